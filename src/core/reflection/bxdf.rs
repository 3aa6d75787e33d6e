use crate::core::pbrt::*;

pub type BxDFType = u32;

pub const BSDF_NONE: BxDFType = 0;
pub const BSDF_REFLECTION: BxDFType = 1 << 0; //1
pub const BSDF_TRANSMISSION: BxDFType = 1 << 1; //2
pub const BSDF_DIFFUSE: BxDFType = 1 << 2; //4
pub const BSDF_GLOSSY: BxDFType = 1 << 3; //8
pub const BSDF_SPECULAR: BxDFType = 1 << 4; //16
pub const BSDF_GLOSSY_REFLECTION: BxDFType = BSDF_GLOSSY | BSDF_REFLECTION;
pub const BSDF_ALL: BxDFType =
    BSDF_REFLECTION | BSDF_TRANSMISSION | BSDF_DIFFUSE | BSDF_GLOSSY | BSDF_SPECULAR;

/// Request mask for sampling; only the reflection / transmission bits count.
pub type BxDFReflTransFlags = u32;

pub const REFL_TRANS_REFLECTION: BxDFReflTransFlags = BSDF_REFLECTION;
pub const REFL_TRANS_TRANSMISSION: BxDFReflTransFlags = BSDF_TRANSMISSION;
pub const REFL_TRANS_ALL: BxDFReflTransFlags = REFL_TRANS_REFLECTION | REFL_TRANS_TRANSMISSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Radiance,
    Importance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSample {
    pub f: SampledSpectrum,
    pub wi: Vector3f,
    pub pdf: Float,
    pub flags: BxDFType,
    pub eta: Float,
}

impl BSDFSample {
    pub fn new(f: SampledSpectrum, wi: Vector3f, pdf: Float, flags: BxDFType) -> Self {
        BSDFSample {
            f,
            wi,
            pdf,
            flags,
            eta: 1.0,
        }
    }

    #[inline]
    pub fn is_reflection(&self) -> bool {
        return (self.flags & BSDF_REFLECTION) != 0;
    }

    #[inline]
    pub fn is_transmission(&self) -> bool {
        return (self.flags & BSDF_TRANSMISSION) != 0;
    }
}

pub trait BxDF: Send + Sync {
    fn flags(&self) -> BxDFType;

    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> SampledSpectrum;

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample>;

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float;

    /// Directional-hemispherical reflectance estimate for `wo`.
    fn rho_hd(&self, wo: &Vector3f, uc: &[Float], u2: &[Point2f]) -> SampledSpectrum {
        if wo.z == 0.0 {
            return SampledSpectrum::zero();
        }
        let n = usize::min(uc.len(), u2.len());
        if n == 0 {
            return SampledSpectrum::zero();
        }
        let r = (0..n)
            .map(|i| -> SampledSpectrum {
                if let Some(bs) =
                    self.sample_f(wo, uc[i], &u2[i], TransportMode::Radiance, REFL_TRANS_ALL)
                {
                    if bs.pdf > 0.0 {
                        return bs.f * (abs_cos_theta(&bs.wi) / bs.pdf);
                    }
                }
                return SampledSpectrum::zero();
            })
            .fold(SampledSpectrum::zero(), |a, b| a + b);
        return r / (n as Float);
    }

    /// Hemispherical-hemispherical reflectance estimate.
    fn rho_hh(&self, u1: &[Point2f], uc: &[Float], u2: &[Point2f]) -> SampledSpectrum {
        let n = usize::min(u1.len(), usize::min(uc.len(), u2.len()));
        if n == 0 {
            return SampledSpectrum::zero();
        }
        let r = (0..n)
            .map(|i| -> SampledSpectrum {
                let wo = uniform_sample_hemisphere(&u1[i]);
                if wo.z == 0.0 {
                    return SampledSpectrum::zero();
                }
                let pdfo = uniform_hemisphere_pdf();
                if let Some(bs) =
                    self.sample_f(&wo, uc[i], &u2[i], TransportMode::Radiance, REFL_TRANS_ALL)
                {
                    if bs.pdf > 0.0 {
                        return bs.f * (abs_cos_theta(&bs.wi) * abs_cos_theta(&wo) / (pdfo * bs.pdf));
                    }
                }
                return SampledSpectrum::zero();
            })
            .fold(SampledSpectrum::zero(), |a, b| a + b);
        return r / (PI * n as Float);
    }

    fn regularize(&mut self) {}

    fn to_string(&self) -> String {
        return format!("[ BxDF flags: {} ]", self.flags());
    }
}
