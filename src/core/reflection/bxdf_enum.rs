use crate::bxdfs::*;
use crate::core::pbrt::*;

/// Closed set of scattering models with static dispatch.
#[derive(Debug, Clone)]
pub enum BxDFEnum {
    Hair(HairBxDF),
    TabulatedHair(TabulatedHairBxDF),
    Measured(MeasuredBxDF),
}

impl BxDFEnum {
    #[inline]
    pub fn flags(&self) -> BxDFType {
        match self {
            BxDFEnum::Hair(v) => v.flags(),
            BxDFEnum::TabulatedHair(v) => v.flags(),
            BxDFEnum::Measured(v) => v.flags(),
        }
    }

    #[inline]
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> SampledSpectrum {
        match self {
            BxDFEnum::Hair(v) => v.f(wo, wi, mode),
            BxDFEnum::TabulatedHair(v) => v.f(wo, wi, mode),
            BxDFEnum::Measured(v) => v.f(wo, wi, mode),
        }
    }

    #[inline]
    pub fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        match self {
            BxDFEnum::Hair(v) => v.sample_f(wo, uc, u, mode, sample_flags),
            BxDFEnum::TabulatedHair(v) => v.sample_f(wo, uc, u, mode, sample_flags),
            BxDFEnum::Measured(v) => v.sample_f(wo, uc, u, mode, sample_flags),
        }
    }

    #[inline]
    pub fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        match self {
            BxDFEnum::Hair(v) => v.pdf(wo, wi, mode, sample_flags),
            BxDFEnum::TabulatedHair(v) => v.pdf(wo, wi, mode, sample_flags),
            BxDFEnum::Measured(v) => v.pdf(wo, wi, mode, sample_flags),
        }
    }

    #[inline]
    pub fn rho_hd(&self, wo: &Vector3f, uc: &[Float], u2: &[Point2f]) -> SampledSpectrum {
        match self {
            BxDFEnum::Hair(v) => v.rho_hd(wo, uc, u2),
            BxDFEnum::TabulatedHair(v) => v.rho_hd(wo, uc, u2),
            BxDFEnum::Measured(v) => v.rho_hd(wo, uc, u2),
        }
    }

    #[inline]
    pub fn rho_hh(&self, u1: &[Point2f], uc: &[Float], u2: &[Point2f]) -> SampledSpectrum {
        match self {
            BxDFEnum::Hair(v) => v.rho_hh(u1, uc, u2),
            BxDFEnum::TabulatedHair(v) => v.rho_hh(u1, uc, u2),
            BxDFEnum::Measured(v) => v.rho_hh(u1, uc, u2),
        }
    }

    pub fn regularize(&mut self) {
        match self {
            BxDFEnum::Hair(v) => v.regularize(),
            BxDFEnum::TabulatedHair(v) => v.regularize(),
            BxDFEnum::Measured(v) => v.regularize(),
        }
    }

    pub fn to_string(&self) -> String {
        match self {
            BxDFEnum::Hair(v) => BxDF::to_string(v),
            BxDFEnum::TabulatedHair(v) => BxDF::to_string(v),
            BxDFEnum::Measured(v) => BxDF::to_string(v),
        }
    }
}

impl From<HairBxDF> for BxDFEnum {
    fn from(v: HairBxDF) -> Self {
        BxDFEnum::Hair(v)
    }
}

impl From<TabulatedHairBxDF> for BxDFEnum {
    fn from(v: TabulatedHairBxDF) -> Self {
        BxDFEnum::TabulatedHair(v)
    }
}

impl From<MeasuredBxDF> for BxDFEnum {
    fn from(v: MeasuredBxDF) -> Self {
        BxDFEnum::Measured(v)
    }
}
