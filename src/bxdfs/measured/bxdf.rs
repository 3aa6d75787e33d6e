use super::data::*;
use crate::core::pbrt::*;

use std::sync::Arc;

/// Floor of the sine-weighted solid-angle factor of the reflection Jacobian.
pub const MIN_JACOBIAN: Float = 1e-6;

#[inline]
fn theta2u(theta: Float) -> Float {
    return Float::sqrt(theta * (2.0 / PI));
}

#[inline]
fn phi2u(phi: Float) -> Float {
    return phi * INV_2_PI + 0.5;
}

#[inline]
fn u2theta(u: Float) -> Float {
    return sqr(u) * PI_OVER_2;
}

#[inline]
fn u2phi(u: Float) -> Float {
    return (2.0 * u - 1.0) * PI;
}

/// Reflectance reconstructed from a measured, spectrally resolved dataset.
#[derive(Debug, Clone)]
pub struct MeasuredBxDF {
    brdf: Arc<MeasuredBxDFData>,
    lambda: SampledWavelengths,
}

impl MeasuredBxDF {
    pub fn new(brdf: Arc<MeasuredBxDFData>, lambda: &SampledWavelengths) -> Self {
        MeasuredBxDF {
            brdf,
            lambda: *lambda,
        }
    }

    pub fn data(&self) -> &Arc<MeasuredBxDFData> {
        return &self.brdf;
    }

    pub fn wavelengths(&self) -> &SampledWavelengths {
        return &self.lambda;
    }

    fn spectrum_at(&self, u: Point2f, phi_o: Float, theta_o: Float) -> SampledSpectrum {
        let mut fr = SampledSpectrum::zero();
        for i in 0..N_SPECTRUM_SAMPLES {
            let v = self.brdf.spectra.evaluate(u, [phi_o, theta_o, self.lambda[i]]);
            fr[i] = Float::max(0.0, v);
        }
        return fr;
    }

    /// Microfacet normal of the pair in the unit-square parameterization.
    fn half_vector_coords(&self, wo: &Vector3f, wm: &Vector3f) -> (Point2f, Float, Float) {
        let theta_o = spherical_theta(wo);
        let phi_o = Float::atan2(wo.y, wo.x);
        let theta_m = spherical_theta(wm);
        let phi_m = Float::atan2(wm.y, wm.x);
        let mut u_wm = Point2f::new(
            theta2u(theta_m),
            phi2u(if self.brdf.isotropic { phi_m - phi_o } else { phi_m }),
        );
        u_wm.y -= Float::floor(u_wm.y);
        return (u_wm, phi_o, theta_o);
    }
}

impl BxDF for MeasuredBxDF {
    fn flags(&self) -> BxDFType {
        return BSDF_GLOSSY_REFLECTION;
    }

    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> SampledSpectrum {
        if !same_hemisphere(wo, wi) {
            return SampledSpectrum::zero();
        }
        let (wo, wi) = if wo.z < 0.0 { (-*wo, -*wi) } else { (*wo, *wi) };

        let wm = wi + wo;
        if wm.length_squared() == 0.0 {
            return SampledSpectrum::zero();
        }
        let wm = wm.normalize();

        let (u_wm, phi_o, theta_o) = self.half_vector_coords(&wo, &wm);
        let u_wo = Point2f::new(theta2u(theta_o), phi2u(phi_o));

        // Recover the sample-space coordinate of the microfacet normal
        let ui = self.brdf.vndf.invert(u_wm, [phi_o, theta_o]);

        let fr = self.spectrum_at(ui.p, phi_o, theta_o);
        let denom = 4.0 * self.brdf.sigma.evaluate(u_wo, []) * cos_theta(&wi);
        if !(denom > 0.0) {
            return SampledSpectrum::zero();
        }
        return fr * (self.brdf.ndf.evaluate(u_wm, []) / denom);
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if (sample_flags & REFL_TRANS_REFLECTION) == 0 {
            return None;
        }
        let flip_wi = wo.z <= 0.0;
        let wo = if flip_wi { -*wo } else { *wo };

        let theta_o = spherical_theta(&wo);
        let phi_o = Float::atan2(wo.y, wo.x);

        // Warp sample using luminance distribution
        let s = self.brdf.luminance.sample(*u, [phi_o, theta_o]);
        let u = s.p;
        let lum_pdf = s.pdf;

        // Sample visible normal distribution
        let s = self.brdf.vndf.sample(u, [phi_o, theta_o]);
        let u_wm = s.p;
        let mut pdf = s.pdf;

        // Map from microfacet normal to incident direction
        let mut phi_m = u2phi(u_wm.y);
        let theta_m = u2theta(u_wm.x);
        if self.brdf.isotropic {
            phi_m += phi_o;
        }
        let sin_theta_m = Float::sin(theta_m);
        let cos_theta_m = Float::cos(theta_m);
        let wm = spherical_direction(sin_theta_m, cos_theta_m, phi_m);
        let wi = reflect(&wo, &wm);
        if wi.z <= 0.0 {
            return None;
        }

        let u_wo = Point2f::new(theta2u(theta_o), phi2u(phi_o));
        let denom = 4.0 * self.brdf.sigma.evaluate(u_wo, []) * abs_cos_theta(&wi);
        if !(denom > 0.0) {
            return None;
        }
        let fr = self.spectrum_at(u, phi_o, theta_o) * (self.brdf.ndf.evaluate(u_wm, []) / denom);
        pdf /= 4.0
            * Vector3f::dot(&wo, &wm)
            * Float::max(2.0 * sqr(PI) * u_wm.x * sin_theta_m, MIN_JACOBIAN);
        let pdf = pdf * lum_pdf;
        if !(pdf > 0.0) || !pdf.is_finite() {
            return None;
        }

        let wi = if flip_wi { -wi } else { wi };
        return Some(BSDFSample::new(fr, wi, pdf, BSDF_GLOSSY_REFLECTION));
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if (sample_flags & REFL_TRANS_REFLECTION) == 0 {
            return 0.0;
        }
        if !same_hemisphere(wo, wi) {
            return 0.0;
        }
        let (wo, wi) = if wo.z < 0.0 { (-*wo, -*wi) } else { (*wo, *wi) };

        let wm = wi + wo;
        if wm.length_squared() == 0.0 {
            return 0.0;
        }
        let wm = wm.normalize();

        let (u_wm, phi_o, theta_o) = self.half_vector_coords(&wo, &wm);
        let ui = self.brdf.vndf.invert(u_wm, [phi_o, theta_o]);
        let vndf_pdf = ui.pdf;

        let pdf = self.brdf.luminance.evaluate(ui.p, [phi_o, theta_o]);
        let sin_theta_m = Float::sqrt(sqr(wm.x) + sqr(wm.y));
        let jacobian = 4.0
            * Vector3f::dot(&wo, &wm)
            * Float::max(2.0 * sqr(PI) * u_wm.x * sin_theta_m, MIN_JACOBIAN);
        return vndf_pdf * pdf / jacobian;
    }

    fn to_string(&self) -> String {
        return format!("[ MeasuredBxDF brdf: {} ]", self.brdf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        for &t in [0.0, 0.3, 1.0, PI_OVER_2].iter() {
            assert!((u2theta(theta2u(t)) - t).abs() < 1e-5);
        }
        for &p in [-PI, -1.0, 0.0, 2.5].iter() {
            assert!((u2phi(phi2u(p)) - p).abs() < 1e-5);
        }
        assert!((theta2u(PI_OVER_2) - 1.0).abs() < 1e-6);
        assert!(phi2u(-PI).abs() < 1e-6);
    }
}
