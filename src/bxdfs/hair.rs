use crate::core::pbrt::*;

pub const P_MAX: usize = 3;
const SQRT_PI_OVER8: Float = 0.626657069;

/// Lower bound on the longitudinal sample, keeps the log away from zero.
pub const MIN_LONGITUDINAL_SAMPLE: Float = 1e-5;

// Anchor wavelengths (nm) of the melanin absorption basis, ordered R, G, B.
const MELANIN_BASIS_LAMBDA: [Float; 3] = [630.0, 532.0, 465.0];
const EUMELANIN_SIGMA_A: [Float; 3] = [0.419, 0.697, 1.37];
const PHEOMELANIN_SIGMA_A: [Float; 3] = [0.187, 0.4, 1.05];

// Hair Local Declarations
#[inline]
fn mp(
    cos_theta_i: Float,
    cos_theta_o: Float,
    sin_theta_i: Float,
    sin_theta_o: Float,
    v: Float,
) -> Float {
    const LN2: Float = 0.6931;

    let a = cos_theta_i * cos_theta_o / v;
    let b = sin_theta_i * sin_theta_o / v;
    debug_assert!(v.is_finite() && v > 0.0);

    let mp = if v <= 0.1 {
        Float::exp(log_i0(a) - b - 1.0 / v + LN2 + Float::ln(1.0 / (2.0 * v)))
    } else {
        Float::exp(-b) * i0(a) / (Float::sinh(1.0 / v) * 2.0 * v)
    };
    debug_assert!(mp.is_finite());
    return mp.max(0.0);
}

#[inline]
fn i0(x: Float) -> Float {
    let mut val = 0.0;
    let mut x2i = 1.0;
    let mut ifact: u64 = 1;
    let mut i4: u64 = 1;
    // I0(x) \approx Sum_i x^(2i) / (4^i (i!)^2)
    for i in 0..10 {
        if i > 1 {
            ifact *= i;
        }
        val += x2i / (i4 as Float * sqr(ifact as Float));
        x2i *= x * x;
        i4 *= 4;
    }
    val
}

#[inline]
fn log_i0(x: Float) -> Float {
    if x > 12.0 {
        return x + 0.5 * (-Float::ln(2.0 * PI) + Float::ln(1.0 / x) + 1.0 / (8.0 * x));
    } else {
        return Float::ln(i0(x));
    }
}

fn ap(
    cos_theta_o: Float,
    eta: Float,
    h: Float,
    t: &SampledSpectrum,
) -> [SampledSpectrum; P_MAX + 1] {
    let mut ap = [SampledSpectrum::zero(); P_MAX + 1];
    // Compute $p=0$ attenuation at initial cylinder intersection
    let cos_gamma_o = safe_sqrt(1.0 - h * h);
    let cos_theta = cos_theta_o * cos_gamma_o;
    let f = fr_dielectric(cos_theta, eta);
    let tf = *t * f;

    ap[0] = SampledSpectrum::from(f);
    ap[1] = *t * sqr(1.0 - f);
    for p in 2..P_MAX {
        ap[p] = ap[p - 1] * tf;
    }

    // Remaining orders form a geometric series
    let denom = SampledSpectrum::one() - tf;
    let num = ap[P_MAX - 1] * tf;
    for i in 0..N_SPECTRUM_SAMPLES {
        ap[P_MAX][i] = if denom[i] > 0.0 { num[i] / denom[i] } else { 0.0 };
    }
    return ap;
}

#[inline]
fn phi(p: usize, gamma_o: Float, gamma_t: Float) -> Float {
    let p = p as Float;
    return 2.0 * p * gamma_t - 2.0 * gamma_o + p * PI;
}

#[inline]
fn np(phi_: Float, p: usize, s: Float, gamma_o: Float, gamma_t: Float) -> Float {
    let mut dphi = phi_ - phi(p, gamma_o, gamma_t);
    // Remap _dphi_ to $[-\pi,\pi]$
    while dphi > PI {
        dphi -= 2.0 * PI;
    }
    while dphi < -PI {
        dphi += 2.0 * PI;
    }
    return trimmed_logistic(dphi, s, -PI, PI).max(0.0);
}

/// Refraction quantities shared by evaluation and sampling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HairFrame {
    pub sin_theta_o: Float,
    pub cos_theta_o: Float,
    pub phi_o: Float,
    pub gamma_t: Float,
    pub transmittance: SampledSpectrum,
}

/// Multi-lobe scattering from a dielectric fiber with cuticle scales.
///
/// Directions are in the fiber frame: x runs along the fiber, the y-z plane
/// is the cross section. `h` is the offset across the width in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct HairBxDF {
    h: Float,
    gamma_o: Float,
    eta: Float,
    sigma_a: SampledSpectrum,
    beta_m: Float,
    beta_n: Float,
    v: [Float; P_MAX + 1],
    s: Float,
    sin2k_alpha: [Float; 3],
    cos2k_alpha: [Float; 3],
}

impl HairBxDF {
    pub fn new(
        h: Float,
        eta: Float,
        sigma_a: SampledSpectrum,
        beta_m: Float,
        beta_n: Float,
        alpha: Float,
    ) -> Result<Self, PbrtError> {
        if !(h >= -1.0 && h <= 1.0) {
            let msg = format!("hair: h = {} is outside [-1, 1]", h);
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if !(eta > 0.0 && eta.is_finite()) {
            let msg = format!("hair: eta = {} must be positive", eta);
            return Err(PbrtError::invalid_parameter(&msg));
        }
        // zero roughness collapses the lobes to delta functions
        if !(beta_m > 0.0 && beta_m <= 1.0) {
            let msg = format!(
                "hair: beta_m = {} is outside (0, 1]; zero roughness makes the longitudinal lobe non-finite",
                beta_m
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if !(beta_n > 0.0 && beta_n <= 1.0) {
            let msg = format!(
                "hair: beta_n = {} is outside (0, 1]; zero roughness makes the azimuthal lobe non-finite",
                beta_n
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if !alpha.is_finite() {
            return Err(PbrtError::invalid_parameter("hair: alpha must be finite"));
        }
        if !sigma_a.is_valid() || !sigma_a.is_non_negative() {
            return Err(PbrtError::invalid_parameter(
                "hair: sigma_a must be finite and non-negative",
            ));
        }
        let gamma_o = safe_asin(h);

        let mut v = [0.0; P_MAX + 1];
        let v0 = sqr(0.726 * beta_m + 0.812 * sqr(beta_m) + 3.7 * Float::powi(beta_m, 20));
        v[0] = v0;
        v[1] = 0.25 * v0;
        v[2] = 4.0 * v0;
        for i in 3..v.len() {
            v[i] = v[2];
        }
        // Compute azimuthal logistic scale factor from $\beta_n$
        let s = SQRT_PI_OVER8
            * (0.265 * beta_n + 1.194 * sqr(beta_n) + 5.372 * Float::powi(beta_n, 22));

        // Compute $\alpha$ terms for hair scales
        let sin0 = Float::sin(radians(alpha));
        let cos0 = safe_sqrt(1.0 - sqr(sin0));
        let mut sin2k_alpha = [sin0, 0.0, 0.0];
        let mut cos2k_alpha = [cos0, 0.0, 0.0];
        for i in 1..3 {
            sin2k_alpha[i] = 2.0 * cos2k_alpha[i - 1] * sin2k_alpha[i - 1];
            cos2k_alpha[i] = sqr(cos2k_alpha[i - 1]) - sqr(sin2k_alpha[i - 1]);
        }

        Ok(HairBxDF {
            h,
            gamma_o,
            eta,
            sigma_a,
            beta_m,
            beta_n,
            v,
            s,
            sin2k_alpha,
            cos2k_alpha,
        })
    }

    pub fn h(&self) -> Float {
        return self.h;
    }

    pub fn eta(&self) -> Float {
        return self.eta;
    }

    pub fn sigma_a(&self) -> &SampledSpectrum {
        return &self.sigma_a;
    }

    pub fn beta_m(&self) -> Float {
        return self.beta_m;
    }

    pub fn beta_n(&self) -> Float {
        return self.beta_n;
    }

    pub(crate) fn frame(&self, wo: &Vector3f) -> HairFrame {
        let eta = self.eta;
        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = Float::atan2(wo.z, wo.y);

        // Compute $\cos \thetat$ for refracted ray
        let sin_theta_t = sin_theta_o / eta;
        let cos_theta_t = safe_sqrt(1.0 - sqr(sin_theta_t));

        // Compute $\gammat$ for refracted ray
        let etap = safe_sqrt(eta * eta - sqr(sin_theta_o)) / cos_theta_o;
        let sin_gamma_t = self.h / etap;
        let cos_gamma_t = safe_sqrt(1.0 - sqr(sin_gamma_t));
        let gamma_t = safe_asin(sin_gamma_t);

        // Transmittance of a single path through the cylinder
        let transmittance = (-self.sigma_a * (2.0 * cos_gamma_t / cos_theta_t)).exp();
        HairFrame {
            sin_theta_o,
            cos_theta_o,
            phi_o,
            gamma_t,
            transmittance,
        }
    }

    fn compute_theta_op(&self, p: usize, sin_theta_o: Float, cos_theta_o: Float) -> (Float, Float) {
        let sin2k_alpha = &self.sin2k_alpha;
        let cos2k_alpha = &self.cos2k_alpha;
        let (sin_theta_op, cos_theta_op) = match p {
            0 => (
                sin_theta_o * cos2k_alpha[1] - cos_theta_o * sin2k_alpha[1],
                cos_theta_o * cos2k_alpha[1] + sin_theta_o * sin2k_alpha[1],
            ),
            1 => (
                sin_theta_o * cos2k_alpha[0] + cos_theta_o * sin2k_alpha[0],
                cos_theta_o * cos2k_alpha[0] - sin_theta_o * sin2k_alpha[0],
            ),
            2 => (
                sin_theta_o * cos2k_alpha[2] + cos_theta_o * sin2k_alpha[2],
                cos_theta_o * cos2k_alpha[2] - sin_theta_o * sin2k_alpha[2],
            ),
            _ => (sin_theta_o, cos_theta_o),
        };
        // Handle out-of-range $\cos \thetao$ from scale adjustment
        return (sin_theta_op, Float::abs(cos_theta_op));
    }

    /// Discrete probabilities of choosing each scattering order.
    pub(crate) fn ap_pdf(&self, frame: &HairFrame) -> [Float; P_MAX + 1] {
        let ap = ap(frame.cos_theta_o, self.eta, self.h, &frame.transmittance);
        let sum: Float = ap.iter().map(|a| a.average()).sum();
        let mut ap_pdf = [0.0; P_MAX + 1];
        if sum > 0.0 {
            for i in 0..=P_MAX {
                ap_pdf[i] = Float::max(ap[i].average() / sum, 0.0);
            }
        }
        return ap_pdf;
    }

    /// Each order's term of `f`, before the division by `|cos theta_i|`.
    /// The last entry holds all orders from `P_MAX` on.
    pub fn lobe_contributions(&self, wo: &Vector3f, wi: &Vector3f) -> [SampledSpectrum; P_MAX + 1] {
        let frame = self.frame(wo);
        let sin_theta_i = wi.x;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));
        let phi_i = Float::atan2(wi.z, wi.y);
        let phi = phi_i - frame.phi_o;

        let ap = ap(frame.cos_theta_o, self.eta, self.h, &frame.transmittance);
        let mut terms = [SampledSpectrum::zero(); P_MAX + 1];
        for p in 0..P_MAX {
            let (sin_theta_op, cos_theta_op) =
                self.compute_theta_op(p, frame.sin_theta_o, frame.cos_theta_o);
            terms[p] = ap[p]
                * (mp(cos_theta_i, cos_theta_op, sin_theta_i, sin_theta_op, self.v[p])
                    * np(phi, p, self.s, self.gamma_o, frame.gamma_t));
        }
        terms[P_MAX] = ap[P_MAX]
            * (mp(
                cos_theta_i,
                frame.cos_theta_o,
                sin_theta_i,
                frame.sin_theta_o,
                self.v[P_MAX],
            ) / (2.0 * PI));
        return terms;
    }

    /// Density of `sample_direction` over the sphere of incident directions.
    pub(crate) fn density(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        let frame = self.frame(wo);
        let sin_theta_i = wi.x;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));
        let phi_i = Float::atan2(wi.z, wi.y);
        let ap_pdf = self.ap_pdf(&frame);
        return self.density_with(&frame, &ap_pdf, sin_theta_i, cos_theta_i, phi_i - frame.phi_o);
    }

    fn density_with(
        &self,
        frame: &HairFrame,
        ap_pdf: &[Float; P_MAX + 1],
        sin_theta_i: Float,
        cos_theta_i: Float,
        phi: Float,
    ) -> Float {
        let mut pdf = 0.0;
        for p in 0..P_MAX {
            let (sin_theta_op, cos_theta_op) =
                self.compute_theta_op(p, frame.sin_theta_o, frame.cos_theta_o);
            pdf += mp(cos_theta_i, cos_theta_op, sin_theta_i, sin_theta_op, self.v[p])
                * ap_pdf[p]
                * np(phi, p, self.s, self.gamma_o, frame.gamma_t);
        }
        pdf += mp(
            cos_theta_i,
            frame.cos_theta_o,
            sin_theta_i,
            frame.sin_theta_o,
            self.v[P_MAX],
        ) * ap_pdf[P_MAX]
            * (1.0 / (2.0 * PI));
        return pdf;
    }

    /// Importance-samples an incident direction; returns it with its density.
    pub(crate) fn sample_direction(&self, wo: &Vector3f, uc: Float, u: &Point2f) -> Option<(Vector3f, Float)> {
        let frame = self.frame(wo);

        // Determine which term $p$ to sample for hair scattering
        let ap_pdf = self.ap_pdf(&frame);
        let (p, _, uc) = sample_discrete(&ap_pdf, uc)?;

        let (sin_theta_op, cos_theta_op) =
            self.compute_theta_op(p, frame.sin_theta_o, frame.cos_theta_o);

        // Sample $M_p$ to compute $\thetai$
        let v = self.v[p];
        let u0 = Float::max(u[0], MIN_LONGITUDINAL_SAMPLE);
        let cos_theta = 1.0 + v * Float::ln(u0 + (1.0 - u[0]) * Float::exp(-2.0 / v));
        let sin_theta = safe_sqrt(1.0 - sqr(cos_theta));
        let cos_phi = Float::cos(2.0 * PI * u[1]);
        let sin_theta_i = Float::clamp(
            -cos_theta * sin_theta_op + sin_theta * cos_phi * cos_theta_op,
            -1.0,
            1.0,
        );
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));

        // Sample $N_p$ to compute $\Delta\phi$
        let dphi = if p < P_MAX {
            phi(p, self.gamma_o, frame.gamma_t) + sample_trimmed_logistic(uc, self.s, -PI, PI)
        } else {
            2.0 * PI * uc
        };

        // Compute _wi_ from sampled hair scattering angles
        let phi_i = frame.phi_o + dphi;
        let wi = Vector3f::new(
            sin_theta_i,
            cos_theta_i * Float::cos(phi_i),
            cos_theta_i * Float::sin(phi_i),
        );
        let pdf = self.density_with(&frame, &ap_pdf, sin_theta_i, cos_theta_i, dphi);
        if !(pdf > 0.0) || !pdf.is_finite() {
            return None;
        }
        return Some((wi, pdf));
    }

    /// Absorption coefficient from eumelanin and pheomelanin concentrations,
    /// in the R, G, B basis.
    pub fn sigma_a_from_concentration_rgb(ce: Float, cp: Float) -> [Float; 3] {
        let mut sigma_a = [0.0; 3];
        for i in 0..3 {
            sigma_a[i] = ce * EUMELANIN_SIGMA_A[i] + cp * PHEOMELANIN_SIGMA_A[i];
        }
        return sigma_a;
    }

    /// Absorption coefficient from pigment concentrations at the given wavelengths.
    pub fn sigma_a_from_concentration(ce: Float, cp: Float, lambda: &SampledWavelengths) -> SampledSpectrum {
        let rgb = Self::sigma_a_from_concentration_rgb(ce, cp);
        // ascending wavelength order: B, G, R
        let xs = [
            MELANIN_BASIS_LAMBDA[2],
            MELANIN_BASIS_LAMBDA[1],
            MELANIN_BASIS_LAMBDA[0],
        ];
        let ys = [rgb[2], rgb[1], rgb[0]];
        let mut sigma_a = SampledSpectrum::zero();
        for i in 0..N_SPECTRUM_SAMPLES {
            let l = lambda[i];
            sigma_a[i] = if l <= xs[0] {
                ys[0]
            } else if l >= xs[2] {
                ys[2]
            } else {
                let k = find_interval(3, |j| xs[j] <= l);
                let t = (l - xs[k]) / (xs[k + 1] - xs[k]);
                lerp(t, ys[k], ys[k + 1])
            };
        }
        return sigma_a;
    }

    /// Inverts the fitted relation between absorption and multiply-scattered color.
    pub fn sigma_a_from_reflectance(c: &SampledSpectrum, beta_n: Float) -> SampledSpectrum {
        let mut sigma_a = SampledSpectrum::zero();
        for i in 0..N_SPECTRUM_SAMPLES {
            sigma_a[i] = sqr(Float::ln(c[i])
                / (5.969 - 0.215 * beta_n + 2.532 * sqr(beta_n)
                    - 10.73 * Float::powi(beta_n, 3)
                    + 5.574 * Float::powi(beta_n, 4)
                    + 0.245 * Float::powi(beta_n, 5)));
        }
        return sigma_a;
    }
}

impl BxDF for HairBxDF {
    fn flags(&self) -> BxDFType {
        return BSDF_GLOSSY_REFLECTION;
    }

    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> SampledSpectrum {
        let terms = self.lobe_contributions(wo, wi);
        let mut fsum = terms
            .iter()
            .fold(SampledSpectrum::zero(), |a, b| a + *b);
        let abs_cos_theta_wi = abs_cos_theta(wi);
        if abs_cos_theta_wi > 0.0 {
            fsum /= abs_cos_theta_wi;
        }
        debug_assert!(fsum.is_valid());
        return fsum;
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if (sample_flags & REFL_TRANS_REFLECTION) == 0 {
            return None;
        }
        let (wi, pdf) = self.sample_direction(wo, uc, u)?;
        let f = self.f(wo, &wi, mode);
        return Some(BSDFSample::new(f, wi, pdf, self.flags()));
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
        return self.density(wo, wi);
    }

    fn to_string(&self) -> String {
        return format!(
            "[ HairBxDF h: {} gamma_o: {} eta: {} beta_m: {} beta_n: {} v[0]: {} s: {} sigma_a: {:?} ]",
            self.h, self.gamma_o, self.eta, self.beta_m, self.beta_n, self.v[0], self.s, self.sigma_a.c
        );
    }
}
