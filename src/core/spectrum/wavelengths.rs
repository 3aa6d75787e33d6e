use super::sampled::*;
use crate::core::pbrt::*;

pub const LAMBDA_MIN: Float = 360.0;
pub const LAMBDA_MAX: Float = 830.0;

/// Wavelengths (nm) associated with the entries of a `SampledSpectrum`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SampledWavelengths {
    lambda: [Float; N_SPECTRUM_SAMPLES],
    pdf: [Float; N_SPECTRUM_SAMPLES],
}

impl SampledWavelengths {
    pub fn new(lambda: [Float; N_SPECTRUM_SAMPLES]) -> Self {
        let pdf = 1.0 / (LAMBDA_MAX - LAMBDA_MIN);
        SampledWavelengths {
            lambda,
            pdf: [pdf; N_SPECTRUM_SAMPLES],
        }
    }

    /// Stratified uniform wavelengths over `[lambda_min, lambda_max]`, offset by `u`.
    pub fn sample_uniform_range(u: Float, lambda_min: Float, lambda_max: Float) -> Self {
        let mut lambda = [0.0; N_SPECTRUM_SAMPLES];
        lambda[0] = lerp(u, lambda_min, lambda_max);
        let delta = (lambda_max - lambda_min) / (N_SPECTRUM_SAMPLES as Float);
        for i in 1..N_SPECTRUM_SAMPLES {
            lambda[i] = lambda[i - 1] + delta;
            if lambda[i] > lambda_max {
                lambda[i] = lambda_min + (lambda[i] - lambda_max);
            }
        }
        let pdf = 1.0 / (lambda_max - lambda_min);
        SampledWavelengths {
            lambda,
            pdf: [pdf; N_SPECTRUM_SAMPLES],
        }
    }

    pub fn sample_uniform(u: Float) -> Self {
        return Self::sample_uniform_range(u, LAMBDA_MIN, LAMBDA_MAX);
    }

    /// Evenly spaced bin centers over the visible range.
    pub fn visible() -> Self {
        return Self::sample_uniform(0.5 / N_SPECTRUM_SAMPLES as Float);
    }

    pub fn pdf(&self) -> SampledSpectrum {
        return SampledSpectrum::from(self.pdf);
    }

    pub fn as_slice(&self) -> &[Float] {
        return &self.lambda;
    }
}

impl std::ops::Index<usize> for SampledWavelengths {
    type Output = Float;
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        return &self.lambda[i];
    }
}

impl Default for SampledWavelengths {
    fn default() -> Self {
        Self::visible()
    }
}
