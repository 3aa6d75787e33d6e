use crate::core::pbrt::*;

use std::ops;

pub const N_SPECTRUM_SAMPLES: usize = 4;

/// Spectral quantity sampled at the `N_SPECTRUM_SAMPLES` wavelengths carried
/// by a matching `SampledWavelengths`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SampledSpectrum {
    pub c: [Float; N_SPECTRUM_SAMPLES],
}

impl SampledSpectrum {
    pub const N_SAMPLES: usize = N_SPECTRUM_SAMPLES;

    pub fn zero() -> Self {
        SampledSpectrum {
            c: [0.0; N_SPECTRUM_SAMPLES],
        }
    }

    pub fn one() -> Self {
        SampledSpectrum {
            c: [1.0; N_SPECTRUM_SAMPLES],
        }
    }

    #[inline]
    fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        let mut c = self.c;
        for v in c.iter_mut() {
            *v = f(*v);
        }
        return SampledSpectrum { c };
    }

    #[inline]
    fn zip<F: Fn(Float, Float) -> Float>(&self, rhs: &Self, f: F) -> Self {
        let mut c = self.c;
        for i in 0..N_SPECTRUM_SAMPLES {
            c[i] = f(c[i], rhs.c[i]);
        }
        return SampledSpectrum { c };
    }

    pub fn clamp(&self, low: Float, hi: Float) -> Self {
        return self.map(|v| Float::clamp(v, low, hi));
    }

    pub fn clamp_zero(&self) -> Self {
        return self.map(|v| Float::max(v, 0.0));
    }

    pub fn exp(&self) -> Self {
        return self.map(Float::exp);
    }

    pub fn sqrt(&self) -> Self {
        return self.map(Float::sqrt);
    }

    pub fn average(&self) -> Float {
        return self.c.iter().sum::<Float>() / (N_SPECTRUM_SAMPLES as Float);
    }

    pub fn max_component_value(&self) -> Float {
        return self.c.iter().fold(Float::NEG_INFINITY, |a, b| Float::max(a, *b));
    }

    pub fn min_component_value(&self) -> Float {
        return self.c.iter().fold(Float::INFINITY, |a, b| Float::min(a, *b));
    }

    pub fn is_black(&self) -> bool {
        return self.c.iter().all(|x| *x == 0.0);
    }

    pub fn is_valid(&self) -> bool {
        return self.c.iter().all(|x| x.is_finite());
    }

    pub fn is_non_negative(&self) -> bool {
        return self.c.iter().all(|x| *x >= 0.0);
    }

    /// Elementwise division that yields zero where the divisor is zero.
    pub fn safe_div(&self, rhs: &Self) -> Self {
        return self.zip(rhs, |a, b| if b != 0.0 { a / b } else { 0.0 });
    }

    pub fn len(&self) -> usize {
        return N_SPECTRUM_SAMPLES;
    }

    pub fn is_empty(&self) -> bool {
        return false;
    }

    pub fn near_equal(a: &SampledSpectrum, b: &SampledSpectrum, eps: Float) -> bool {
        return a.c.iter().zip(b.c.iter()).all(|(x, y)| Float::abs(x - y) <= eps);
    }
}

impl ops::Index<usize> for SampledSpectrum {
    type Output = Float;
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        return &self.c[i];
    }
}

impl ops::IndexMut<usize> for SampledSpectrum {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        return &mut self.c[i];
    }
}

impl ops::Add<SampledSpectrum> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn add(self, s: SampledSpectrum) -> SampledSpectrum {
        return self.zip(&s, |a, b| a + b);
    }
}

impl ops::Sub<SampledSpectrum> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn sub(self, s: SampledSpectrum) -> SampledSpectrum {
        return self.zip(&s, |a, b| a - b);
    }
}

impl ops::Mul<SampledSpectrum> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn mul(self, s: SampledSpectrum) -> SampledSpectrum {
        return self.zip(&s, |a, b| a * b);
    }
}

impl ops::Div<SampledSpectrum> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn div(self, s: SampledSpectrum) -> SampledSpectrum {
        return self.zip(&s, |a, b| a / b);
    }
}

impl ops::Mul<Float> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn mul(self, s: Float) -> SampledSpectrum {
        return self.map(|a| a * s);
    }
}

impl ops::Mul<SampledSpectrum> for Float {
    type Output = SampledSpectrum;
    #[inline]
    fn mul(self, rhs: SampledSpectrum) -> SampledSpectrum {
        return rhs * self;
    }
}

impl ops::Div<Float> for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn div(self, s: Float) -> SampledSpectrum {
        return self.map(|a| a / s);
    }
}

impl ops::AddAssign<SampledSpectrum> for SampledSpectrum {
    #[inline]
    fn add_assign(&mut self, s: SampledSpectrum) {
        *self = *self + s;
    }
}

impl ops::MulAssign<SampledSpectrum> for SampledSpectrum {
    #[inline]
    fn mul_assign(&mut self, s: SampledSpectrum) {
        *self = *self * s;
    }
}

impl ops::MulAssign<Float> for SampledSpectrum {
    #[inline]
    fn mul_assign(&mut self, s: Float) {
        *self = *self * s;
    }
}

impl ops::DivAssign<Float> for SampledSpectrum {
    #[inline]
    fn div_assign(&mut self, s: Float) {
        *self = *self / s;
    }
}

impl ops::Neg for SampledSpectrum {
    type Output = SampledSpectrum;
    #[inline]
    fn neg(self) -> Self::Output {
        return self.map(|a| -a);
    }
}

impl Default for SampledSpectrum {
    #[inline]
    fn default() -> Self {
        SampledSpectrum::zero()
    }
}

impl From<Float> for SampledSpectrum {
    #[inline]
    fn from(value: Float) -> Self {
        SampledSpectrum {
            c: [value; N_SPECTRUM_SAMPLES],
        }
    }
}

impl From<[Float; N_SPECTRUM_SAMPLES]> for SampledSpectrum {
    #[inline]
    fn from(value: [Float; N_SPECTRUM_SAMPLES]) -> Self {
        SampledSpectrum { c: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let v1 = SampledSpectrum::from(1.0);
        let v2 = SampledSpectrum::from(2.0);
        assert_eq!(v1 + v2, SampledSpectrum::from(3.0));
        assert_eq!(v2 - v1, v1);
        assert_eq!(v2 * v2, SampledSpectrum::from(4.0));
    }

    #[test]
    fn test_002() {
        let v = SampledSpectrum::from([1.0, 2.0, 3.0, 6.0]);
        assert_eq!(v.average(), 3.0);
        assert_eq!(v.max_component_value(), 6.0);
        assert_eq!(v.min_component_value(), 1.0);
    }

    #[test]
    fn test_003() {
        let v = SampledSpectrum::from([-1.0, 0.0, 1.0, 2.0]).clamp_zero();
        assert_eq!(v, SampledSpectrum::from([0.0, 0.0, 1.0, 2.0]));
        assert!(SampledSpectrum::zero().exp() == SampledSpectrum::one());
        let d = SampledSpectrum::one().safe_div(&SampledSpectrum::from([0.0, 1.0, 2.0, 4.0]));
        assert_eq!(d, SampledSpectrum::from([0.0, 1.0, 0.5, 0.25]));
    }
}
