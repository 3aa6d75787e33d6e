use crate::core::pbrt::*;

pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[0];
    let r = Float::sqrt(Float::max(0.0, 1.0 - z * z));
    let phi = 2.0 * PI * u[1];
    return Vector3f::new(r * Float::cos(phi), r * Float::sin(phi), z);
}

#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    return INV_2_PI;
}

#[inline]
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = Float::sqrt(Float::max(0.0, 1.0 - z * z));
    let phi = 2.0 * PI * u[1];
    return Vector3f::new(r * Float::cos(phi), r * Float::sin(phi), z);
}

#[inline]
pub fn uniform_sphere_pdf() -> Float {
    return INV_4_PI;
}

pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to $[-1,1]^2$
    let ox = 2.0 * u.x - 1.0;
    let oy = 2.0 * u.y - 1.0;

    // Handle degeneracy at the origin
    if ox == 0.0 && oy == 0.0 {
        return Point2f::zero();
    }

    // Apply concentric mapping to point
    let (r, theta) = if Float::abs(ox) > Float::abs(oy) {
        (ox, PI_OVER_4 * (oy / ox))
    } else {
        (oy, PI_OVER_2 - PI_OVER_4 * (ox / oy))
    };
    return Point2f::new(r * Float::cos(theta), r * Float::sin(theta));
}

pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    return Vector3f::new(d.x, d.y, z);
}

#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    return cos_theta * INV_PI;
}

/// Picks an index with probability proportional to `weights`.
///
/// Returns `(index, pmf, u_remapped)` where `u_remapped` is a fresh uniform
/// sample recovered from the unused part of `u`. `None` if all weights are zero.
pub fn sample_discrete(weights: &[Float], u: Float) -> Option<(usize, Float, Float)> {
    if weights.is_empty() {
        return None;
    }
    let sum_weights: Float = weights.iter().sum();
    if !(sum_weights > 0.0) {
        return None;
    }
    let mut up = u * sum_weights;
    if up >= sum_weights {
        up = sum_weights * ONE_MINUS_EPSILON;
    }
    let mut offset = 0;
    let mut sum = 0.0;
    while offset + 1 < weights.len() && sum + weights[offset] <= up {
        sum += weights[offset];
        offset += 1;
    }
    let w = weights[offset];
    let pmf = w / sum_weights;
    let u_remapped = if w > 0.0 {
        Float::clamp((up - sum) / w, 0.0, ONE_MINUS_EPSILON)
    } else {
        0.0
    };
    return Some((offset, pmf, u_remapped));
}

#[inline]
pub fn logistic(x: Float, s: Float) -> Float {
    let x = Float::abs(x);
    return Float::exp(-x / s) / (s * sqr(1.0 + Float::exp(-x / s)));
}

#[inline]
pub fn logistic_cdf(x: Float, s: Float) -> Float {
    return 1.0 / (1.0 + Float::exp(-x / s));
}

/// Logistic density restricted to `[a, b]` and renormalized.
#[inline]
pub fn trimmed_logistic(x: Float, s: Float, a: Float, b: Float) -> Float {
    debug_assert!(a < b);
    return logistic(x, s) / (logistic_cdf(b, s) - logistic_cdf(a, s));
}

#[inline]
pub fn sample_trimmed_logistic(u: Float, s: Float, a: Float, b: Float) -> Float {
    debug_assert!(a < b);
    let k = logistic_cdf(b, s) - logistic_cdf(a, s);
    let x = -s * Float::ln(1.0 / (u * k + logistic_cdf(a, s)) - 1.0);
    debug_assert!(!x.is_nan());
    return Float::clamp(x, a, b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        assert!(sample_discrete(&[], 0.5).is_none());
        assert!(sample_discrete(&[0.0, 0.0], 0.5).is_none());
        let (i, pmf, u) = sample_discrete(&[1.0, 3.0], 0.5).unwrap();
        assert_eq!(i, 1);
        assert!((pmf - 0.75).abs() < 1e-6);
        assert!((u - 1.0 / 3.0).abs() < 1e-5);
        let (i, _, _) = sample_discrete(&[1.0, 3.0], 0.2).unwrap();
        assert_eq!(i, 0);
        let (i, _, u) = sample_discrete(&[1.0, 3.0, 0.0], 1.0).unwrap();
        assert_eq!(i, 1);
        assert!(u < 1.0);
    }

    #[test]
    fn test_002() {
        // Trimmed logistic integrates to one over its support.
        let s = 0.4;
        let n = 20000;
        let mut sum = 0.0;
        for i in 0..n {
            let x = -PI + (i as Float + 0.5) * (2.0 * PI / n as Float);
            sum += trimmed_logistic(x, s, -PI, PI);
        }
        sum *= 2.0 * PI / n as Float;
        assert!((sum - 1.0).abs() < 1e-3, "sum = {}", sum);
    }

    #[test]
    fn test_003() {
        let s = 0.7;
        for i in 1..10 {
            let u = i as Float / 10.0;
            let x = sample_trimmed_logistic(u, s, -PI, PI);
            let cdf = (logistic_cdf(x, s) - logistic_cdf(-PI, s))
                / (logistic_cdf(PI, s) - logistic_cdf(-PI, s));
            assert!((cdf - u).abs() < 1e-4, "u = {} cdf = {}", u, cdf);
        }
    }

    #[test]
    fn test_004() {
        let w = cosine_sample_hemisphere(&Point2f::new(0.3, 0.8));
        assert!(w.z > 0.0);
        assert!((w.length() - 1.0).abs() < 1e-5);
        let w = uniform_sample_sphere(&Point2f::new(0.9, 0.1));
        assert!((w.length() - 1.0).abs() < 1e-5);
    }
}
