use super::constants::*;
use super::types::Float;

#[inline]
pub fn sqr(x: Float) -> Float {
    return x * x;
}

#[inline]
pub fn safe_sqrt(x: Float) -> Float {
    debug_assert!(x >= -1e-3, "safe_sqrt({})", x);
    return Float::sqrt(Float::max(0.0, x));
}

#[inline]
pub fn safe_asin(x: Float) -> Float {
    debug_assert!((-1.0001..=1.0001).contains(&x), "safe_asin({})", x);
    return Float::asin(Float::clamp(x, -1.0, 1.0));
}

#[inline]
pub fn radians(deg: Float) -> Float {
    return (PI / 180.0) * deg;
}

#[inline]
pub fn degrees(rad: Float) -> Float {
    return (180.0 / PI) * rad;
}

#[inline]
pub fn lerp(t: Float, v1: Float, v2: Float) -> Float {
    return (1.0 - t) * v1 + t * v2;
}

/// Returns the largest index `i` in `[0, size - 2]` for which `pred(i)` holds,
/// assuming `pred` is true for a prefix of the range.
#[inline]
pub fn find_interval<P>(size: usize, pred: P) -> usize
where
    P: Fn(usize) -> bool,
{
    if size < 2 {
        return 0;
    }
    let mut len = size as i64 - 2;
    let mut first: i64 = 1;
    while len > 0 {
        let half = len.wrapping_shr(1);
        let middle = first + half;
        // Bisect range based on value of _pred_ at _middle_
        if pred(middle as usize) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    return i64::clamp(first - 1, 0, size as i64 - 2) as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        assert!((radians(180.0) - PI).abs() < 1e-6);
        assert!((degrees(PI_OVER_2) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_002() {
        assert_eq!(safe_sqrt(-1e-5), 0.0);
        assert_eq!(safe_asin(1.00001), PI_OVER_2);
    }

    #[test]
    fn test_003() {
        assert_eq!(find_interval(1, |_| true), 0);
        assert_eq!(find_interval(2, |_| true), 0);
    }
}
