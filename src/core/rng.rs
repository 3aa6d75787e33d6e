use crate::core::pbrt::*;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 generator used for reproducible estimation runs.
#[derive(Debug, PartialEq, Clone)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl RNG {
    pub fn new() -> Self {
        RNG {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }

    pub fn new_sequence(initseq: u64) -> Self {
        let mut r = Self::new();
        r.set_sequence(initseq);
        return r;
    }

    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0;
        self.inc = (initseq << 1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }

    #[inline]
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted = ((oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27)) as u32;
        let rot = oldstate.wrapping_shr(59) as u32;
        return xorshifted.rotate_right(rot);
    }

    #[inline]
    pub fn uniform_float(&mut self) -> Float {
        let f = self.uniform_uint32() as f32 * 2.3283064365386963e-10;
        return FLOAT_ONE_MINUS_EPSILON.min(f) as Float;
    }

    #[inline]
    pub fn uniform_point2f(&mut self) -> Point2f {
        let x = self.uniform_float();
        let y = self.uniform_float();
        return Point2f::new(x, y);
    }
}

impl Default for RNG {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let mut rng = RNG::new();
        let a = rng.uniform_float();
        let b = rng.uniform_float();
        assert_ne!(a, b);
        assert!((0.0..1.0).contains(&a));
    }

    #[test]
    fn test_002() {
        let mut a = RNG::new_sequence(7);
        let mut b = RNG::new_sequence(7);
        let mut c = RNG::new_sequence(8);
        let va = a.uniform_uint32();
        assert_eq!(va, b.uniform_uint32());
        assert_ne!(va, c.uniform_uint32());
    }
}
