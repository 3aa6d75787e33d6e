use crate::core::pbrt::types::Float;
use std::ops;

#[derive(Debug, PartialEq, Default, Copy, Clone)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Copy> Vector3<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Vector3::<T> { x, y, z }
    }
}

impl<T: Copy + Default> Vector3<T> {
    #[inline]
    pub fn zero() -> Self {
        Vector3::<T> {
            x: T::default(),
            y: T::default(),
            z: T::default(),
        }
    }
}

impl Vector3<Float> {
    #[inline]
    pub fn dot(&self, rhs: &Self) -> Float {
        return self.x * rhs.x + self.y * rhs.y + self.z * rhs.z;
    }

    #[inline]
    pub fn length_squared(&self) -> Float {
        return self.dot(self);
    }

    #[inline]
    pub fn length(&self) -> Float {
        return Float::sqrt(self.length_squared());
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let l = self.length();
        return Vector3::new(self.x / l, self.y / l, self.z / l);
    }

    #[inline]
    pub fn cross(v1: &Self, v2: &Self) -> Self {
        Vector3 {
            x: (v1.y * v2.z) - (v1.z * v2.y),
            y: (v1.z * v2.x) - (v1.x * v2.z),
            z: (v1.x * v2.y) - (v1.y * v2.x),
        }
    }

    /// Rotates the vector about the z axis by `phi` radians.
    pub fn rotate_z(&self, phi: Float) -> Self {
        let (s, c) = Float::sin_cos(phi);
        return Vector3::new(c * self.x - s * self.y, s * self.x + c * self.y, self.z);
    }
}

impl<T: ops::Add<Output = T>> ops::Add<Vector3<T>> for Vector3<T> {
    type Output = Vector3<T>;
    #[inline]
    fn add(self, rhs: Vector3<T>) -> Vector3<T> {
        return Vector3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        };
    }
}

impl<T: ops::Sub<Output = T>> ops::Sub<Vector3<T>> for Vector3<T> {
    type Output = Vector3<T>;
    #[inline]
    fn sub(self, rhs: Vector3<T>) -> Vector3<T> {
        return Vector3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        };
    }
}

impl<T: ops::Mul<Output = T> + Copy> ops::Mul<T> for Vector3<T> {
    type Output = Vector3<T>;
    #[inline]
    fn mul(self, rhs: T) -> Vector3<T> {
        return Vector3 {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        };
    }
}

impl ops::Mul<Vector3<Float>> for Float {
    type Output = Vector3<Float>;
    #[inline]
    fn mul(self, rhs: Vector3<Float>) -> Vector3<Float> {
        return rhs * self;
    }
}

impl<T: ops::Div<Output = T> + Copy> ops::Div<T> for Vector3<T> {
    type Output = Vector3<T>;
    #[inline]
    fn div(self, rhs: T) -> Vector3<T> {
        return Vector3 {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        };
    }
}

impl<T: ops::Neg<Output = T>> ops::Neg for Vector3<T> {
    type Output = Vector3<T>;
    #[inline]
    fn neg(self) -> Vector3<T> {
        return Vector3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        };
    }
}

impl<T: ops::AddAssign<T>> ops::AddAssign for Vector3<T> {
    #[inline]
    fn add_assign(&mut self, rhs: Vector3<T>) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T> ops::Index<usize> for Vector3<T> {
    type Output = T;
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

impl<T: Copy> From<[T; 3]> for Vector3<T> {
    #[inline]
    fn from(v: [T; 3]) -> Self {
        Vector3::new(v[0], v[1], v[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let a = Vector3::<Float>::new(1.0, 2.0, 2.0);
        assert_eq!(a.length(), 3.0);
        assert!((a.normalize().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_002() {
        let x = Vector3::<Float>::new(1.0, 0.0, 0.0);
        let y = Vector3::<Float>::new(0.0, 1.0, 0.0);
        assert_eq!(Vector3::cross(&x, &y), Vector3::new(0.0, 0.0, 1.0));
        let r = x.rotate_z(crate::core::pbrt::PI_OVER_2);
        assert!((r - y).length() < 1e-6);
    }
}
