use super::types::Float;

pub const DOUBLE_ONE_MINUS_EPSILON: f64 = 0.99999999999999989;
pub const FLOAT_ONE_MINUS_EPSILON: f32 = 0.99999994;

#[cfg(not(feature = "float-as-double"))]
mod detail {
    use super::*;

    pub const PI: Float = std::f32::consts::PI;
    pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
    pub const INV_2_PI: Float = INV_PI * 0.5;
    pub const INV_4_PI: Float = INV_PI * 0.25;

    pub const PI_OVER_2: Float = PI / 2.0;
    pub const PI_OVER_4: Float = PI / 4.0;

    pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;
}

#[cfg(feature = "float-as-double")]
mod detail {
    use super::*;

    pub const PI: Float = std::f64::consts::PI;
    pub const INV_PI: Float = std::f64::consts::FRAC_1_PI;
    pub const INV_2_PI: Float = INV_PI * 0.5;
    pub const INV_4_PI: Float = INV_PI * 0.25;

    pub const PI_OVER_2: Float = PI / 2.0;
    pub const PI_OVER_4: Float = PI / 4.0;

    pub const ONE_MINUS_EPSILON: Float = DOUBLE_ONE_MINUS_EPSILON;
}

pub use detail::*;
