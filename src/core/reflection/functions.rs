use crate::core::pbrt::*;

#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    return w.z;
}

#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    return Float::abs(w.z);
}

#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    return w.z * wp.z > 0.0;
}

#[inline]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    return 2.0 * Vector3f::dot(wo, n) * *n - *wo;
}

/// Polar angle of a unit vector. Uses atan2 so that angles near the pole
/// keep their precision.
#[inline]
pub fn spherical_theta(v: &Vector3f) -> Float {
    return Float::atan2(Float::sqrt(v.x * v.x + v.y * v.y), v.z);
}

#[inline]
pub fn spherical_phi(v: &Vector3f) -> Float {
    let p = Float::atan2(v.y, v.x);
    return if p < 0.0 { p + 2.0 * PI } else { p };
}

#[inline]
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta = Float::clamp(sin_theta, -1.0, 1.0);
    return Vector3f::new(
        sin_theta * Float::cos(phi),
        sin_theta * Float::sin(phi),
        Float::clamp(cos_theta, -1.0, 1.0),
    );
}

/// Unpolarized Fresnel reflectance of a dielectric interface with relative
/// index `eta`. A negative cosine means the ray arrives from inside.
pub fn fr_dielectric(cos_theta_i: Float, eta: Float) -> Float {
    let mut cos_theta_i = Float::clamp(cos_theta_i, -1.0, 1.0);
    let mut eta = eta;
    if cos_theta_i < 0.0 {
        eta = 1.0 / eta;
        cos_theta_i = -cos_theta_i;
    }

    // Snell's law
    let sin2_theta_i = 1.0 - sqr(cos_theta_i);
    let sin2_theta_t = sin2_theta_i / sqr(eta);
    if sin2_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = safe_sqrt(1.0 - sin2_theta_t);

    let r_parl = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let r_perp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    return (sqr(r_parl) + sqr(r_perp)) / 2.0;
}
