use pbrt_scatter::bxdfs::*;
use pbrt_scatter::core::pbrt::*;

const MODE: TransportMode = TransportMode::Radiance;

fn sample_sphere(rng: &mut RNG) -> Vector3f {
    return uniform_sample_sphere(&rng.uniform_point2f());
}

fn new_hair(h: Float, sigma_a: Float, beta_m: Float, beta_n: Float, alpha: Float) -> HairBxDF {
    return HairBxDF::new(h, 1.55, SampledSpectrum::from(sigma_a), beta_m, beta_n, alpha).unwrap();
}

#[test]
fn hair_white_furnace() {
    let mut rng = RNG::new();
    let wo = sample_sphere(&mut rng);
    let mut beta_m = 0.1;
    while beta_m < 1.0 {
        let mut beta_n = 0.1;
        while beta_n < 1.0 {
            // Estimate reflected uniform incident radiance from hair
            let mut sum = SampledSpectrum::zero();
            let count = 300000;
            for _ in 0..count {
                let h = -1.0 + 2.0 * rng.uniform_float();
                let hair = new_hair(h, 0.0, beta_m, beta_n, 0.0);
                let wi = sample_sphere(&mut rng);
                sum += hair.f(&wo, &wi, MODE) * abs_cos_theta(&wi);
            }
            let avg = sum.average() / (count as Float * uniform_sphere_pdf());
            assert!(avg >= 0.95 && avg <= 1.05, "avg = {}", avg);
            beta_n += 0.2;
        }
        beta_m += 0.2;
    }
}

#[test]
fn hair_white_furnace_sampled() {
    let mut rng = RNG::new();
    let wo = sample_sphere(&mut rng);
    let mut beta_m = 0.1;
    while beta_m < 1.0 {
        let mut beta_n = 0.1;
        while beta_n < 1.0 {
            let mut sum = SampledSpectrum::zero();
            let count = 300000;
            for _ in 0..count {
                let h = -1.0 + 2.0 * rng.uniform_float();
                let hair = new_hair(h, 0.0, beta_m, beta_n, 0.0);
                let uc = rng.uniform_float();
                let u = rng.uniform_point2f();
                if let Some(bs) = hair.sample_f(&wo, uc, &u, MODE, REFL_TRANS_ALL) {
                    sum += bs.f * (abs_cos_theta(&bs.wi) / bs.pdf);
                }
            }
            let avg = sum.average() / count as Float;
            assert!(avg >= 0.99 && avg <= 1.01, "avg = {}", avg);
            beta_n += 0.2;
        }
        beta_m += 0.2;
    }
}

#[test]
fn hair_sampling_weights() {
    let mut rng = RNG::new();
    let mut beta_m = 0.1;
    while beta_m < 1.0 {
        let mut beta_n = 0.4;
        while beta_n < 1.0 {
            let count = 10000;
            for _ in 0..count {
                let h = -1.0 + 2.0 * rng.uniform_float();
                let hair = new_hair(h, 0.0, beta_m, beta_n, 2.0);
                let wo = sample_sphere(&mut rng);
                let uc = rng.uniform_float();
                let u = rng.uniform_point2f();
                if let Some(bs) = hair.sample_f(&wo, uc, &u, MODE, REFL_TRANS_ALL) {
                    // Without absorption every sample carries unit weight
                    let weight = bs.f.average() * abs_cos_theta(&bs.wi) / bs.pdf;
                    assert!(weight >= 0.99, "weight = {}", weight);
                    assert!(weight <= 1.01, "weight = {}", weight);
                }
            }
            beta_n += 0.2;
        }
        beta_m += 0.2;
    }
}

#[test]
fn hair_sampling_consistency() {
    let li = |w: &Vector3f| w.z * w.z;
    let mut rng = RNG::new();
    let mut beta_m = 0.1;
    while beta_m < 1.0 {
        let mut beta_n = 0.4;
        while beta_n < 1.0 {
            let count = 64 * 1024;
            let wo = sample_sphere(&mut rng);
            let mut f_importance = SampledSpectrum::zero();
            let mut f_uniform = SampledSpectrum::zero();
            for _ in 0..count {
                let h = -1.0 + 2.0 * rng.uniform_float();
                let hair = new_hair(h, 0.25, beta_m, beta_n, 0.0);
                let uc = rng.uniform_float();
                let u = rng.uniform_point2f();
                if let Some(bs) = hair.sample_f(&wo, uc, &u, MODE, REFL_TRANS_ALL) {
                    f_importance +=
                        bs.f * (li(&bs.wi) * abs_cos_theta(&bs.wi) / (bs.pdf * count as Float));
                }
                let wi = uniform_sample_sphere(&u);
                f_uniform += hair.f(&wo, &wi, MODE)
                    * (li(&wi) * abs_cos_theta(&wi) / (uniform_sphere_pdf() * count as Float));
            }
            // Verify consistency of estimated hair reflected radiance values
            let err = Float::abs(f_importance.average() - f_uniform.average()) / f_uniform.average();
            assert!(err < 0.05, "err = {}", err);
            beta_n += 0.2;
        }
        beta_m += 0.2;
    }
}

#[test]
fn hair_sample_pdf_matches_pdf() {
    let mut rng = RNG::new_sequence(3);
    for _ in 0..2000 {
        let h = -1.0 + 2.0 * rng.uniform_float();
        let beta_m = 0.2 + 0.8 * rng.uniform_float();
        let beta_n = 0.2 + 0.8 * rng.uniform_float();
        let hair = new_hair(h, 0.5, beta_m, beta_n, 2.0);
        let wo = sample_sphere(&mut rng);
        let uc = rng.uniform_float();
        let u = rng.uniform_point2f();
        if let Some(bs) = hair.sample_f(&wo, uc, &u, MODE, REFL_TRANS_ALL) {
            let pdf = hair.pdf(&wo, &bs.wi, MODE, REFL_TRANS_ALL);
            let err = Float::abs(pdf - bs.pdf) / Float::max(bs.pdf, 1e-3);
            assert!(err < 1e-2, "pdf = {} sampled = {}", pdf, bs.pdf);
            assert_eq!(bs.flags, BSDF_GLOSSY_REFLECTION);
            assert_eq!(bs.eta, 1.0);
        }
    }
}

#[test]
fn hair_values_finite_and_non_negative() {
    let mut rng = RNG::new_sequence(5);
    for _ in 0..5000 {
        let h = -1.0 + 2.0 * rng.uniform_float();
        let sigma_a = 2.0 * rng.uniform_float();
        let beta_m = 0.05 + 0.95 * rng.uniform_float();
        let beta_n = 0.05 + 0.95 * rng.uniform_float();
        let hair = new_hair(h, sigma_a, beta_m, beta_n, 2.0);
        let wo = sample_sphere(&mut rng);
        let wi = sample_sphere(&mut rng);
        let f = hair.f(&wo, &wi, MODE);
        assert!(f.is_valid() && f.is_non_negative(), "f = {:?}", f);
        let pdf = hair.pdf(&wo, &wi, MODE, REFL_TRANS_ALL);
        assert!(pdf.is_finite() && pdf >= 0.0, "pdf = {}", pdf);
    }
}

#[test]
fn hair_sampled_direction_histogram() {
    // Fractions of sampled directions per hemisphere agree with the
    // integral of the pdf over that hemisphere.
    let hair = new_hair(0.3, 0.25, 0.5, 0.5, 2.0);
    let wo = Vector3f::new(0.3, 0.5, 0.8).normalize();
    let count = 200000;

    let mut rng = RNG::new_sequence(11);
    let mut sampled = [0usize; 2];
    let mut n_sampled = 0;
    for _ in 0..count {
        let uc = rng.uniform_float();
        let u = rng.uniform_point2f();
        if let Some(bs) = hair.sample_f(&wo, uc, &u, MODE, REFL_TRANS_ALL) {
            n_sampled += 1;
            if bs.wi.x > 0.0 {
                sampled[0] += 1;
            }
            if bs.wi.y > 0.0 {
                sampled[1] += 1;
            }
        }
    }

    let mut total = 0.0;
    let mut integral = [0.0; 2];
    for _ in 0..count {
        let wi = sample_sphere(&mut rng);
        let pdf = hair.pdf(&wo, &wi, MODE, REFL_TRANS_ALL) / uniform_sphere_pdf();
        total += pdf;
        if wi.x > 0.0 {
            integral[0] += pdf;
        }
        if wi.y > 0.0 {
            integral[1] += pdf;
        }
    }
    let norm = total / count as Float;
    assert!((norm - 1.0).abs() < 0.05, "pdf integral = {}", norm);
    for i in 0..2 {
        let a = sampled[i] as Float / n_sampled as Float;
        let b = integral[i] / total;
        assert!((a - b).abs() < 0.03, "axis {}: sampled {} vs pdf {}", i, a, b);
    }
}

#[test]
fn hair_normal_incidence() {
    let hair = new_hair(0.0, 0.0, 0.3, 0.3, 2.0);
    let w = Vector3f::new(0.0, 0.0, 1.0);
    let f = hair.f(&w, &w, MODE);
    assert!(f.min_component_value() > 0.0, "f = {:?}", f);

    // Direct reflection dominates
    let lobes = hair.lobe_contributions(&w, &w);
    for p in 1..lobes.len() {
        assert!(
            lobes[0].average() > lobes[p].average(),
            "order 0: {} order {}: {}",
            lobes[0].average(),
            p,
            lobes[p].average()
        );
    }
}

#[test]
fn hair_empty_mask() {
    let hair = new_hair(0.2, 0.3, 0.3, 0.3, 2.0);
    let wo = Vector3f::new(0.1, 0.2, 0.9).normalize();
    let u = Point2f::new(0.3, 0.6);
    assert!(hair.sample_f(&wo, 0.5, &u, MODE, 0).is_none());
    assert!(hair
        .sample_f(&wo, 0.5, &u, MODE, REFL_TRANS_TRANSMISSION)
        .is_none());
    assert!(hair.sample_f(&wo, 0.5, &u, MODE, REFL_TRANS_REFLECTION).is_some());
    let wi = Vector3f::new(-0.1, 0.3, 0.8).normalize();
    assert_eq!(hair.pdf(&wo, &wi, MODE, 0), 0.0);
}

#[test]
fn hair_invalid_parameters() {
    let s = SampledSpectrum::from(0.5);
    let kind = |r: Result<HairBxDF, PbrtError>| r.unwrap_err().kind();
    assert_eq!(kind(HairBxDF::new(1.5, 1.55, s, 0.3, 0.3, 2.0)), PbrtErrorKind::InvalidParameter);
    assert_eq!(kind(HairBxDF::new(0.0, 0.0, s, 0.3, 0.3, 2.0)), PbrtErrorKind::InvalidParameter);
    assert_eq!(kind(HairBxDF::new(0.0, 1.55, s, 1.3, 0.3, 2.0)), PbrtErrorKind::InvalidParameter);
    assert_eq!(kind(HairBxDF::new(0.0, 1.55, s, 0.3, -0.1, 2.0)), PbrtErrorKind::InvalidParameter);
    assert_eq!(kind(HairBxDF::new(0.0, 1.55, s, 0.0, 0.3, 2.0)), PbrtErrorKind::InvalidParameter);
    let neg = SampledSpectrum::from(-1.0);
    assert_eq!(kind(HairBxDF::new(0.0, 1.55, neg, 0.3, 0.3, 2.0)), PbrtErrorKind::InvalidParameter);
    assert!(HairBxDF::new(-1.0, 1.55, s, 1.0, 1.0, 0.0).is_ok());
}

#[test]
fn hair_zero_roughness_message() {
    let s = SampledSpectrum::from(0.5);
    let e = HairBxDF::new(0.0, 1.55, s, 0.0, 0.3, 2.0).unwrap_err();
    assert!(e.msg.contains("beta_m") && e.msg.contains("non-finite"), "{}", e);
    let e = HairBxDF::new(0.0, 1.55, s, 0.3, 0.0, 2.0).unwrap_err();
    assert!(e.msg.contains("beta_n") && e.msg.contains("non-finite"), "{}", e);
}

#[test]
fn hair_sigma_a_from_reflectance() {
    // Darker colors absorb more
    let c = SampledSpectrum::from([0.1, 0.3, 0.5, 0.9]);
    let s = HairBxDF::sigma_a_from_reflectance(&c, 0.3);
    for i in 1..N_SPECTRUM_SAMPLES {
        assert!(s[i - 1] > s[i]);
    }
    let white = HairBxDF::sigma_a_from_reflectance(&SampledSpectrum::one(), 0.3);
    assert!(white.is_black());
}
