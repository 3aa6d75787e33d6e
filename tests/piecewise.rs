use pbrt_scatter::core::pbrt::*;

const NX: usize = 7;
const NY: usize = 5;

fn slice(a: Float, b: Float) -> Vec<Float> {
    let mut v = Vec::with_capacity(NX * NY);
    for y in 0..NY {
        for x in 0..NX {
            let fx = x as Float / (NX - 1) as Float;
            let fy = y as Float / (NY - 1) as Float;
            v.push(0.2 + a * fx * fx + b * fy * (1.0 - fx));
        }
    }
    return v;
}

fn two_param_distribution() -> PiecewiseLinear2D<2> {
    let p0 = [0.0, 1.0];
    let p1 = [0.0, 0.5, 1.0];
    let mut data = Vec::new();
    for i in 0..p0.len() {
        for j in 0..p1.len() {
            data.extend(slice(1.0 + 3.0 * p0[i], 4.0 * p1[j]));
        }
    }
    return PiecewiseLinear2D::<2>::new(&data, NX, NY, [&p0[..], &p1[..]], true, true).unwrap();
}

#[test]
fn piecewise_sample_invert() {
    let dist = two_param_distribution();
    assert!(dist.has_cdf());
    assert_eq!(dist.resolution(), (NX, NY));
    for param in [[0.0, 0.0], [1.0, 0.5], [0.3, 0.8], [0.75, 0.1]] {
        for i in 1..10 {
            for j in 1..10 {
                let u = Point2f::new(i as Float / 10.0, j as Float / 10.0);
                let s = dist.sample(u, param);
                assert!(s.p.x >= 0.0 && s.p.x <= 1.0 && s.p.y >= 0.0 && s.p.y <= 1.0);
                assert!(s.pdf > 0.0);

                let inv = dist.invert(s.p, param);
                assert!((inv.p.x - u.x).abs() < 1e-3, "{:?} -> {:?}", u, inv.p);
                assert!((inv.p.y - u.y).abs() < 1e-3, "{:?} -> {:?}", u, inv.p);
                assert!((inv.pdf - s.pdf).abs() < 1e-3 * s.pdf);

                let f = dist.evaluate(s.p, param);
                assert!((f - s.pdf).abs() < 1e-3 * s.pdf, "eval {} pdf {}", f, s.pdf);
            }
        }
    }
}

#[test]
fn piecewise_normalized_integral() {
    let dist = two_param_distribution();
    let n = 200;
    for param in [[0.0, 1.0], [0.5, 0.5], [1.0, 0.2]] {
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let p = Point2f::new(
                    (i as Float + 0.5) / n as Float,
                    (j as Float + 0.5) / n as Float,
                );
                sum += dist.evaluate(p, param);
            }
        }
        sum /= (n * n) as Float;
        assert!((sum - 1.0).abs() < 1e-3, "integral = {}", sum);
    }
}

#[test]
fn piecewise_parameter_interpolation() {
    let p0 = [0.0, 2.0];
    let mut data = slice(0.0, 0.0);
    data.extend(slice(0.0, 0.0).iter().map(|v| v * 3.0));
    let dist = PiecewiseLinear2D::<1>::new(&data, NX, NY, [&p0[..]], false, false).unwrap();
    assert!(!dist.has_cdf());
    assert_eq!(dist.param_values(0), &p0);
    let p = Point2f::new(0.4, 0.6);
    assert!((dist.evaluate(p, [0.0]) - 0.2).abs() < 1e-5);
    assert!((dist.evaluate(p, [2.0]) - 0.6).abs() < 1e-5);
    assert!((dist.evaluate(p, [1.0]) - 0.4).abs() < 1e-5);
    // Parameters outside the range clamp to the end slices
    assert!((dist.evaluate(p, [5.0]) - 0.6).abs() < 1e-5);
    assert!((dist.evaluate(p, [-1.0]) - 0.2).abs() < 1e-5);
}

#[test]
fn piecewise_invalid_construction() {
    let p0 = [0.0, 1.0];
    let data = slice(1.0, 1.0);
    let e = PiecewiseLinear2D::<1>::new(&data, NX, NY, [&p0[..]], true, true).unwrap_err();
    assert_eq!(e.kind(), PbrtErrorKind::InvalidFormat);
    let empty: [Float; 0] = [];
    assert!(PiecewiseLinear2D::<1>::new(&data, NX, NY, [&empty[..]], true, true).is_err());
    let zeros = vec![0.0; NX * NY];
    assert!(PiecewiseLinear2D::<0>::new(&zeros, NX, NY, [], true, true).is_err());
    assert!(PiecewiseLinear2D::<0>::new(&data, 1, NX * NY, [], true, true).is_err());
}
