use crate::core::pbrt::*;

/// Relative tolerance under which a linear segment is treated as constant
/// when inverting its CDF.
const CONSTANT_SEGMENT_EPSILON: Float = 1e-4;

/// Result of sampling or inverting a `PiecewiseLinear2D`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PLSample {
    pub p: Point2f,
    pub pdf: Float,
}

/// Bilinearly interpolated 2D function on `[0,1]^2`, optionally conditioned on
/// `K` extra parameters that are blended multilinearly.
///
/// The function is stored on a regular `size_x * size_y` grid per parameter
/// slice. When constructed with `build_cdf`, the function is normalized and
/// the marginal (rows) and conditional (columns) CDFs needed by `sample` and
/// `invert` are precomputed; the two operations are exact inverses of each
/// other.
#[derive(Debug, Clone)]
pub struct PiecewiseLinear2D<const K: usize> {
    size: [usize; 2],
    patch_size: Vector2f,
    inv_patch_size: Vector2f,
    param_strides: [usize; K],
    param_values: [Vec<Float>; K],
    data: Vec<Float>,
    marginal_cdf: Vec<Float>,
    conditional_cdf: Vec<Float>,
}

impl<const K: usize> PiecewiseLinear2D<K> {
    /// `data` holds one `x_size * y_size` row-major slice (x varies fastest)
    /// for every combination of parameter values, the last parameter varying
    /// fastest across slices.
    pub fn new(
        data: &[Float],
        x_size: usize,
        y_size: usize,
        param_values: [&[Float]; K],
        normalize: bool,
        build_cdf: bool,
    ) -> Result<Self, PbrtError> {
        if x_size < 2 || y_size < 2 {
            let msg = format!(
                "piecewise-linear grid must be at least 2x2 (got {}x{})",
                x_size, y_size
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if build_cdf && !normalize {
            return Err(PbrtError::invalid_parameter(
                "piecewise-linear CDF construction requires normalization",
            ));
        }

        let mut param_strides = [0; K];
        let mut slices = 1;
        for i in (0..K).rev() {
            let n = param_values[i].len();
            if n < 1 {
                let msg = format!("parameter {} must have at least one value", i);
                return Err(PbrtError::invalid_parameter(&msg));
            }
            param_strides[i] = if n > 1 { slices } else { 0 };
            slices *= n;
        }

        let n_values = x_size * y_size;
        if data.len() != slices * n_values {
            let msg = format!(
                "piecewise-linear data has {} values, expected {} ({} slices of {}x{})",
                data.len(),
                slices * n_values,
                slices,
                x_size,
                y_size
            );
            return Err(PbrtError::invalid_format(&msg));
        }

        let mut out = vec![0.0; slices * n_values];
        let mut marginal_cdf = Vec::new();
        let mut conditional_cdf = Vec::new();
        if build_cdf {
            marginal_cdf = vec![0.0; slices * y_size];
            conditional_cdf = vec![0.0; slices * n_values];
        }

        for slice in 0..slices {
            let src = &data[slice * n_values..(slice + 1) * n_values];
            let dst = &mut out[slice * n_values..(slice + 1) * n_values];
            if build_cdf {
                let cond = &mut conditional_cdf[slice * n_values..(slice + 1) * n_values];
                let marg = &mut marginal_cdf[slice * y_size..(slice + 1) * y_size];

                // Conditional CDF per row
                for y in 0..y_size {
                    let mut sum = 0.0f64;
                    let i = y * x_size;
                    cond[i] = 0.0;
                    for x in 0..x_size - 1 {
                        sum += 0.5 * (src[i + x] as f64 + src[i + x + 1] as f64);
                        cond[i + x + 1] = sum as Float;
                    }
                }

                // Marginal CDF over row totals
                marg[0] = 0.0;
                let mut sum = 0.0f64;
                for y in 0..y_size - 1 {
                    sum += 0.5
                        * (cond[(y + 1) * x_size - 1] as f64 + cond[(y + 2) * x_size - 1] as f64);
                    marg[y + 1] = sum as Float;
                }

                let total = marg[y_size - 1];
                if !(total > 0.0) || !total.is_finite() {
                    let msg = format!("piecewise-linear slice {} has no positive mass", slice);
                    return Err(PbrtError::invalid_format(&msg));
                }
                let normal = 1.0 / total;
                cond.iter_mut().for_each(|v| *v *= normal);
                marg.iter_mut().for_each(|v| *v *= normal);
                for i in 0..n_values {
                    dst[i] = src[i] * normal;
                }
            } else {
                // evaluate() returns the raw values unless normalized
                let mut normalization = 1.0 / ((x_size - 1) * (y_size - 1)) as Float;
                if normalize {
                    let mut sum = 0.0f64;
                    for y in 0..y_size - 1 {
                        let i = y * x_size;
                        for x in 0..x_size - 1 {
                            let v00 = src[i + x] as f64;
                            let v10 = src[i + x + 1] as f64;
                            let v01 = src[i + x + x_size] as f64;
                            let v11 = src[i + x + 1 + x_size] as f64;
                            sum += 0.25 * (v00 + v10 + v01 + v11);
                        }
                    }
                    if !(sum > 0.0) {
                        let msg =
                            format!("piecewise-linear slice {} has no positive mass", slice);
                        return Err(PbrtError::invalid_format(&msg));
                    }
                    normalization = (1.0 / sum) as Float;
                }
                for i in 0..n_values {
                    dst[i] = src[i] * normalization;
                }
            }
        }

        let param_values: [Vec<Float>; K] = std::array::from_fn(|i| param_values[i].to_vec());
        Ok(PiecewiseLinear2D {
            size: [x_size, y_size],
            patch_size: Vector2f::new(
                1.0 / (x_size - 1) as Float,
                1.0 / (y_size - 1) as Float,
            ),
            inv_patch_size: Vector2f::new((x_size - 1) as Float, (y_size - 1) as Float),
            param_strides,
            param_values,
            data: out,
            marginal_cdf,
            conditional_cdf,
        })
    }

    pub fn has_cdf(&self) -> bool {
        return !self.marginal_cdf.is_empty();
    }

    pub fn resolution(&self) -> (usize, usize) {
        return (self.size[0], self.size[1]);
    }

    pub fn param_values(&self, dim: usize) -> &[Float] {
        return &self.param_values[dim];
    }

    pub fn bytes_used(&self) -> usize {
        let params: usize = self.param_values.iter().map(|v| v.len()).sum();
        return std::mem::size_of::<Float>()
            * (self.data.len() + self.marginal_cdf.len() + self.conditional_cdf.len() + params);
    }

    /// Interpolation weights and slice offset for the given parameter values.
    fn param_weights(&self, param: &[Float; K]) -> ([[Float; 2]; K], usize) {
        let mut weights = [[1.0, 0.0]; K];
        let mut slice_offset = 0;
        for dim in 0..K {
            let values = &self.param_values[dim];
            if values.len() == 1 {
                continue;
            }
            let index = find_interval(values.len(), |i| values[i] <= param[dim]);
            let p0 = values[index];
            let p1 = values[index + 1];
            let w1 = Float::clamp((param[dim] - p0) / (p1 - p0), 0.0, 1.0);
            weights[dim] = [1.0 - w1, w1];
            slice_offset += self.param_strides[dim] * index;
        }
        return (weights, slice_offset);
    }

    /// Multilinear blend of `data[offset]` across the 2^K neighboring slices.
    #[inline]
    fn lookup(
        &self,
        data: &[Float],
        offset: usize,
        slice_size: usize,
        weights: &[[Float; 2]; K],
    ) -> Float {
        if K == 0 {
            return data[offset];
        }
        let mut result = 0.0;
        for corner in 0..(1usize << K) {
            let mut weight = 1.0;
            let mut index = offset;
            for dim in 0..K {
                let bit = (corner >> dim) & 1;
                weight *= weights[dim][bit];
                index += bit * self.param_strides[dim] * slice_size;
            }
            if weight != 0.0 {
                result += weight * data[index];
            }
        }
        return result;
    }

    #[inline]
    fn cell(&self, pos: Float, axis: usize) -> usize {
        let p = Float::max(pos, 0.0) as usize;
        return usize::min(p, self.size[axis] - 2);
    }

    pub fn evaluate(&self, pos: Point2f, param: [Float; K]) -> Float {
        let (weights, slice_offset) = self.param_weights(&param);
        let px = pos.x * self.inv_patch_size.x;
        let py = pos.y * self.inv_patch_size.y;
        let ox = self.cell(px, 0);
        let oy = self.cell(py, 1);
        let w1 = Vector2f::new(px - ox as Float, py - oy as Float);
        let w0 = Vector2f::new(1.0 - w1.x, 1.0 - w1.y);

        let slice_size = self.size[0] * self.size[1];
        let index = ox + oy * self.size[0] + slice_offset * slice_size;
        let sx = self.size[0];
        let v00 = self.lookup(&self.data, index, slice_size, &weights);
        let v10 = self.lookup(&self.data, index + 1, slice_size, &weights);
        let v01 = self.lookup(&self.data, index + sx, slice_size, &weights);
        let v11 = self.lookup(&self.data, index + sx + 1, slice_size, &weights);

        let v = w0.y * (w0.x * v00 + w1.x * v10) + w1.y * (w0.x * v01 + w1.x * v11);
        return v * self.inv_patch_size.x * self.inv_patch_size.y;
    }

    /// Warps a uniform sample into the distribution; rows are chosen from the
    /// marginal first, then the column from the conditional of that row.
    pub fn sample(&self, u: Point2f, param: [Float; K]) -> PLSample {
        debug_assert!(self.has_cdf());
        let mut sample = Vector2f::new(
            Float::clamp(u.x, 1.0 - ONE_MINUS_EPSILON, ONE_MINUS_EPSILON),
            Float::clamp(u.y, 1.0 - ONE_MINUS_EPSILON, ONE_MINUS_EPSILON),
        );
        let (weights, slice_offset) = self.param_weights(&param);
        let sx = self.size[0];
        let sy = self.size[1];
        let slice_size = sx * sy;

        // Sample the row first
        let offset = slice_offset * sy;
        let fetch_marginal =
            |idx: usize| -> Float { self.lookup(&self.marginal_cdf, offset + idx, sy, &weights) };
        let row = find_interval(sy, |idx| fetch_marginal(idx) < sample.y);
        sample.y -= fetch_marginal(row);

        let mut offset = row * sx + slice_offset * slice_size;
        let r0 = self.lookup(&self.conditional_cdf, offset + sx - 1, slice_size, &weights);
        let r1 = self.lookup(&self.conditional_cdf, offset + 2 * sx - 1, slice_size, &weights);
        let is_const = Float::abs(r0 - r1) < CONSTANT_SEGMENT_EPSILON * (r0 + r1);
        sample.y = if is_const {
            2.0 * sample.y / (r0 + r1)
        } else {
            (r0 - safe_sqrt(r0 * r0 - 2.0 * sample.y * (r0 - r1))) / (r0 - r1)
        };

        // Sample the column next
        sample.x *= (1.0 - sample.y) * r0 + sample.y * r1;
        let sy_frac = sample.y;
        let fetch_conditional = |idx: usize| -> Float {
            let v0 = self.lookup(&self.conditional_cdf, offset + idx, slice_size, &weights);
            let v1 = self.lookup(&self.conditional_cdf, offset + idx + sx, slice_size, &weights);
            return (1.0 - sy_frac) * v0 + sy_frac * v1;
        };
        let col = find_interval(sx, |idx| fetch_conditional(idx) < sample.x);
        sample.x -= fetch_conditional(col);
        offset += col;

        let v00 = self.lookup(&self.data, offset, slice_size, &weights);
        let v10 = self.lookup(&self.data, offset + 1, slice_size, &weights);
        let v01 = self.lookup(&self.data, offset + sx, slice_size, &weights);
        let v11 = self.lookup(&self.data, offset + sx + 1, slice_size, &weights);
        let c0 = (1.0 - sample.y) * v00 + sample.y * v01;
        let c1 = (1.0 - sample.y) * v10 + sample.y * v11;
        let is_const = Float::abs(c0 - c1) < CONSTANT_SEGMENT_EPSILON * (c0 + c1);
        sample.x = if is_const {
            2.0 * sample.x
        } else {
            c0 - safe_sqrt(c0 * c0 - 2.0 * sample.x * (c0 - c1))
        };
        let divisor = if is_const { c0 + c1 } else { c0 - c1 };
        if divisor != 0.0 {
            sample.x /= divisor;
        }

        let p = Point2f::new(
            (col as Float + sample.x) * self.patch_size.x,
            (row as Float + sample.y) * self.patch_size.y,
        );
        let pdf = ((1.0 - sample.x) * c0 + sample.x * c1)
            * self.inv_patch_size.x
            * self.inv_patch_size.y;
        return PLSample { p, pdf };
    }

    /// Inverse of `sample`: maps a point of the domain back to the uniform
    /// sample that produces it.
    pub fn invert(&self, p: Point2f, param: [Float; K]) -> PLSample {
        debug_assert!(self.has_cdf());
        let (weights, slice_offset) = self.param_weights(&param);
        let sx = self.size[0];
        let sy = self.size[1];
        let slice_size = sx * sy;

        let mut sample = Vector2f::new(p.x * self.inv_patch_size.x, p.y * self.inv_patch_size.y);
        let px = self.cell(sample.x, 0);
        let py = self.cell(sample.y, 1);
        sample.x -= px as Float;
        sample.y -= py as Float;

        let mut offset = px + py * sx + slice_offset * slice_size;

        // Invert the X component
        let v00 = self.lookup(&self.data, offset, slice_size, &weights);
        let v10 = self.lookup(&self.data, offset + 1, slice_size, &weights);
        let v01 = self.lookup(&self.data, offset + sx, slice_size, &weights);
        let v11 = self.lookup(&self.data, offset + sx + 1, slice_size, &weights);
        let w1 = sample;
        let w0 = Vector2f::new(1.0 - w1.x, 1.0 - w1.y);
        let c0 = w0.y * v00 + w1.y * v01;
        let c1 = w0.y * v10 + w1.y * v11;
        let pdf = w0.x * c0 + w1.x * c1;

        sample.x *= c0 + 0.5 * sample.x * (c1 - c0);

        let v0 = self.lookup(&self.conditional_cdf, offset, slice_size, &weights);
        let v1 = self.lookup(&self.conditional_cdf, offset + sx, slice_size, &weights);
        sample.x += (1.0 - sample.y) * v0 + sample.y * v1;

        offset = py * sx + slice_offset * slice_size;
        let r0 = self.lookup(&self.conditional_cdf, offset + sx - 1, slice_size, &weights);
        let r1 = self.lookup(&self.conditional_cdf, offset + 2 * sx - 1, slice_size, &weights);
        let row_total = (1.0 - sample.y) * r0 + sample.y * r1;
        if row_total > 0.0 {
            sample.x /= row_total;
        }

        // Invert the Y component
        sample.y *= r0 + 0.5 * sample.y * (r1 - r0);
        let offset = py + slice_offset * sy;
        sample.y += self.lookup(&self.marginal_cdf, offset, sy, &weights);

        return PLSample {
            p: Point2f::new(sample.x, sample.y),
            pdf: pdf * self.inv_patch_size.x * self.inv_patch_size.y,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(nx: usize, ny: usize) -> Vec<Float> {
        let mut v = Vec::new();
        for y in 0..ny {
            for x in 0..nx {
                v.push(1.0 + x as Float + 2.0 * y as Float);
            }
        }
        return v;
    }

    #[test]
    fn test_001() {
        let data = vec![1.0, 1.0, 1.0];
        let r = PiecewiseLinear2D::<0>::new(&data, 2, 2, [], true, true);
        assert!(r.is_err());
        let r = PiecewiseLinear2D::<0>::new(&ramp(3, 3), 3, 3, [], false, true);
        assert!(r.is_err());
    }

    #[test]
    fn test_002() {
        // Constant grids evaluate to the density of a uniform distribution.
        let data = vec![5.0; 16];
        let pl = PiecewiseLinear2D::<0>::new(&data, 4, 4, [], true, true).unwrap();
        let v = pl.evaluate(Point2f::new(0.3, 0.7), []);
        assert!((v - 1.0).abs() < 1e-5, "v = {}", v);
        let s = pl.sample(Point2f::new(0.25, 0.5), []);
        assert!((s.p.x - 0.25).abs() < 1e-4 && (s.p.y - 0.5).abs() < 1e-4);
        assert!((s.pdf - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_003() {
        let data = ramp(5, 4);
        let pl = PiecewiseLinear2D::<0>::new(&data, 5, 4, [], false, false).unwrap();
        // Grid points reproduce the raw data.
        let v = pl.evaluate(Point2f::new(0.25, 1.0 / 3.0), []);
        assert!((v - 4.0).abs() < 1e-4, "v = {}", v);
        let v = pl.evaluate(Point2f::new(0.375, 0.5), []);
        assert!((v - 5.5).abs() < 1e-4, "v = {}", v);
    }
}
