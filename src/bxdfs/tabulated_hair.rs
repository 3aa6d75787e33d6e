use crate::bxdfs::hair::*;
use crate::core::pbrt::*;

use std::path::Path;
use std::sync::Arc;

/// Tabulated values are stored scaled by this factor.
pub const TABLE_NORMALIZATION: Float = 2.5;
/// One entry per degree in [0, 90].
pub const DEFAULT_TABLE_RESOLUTION: usize = 91;

/// Scattering values indexed by incident and outgoing longitudinal angle
/// (whole degrees), with one channel or one per spectral sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AngularTable {
    n_theta: usize,
    channels: usize,
    data: Vec<Float>,
}

impl AngularTable {
    pub fn new(n_theta: usize, channels: usize, data: Vec<Float>) -> Result<Self, PbrtError> {
        if n_theta == 0 {
            return Err(PbrtError::invalid_parameter("angular table: empty angle axis"));
        }
        if channels != 1 && channels != N_SPECTRUM_SAMPLES {
            let msg = format!(
                "angular table: {} channels, expected 1 or {}",
                channels, N_SPECTRUM_SAMPLES
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if data.len() != n_theta * n_theta * channels {
            let msg = format!(
                "angular table: {} values for a {}x{}x{} table",
                data.len(),
                n_theta,
                n_theta,
                channels
            );
            return Err(PbrtError::invalid_parameter(&msg));
        }
        if data.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PbrtError::invalid_parameter(
                "angular table: values must be finite and non-negative",
            ));
        }
        Ok(AngularTable {
            n_theta,
            channels,
            data,
        })
    }

    /// Reads a `[n_theta, n_theta, channels]` float32 field.
    pub fn from_tensor(tensor: &Tensor, field: &str) -> Result<Self, PbrtError> {
        let f = tensor.field(field)?;
        if f.ndim() != 3 || f.shape[0] != f.shape[1] {
            let msg = format!(
                "{}: field \"{}\" must have shape [n, n, channels], found {:?}",
                tensor.filename(),
                field,
                f.shape
            );
            return Err(PbrtError::invalid_format(&msg));
        }
        let data = f.to_floats()?;
        return Self::new(f.shape[0] as usize, f.shape[2] as usize, data)
            .map_err(|e| PbrtError::invalid_format(&format!("{}: {}", tensor.filename(), e.msg)));
    }

    pub fn open<P: AsRef<Path>>(path: P, field: &str) -> Result<Self, PbrtError> {
        let tensor = Tensor::open(path)?;
        return Self::from_tensor(&tensor, field);
    }

    pub fn n_theta(&self) -> usize {
        return self.n_theta;
    }

    pub fn channels(&self) -> usize {
        return self.channels;
    }

    /// Raw table entry, indices clamped into range.
    pub fn lookup(&self, it: usize, ot: usize) -> SampledSpectrum {
        let it = usize::min(it, self.n_theta - 1);
        let ot = usize::min(ot, self.n_theta - 1);
        let base = (it * self.n_theta + ot) * self.channels;
        if self.channels == 1 {
            return SampledSpectrum::from(self.data[base]);
        }
        let mut s = SampledSpectrum::zero();
        for i in 0..N_SPECTRUM_SAMPLES {
            s[i] = self.data[base + i];
        }
        return s;
    }
}

/// Whole-degree magnitude of the longitudinal angle of `w`.
#[inline]
pub fn longitudinal_index(w: &Vector3f) -> usize {
    let theta = Float::atan2(w.x, Float::sqrt(w.y * w.y + w.z * w.z));
    return Float::abs(Float::round(degrees(theta))) as usize;
}

/// Fiber model whose lobe value comes from an angular table while the
/// absorption and the sampling strategy stay analytic.
#[derive(Debug, Clone)]
pub struct TabulatedHairBxDF {
    hair: HairBxDF,
    table: Arc<AngularTable>,
}

impl TabulatedHairBxDF {
    pub fn new(
        h: Float,
        eta: Float,
        sigma_a: SampledSpectrum,
        beta_m: Float,
        beta_n: Float,
        alpha: Float,
        table: Arc<AngularTable>,
    ) -> Result<Self, PbrtError> {
        let hair = HairBxDF::new(h, eta, sigma_a, beta_m, beta_n, alpha)?;
        return Ok(Self::from_hair(hair, table));
    }

    pub fn from_hair(hair: HairBxDF, table: Arc<AngularTable>) -> Self {
        TabulatedHairBxDF { hair, table }
    }

    pub fn hair(&self) -> &HairBxDF {
        return &self.hair;
    }

    pub fn table(&self) -> &Arc<AngularTable> {
        return &self.table;
    }
}

impl BxDF for TabulatedHairBxDF {
    fn flags(&self) -> BxDFType {
        return BSDF_GLOSSY_REFLECTION;
    }

    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> SampledSpectrum {
        let frame = self.hair.frame(wo);
        let it = longitudinal_index(wi);
        let ot = longitudinal_index(wo);
        let value = self.table.lookup(it, ot) / TABLE_NORMALIZATION;
        return value * frame.transmittance;
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if (sample_flags & REFL_TRANS_REFLECTION) == 0 {
            return None;
        }
        let (wi, pdf) = self.hair.sample_direction(wo, uc, u)?;
        let f = self.f(wo, &wi, mode);
        return Some(BSDFSample::new(f, wi, pdf, self.flags()));
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if (sample_flags & REFL_TRANS_REFLECTION) == 0 {
            return 0.0;
        }
        return self.hair.density(wo, wi);
    }

    fn to_string(&self) -> String {
        return format!(
            "[ TabulatedHairBxDF table: {}x{}x{} hair: {} ]",
            self.table.n_theta(),
            self.table.n_theta(),
            self.table.channels(),
            BxDF::to_string(&self.hair)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        assert_eq!(longitudinal_index(&Vector3f::new(0.0, 0.0, 1.0)), 0);
        assert_eq!(longitudinal_index(&Vector3f::new(1.0, 0.0, 0.0)), 90);
        assert_eq!(longitudinal_index(&Vector3f::new(-1.0, 0.0, 0.0)), 90);
        let s = Float::sin(radians(30.2));
        let c = Float::cos(radians(30.2));
        assert_eq!(longitudinal_index(&Vector3f::new(-s, c, 0.0)), 30);
    }

    #[test]
    fn test_002() {
        assert!(AngularTable::new(2, 3, vec![0.0; 12]).is_err());
        assert!(AngularTable::new(2, 1, vec![0.0; 3]).is_err());
        let t = AngularTable::new(2, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(t.lookup(1, 0)[2], 3.0);
        assert_eq!(t.lookup(7, 9)[0], 4.0);
    }
}
