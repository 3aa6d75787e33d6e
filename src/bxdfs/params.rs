use crate::bxdfs::hair::*;
use crate::bxdfs::tabulated_hair::*;
use crate::core::pbrt::*;

use log::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A spectral parameter given either as one value or one value per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpectrumValue {
    Constant(Float),
    Samples(Vec<Float>),
}

impl SpectrumValue {
    pub fn to_spectrum(&self) -> Result<SampledSpectrum, PbrtError> {
        match self {
            SpectrumValue::Constant(v) => Ok(SampledSpectrum::from(*v)),
            SpectrumValue::Samples(v) => {
                if v.len() == 1 {
                    return Ok(SampledSpectrum::from(v[0]));
                }
                if v.len() != N_SPECTRUM_SAMPLES {
                    let msg = format!(
                        "spectral value needs 1 or {} entries, got {}",
                        N_SPECTRUM_SAMPLES,
                        v.len()
                    );
                    return Err(PbrtError::invalid_parameter(&msg));
                }
                let mut s = SampledSpectrum::zero();
                for i in 0..N_SPECTRUM_SAMPLES {
                    s[i] = v[i];
                }
                Ok(s)
            }
        }
    }
}

/// Ways of specifying hair absorption. At most one is used, in the order
/// `sigma_a`, `color`, melanin concentrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbsorptionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma_a: Option<SpectrumValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<SpectrumValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eumelanin: Option<Float>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pheomelanin: Option<Float>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairParams {
    pub eta: Float,
    pub beta_m: Float,
    pub beta_n: Float,
    pub alpha: Float,
    #[serde(flatten)]
    pub absorption: AbsorptionParams,
}

impl Default for HairParams {
    fn default() -> Self {
        HairParams {
            eta: 1.55,
            beta_m: 0.3,
            beta_n: 0.3,
            alpha: 2.0,
            absorption: AbsorptionParams::default(),
        }
    }
}

impl HairParams {
    pub fn resolve_sigma_a(&self, lambda: &SampledWavelengths) -> Result<SampledSpectrum, PbrtError> {
        let a = &self.absorption;
        let sigma_a = &a.sigma_a;
        let color = &a.color;
        let eumelanin = a.eumelanin;
        let pheomelanin = a.pheomelanin;

        if let Some(sigma_a) = sigma_a {
            if color.is_some() {
                warn!("Ignoring \"color\" parameter since \"sigma_a\" was provided.");
            }
            if eumelanin.is_some() {
                warn!("Ignoring \"eumelanin\" parameter since \"sigma_a\" was provided.");
            }
            if pheomelanin.is_some() {
                warn!("Ignoring \"pheomelanin\" parameter since \"sigma_a\" was provided.");
            }
            return Ok(sigma_a.to_spectrum()?.clamp_zero());
        } else if let Some(color) = color {
            if eumelanin.is_some() {
                warn!("Ignoring \"eumelanin\" parameter since \"color\" was provided.");
            }
            if pheomelanin.is_some() {
                warn!("Ignoring \"pheomelanin\" parameter since \"color\" was provided.");
            }
            let c = color.to_spectrum()?.clamp_zero();
            return Ok(HairBxDF::sigma_a_from_reflectance(&c, self.beta_n));
        } else if eumelanin.is_some() || pheomelanin.is_some() {
            return Ok(HairBxDF::sigma_a_from_concentration(
                eumelanin.unwrap_or(0.0).max(0.0),
                pheomelanin.unwrap_or(0.0).max(0.0),
                lambda,
            ));
        }
        // Default: brown-ish hair.
        return Ok(SampledSpectrum::one());
    }

    pub fn create_bxdf(&self, h: Float, lambda: &SampledWavelengths) -> Result<HairBxDF, PbrtError> {
        let sigma_a = self.resolve_sigma_a(lambda)?;
        return HairBxDF::new(h, self.eta, sigma_a, self.beta_m, self.beta_n, self.alpha);
    }

    pub fn create_tabulated_bxdf(
        &self,
        h: Float,
        lambda: &SampledWavelengths,
        table: &Arc<AngularTable>,
    ) -> Result<TabulatedHairBxDF, PbrtError> {
        let hair = self.create_bxdf(h, lambda)?;
        return Ok(TabulatedHairBxDF::from_hair(hair, table.clone()));
    }
}

fn default_table_field() -> String {
    return String::from("brdf");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableParams {
    pub path: PathBuf,
    #[serde(default = "default_table_field")]
    pub field: String,
}

impl TableParams {
    pub fn load(&self) -> Result<AngularTable, PbrtError> {
        return AngularTable::open(&self.path, &self.field);
    }
}

/// Settings document read by the command line tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub hair: HairParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableParams>,
}

impl ScatterConfig {
    pub fn from_json(s: &str) -> Result<Self, PbrtError> {
        let config: ScatterConfig = serde_json::from_str(s)?;
        return Ok(config);
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PbrtError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| {
            let msg = format!("{}: {}", path.display(), e);
            PbrtError::new(PbrtErrorKind::Io, &msg)
        })?;
        return Self::from_json(&s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let c = ScatterConfig::from_json("{}").unwrap();
        assert_eq!(c.hair, HairParams::default());
        assert!(c.measured.is_none());

        let c = ScatterConfig::from_json(
            r#"{ "hair": { "beta_m": 0.5, "sigma_a": 0.25 }, "table": { "path": "t.tensor" } }"#,
        )
        .unwrap();
        assert_eq!(c.hair.beta_m, 0.5);
        assert_eq!(c.hair.eta, 1.55);
        assert_eq!(c.hair.absorption.sigma_a, Some(SpectrumValue::Constant(0.25)));
        assert_eq!(c.table.unwrap().field, "brdf");
    }

    #[test]
    fn test_002() {
        let lambda = SampledWavelengths::default();
        let mut p = HairParams::default();
        assert_eq!(p.resolve_sigma_a(&lambda).unwrap(), SampledSpectrum::one());

        p.absorption.eumelanin = Some(1.0);
        let melanin = p.resolve_sigma_a(&lambda).unwrap();
        assert!(melanin.max_component_value() <= 1.37 + 1e-5);

        // sigma_a wins over everything else
        p.absorption.color = Some(SpectrumValue::Constant(0.5));
        p.absorption.sigma_a = Some(SpectrumValue::Samples(vec![0.1, 0.2, 0.3, 0.4]));
        let s = p.resolve_sigma_a(&lambda).unwrap();
        assert_eq!(s, SampledSpectrum::from([0.1, 0.2, 0.3, 0.4]));

        p.absorption.sigma_a = Some(SpectrumValue::Samples(vec![0.1, 0.2]));
        assert!(p.resolve_sigma_a(&lambda).is_err());
    }
}
