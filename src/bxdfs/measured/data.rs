use crate::core::pbrt::*;

use log::*;
use std::path::Path;

pub const MEASURED_FIELD_NAMES: [&str; 10] = [
    "theta_i",
    "phi_i",
    "ndf",
    "sigma",
    "vndf",
    "spectra",
    "luminance",
    "wavelengths",
    "description",
    "jacobian",
];

/// Validated, interpolation-ready contents of a measured BRDF file.
#[derive(Debug)]
pub struct MeasuredBxDFData {
    pub filename: String,
    pub description: String,
    pub wavelengths: Vec<Float>,
    pub isotropic: bool,
    pub jacobian: bool,
    pub ndf: PiecewiseLinear2D<0>,
    pub sigma: PiecewiseLinear2D<0>,
    pub vndf: PiecewiseLinear2D<2>,
    pub luminance: PiecewiseLinear2D<2>,
    pub spectra: PiecewiseLinear2D<3>,
}

fn is_float(f: &Field, ndim: usize) -> bool {
    return f.dtype == DataType::Float32 && f.ndim() == ndim;
}

fn check_structure(tensor: &Tensor) -> Result<(), String> {
    for name in MEASURED_FIELD_NAMES.iter() {
        if !tensor.has_field(name) {
            return Err(format!("missing field \"{}\"", name));
        }
    }
    let field = |name: &str| tensor.field(name).map_err(|e| e.msg);
    let theta_i = field("theta_i")?;
    let phi_i = field("phi_i")?;
    let wavelengths = field("wavelengths")?;
    let ndf = field("ndf")?;
    let sigma = field("sigma")?;
    let vndf = field("vndf")?;
    let luminance = field("luminance")?;
    let spectra = field("spectra")?;
    let description = field("description")?;
    let jacobian = field("jacobian")?;

    if !(description.ndim() == 1 && description.dtype == DataType::UInt8) {
        return Err("\"description\" must be a 1D uint8_t array".into());
    }
    if !(is_float(theta_i, 1) && is_float(phi_i, 1) && is_float(wavelengths, 1)) {
        return Err("angle and wavelength axes must be 1D float32_t arrays".into());
    }
    if !(is_float(ndf, 2) && is_float(sigma, 2)) {
        return Err("\"ndf\" and \"sigma\" must be 2D float32_t arrays".into());
    }
    if !(is_float(vndf, 4) && vndf.shape[0] == phi_i.shape[0] && vndf.shape[1] == theta_i.shape[0]) {
        return Err("\"vndf\" must be a 4D float32_t array over (phi_i, theta_i)".into());
    }
    if !(is_float(luminance, 4)
        && luminance.shape[0] == phi_i.shape[0]
        && luminance.shape[1] == theta_i.shape[0]
        && luminance.shape[2] == luminance.shape[3])
    {
        return Err("\"luminance\" must be a square 4D float32_t array over (phi_i, theta_i)".into());
    }
    if !(is_float(spectra, 5)
        && spectra.shape[0] == phi_i.shape[0]
        && spectra.shape[1] == theta_i.shape[0]
        && spectra.shape[2] == wavelengths.shape[0]
        && spectra.shape[3] == spectra.shape[4])
    {
        return Err(
            "\"spectra\" must be a square 5D float32_t array over (phi_i, theta_i, wavelengths)"
                .into(),
        );
    }
    if !(luminance.shape[2] == spectra.shape[3] && luminance.shape[3] == spectra.shape[4]) {
        return Err("\"luminance\" and \"spectra\" grids differ".into());
    }
    if !(jacobian.ndim() == 1 && jacobian.shape[0] == 1 && jacobian.dtype == DataType::UInt8) {
        return Err("\"jacobian\" must be a single uint8_t".into());
    }
    return Ok(());
}

impl MeasuredBxDFData {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PbrtError> {
        let tensor = Tensor::open(path)?;
        return Self::from_tensor(tensor);
    }

    /// Validates the field layout and builds the interpolants. Consumes the
    /// tensor; field buffers are moved, not copied.
    pub fn from_tensor(mut tensor: Tensor) -> Result<Self, PbrtError> {
        let filename = tensor.filename().to_string();
        if let Err(what) = check_structure(&tensor) {
            let msg = format!("{}: invalid BRDF file structure ({}): {}", filename, what, tensor);
            return Err(PbrtError::invalid_format(&msg));
        }

        let theta_i = tensor.take_field("theta_i")?.to_floats()?;
        let phi_i = tensor.take_field("phi_i")?.to_floats()?;
        let wavelengths = tensor.take_field("wavelengths")?.to_floats()?;
        let description = tensor.take_field("description")?;
        let jacobian = tensor.take_field("jacobian")?;
        let ndf = tensor.take_field("ndf")?;
        let sigma = tensor.take_field("sigma")?;
        let vndf = tensor.take_field("vndf")?;
        let luminance = tensor.take_field("luminance")?;
        let spectra = tensor.take_field("spectra")?;

        let isotropic = phi_i.len() <= 2;
        if !isotropic {
            let span = phi_i[phi_i.len() - 1] - phi_i[0];
            let reduction = ((2.0 * PI) / span).round();
            if reduction != 1.0 {
                let msg = format!("{}: reduction {} (!= 1) not supported", filename, reduction);
                return Err(PbrtError::invalid_format(&msg));
            }
        }

        let with_name = |what: &str, e: PbrtError| -> PbrtError {
            PbrtError::invalid_format(&format!("{}: {}: {}", filename, what, e.msg))
        };

        let ndf = PiecewiseLinear2D::<0>::new(
            &ndf.to_floats()?,
            ndf.shape[1] as usize,
            ndf.shape[0] as usize,
            [],
            false,
            false,
        )
        .map_err(|e| with_name("ndf", e))?;

        let sigma = PiecewiseLinear2D::<0>::new(
            &sigma.to_floats()?,
            sigma.shape[1] as usize,
            sigma.shape[0] as usize,
            [],
            false,
            false,
        )
        .map_err(|e| with_name("sigma", e))?;

        let vndf = PiecewiseLinear2D::<2>::new(
            &vndf.to_floats()?,
            vndf.shape[3] as usize,
            vndf.shape[2] as usize,
            [phi_i.as_slice(), theta_i.as_slice()],
            true,
            true,
        )
        .map_err(|e| with_name("vndf", e))?;

        let luminance = PiecewiseLinear2D::<2>::new(
            &luminance.to_floats()?,
            luminance.shape[3] as usize,
            luminance.shape[2] as usize,
            [phi_i.as_slice(), theta_i.as_slice()],
            true,
            true,
        )
        .map_err(|e| with_name("luminance", e))?;

        let spectra = PiecewiseLinear2D::<3>::new(
            &spectra.to_floats()?,
            spectra.shape[4] as usize,
            spectra.shape[3] as usize,
            [phi_i.as_slice(), theta_i.as_slice(), wavelengths.as_slice()],
            false,
            false,
        )
        .map_err(|e| with_name("spectra", e))?;

        let data = MeasuredBxDFData {
            description: String::from_utf8_lossy(&description.data)
                .trim_end_matches('\0')
                .to_string(),
            jacobian: jacobian.data[0] != 0,
            filename,
            wavelengths,
            isotropic,
            ndf,
            sigma,
            vndf,
            luminance,
            spectra,
        };
        info!(
            "Measured BRDF \"{}\": {} wavelengths, {}, {} bytes",
            data.filename,
            data.wavelengths.len(),
            if data.isotropic { "isotropic" } else { "anisotropic" },
            data.bytes_used()
        );
        return Ok(data);
    }

    pub fn bytes_used(&self) -> usize {
        return std::mem::size_of::<MeasuredBxDFData>()
            + std::mem::size_of::<Float>() * self.wavelengths.len()
            + self.ndf.bytes_used()
            + self.sigma.bytes_used()
            + self.vndf.bytes_used()
            + self.luminance.bytes_used()
            + self.spectra.bytes_used();
    }
}

impl std::fmt::Display for MeasuredBxDFData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ MeasuredBxDFData filename: {} ]", self.filename)
    }
}
