use clap::*;

use pbrt_scatter::bxdfs::*;
use pbrt_scatter::core::pbrt::*;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use log::*;

const BATCH_SIZE: usize = 4096;

#[derive(Debug, Parser)]
#[clap(author, about, version)]
struct CommandOptions {
    /// Log messages at or above this level (0 -> INFO,
    /// 1 -> WARNING, 2 -> ERROR, 3-> FATAL).
    #[arg(long, value_name = "num", global = true)]
    pub minloglevel: Option<i32>,

    /// Suppress all text output other than results and error messages.
    #[arg(long, default_value = "false", global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print the header of a tensor file.
    Info {
        #[arg(value_name = "filename")]
        path: PathBuf,

        /// Print as JSON.
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Check that a file is a well-formed measured BRDF.
    Validate {
        #[arg(value_name = "filename")]
        path: PathBuf,
    },
    /// White-furnace estimate of the fiber models.
    Furnace {
        /// JSON settings file.
        #[arg(short, long, value_name = "filename")]
        config: Option<PathBuf>,

        /// Number of samples per estimate.
        #[arg(short, long, default_value = "262144", value_name = "num")]
        samples: usize,

        /// Use specified number of threads.
        #[arg(short = 'j', long = "nthreads", value_name = "num")]
        nthreads: Option<usize>,
    },
    /// Directional-hemispherical reflectance of a measured BRDF.
    Rho {
        #[arg(long, value_name = "filename")]
        measured: PathBuf,

        /// Polar angle of the outgoing direction in degrees.
        #[arg(long, default_value = "30", value_name = "deg")]
        theta: Float,

        /// Number of samples.
        #[arg(short, long, default_value = "65536", value_name = "num")]
        samples: usize,

        /// Use specified number of threads.
        #[arg(short = 'j', long = "nthreads", value_name = "num")]
        nthreads: Option<usize>,
    },
}

fn init_logger(opts: &CommandOptions) {
    if let Some(minloglevel) = opts.minloglevel {
        const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        let log_level = LOG_LEVELS[(minloglevel + 2).clamp(0, 4) as usize];
        env::set_var("RUST_LOG", log_level);
    } else {
        //default log level : warn
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_owned());
        env::set_var("RUST_LOG", log_level);
    }

    env_logger::Builder::from_default_env()
        .format_target(false)
        .format_module_path(false)
        .init();
}

fn init_threads(nthreads: Option<usize>) {
    if let Some(n) = nthreads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            warn!("Unable to set thread count: {}", e);
        }
    }
}

/// Sums `f` over `n_samples` draws, in parallel batches with their own
/// random sequences, and returns the mean.
fn estimate<F>(n_samples: usize, progress: &ProgressReporter, f: F) -> SampledSpectrum
where
    F: Fn(&mut RNG) -> SampledSpectrum + Sync,
{
    if n_samples == 0 {
        return SampledSpectrum::zero();
    }
    let n_batches = (n_samples + BATCH_SIZE - 1) / BATCH_SIZE;
    let sum = (0..n_batches)
        .into_par_iter()
        .map(|batch| {
            let mut rng = RNG::new_sequence(batch as u64);
            let n = usize::min(BATCH_SIZE, n_samples - batch * BATCH_SIZE);
            let mut s = SampledSpectrum::zero();
            for _ in 0..n {
                s += f(&mut rng);
            }
            progress.update(n);
            s
        })
        .reduce(SampledSpectrum::zero, |a, b| a + b);
    return sum / n_samples as Float;
}

fn info(path: &Path, json: bool) -> Result<(), PbrtError> {
    let tensor = Tensor::open(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tensor.info())?);
    } else {
        println!("{}", tensor);
    }
    return Ok(());
}

fn validate(path: &Path) -> Result<(), PbrtError> {
    let data = MeasuredBxDFData::open(path)?;
    println!("{}", data);
    println!("  description = \"{}\"", data.description);
    println!("  isotropic = {}", data.isotropic);
    println!("  wavelengths = {:?}", data.wavelengths);
    println!("  bytes = {}", data.bytes_used());
    return Ok(());
}

fn furnace(config: &Option<PathBuf>, samples: usize, quiet: bool) -> Result<(), PbrtError> {
    let config = match config {
        Some(path) => ScatterConfig::from_file(path)?,
        None => ScatterConfig::default(),
    };
    let table = match config.table.as_ref() {
        Some(t) => Some(Arc::new(t.load()?)),
        None => None,
    };
    let lambda = SampledWavelengths::visible();

    let offsets: [Float; 5] = [-0.9, -0.5, 0.0, 0.5, 0.9];
    let progress = ProgressReporter::new(2 * offsets.len() * samples, "Furnace", quiet);
    let mut rows = Vec::new();
    for &h in offsets.iter() {
        let bxdf: BxDFEnum = match table.as_ref() {
            Some(table) => config.hair.create_tabulated_bxdf(h, &lambda, table)?.into(),
            None => config.hair.create_bxdf(h, &lambda)?.into(),
        };
        let mode = TransportMode::Radiance;

        let uniform = estimate(samples, &progress, |rng| {
            let wo = uniform_sample_sphere(&rng.uniform_point2f());
            let wi = uniform_sample_sphere(&rng.uniform_point2f());
            bxdf.f(&wo, &wi, mode) * (abs_cos_theta(&wi) / uniform_sphere_pdf())
        });
        let sampled = estimate(samples, &progress, |rng| {
            let wo = uniform_sample_sphere(&rng.uniform_point2f());
            let uc = rng.uniform_float();
            let u = rng.uniform_point2f();
            match bxdf.sample_f(&wo, uc, &u, mode, REFL_TRANS_ALL) {
                Some(bs) if bs.pdf > 0.0 => bs.f * (abs_cos_theta(&bs.wi) / bs.pdf),
                _ => SampledSpectrum::zero(),
            }
        });
        rows.push((h, uniform, sampled));
    }
    progress.done();

    println!("{:>6} {:>12} {:>12}", "h", "uniform", "sampled");
    for (h, uniform, sampled) in rows.iter() {
        println!("{:>6.2} {:>12.5} {:>12.5}", h, uniform.average(), sampled.average());
    }
    return Ok(());
}

fn rho(path: &Path, theta: Float, samples: usize, quiet: bool) -> Result<(), PbrtError> {
    let cache = MeasuredDataCache::new();
    let data = cache.get_or_load(path)?;
    let lambda = SampledWavelengths::visible();
    let bxdf = BxDFEnum::from(MeasuredBxDF::new(data, &lambda));

    let theta = radians(theta);
    let wo = Vector3f::new(Float::sin(theta), 0.0, Float::cos(theta));
    let progress = ProgressReporter::new(samples, "Rho", quiet);
    let r = estimate(samples, &progress, |rng| {
        let uc = [rng.uniform_float()];
        let u2 = [rng.uniform_point2f()];
        bxdf.rho_hd(&wo, &uc, &u2)
    });
    progress.done();

    for i in 0..N_SPECTRUM_SAMPLES {
        println!("{:>8.2} nm  {:.6}", lambda[i], r[i]);
    }
    return Ok(());
}

pub fn main() {
    let opts = CommandOptions::parse();
    init_logger(&opts);

    let r = match &opts.action {
        Action::Info { path, json } => info(path, *json),
        Action::Validate { path } => validate(path),
        Action::Furnace {
            config,
            samples,
            nthreads,
        } => {
            init_threads(*nthreads);
            furnace(config, *samples, opts.quiet)
        }
        Action::Rho {
            measured,
            theta,
            samples,
            nthreads,
        } => {
            init_threads(*nthreads);
            rho(measured, *theta, *samples, opts.quiet)
        }
    };
    if let Err(e) = r {
        error!("{}", e);
        process::exit(-1);
    }
}
