//! Cubestitch CLI - cubemap to equirectangular panorama stitcher.
//!
//! Stitch individual cube face sets, run JSON job descriptors, or scan a
//! TrueView export tree and publish a scene catalog.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cubestitch::catalog::{
    build_catalog, stitch_if_absent, stitch_job, write_catalog, CatalogUrls, SceneStitchJob,
    StitchOutcome,
};
use cubestitch::cubemap::load_faces;
use cubestitch::export::write_equirect;
use cubestitch::stitch::{stitch_equirect, OutputFormat, StitchOptions};
use cubestitch::CubeFaceId;

/// Cubemap to equirectangular panorama stitcher.
#[derive(Parser)]
#[command(name = "cubestitch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch six face images into one panorama.
    Stitch {
        /// Back face (-X).
        #[arg(long)]
        face0: Option<PathBuf>,
        /// Right face (+X).
        #[arg(long)]
        face1: Option<PathBuf>,
        /// Front face (+Z).
        #[arg(long)]
        face2: Option<PathBuf>,
        /// Left face (-Z).
        #[arg(long)]
        face3: Option<PathBuf>,
        /// Top face (+Y).
        #[arg(long)]
        face4: Option<PathBuf>,
        /// Bottom face (-Y).
        #[arg(long)]
        face5: Option<PathBuf>,

        /// Output file. Format follows the extension unless --format is given.
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Run a JSON job descriptor ({"scene": ..., "faces": {...}}).
    Job {
        /// Path to the job file.
        job: PathBuf,

        /// Directory receiving `<scene>_stitched.<ext>`.
        #[arg(long, default_value = "./output/trueview_stitched")]
        output_root: PathBuf,

        /// Public URL prefix of the output directory.
        #[arg(long, default_value = "/output/trueview_stitched")]
        url_prefix: String,

        /// Stitch even if the output already exists.
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Stitch every scene under a TrueView export directory.
    Scan {
        /// Directory with one sub-directory per scene.
        root: PathBuf,

        /// Directory receiving `<scene>_stitched.<ext>`.
        #[arg(long, default_value = "./output/trueview_stitched")]
        output_root: PathBuf,

        /// Public URL prefix of the input tree.
        #[arg(long, default_value = "/input_data/trueview")]
        input_prefix: String,

        /// Public URL prefix of the output directory.
        #[arg(long, default_value = "/output/trueview_stitched")]
        url_prefix: String,

        /// Write the scene catalog JSON here instead of stdout.
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Display size and memory figures for an output width.
    Info {
        /// Output width in pixels.
        #[arg(short, long, default_value = "4096")]
        width: u32,
    },
}

#[derive(Args)]
struct EncodeArgs {
    /// Output width in pixels (height is width / 2).
    #[arg(short, long, default_value = "4096")]
    width: u32,

    /// Encoder quality in (0, 1], JPEG only.
    #[arg(short, long, default_value = "0.95")]
    quality: f32,

    /// Output format.
    #[arg(short, long)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Baseline JPEG.
    Jpeg,
    /// 8-bit RGB PNG.
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

impl EncodeArgs {
    fn options(&self, output: Option<&Path>) -> StitchOptions {
        let format = self
            .format
            .map(OutputFormat::from)
            .or_else(|| output.and_then(OutputFormat::from_path))
            .unwrap_or_default();
        StitchOptions {
            width: self.width,
            quality: self.quality,
            format,
            ..Default::default()
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Stitch {
            face0,
            face1,
            face2,
            face3,
            face4,
            face5,
            output,
            encode,
        } => {
            let faces = [face0, face1, face2, face3, face4, face5];
            let options = encode.options(Some(&output));
            run_stitch(faces, &output, &options)
        }
        Commands::Job {
            job,
            output_root,
            url_prefix,
            force,
            encode,
        } => run_job(&job, &output_root, &url_prefix, force, &encode.options(None)),
        Commands::Scan {
            root,
            output_root,
            input_prefix,
            url_prefix,
            catalog,
            encode,
        } => {
            let urls = CatalogUrls {
                input_prefix,
                output_prefix: url_prefix,
            };
            run_scan(&root, &output_root, &urls, catalog.as_deref(), &encode.options(None))
        }
        Commands::Info { width } => {
            run_info(width);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn run_stitch(faces: [Option<PathBuf>; 6], output: &Path, options: &StitchOptions) -> CliResult {
    options.validate()?;
    let start = Instant::now();

    let paths = CubeFaceId::all()
        .into_iter()
        .zip(faces)
        .filter_map(|(id, path)| path.map(|p| (id, p)));
    let (set, report) = load_faces(paths);
    info!(loaded = report.loaded.len(), "faces loaded in {:.2?}", start.elapsed());

    let pano = stitch_equirect(&set, options)?;
    if pano.stats.is_blank() {
        warn!("panorama is entirely background");
    }
    write_equirect(&pano.image, output, options)?;

    info!("Done in {:.2?}", start.elapsed());
    println!("{}", output.display());
    Ok(())
}

fn run_job(job_path: &Path, output_root: &Path, url_prefix: &str, force: bool, options: &StitchOptions) -> CliResult {
    let job = SceneStitchJob::from_json_file(job_path)?;
    let outcome = if force {
        stitch_job(&job, output_root, options)?
    } else {
        stitch_if_absent(&job, output_root, options)?
    };

    if let StitchOutcome::Stitched { report, stats, .. } = &outcome {
        if !report.is_complete() {
            warn!(scene = %job.scene, missing = ?report.missing(), failed = ?report.failed(), "panorama stitched with degraded coverage");
        }
        if stats.is_blank() {
            warn!(scene = %job.scene, "panorama is entirely background");
        }
    }

    let urls = CatalogUrls {
        output_prefix: url_prefix.to_string(),
        ..Default::default()
    };
    println!("{}", urls.output_url(&job.output_file_name(options.format)));
    Ok(())
}

fn run_scan(
    root: &Path,
    output_root: &Path,
    urls: &CatalogUrls,
    catalog: Option<&Path>,
    options: &StitchOptions,
) -> CliResult {
    options.validate()?;
    let start = Instant::now();
    let entries = build_catalog(root, output_root, urls, options)?;

    match catalog {
        Some(path) => {
            write_catalog(&entries, path)?;
            info!(path = %path.display(), "catalog written");
        }
        None => println!("{}", serde_json::to_string_pretty(&entries)?),
    }

    info!(scenes = entries.len(), "Scan completed in {:.2?}", start.elapsed());
    Ok(())
}

fn run_info(width: u32) {
    let options = StitchOptions::with_width(width);
    if let Err(e) = options.validate() {
        println!("{}", e);
        return;
    }
    let height = options.height();
    let pixels = width as u64 * height as u64;
    let rgb_bytes = pixels * 3;
    let face_estimate = (width / 4) as u64;
    let faces_bytes = face_estimate * face_estimate * 3 * 6;

    println!("Cubestitch - Output Info");
    println!("========================");
    println!();
    println!("Output:        {}x{} ({} pixels)", width, height, pixels);
    println!("Output buffer: {:>12} bytes ({:.2} MB)", rgb_bytes, rgb_bytes as f64 / 1024.0 / 1024.0);
    println!(
        "Matching faces: {}x{} each, {:.2} MB decoded for six",
        face_estimate,
        face_estimate,
        faces_bytes as f64 / 1024.0 / 1024.0
    );
    println!("Worker threads: {}", rayon::current_num_threads());
}
