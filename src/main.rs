use clap::{Parser, Subcommand};
use simple_thumb::cache;
use simple_thumb::config::{self, SiteConfig};
use simple_thumb::generate::ThumbnailGenerator;
use simple_thumb::imaging::RustBackend;
use simple_thumb::output;
use simple_thumb::paths::Layout;
use simple_thumb::request::normalize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    if env!("SIMPLE_THUMB_ON_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    let hash = env!("SIMPLE_THUMB_GIT_HASH");
    if hash.is_empty() {
        "dev@unknown"
    } else {
        // Leaked once at startup
        Box::leak(format!("dev@{hash}").into_boxed_str())
    }
}

/// Target size and mode shared by commands that name a thumbnail.
#[derive(clap::Args, Clone)]
struct ThumbArgs {
    /// Target width in pixels (max 2000)
    #[arg(short, long)]
    width: Option<u32>,

    /// Target height in pixels (max 2000)
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// resize | crop | fit (default: resize)
    #[arg(short, long)]
    mode: Option<String>,

    /// Encoding quality 1-100 (default: 100, out-of-range values are clamped)
    #[arg(short, long)]
    quality: Option<u32>,
}

#[derive(Parser)]
#[command(name = "simple-thumb")]
#[command(about = "On-demand image thumbnails with a filesystem cache")]
#[command(long_about = "\
On-demand image thumbnails with a filesystem cache

Source images are read from <root>/<images>, thumbnails are written to
<root>/<thumbnails> mirroring the source folders. The output filename
encodes every parameter, so asking twice returns the cached file:

  public/
  ├── images/
  │   └── photos/cat.png
  └── thumbnails/
      └── photos/cat_200x100_fit_80.png    # -w 200 -H 100 -m fit -q 80

Modes:
  resize  scale into the box, keeping aspect ratio
  crop    cut an exact centered region, no scaling
  fit     scale to cover the box, then crop to it

A missing width or height is derived at 16:9 for resize and crop, and
mirrored from the other side for fit.

Run 'simple-thumb gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory (holds config.toml)
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Log cache decisions and transforms to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate thumbnails (or reuse cached ones) and print their paths
    Make {
        /// Source paths, relative to the images directory
        #[arg(required = true)]
        paths: Vec<String>,

        #[command(flatten)]
        thumb: ThumbArgs,

        /// Delete existing thumbnails first and regenerate them
        #[arg(long)]
        force: bool,
    },
    /// Print the canonical thumbnail path without generating anything
    Path {
        /// Source path, relative to the images directory
        path: String,

        #[command(flatten)]
        thumb: ThumbArgs,
    },
    /// List files in the thumbnails directory
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print one value by dotted key, e.g. `paths.images`
    Get { key: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Make {
            paths,
            thumb,
            force,
        } => {
            let site_config = config::load_config(&cli.project)?;
            init_thread_pool(&site_config.processing);
            let generator = ThumbnailGenerator::new(
                RustBackend::new(),
                Layout::from_config(&cli.project, &site_config),
            );
            if force {
                for path in &paths {
                    let request = normalize(
                        path,
                        thumb.width,
                        thumb.height,
                        thumb.mode.as_deref(),
                        thumb.quality,
                    )?;
                    generator.invalidate(&request)?;
                }
            }
            let items = generator.make_many(
                &paths,
                thumb.width,
                thumb.height,
                thumb.mode.as_deref(),
                thumb.quality,
            );
            output::print_make_output(&items);
            if items.iter().any(|item| item.result.is_err()) {
                std::process::exit(1);
            }
        }
        Command::Path { path, thumb } => {
            let site_config = config::load_config(&cli.project)?;
            let generator = ThumbnailGenerator::new(
                RustBackend::new(),
                Layout::from_config(&cli.project, &site_config),
            );
            let resolved = generator.resolve(
                &path,
                thumb.width,
                thumb.height,
                thumb.mode.as_deref(),
                thumb.quality,
            )?;
            println!("{}", resolved.relative_output);
        }
        Command::List { json } => {
            let site_config = config::load_config(&cli.project)?;
            let layout = Layout::from_config(&cli.project, &site_config);
            let thumbs = cache::list(&layout.destination)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&thumbs)?);
            } else {
                output::print_list_output(&thumbs);
            }
        }
        Command::Config(ConfigCommand::Get { key }) => {
            let site_config = config::load_config(&cli.project)?;
            print_config_value(&site_config, &key)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "simple_thumb=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn print_config_value(site_config: &SiteConfig, key: &str) -> Result<(), String> {
    match site_config.lookup(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(format!("Unknown config key or no value set: {key}")),
    }
}
