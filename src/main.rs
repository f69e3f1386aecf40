use clap::{Parser, Subcommand};
use glass_catalog::catalog::RecordFilter;
use glass_catalog::scan::{self, Manifest};
use glass_catalog::{config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glass-catalog")]
#[command(about = "Build and query a catalog of automotive glass part images")]
#[command(long_about = "\
Build and query a catalog of automotive glass part images

The image directory is the data source. Every filename encodes the vehicle,
year range, part code, part number, size, and a free-text description:

  BRAND-MODEL-STARTYEAR-ENDYEAR-CODE-NUMBER-WIDTHxHEIGHT-DESCRIPTION.png

  FORD-TRANSIT-CUSTOM-2017-2021-FD-28414-567X1199-PUERTA-DELANTERA-DERECHA.PNG
  │    │              │    │    │  │     │        └ description
  │    │              │    │    │  │     └ size (width x height)
  │    │              │    │    │  └ window number
  │    │              │    │    └ window code
  │    │              └────┴ start / end year (start must be 2000-2030)
  │    └ model (any number of dash-separated parts)
  └ brand

Files starting with '.' or '_' are ignored. Names that do not follow the
convention are reported and left out of the catalog.

Run 'glass-catalog gen-config' to generate a documented catalog.toml.")]
#[command(version)]
struct Cli {
    /// Image directory (defaults to image_dir from catalog.toml)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Directory containing catalog.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Catalog manifest written by scan and read by query
    #[arg(long, default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the image directory listing as a JSON array
    List,
    /// Parse the image directory and write the catalog manifest
    Scan {
        /// Rewrite the manifest even if the directory has not changed
        #[arg(long)]
        force: bool,
    },
    /// Parse the image directory and report rejected filenames without writing
    Check,
    /// Print brands, models, window codes, and size statistics
    Stats,
    /// Filter the catalog manifest (criteria combine with AND)
    Query(QueryArgs),
    /// Print a stock catalog.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Exact brand, e.g. FORD
    #[arg(long)]
    brand: Option<String>,
    /// Exact model, e.g. TRANSIT-CUSTOM
    #[arg(long)]
    model: Option<String>,
    /// Exact window code, e.g. FD
    #[arg(long)]
    code: Option<String>,
    /// Year range that must overlap the part's years
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    years: Option<Vec<u32>>,
    /// Case-insensitive text to find in the description
    #[arg(long)]
    search: Option<String>,
    /// Print matching records as JSON
    #[arg(long)]
    json: bool,
}

impl QueryArgs {
    fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            brand: self.brand.clone(),
            model: self.model.clone(),
            window_code: self.code.clone(),
            years: self.years.as_deref().and_then(|y| match y {
                [start, end] => Some((*start, *end)),
                _ => None,
            }),
            search: self.search.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::List => {
            let (site_config, source) = load_settings(&cli)?;
            let names = scan::list_image_files(&source, &site_config.listing);
            println!("{}", serde_json::to_string_pretty(&names)?);
        }
        Command::Scan { force } => {
            let (site_config, source) = load_settings(&cli)?;
            println!("==> Scanning {}", source.display());
            let manifest = scan::scan(&source, &site_config);
            output::print_scan_output(&manifest, &source);

            if manifest.save_if_changed(&cli.catalog, *force)? {
                println!("==> Wrote {}", cli.catalog.display());
            } else {
                println!("==> Catalog unchanged: {}", cli.catalog.display());
            }
        }
        Command::Check => {
            let (site_config, source) = load_settings(&cli)?;
            println!("==> Checking {}", source.display());
            let manifest = scan::scan(&source, &site_config);
            output::print_scan_output(&manifest, &source);
        }
        Command::Stats => {
            let (site_config, source) = load_settings(&cli)?;
            let manifest = scan::scan(&source, &site_config);
            output::print_stats_output(&manifest.records);
        }
        Command::Query(args) => {
            let manifest = Manifest::load(&cli.catalog)?;
            let hits = manifest.records.select(&args.to_filter());
            if args.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                output::print_records(&hits);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `catalog.toml` and work out which image directory to read.
fn load_settings(cli: &Cli) -> Result<(config::CatalogConfig, PathBuf), config::ConfigError> {
    let site_config = config::load_config(&cli.config_dir)?;
    let source = resolve_source(cli, &site_config);
    Ok((site_config, source))
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `--source` if given, else `image_dir` relative to the config directory.
fn resolve_source(cli: &Cli, site_config: &config::CatalogConfig) -> PathBuf {
    match &cli.source {
        Some(source) => source.clone(),
        None => relative_to(&cli.config_dir, Path::new(&site_config.image_dir)),
    }
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || base == Path::new(".") {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
