//! Reweave CLI
//!
//! Usage:
//!   reweave [OPTIONS] <VIEW>
//!
//! Options:
//!   -S, --schemes <DIR>   Directory of scheme layout files
//!   -v, --views <DIR>     Directory of view files for include resolution
//!   -s, --scheme <NAME>   Scheme to render into
//!   -d, --data <FILE>     JSON file with the page data
//!   -c, --config <FILE>   Renderer config file (TOML)
//!       --ignore-errors   Render partial output even when markers fail
//!   -h, --help            Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;

use reweave::{ConfigStore, RenderPipeline, SchemeRef, SchemeRegistry};

#[derive(Parser)]
#[command(name = "reweave")]
#[command(about = "Server-side template renderer with {{ ... }} expression markers")]
struct Cli {
    /// View name rendered into the scheme (exposed to markers as file_name)
    view: String,

    /// Directory of scheme layout files
    #[arg(short = 'S', long, default_value = "schemes")]
    schemes: PathBuf,

    /// Directory of view files for include resolution
    #[arg(short, long)]
    views: Option<PathBuf>,

    /// Scheme to render into (falls back to default_scheme from config)
    #[arg(short, long)]
    scheme: Option<String>,

    /// JSON file with the page data
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Renderer config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render partial output even when markers fail
    #[arg(long)]
    ignore_errors: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ConfigStore::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => ConfigStore::new(),
    };

    // Command-line flags override the config file
    if let Some(views) = &cli.views {
        config.set("views", views.display().to_string());
    }
    if cli.ignore_errors {
        config.set("ignore_errors", true);
    }

    let mut schemes = SchemeRegistry::new();
    if let Err(e) = schemes.load(&cli.schemes) {
        eprintln!(
            "Error loading schemes from '{}': {}",
            cli.schemes.display(),
            e
        );
        process::exit(1);
    }

    let data = match &cli.data {
        Some(path) => {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading data file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Error parsing data file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            }
        }
        None => serde_json::json!({}),
    };

    let pipeline = RenderPipeline::new(schemes, config);
    let scheme_ref = cli.scheme.as_deref().map(SchemeRef::from);

    match pipeline.render(&cli.view, data, scheme_ref) {
        Ok(page) => {
            println!("{}", page.body);
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            process::exit(1);
        }
    }
}
