//! lenscap CLI - generate a slip-on lens cap as STEP and STL
//!
//! Dimensions come from flags, optionally layered over a TOML parameter
//! file. Both output files are named after the inner diameter.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use lenscap::{CapParams, ExportOptions, ExportSummary, LensCap, StlFormat, TessellationParams};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lenscap")]
#[command(about = "Parametric slip-on lens cap generator", long_about = None)]
struct Cli {
    /// Inner diameter in mm [default: 75.0]
    #[arg(long = "id", value_name = "MM")]
    inner_diameter: Option<f64>,

    /// Wall thickness in mm [default: 2.0]
    #[arg(long, value_name = "MM")]
    wall: Option<f64>,

    /// Overall height in mm [default: 20.0]
    #[arg(long, value_name = "MM")]
    height: Option<f64>,

    /// Floor thickness in mm (default: same as the wall)
    #[arg(long, value_name = "MM")]
    bottom: Option<f64>,

    /// TOML parameter file; flags given on the command line win
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the STEP and STL files are written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    out_dir: PathBuf,

    /// STL encoding
    #[arg(long, value_enum, default_value_t = StlFormatArg::Binary)]
    stl_format: StlFormatArg,

    /// Segments around the axis in the STL mesh
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(3..))]
    segments: u32,

    /// Print a JSON export summary instead of plain text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StlFormatArg {
    Binary,
    Ascii,
}

impl From<StlFormatArg> for StlFormat {
    fn from(arg: StlFormatArg) -> Self {
        match arg {
            StlFormatArg::Binary => StlFormat::Binary,
            StlFormatArg::Ascii => StlFormat::Ascii,
        }
    }
}

impl Cli {
    /// Start from the config file (or defaults) and apply explicit flags.
    fn cap_params(&self) -> Result<CapParams> {
        let mut params = match &self.config {
            Some(path) => CapParams::from_toml_file(path)
                .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
            None => CapParams::default(),
        };
        if let Some(id) = self.inner_diameter {
            params.inner_diameter = id;
        }
        if let Some(wall) = self.wall {
            params.wall = wall;
        }
        if let Some(height) = self.height {
            params.height = height;
        }
        if let Some(bottom) = self.bottom {
            params.bottom = Some(bottom);
        }
        Ok(params)
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            stl_format: self.stl_format.into(),
            tessellation: TessellationParams {
                circle_segments: self.segments,
                ..TessellationParams::default()
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the cap and write both files. Nothing touches the output
/// directory until the parameters have been validated.
fn run(cli: &Cli) -> Result<ExportSummary> {
    let params = cli.cap_params()?;
    debug!(?params, "resolved parameters");

    let cap = LensCap::new(params).context("Invalid cap parameters")?;

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;
    cap.export(&cli.out_dir, &cli.export_options())
        .with_context(|| format!("Failed to export {}", cap.name))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let summary = run(&cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Exported STEP to {}", summary.step_path.display());
        println!("Exported STL to {}", summary.stl_path.display());
    }

    Ok(())
}
