//! akiya-advisor command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use akiya_advisor::{
    app::{Advisor, AdvisorError, AnalyzeRequest, Collaborators, LocateRequest},
    config::Settings,
    domain::{AreaType, RecommendationReport},
    output,
    util::persistence,
};

#[derive(Debug, Parser)]
#[command(name = "akiya-advisor", version, about)]
struct Cli {
    /// Settings file (defaults to akiya.toml in the user config directory).
    #[arg(long, global = true, env = "AKIYA_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// More logging; repeat for debug output. RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the configured areas.
    Areas,
    /// Evaluate an area from its fixed market signals.
    Analyze {
        #[arg(long)]
        area: String,
        /// Replace every business's initial investment (yen).
        #[arg(long)]
        investment: Option<u64>,
    },
    /// Look up a property's signals and evaluate the businesses its zoning permits.
    Locate {
        /// Prefecture and municipality, e.g. 神奈川県鎌倉市.
        #[arg(long)]
        region: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        investment: Option<u64>,
        /// Total floor area of the building in m².
        #[arg(long)]
        floor_area: f64,
    },
    /// Show the most recent report again.
    Last,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(cli.config.as_deref())?;
    let advisor = Advisor::from_settings(&settings)?;

    let report = match cli.command {
        Command::Areas => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&advisor.catalog().areas)?);
            } else {
                println!("{}", output::render_areas(advisor.catalog()));
            }
            return Ok(());
        }
        Command::Last => {
            let report = persistence::load_last_report()
                .ok_or("no saved report yet; run `analyze` or `locate` first")?;
            print_report(&report, cli.json, cli.verbose > 0)?;
            return Ok(());
        }
        Command::Analyze { area, investment } => advisor.analyze(&AnalyzeRequest {
            area: AreaType::new(area.trim()),
            investment,
        })?,
        Command::Locate {
            region,
            address,
            investment,
            floor_area,
        } => {
            let collaborators = Collaborators::from_settings(&settings)?;
            let request = LocateRequest {
                region,
                address,
                investment,
                floor_area_m2: floor_area,
            };
            match advisor.locate(&collaborators, &request).await {
                Ok(report) => report,
                Err(AdvisorError::Lookup { stage, source }) if source.is_retryable() => {
                    return Err(format!(
                        "{stage} lookup failed ({source}); the service may be unavailable, try again later"
                    )
                    .into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    print_report(&report, cli.json, cli.verbose > 0)?;
    match persistence::save_last_report(&report) {
        Ok(path) => tracing::debug!(path = %path.display(), "saved report"),
        Err(e) => tracing::warn!("could not save report: {e}"),
    }
    Ok(())
}

fn print_report(
    report: &RecommendationReport,
    json: bool,
    verbose: bool,
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", output::render_report(report, verbose));
    }
    Ok(())
}
