use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, error, info, Level};

use power_ratings::performance::report_comp_record;
use power_ratings::report::{export_csv, output_report};
use power_ratings::{load_data, rate_season, InputFormat, RatingContext};

const DEFAULT_INFILE: &str = "games.txt";
const DEFAULT_OUTFILE: &str = "rank.txt";

const USAGE: &str = "Run the program with the following command: \
    power_ratings [-i inputfile] [-o outputfile] [-f text|csv|pipe] [-c config.json] [--csv csvfile] [-v]";

#[derive(Debug, Parser)]
#[command(name = "power_ratings", version, about = "Team ratings and strength of schedule from a season of scores")]
struct Args {
    /// file to read the games from
    #[arg(short = 'i', long = "input", default_value = DEFAULT_INFILE)]
    input: PathBuf,

    /// file to write the rankings to (truncated)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTFILE)]
    output: PathBuf,

    /// layout of the input file
    #[arg(short = 'f', long = "format", value_enum, default_value_t = InputFormat::Text)]
    format: InputFormat,

    /// JSON file overriding model constants
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// also export the rankings as CSV
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// log skipped input lines
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("{USAGE}");
            return ExitCode::from(1);
        }
    };

    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<()> {
    debug!("args: {args:?}");
    let ranking_context = RatingContext::load_or_default(args.config.as_deref())?;

    let mut season = load_data(&args.input, args.format, &ranking_context)
        .context("reading games")?;

    let convergence = rate_season(&mut season, &ranking_context)?;
    debug!("{convergence:?}");

    output_report(&args.output, &season)?;
    if let Some(path) = &args.csv {
        export_csv(path, &season)?;
        info!("Rankings have been exported to {} as well", path.display());
    }

    report_comp_record(&season);

    Ok(())
}
