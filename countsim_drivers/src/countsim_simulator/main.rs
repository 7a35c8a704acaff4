mod simulation;

use std::process::ExitCode;

use clap::Parser;
use countsim_drivers::{parse_config_from_file, DriverError};
use simulation::{print_report, simulate, RoundPrinter};
use tracing::Level;

const DEFAULT_CONFIG_PATH: &str = "~/.countsim.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of shoes to play, overriding the config file
    #[arg(long)]
    shoes: Option<u64>,

    /// Seed for shoe `i` is `seed + i`, overriding the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads, overriding the config file
    #[arg(long)]
    threads: Option<usize>,

    /// Print every round. Shoes are then played on a single thread
    #[arg(long)]
    print_rounds: bool,

    /// Print the report as YAML
    #[arg(long)]
    yaml: bool,

    /// Log more: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn resolve_config_path(config: &str) -> Result<String, DriverError> {
    if config != DEFAULT_CONFIG_PATH {
        return Ok(config.to_string());
    }
    let home_dir = home::home_dir()
        .ok_or_else(|| DriverError::ConfigPath(String::from("Cannot find home directory")))?;
    let config_file_path = home_dir.join(".countsim.yml");
    if !config_file_path.exists() {
        return Err(DriverError::ConfigPath(format!(
            "Config file {} does not exist",
            config_file_path.display()
        )));
    }
    if config_file_path.is_dir() {
        return Err(DriverError::ConfigPath(String::from(
            "This should be a path rather than a directory",
        )));
    }
    Ok(config_file_path.to_string_lossy().into_owned())
}

fn run(args: CommandLineArgs) -> Result<(), DriverError> {
    let config_path = resolve_config_path(&args.config)?;
    let mut config = parse_config_from_file(&config_path)?;
    if let Some(shoes) = args.shoes {
        config.simulator.number_of_shoes = shoes;
    }
    if let Some(seed) = args.seed {
        config.simulator.seed = Some(seed);
    }
    if let Some(threads) = args.threads {
        config.simulator.number_of_threads = threads;
    }

    let mut printer = RoundPrinter::default();
    let report = simulate(&config, args.print_rounds.then_some(&mut printer))?;
    if args.yaml {
        print!("{}", serde_yaml::to_string(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
