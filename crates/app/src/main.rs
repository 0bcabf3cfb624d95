use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{Clock, PracticeService, ProgressService};
use soap_core::model::{ExerciseId, UserId};
use soap_core::{ProgressRecommender, RecommenderSettings};
use storage::repository::{ProgressRepository, Storage};
use storage::{load_exercises, load_progress};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- check     [--exercises <file>] --id <exercise-id> --input <text>");
    eprintln!("  cargo run -p app -- recommend [--progress <file>] [--min-attempts <n>] [--weak-rate <pct>]");
    eprintln!("  cargo run -p app -- overview  [--progress <file>] [--min-attempts <n>] [--weak-rate <pct>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --exercises data/exercises.json");
    eprintln!("  --progress  data/progress.json");
    eprintln!("  --min-attempts 3, --weak-rate 80");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SOAP_EXERCISES, SOAP_PROGRESS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Recommend,
    Overview,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "check" => Some(Self::Check),
            "recommend" => Some(Self::Recommend),
            "overview" => Some(Self::Overview),
            _ => None,
        }
    }
}

struct CheckArgs {
    exercises: PathBuf,
    id: String,
    input: String,
}

struct ProgressArgs {
    progress: PathBuf,
    settings: RecommenderSettings,
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}

impl CheckArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut exercises = env_path("SOAP_EXERCISES", "data/exercises.json");
        let mut id = None;
        let mut input = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--exercises" => exercises = PathBuf::from(require_value(args, "--exercises")?),
                "--id" => id = Some(require_value(args, "--id")?),
                "--input" => input = Some(require_value(args, "--input")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            exercises,
            id: id.ok_or(ArgsError::MissingFlag { flag: "--id" })?,
            input: input.ok_or(ArgsError::MissingFlag { flag: "--input" })?,
        })
    }
}

impl ProgressArgs {
    fn parse(
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut progress = env_path("SOAP_PROGRESS", "data/progress.json");
        let defaults = RecommenderSettings::default();
        let mut min_attempts = defaults.min_attempts();
        let mut weak_rate = defaults.weak_success_rate();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--progress" => progress = PathBuf::from(require_value(args, "--progress")?),
                "--min-attempts" => {
                    let value = require_value(args, "--min-attempts")?;
                    min_attempts = parse_number("--min-attempts", value)?;
                }
                "--weak-rate" => {
                    let value = require_value(args, "--weak-rate")?;
                    weak_rate = parse_number("--weak-rate", value)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg).into()),
            }
        }

        Ok(Self {
            progress,
            settings: RecommenderSettings::new(min_attempts, weak_rate)?,
        })
    }
}

async fn check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::with_exercises(load_exercises(&args.exercises)?);
    let practice = PracticeService::from_storage(Clock::default(), &storage);
    let id: ExerciseId = args.id.parse()?;

    let result = practice.check(&id, &args.input).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn progress_service(
    args: &ProgressArgs,
) -> Result<(ProgressService, UserId), Box<dyn std::error::Error>> {
    let snapshot = load_progress(&args.progress)?;
    let storage = Storage::in_memory();
    let user = UserId::random();
    storage.progress.save_progress(user, &snapshot).await?;

    let service = ProgressService::new(Arc::clone(&storage.progress))
        .with_recommender(ProgressRecommender::new(args.settings));
    Ok((service, user))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    tracing::info!(command = ?cmd, "starting");
    let mut iter = argv.into_iter().skip(1);
    let report = |e: Box<dyn std::error::Error>| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Check => {
            let parsed = CheckArgs::parse(&mut iter).map_err(|e| report(e.into()))?;
            check(parsed).await
        }
        Command::Recommend => {
            let parsed = ProgressArgs::parse(&mut iter).map_err(report)?;
            let (service, user) = progress_service(&parsed).await?;
            let recommendation = service.recommend(user).await?;
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
            Ok(())
        }
        Command::Overview => {
            let parsed = ProgressArgs::parse(&mut iter).map_err(report)?;
            let (service, user) = progress_service(&parsed).await?;
            let overview = service.overview(user).await?;
            println!("{}", serde_json::to_string_pretty(&overview)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
