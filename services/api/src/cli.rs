use crate::infra::{build_dispatcher, parse_date};
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use return_risk::config::AppConfig;
use return_risk::error::AppError;
use return_risk::risk::{BorrowingHistory, VerdictSource};
use return_risk::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Return Risk Classifier",
    about = "Grade library returns as Low, Medium or High risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify a single return and print the verdict
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Day the item came back (YYYY-MM-DD or RFC 3339 timestamp)
    #[arg(long, value_parser = parse_date)]
    pub(crate) returned_on: NaiveDate,
    /// Due date of the previous loan
    #[arg(long, value_parser = parse_date)]
    pub(crate) last_due: Option<NaiveDate>,
    /// Day the previous loan was returned
    #[arg(long, value_parser = parse_date)]
    pub(crate) last_returned: Option<NaiveDate>,
    /// Due date of the current loan; omit when none is recorded
    #[arg(long, value_parser = parse_date)]
    pub(crate) current_due: Option<NaiveDate>,
}

impl ClassifyArgs {
    fn history(&self) -> BorrowingHistory {
        BorrowingHistory {
            last_due_date: self.last_due,
            last_returned_date: self.last_returned,
            current_due_date: self.current_due.into(),
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args).await,
    }
}

async fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let dispatcher = build_dispatcher(&config.predictor)?;
    let history = args.history();
    let outcome = dispatcher
        .classify(Some(&history), args.returned_on)
        .await?;

    println!("{}", outcome.verdict);
    match outcome.source {
        VerdictSource::Rule(rule) => println!("source: rule {rule}"),
        VerdictSource::Fallback(cause) => println!("source: fallback ({cause:?})"),
    }
    Ok(())
}
