use crate::report::{run_emi, run_feasibility, run_series, EmiArgs, FeasibilityArgs, SeriesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Evaluation Engine",
    about = "Serve or query the loan EMI and feasibility engine from the command line",
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
    /// Quote the EMI and repayment totals for one loan
    Emi(EmiArgs),
    /// Run the feasibility decision for an applicant
    Feasibility(FeasibilityArgs),
    /// Print the month-by-month cumulative repayment series
    Series(SeriesArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Emi(args) => run_emi(args),
        Command::Feasibility(args) => run_feasibility(args),
        Command::Series(args) => run_series(args),
    }
}
