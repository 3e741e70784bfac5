use crate::commands::{
    run_report, run_score, run_template, ReportArgs, ScoreArgs, TemplateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use guard_report::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "guard-report",
    about = "Score guard duty evaluations and produce the personal report document",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service with the report form (default command)
    Serve(ServeArgs),
    /// Build a report document from an answers CSV
    Report(ReportArgs),
    /// Print per-category scores and the average for an answers CSV
    Score(ScoreArgs),
    /// Write a blank answers CSV listing every category
    Template(TemplateArgs),
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
        Command::Report(args) => run_report(args),
        Command::Score(args) => run_score(args),
        Command::Template(args) => run_template(args),
    }
}
