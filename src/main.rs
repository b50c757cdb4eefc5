use clap::Parser;
use depcruise_annotate::cli::{Cli, Commands};
use depcruise_annotate::{annotate, rule, workflow};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // Annotating must never fail the CI job, so review and workflow errors only log
    match &cli.command {
        Commands::Review(args) => match annotate::run_review(args).await {
            Ok(Some(summary)) => info!(
                "Annotation complete: {} mapped, {} unmapped, {} posted, {} failed, {} omitted",
                summary.mapped, summary.unmapped, summary.posted, summary.failed, summary.omitted
            ),
            Ok(None) => info!("Nothing to annotate"),
            Err(e) => error!("Annotation failed: {:#}", e),
        },
        Commands::Workflow(args) => {
            if let Err(e) = workflow::run_workflow(args) {
                error!("Failed to emit workflow annotations: {:#}", e);
            }
        }
        Commands::Rules(args) => {
            if let Err(e) = rule::run_rules(args) {
                error!("Failed to write ruleset: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
}

/// Log to stderr so stdout carries only command output
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|e| {
        eprintln!("Invalid log level '{}': {}, using info", log_level, e);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
