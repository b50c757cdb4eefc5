use crate::config::{self, CommentMode};
use clap::{ArgAction, Parser, Subcommand};

// Display order for token option (placed at top of help text)
const TOKEN_DISPLAY_ORDER: usize = 0;
// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "depcruise-annotate",
    version,
    about = "Annotate pull requests with dependency-cruiser violations",
    long_about = None
)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: DEPCRUISE_ANNOTATE_LOG=] [default: info]
    #[arg(
        long,
        env = "DEPCRUISE_ANNOTATE_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Post violations on changed files as pull request review comments
    Review(ReviewArgs),
    /// Print violations as GitHub Actions workflow commands
    Workflow(WorkflowArgs),
    /// Write the layered component architecture ruleset as dependency-cruiser JSON
    Rules(RulesArgs),
}

/// Options shared by the annotating subcommands
#[derive(Parser, Debug, Clone)]
pub struct FilterArgs {
    /// Path to the dependency-cruiser JSON report
    #[arg(long, default_value = "depcruise.json")]
    pub report: String,

    /// Path prefix of the analyzed package inside the repository (monorepo subdirectory)
    #[arg(long, env = "ROOT_PREFIX", default_value = "")]
    pub root_prefix: String,

    /// Maximum number of annotations to emit
    #[arg(
        long,
        env = "MAX_ANNOS",
        default_value_t = config::DEFAULT_MAX_ANNOS,
        value_parser = config::parse_max_annos
    )]
    pub max_annos: usize,

    /// Include warning-level violations (only "false" disables)
    #[arg(
        long,
        env = "INCLUDE_WARN",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = config::parse_include_flag
    )]
    pub include_warn: bool,

    /// Include error-level violations (only "false" disables)
    #[arg(
        long,
        env = "INCLUDE_ERROR",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = config::parse_include_flag
    )]
    pub include_error: bool,

    /// Glob patterns for source files whose violations are skipped (comma-separated in env)
    #[arg(long = "exclude", env = "EXCLUDE_GLOBS", value_delimiter = ',')]
    pub exclude: Vec<String>,
}

/// Arguments for the review command
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// GitHub token (falls back to GH_TOKEN, then INPUT_GITHUB_TOKEN)
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        display_order = TOKEN_DISPLAY_ORDER
    )]
    pub token: Option<String>,

    /// Repository in owner/repo form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Path to the pull request event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// How to post line comments: one batched review, or one request per comment
    #[arg(long, value_enum, default_value_t = CommentMode::Review)]
    pub comment_mode: CommentMode,

    /// Maximum number of unmapped violations listed in the summary comment
    #[arg(long, default_value_t = config::DEFAULT_SUMMARY_LIMIT)]
    pub summary_limit: usize,
}

/// Arguments for the workflow command
#[derive(Parser, Debug)]
pub struct WorkflowArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Skip violations whose source file does not exist in the working directory
    #[arg(long)]
    pub require_exists: bool,
}

/// Arguments for the rules command
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Ruleset TOML file to load instead of the built-in layered ruleset
    #[arg(long)]
    pub config: Option<String>,

    /// Directory containing the layer folders
    #[arg(long, default_value = "src/components")]
    pub components_root: String,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<String>,
}
