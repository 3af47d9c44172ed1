#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use session::Session;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "px: browse projects, their installation tree and their folders",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging (ignored when PROJEX_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ./projex.toml or the user config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create and seed a demo database",
        long_about = "Create the configured database and load a small sample dataset into it.",
        after_help = "EXAMPLES:\n    # Seed the database named in projex.toml\n    px init-demo\n\n    # Start over from an empty file\n    px init-demo --force"
    )]
    InitDemo(cmd::init_demo::InitDemoArgs),

    #[command(
        next_help_heading = "Read",
        about = "List projects",
        long_about = "List projects, newest first, optionally filtered by search terms or status.",
        after_help = "EXAMPLES:\n    # Newest projects\n    px list\n\n    # Projects mentioning 'filler' but not 'valve'\n    px list --search filler --search '!valve'\n\n    # Emit machine-readable output\n    px list --status 20 --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one project",
        long_about = "Show full details for a single project by number or id.",
        after_help = "EXAMPLES:\n    # By number\n    px show P-0042\n\n    # By storage id\n    px show --id 2"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the installation tree of a project",
        long_about = "Climb the install-number chain from a project to its top-most ancestor and print the tree with every level's children.",
        after_help = "EXAMPLES:\n    # Tree around a nested project\n    px tree P-0042-01\n\n    # Emit machine-readable output\n    px tree P-0101 --json"
    )]
    Tree(cmd::tree::TreeArgs),

    #[command(
        next_help_heading = "Read",
        about = "Find project folders",
        long_about = "Search the configured lookup paths for the install and project folders of a project.",
        after_help = "EXAMPLES:\n    # Folders of a stored project\n    px paths P-0042\n\n    # Without a database lookup, listing folder contents\n    px paths P-0042 --install I-0042 --files"
    )]
    Paths(cmd::paths::PathsArgs),

    #[command(
        next_help_heading = "Drill-down",
        about = "List planning tasks",
        after_help = "EXAMPLES:\n    # Top-level tasks\n    px planning P-0042\n\n    # Sub-tasks of task 1\n    px planning P-0042 --parent 1"
    )]
    Planning(cmd::planning::PlanningArgs),

    #[command(
        next_help_heading = "Drill-down",
        about = "List attached documents",
        after_help = "EXAMPLES:\n    # Visible documents\n    px docs P-0042\n\n    # Include hidden versions\n    px docs P-0042 --hidden"
    )]
    Docs(cmd::docs::DocsArgs),

    #[command(
        next_help_heading = "Drill-down",
        about = "List booked hours",
        after_help = "EXAMPLES:\n    # Hours with totals\n    px hours P-0042"
    )]
    Hours(cmd::hours::HoursArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    px completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PROJEX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "projex_core=debug,px=debug,info"
        } else {
            "projex_core=info,px=info,warn"
        })
    });

    let format = env::var("PROJEX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let cwd = env::current_dir()?;
    let session = Session::load(cli.config.as_deref(), &cwd)?;
    let output =
        output::resolve_output_mode(cli.format, cli.json, session.config.output.as_deref());
    debug!(?output, "output mode resolved");

    match &cli.command {
        Commands::InitDemo(args) => cmd::init_demo::run_init_demo(args, &session, output),
        Commands::List(args) => cmd::list::run_list(args, &session, output),
        Commands::Show(args) => cmd::show::run_show(args, &session, output),
        Commands::Tree(args) => cmd::tree::run_tree(args, &session, output),
        Commands::Paths(args) => cmd::paths::run_paths(args, &session, output),
        Commands::Planning(args) => cmd::planning::run_planning(args, &session, output),
        Commands::Docs(args) => cmd::docs::run_docs(args, &session, output),
        Commands::Hours(args) => cmd::hours::run_hours(args, &session, output),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Errors before the config is read fall back to flag/env resolution.
    let error_mode = output::resolve_output_mode(cli.format, cli.json, None);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = output::render_error(error_mode, &CliError::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}
