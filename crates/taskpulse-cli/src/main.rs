use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "taskpulse", version, about = "Task time tracking and deadline risk")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management and timers
    Task {
        #[command(subcommand)]
        action: commands::task::TaskCommand,
    },
    /// Projects that group tasks
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Labels that tag tasks
    Label {
        #[command(subcommand)]
        action: commands::label::LabelAction,
    },
    /// Weekly performance and estimation statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Tasks to start now, and tasks already overdue
    Risk,
    /// Export and import the task snapshot
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so stdout stays pure JSON. Level from `TASKPULSE_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TASKPULSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Label { action } => commands::label::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Risk => commands::risk::run(),
        Commands::Data { action } => commands::data::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "taskpulse", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
