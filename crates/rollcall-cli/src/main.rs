use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "rollcall", version, about = "Rollcall staff attendance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Staff roster management
    Staff {
        #[command(subcommand)]
        action: commands::staff::StaffAction,
    },
    /// Prompt and report channel bindings
    Channel {
        #[command(subcommand)]
        action: commands::channel::ChannelAction,
    },
    /// Print the weekly attendance report
    Report(commands::report::ReportArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the daily/weekly schedule, reading platform events from stdin
    Run(commands::run::RunArgs),
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=info,rollcall_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Staff { action } => commands::staff::run(action),
        Commands::Channel { action } => commands::channel::run(action),
        Commands::Report(args) => commands::report::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run(args) => commands::run::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
