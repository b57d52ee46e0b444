use clap::{Parser, Subcommand};
use setwise_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "setwise", version, about = "Setwise workout tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exercise management
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// Workout management
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Set and rest timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Personal records for an exercise
    Records {
        /// Exercise id or name
        exercise: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Records { exercise } => commands::records::run(&exercise),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
