use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Coach - per-problem coding practice sessions with a mentor backend", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the problems of the catalog
    Problems,
    /// Open a problem and print its saved state
    Open {
        problem: String,
        /// Switch the problem to this language
        #[arg(long)]
        language: Option<String>,
    },
    /// Replace the code of a problem
    Edit {
        problem: String,
        /// New code (read from --file when omitted)
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Print code and conversation of a problem
    Show { problem: String },
    /// Ask the mentor backend (analyze, hint, submit or chat)
    Ask {
        problem: String,
        action: String,
        message: Option<String>,
        /// Skill level for this request (beginner, intermediate or advanced)
        #[arg(long)]
        skill: Option<String>,
    },
    /// Reset the conversation of a problem
    ClearChat { problem: String },
    /// Reset the code of a problem to its starter template
    ClearCode { problem: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    let _log_guard = commands::logging::init(&config)?;

    match cli.command {
        Commands::Problems => commands::practice::problems(&config)?,
        Commands::Open { problem, language } => {
            commands::practice::open(&config, &problem, language).await?
        }
        Commands::Edit {
            problem,
            text,
            file,
            language,
        } => commands::practice::edit(&config, &problem, text, file, language).await?,
        Commands::Show { problem } => commands::practice::show(&config, &problem).await?,
        Commands::Ask {
            problem,
            action,
            message,
            skill,
        } => commands::practice::ask(&config, &problem, &action, message, skill).await?,
        Commands::ClearChat { problem } => commands::practice::clear_chat(&config, &problem).await?,
        Commands::ClearCode { problem } => commands::practice::clear_code(&config, &problem).await?,
    }

    Ok(())
}
