mod chat;
mod config;
mod prompt;
mod repl;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use chat::ConsoleChat;
use config::HostSettings;
use repl::{Host, Submission};

#[derive(Parser)]
#[command(name = "chatline")]
#[command(about = "Slash commands and mentions for a chat prompt")]
#[command(version)]
struct Cli {
    /// Agent whose commands are loaded (overrides CHATLINE_AGENT and the config)
    #[arg(short, long, global = true)]
    agent: Option<String>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive prompt (default)
    Repl,
    /// Submit a single line and exit
    Run {
        /// The line to submit, e.g. "/hello Alice"
        input: String,
    },
    /// Show the suggestion list for a partial line
    Suggest {
        input: String,
    },
    /// List the commands available to the agent
    Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = HostSettings::from_env().with_flags(cli.agent, cli.config);
    let config = chatline_config::load_and_prepare(&settings.config_path).await?;

    let logging = config.logging.clone().unwrap_or_default();
    chatline_logging::init_logger(
        logging.dir.as_deref(),
        logging.level.as_deref().unwrap_or(chatline_config::defaults::DEFAULT_LOG_LEVEL),
    );

    let agent = settings.resolve_agent(&config);
    info!(agent = %agent, config = %settings.config_path.display(), "chatline starting");

    let host = Host::new(&config, &agent, Arc::new(ConsoleChat::new()));

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl::run_repl(&host).await?,
        Commands::Run { input } => {
            let submission = host.submit(&input).await?;
            repl::report(&submission);
            if let Submission::Trigger(result) = &submission {
                if let Some(data) = &result.data {
                    println!("{}", serde_json::to_string_pretty(data)?);
                }
                if !result.is_success() {
                    std::process::exit(1);
                }
            }
        }
        Commands::Suggest { input } => {
            if let Some(state) = host.suggest(&input).await {
                println!("{}", terminal_output::render_suggestions(&state));
            }
        }
        Commands::Commands => {
            let rows: Vec<Vec<String>> = host
                .commands()
                .await?
                .into_iter()
                .map(|item| vec![item.completion().to_string(), item.aliases.join(", "), item.description])
                .collect();
            print!("{}", terminal_output::render_table(&["Command", "Aliases", "Description"], &rows));
        }
    }

    Ok(())
}
