use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use console::Term;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod ui;

use taghive_core::*;
use taghive_server::state::AppState;

#[derive(Parser)]
#[command(
    name = "taghive",
    version,
    about = "taghive social listening classifier"
)]
struct Cli {
    #[arg(
        long,
        default_value = "~/.taghive",
        help = "Config root directory (contains config/ and logs/)"
    )]
    config_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the HTTP API server and browser UI")]
    Serve {
        #[arg(long, help = "Bind address (defaults to server.host)")]
        host: Option<String>,
        #[arg(long, help = "HTTP port (defaults to server.port)")]
        port: Option<u16>,
    },
    #[command(about = "Classify text given as arguments or read from stdin")]
    Analyze {
        #[arg(help = "Messages to classify; each argument becomes one line")]
        text: Vec<String>,
    },
    #[command(about = "Interactive classification session")]
    Repl,
    #[command(about = "Print the configured categories")]
    Taxonomy,
    #[command(about = "Print the prompt that would be sent for TEXT")]
    Prompt {
        #[arg(help = "Message to build the prompt for")]
        text: String,
    },
    #[command(about = "Validate config files")]
    Validate,
}

fn expand_home(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(path.strip_prefix("~").unwrap_or(path));
        }
    }
    path.to_path_buf()
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    cli.config_root = expand_home(&cli.config_root);

    let log_dir = cli.config_root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "taghive.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config_dir = cli.config_root.join("config");
    let term = Term::stdout();

    match command {
        Commands::Validate => {
            let config = load_config(&config_dir)?;
            let taxonomy = config.taxonomy()?;
            println!(
                "Config valid. model {}, preset {}, {} categories, {:?} validation, {:?} input.",
                config.provider.model,
                config.classifier.preset.name(),
                taxonomy.len(),
                config.classifier.validation,
                config.input_mode(),
            );
            if let Err(err) = config.require_credentials() {
                ui::print_warning(&term, &err.to_string());
            }
        }
        Commands::Taxonomy => {
            let config = load_config(&config_dir)?;
            let taxonomy = config.taxonomy()?;
            ui::print_taxonomy(&term, config.classifier.preset.name(), &taxonomy);
        }
        Commands::Prompt { text } => {
            let config = load_config(&config_dir)?;
            println!("{}", build_prompt(&config.taxonomy()?, &text));
        }
        Commands::Analyze { text } => {
            let input = if text.is_empty() {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            } else {
                text.join("\n")
            };
            let mut runner = bootstrap(&config_dir)?.1;
            match runner.analyze(&input).await {
                Ok(report) => ui::print_report(&term, &report),
                Err(warning) => ui::print_warning(&term, &warning.to_string()),
            }
        }
        Commands::Repl => {
            let (_config, runner) = bootstrap(&config_dir)?;
            run_repl(&term, runner).await?;
        }
        Commands::Serve { host, port } => {
            let (config, runner) = bootstrap(&config_dir)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let state = AppState::new(&config, runner)?;
            taghive_server::serve(state, &format!("{host}:{port}")).await?;
        }
    }

    Ok(())
}

fn bootstrap(config_dir: &Path) -> Result<(TaghiveConfig, SessionRunner)> {
    let config = load_config(config_dir)?;
    let provider = config.build_provider()?;
    let runner = config.build_session(provider)?;
    tracing::info!(
        model = %config.provider.model,
        preset = config.classifier.preset.name(),
        max_in_flight = runner.max_in_flight(),
        "classifier ready"
    );
    Ok((config, runner))
}

async fn run_repl(term: &Term, mut runner: SessionRunner) -> Result<()> {
    println!("taghive REPL. One message per line; 'history' shows the session, 'quit' exits.");
    println!("---");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        match input {
            "quit" | "exit" => break,
            "history" => {
                ui::print_history(term, runner.history().entries());
                continue;
            }
            _ => {}
        }

        match runner.analyze(input).await {
            Ok(report) => ui::print_report(term, &report),
            Err(warning) => ui::print_warning(term, &warning.to_string()),
        }
    }

    Ok(())
}
