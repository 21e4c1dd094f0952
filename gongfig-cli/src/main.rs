// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Gongfig: Kong configuration export / import / flush
//
//  Engine:  tokio, bounded worker pools over the admin API
//  Config:  defaults < YAML file < GONGFIG_* env < flags
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod confirm;

use clap::{Args, Parser, Subcommand};
use gongfig_core::SyncError;
use gongfig_core::config::SyncConfig;
use gongfig_engine::SyncEngine;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "gongfig", version, about = "Manage Kong configuration")]
struct Cli {
    /// Optional YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch everything from the gateway and write it to the config file
    Export(FileArgs),
    /// Create everything in the config file on the gateway
    Import(FileArgs),
    /// Delete every managed resource from the gateway
    Flush(UrlArgs),
}

#[derive(Args, Debug)]
struct UrlArgs {
    /// Kong admin API url
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args, Debug)]
struct FileArgs {
    #[command(flatten)]
    target: UrlArgs,

    /// File for export/import (.json, .yml or .yaml)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "gongfig failed");
            let code = e
                .downcast_ref::<SyncError>()
                .map(SyncError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SyncConfig::load(cli.config.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "gongfig starting");

    match cli.command {
        Command::Export(args) => {
            apply(&mut config, &args);
            let engine = SyncEngine::from_config(&config)?;
            println!("The configuration is exporting...");
            engine.export(&config.sync.file).await?;
        }
        Command::Import(args) => {
            apply(&mut config, &args);
            let engine = SyncEngine::from_config(&config)?;
            println!("The configuration is importing...");
            let report = engine.import(&config.sync.file).await?;
            info!(created = report.total(), "import complete");
        }
        Command::Flush(args) => {
            override_url(&mut config, &args);
            let engine = SyncEngine::from_config(&config)?;
            let stdin = std::io::stdin();
            if !confirm::confirm(confirm::FLUSH_PROMPT, stdin.lock(), std::io::stdout())? {
                println!("Configuration was not flushed");
                return Ok(());
            }
            let report = engine.flush().await?;
            info!(
                deleted = report.deleted.values().sum::<usize>(),
                already_gone = report.already_gone.values().sum::<usize>(),
                "flush complete"
            );
        }
    }

    println!("Done");
    Ok(())
}

fn override_url(config: &mut SyncConfig, args: &UrlArgs) {
    if let Some(url) = &args.url {
        config.admin.url = url.clone();
    }
}

fn apply(config: &mut SyncConfig, args: &FileArgs) {
    override_url(config, &args.target);
    if let Some(file) = &args.file {
        config.sync.file = file.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::parse_from([
            "gongfig",
            "export",
            "--url",
            "http://kong.internal:8001",
            "--file",
            "kong.yaml",
        ]);
        let mut config = SyncConfig::default();
        let Command::Export(args) = &cli.command else {
            panic!("expected export");
        };
        apply(&mut config, args);
        assert_eq!(config.admin.url, "http://kong.internal:8001");
        assert_eq!(config.sync.file, PathBuf::from("kong.yaml"));
    }

    #[test]
    fn absent_flags_keep_defaults() {
        let cli = Cli::parse_from(["gongfig", "import"]);
        let mut config = SyncConfig::default();
        let Command::Import(args) = &cli.command else {
            panic!("expected import");
        };
        apply(&mut config, args);
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["gongfig", "flush", "--log-level", "debug", "--log-json"]);
        assert_eq!(cli.log_level, "debug");
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::Flush(UrlArgs { url: None })));
    }
}
