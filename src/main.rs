//! binlog2sql - Row Event to SQL Translation
//!
//! Reads decoded row events (one JSON object per line) and prints the SQL
//! that replays or rolls them back.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binlog2sql::binlog::RowChangeEvent;
use binlog2sql::config::{RowImage, TranslatorConfig};
use binlog2sql::schema::SchemaCatalog;
use binlog2sql::translate::Translator;

/// binlog2sql - Replay or roll back row-based binlog events as SQL
#[derive(Parser)]
#[command(name = "binlog2sql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults are used when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate row events to SQL on stdout
    Translate {
        /// Row events, one JSON object per line
        #[arg(short, long)]
        events: PathBuf,

        /// Table schema catalog (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Emit rollback statements
        #[arg(long)]
        rollback: bool,

        /// Treat the events as minimal row images
        #[arg(long)]
        minimal_image: bool,

        /// Do not qualify tables with their schema name
        #[arg(long)]
        no_schema_prefix: bool,

        /// Maximum rows per INSERT statement
        #[arg(long)]
        rows_per_insert: Option<usize>,
    },

    /// Write a configuration file with default values
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "binlog2sql.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, &config.logging.format);

    match cli.command {
        Commands::Translate {
            events,
            schema,
            rollback,
            minimal_image,
            no_schema_prefix,
            rows_per_insert,
        } => {
            let mut config = config;
            config.rollback |= rollback;
            if minimal_image {
                config.row_image = RowImage::Minimal;
            }
            if no_schema_prefix {
                config.prefix_schema = false;
            }
            if let Some(n) = rows_per_insert {
                config.rows_per_insert = n;
            }
            config.validate()?;
            run_translate(config, events, schema).await
        }
        Commands::Init { output } => run_init(output),
        Commands::Validate => run_validate(cli.config),
    }
}

/// Load the config file if one was given
fn load_config(path: Option<&Path>) -> anyhow::Result<TranslatorConfig> {
    match path {
        Some(path) => TranslatorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => Ok(TranslatorConfig::default()),
    }
}

/// Initialize logging. Logs go to stderr, stdout carries the SQL.
fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Parse the events file, skipping blank lines
fn parse_events(content: &str, path: &Path) -> anyhow::Result<Vec<RowChangeEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            RowChangeEvent::from_json(line)
                .with_context(|| format!("Invalid event at {}:{}", path.display(), i + 1))
        })
        .collect()
}

/// Translate every event and print the statements
async fn run_translate(config: TranslatorConfig, events_path: PathBuf, schema_path: PathBuf) -> anyhow::Result<()> {
    let catalog_text = tokio::fs::read_to_string(&schema_path)
        .await
        .with_context(|| format!("Failed to read schema catalog {:?}", schema_path))?;
    let catalog = SchemaCatalog::from_json(&catalog_text)?;
    tracing::info!("Loaded schema for {} tables", catalog.tables().len());

    let events_text = tokio::fs::read_to_string(&events_path)
        .await
        .with_context(|| format!("Failed to read events {:?}", events_path))?;
    let mut events = parse_events(&events_text, &events_path)?;

    let translator = Translator::new(&config);
    // Rollback statements must be applied newest first
    if translator.is_rollback() {
        events.reverse();
    }

    let mut stdout = tokio::io::stdout();
    let mut statements = 0usize;
    let mut failures = 0usize;

    for event in &events {
        let translation = match translator.translate_from(&catalog, event) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("Skipping {} event on {}: {}", event.kind, event.qualified_name(), e);
                failures += 1;
                continue;
            }
        };

        failures += translation.failures.len();
        let mut sqls = translation.statements;
        if translator.is_rollback() {
            sqls.reverse();
        }
        for sql in sqls {
            stdout.write_all(format!("{};\n", sql).as_bytes()).await?;
            statements += 1;
        }
    }
    stdout.flush().await?;

    tracing::info!(
        "Translated {} events into {} statements ({} failures)",
        events.len(),
        statements,
        failures
    );
    if failures > 0 {
        tracing::warn!("Some rows could not be translated, see warnings above");
    }
    Ok(())
}

/// Write a default configuration file
fn run_init(output: PathBuf) -> anyhow::Result<()> {
    if output.exists() {
        anyhow::bail!("Refusing to overwrite existing file {:?}", output);
    }
    let content = TranslatorConfig::default().to_toml()?;
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {:?}", output))?;
    println!("Configuration written to {:?}", output);
    Ok(())
}

/// Validate a configuration file
fn run_validate(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.context("--config is required for validate")?;
    let config = TranslatorConfig::from_file(&path)?;
    println!("Configuration {:?} is valid", path);
    println!("  row_image:       {:?}", config.row_image);
    println!("  rollback:        {}", config.rollback);
    println!("  prefix_schema:   {}", config.prefix_schema);
    println!("  rows_per_insert: {}", config.rows_per_insert);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_skips_blank_lines() {
        let content = r#"
{"kind": "insert", "schema": "db", "table": "t", "rows": [[{"Int": 1}]]}

{"kind": "delete", "schema": "db", "table": "t", "rows": [[{"Int": 1}]]}
"#;
        let events = parse_events(content, Path::new("events.jsonl")).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_events_reports_line() {
        let err = parse_events("{\"kind\": \"nope\"}", Path::new("events.jsonl")).unwrap_err();
        assert!(err.to_string().contains("events.jsonl:1"));
    }

    #[test]
    fn test_cli_parses_translate() {
        let cli = Cli::try_parse_from([
            "binlog2sql",
            "translate",
            "--events",
            "e.jsonl",
            "--schema",
            "s.json",
            "--rollback",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Translate { rollback: true, .. }));
    }
}
