//! DeployTrail - deployment tracking dashboard
//!
//! The `deploytrail` command shows which version of every app runs in every
//! environment, as reported by a deployment API.
//!
//! ## Commands
//!
//! - `watch`: live dashboard, refreshed every 10 seconds
//! - `matrix`: print the latest-version matrix once
//! - `history`: deployment history of one app
//! - `delete`: remove a deployment record
//! - `record`: record a new deployment
//! - `config`: show the resolved runtime config

mod render;
mod watch;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use deploytrail_core::{
    delete_deployment, lock_state, record_deployment, refresh, ConsistencyRule, DashboardState,
    DeploymentId, DeploymentStore, HttpDeploymentStore, NewDeployment, Poller, RuntimeConfig,
    SharedState, METRICS,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};

use crate::render::{render_dashboard, render_history};
use crate::watch::{WatchCommand, HELP};

#[derive(Parser)]
#[command(name = "deploytrail")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track which version of each app is deployed where", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Runtime config document with API_URL and VERSION
    #[arg(long, global = true, env = "DEPLOYTRAIL_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Deployment API base URL (overrides API_URL from the config document)
    #[arg(long, global = true, env = "DEPLOYTRAIL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live dashboard; type an app name (or `f <app>`) to focus it, `d <id>` to delete, `q` to quit
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value = "10")]
        interval_secs: u64,

        /// Consistency rule for version flags
        #[arg(short, long, default_value = "majority")]
        rule: ConsistencyRule,

        /// App to focus on start
        #[arg(short, long)]
        app: Option<String>,
    },

    /// Print the latest-version matrix once
    Matrix {
        /// Consistency rule for version flags
        #[arg(short, long, default_value = "majority")]
        rule: ConsistencyRule,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the deployment history of one app
    History {
        /// App name
        app: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a deployment record
    Delete {
        /// Deployment id
        id: String,
    },

    /// Record a new deployment
    Record {
        /// App name
        #[arg(long)]
        app: String,

        /// Target environment
        #[arg(short, long)]
        environment: String,

        /// Deployed version label
        #[arg(long = "release")]
        release: String,

        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Show the resolved runtime config
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    deploytrail_core::init_tracing(cli.json, level);

    let config = resolve_config(&cli.config, cli.api_url.as_deref())?;
    let store = HttpDeploymentStore::new(&config).context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Watch {
            interval_secs,
            rule,
            app,
        } => {
            cmd_watch(
                Arc::new(store),
                &config,
                Duration::from_secs(interval_secs),
                rule,
                app.as_deref(),
            )
            .await
        }
        Commands::Matrix { rule, format } => {
            let out = cmd_matrix(&store, rule, format, &config.version).await?;
            println!("{}", out);
            Ok(())
        }
        Commands::History { app, format } => {
            let out = cmd_history(&store, &app, format).await?;
            println!("{}", out);
            Ok(())
        }
        Commands::Delete { id } => cmd_delete(&store, &id).await,
        Commands::Record {
            app,
            environment,
            release,
            note,
        } => {
            let deployment =
                NewDeployment::new(&app, &environment, &release).with_note(note.as_deref());
            cmd_record(&store, &deployment).await
        }
        Commands::Config => cmd_config(&config),
    }
}

/// Load the config document, then apply the command-line override.
fn resolve_config(path: &std::path::Path, api_url: Option<&str>) -> Result<RuntimeConfig> {
    let config = RuntimeConfig::load_or_default(path);
    match api_url {
        Some(url) => config
            .with_api_url(url)
            .with_context(|| format!("Invalid --api-url {:?}", url)),
        None => Ok(config),
    }
}

/// Fetch once and render the matrix
async fn cmd_matrix(
    store: &dyn DeploymentStore,
    rule: ConsistencyRule,
    format: OutputFormat,
    version: &str,
) -> Result<String> {
    let state = DashboardState::shared();
    refresh(store, &state)
        .await
        .context("Failed to fetch deployments")?;

    let view = lock_state(&state).view(rule);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => Ok(render_dashboard(&view, version, &Local)),
    }
}

/// Fetch once and render one app's history
async fn cmd_history(store: &dyn DeploymentStore, app: &str, format: OutputFormat) -> Result<String> {
    let state = DashboardState::shared();
    refresh(store, &state)
        .await
        .context("Failed to fetch deployments")?;

    let history = {
        let mut guard = lock_state(&state);
        guard.select_app(Some(app));
        guard.history()
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&history)?),
        OutputFormat::Text => Ok(format!(
            "Deployment History for {}\n{}",
            app,
            render_history(&history, &Local)
        )),
    }
}

/// Delete one deployment
async fn cmd_delete(store: &dyn DeploymentStore, id: &str) -> Result<()> {
    let id = DeploymentId::parse(id);
    let state = DashboardState::shared();
    delete_deployment(store, &state, &id)
        .await
        .with_context(|| format!("Failed to delete deployment {}", id))?;

    println!("Deleted deployment {}", id);
    Ok(())
}

/// Record a new deployment
async fn cmd_record(store: &dyn DeploymentStore, deployment: &NewDeployment) -> Result<()> {
    let created = record_deployment(store, deployment)
        .await
        .context("Failed to record deployment")?;

    println!(
        "Recorded {} {} -> {} (id {}, at {})",
        created.app, created.version, created.environment, created.id, created.deployed_at
    );
    Ok(())
}

/// Print the resolved config
fn cmd_config(config: &RuntimeConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Live dashboard until `q`, end of input plus Ctrl-C, or Ctrl-C
async fn cmd_watch(
    store: Arc<dyn DeploymentStore>,
    config: &RuntimeConfig,
    interval: Duration,
    rule: ConsistencyRule,
    focus: Option<&str>,
) -> Result<()> {
    info!(api_url = %config.api_url, interval_secs = interval.as_secs(), rule = %rule, "watching deployments");

    let state = DashboardState::shared();
    lock_state(&state).select_app(focus);

    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(interval)
        .spawn();
    let mut refreshes = handle.subscribe();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut status: Option<String> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = refreshes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match WatchCommand::parse(&line) {
                        WatchCommand::Quit => break,
                        WatchCommand::Redraw => {}
                        WatchCommand::Help => status = Some(HELP.to_string()),
                        WatchCommand::ClearFocus => lock_state(&state).select_app(None),
                        WatchCommand::ToggleApp(app) => lock_state(&state).toggle_app(&app),
                        WatchCommand::Delete(id) => {
                            status = Some(delete_status(store.as_ref(), &state, &id).await);
                        }
                        WatchCommand::Invalid(msg) => status = Some(msg),
                    },
                    Ok(None) => stdin_open = false,
                    Err(err) => {
                        warn!(error = %err, "stdin closed");
                        stdin_open = false;
                    }
                }
            }
        }

        redraw(&state, rule, &config.version, status.take());
    }

    let cycles = handle.stop().await;
    info!(cycles = cycles, "stopped watching");
    METRICS.flush();
    Ok(())
}

async fn delete_status(store: &dyn DeploymentStore, state: &SharedState, id: &DeploymentId) -> String {
    match delete_deployment(store, state, id).await {
        Ok(_) => format!("Deleted deployment {}", id),
        Err(err) => format!("Delete of {} failed: {}", id, err),
    }
}

fn redraw(state: &SharedState, rule: ConsistencyRule, version: &str, status: Option<String>) {
    let view = lock_state(state).view(rule);
    let mut out = String::from("\x1b[2J\x1b[H");
    out.push_str(&render_dashboard(&view, version, &Local));
    if let Some(status) = status {
        out.push_str(&format!("\n\n> {}", status));
    }
    out.push('\n');

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = stdout.write_all(out.as_bytes()).and_then(|_| stdout.flush()) {
        warn!(error = %err, "failed to draw dashboard");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploytrail_store::fakes::MemoryDeploymentStore;
    use deploytrail_store::DeploymentRecord;

    fn store() -> MemoryDeploymentStore {
        MemoryDeploymentStore::with_records(vec![
            DeploymentRecord::new(3u64, "web", "staging", "1.3", "2024-01-01T12:00:00Z"),
            DeploymentRecord::new(2u64, "web", "prod", "1.3", "2024-01-02T00:00:00Z"),
            DeploymentRecord::new(1u64, "web", "prod", "1.2", "2024-01-01T00:00:00Z"),
        ])
    }

    #[tokio::test]
    async fn test_cmd_matrix_text() {
        let out = cmd_matrix(&store(), ConsistencyRule::Majority, OutputFormat::Text, "9.9.9")
            .await
            .unwrap();
        assert!(out.contains("Latest Versions per App"));
        assert!(out.contains("1.3 ✓"));
        assert!(!out.contains("1.2"));
        assert!(out.ends_with("DeployTrail version 9.9.9"));
    }

    #[tokio::test]
    async fn test_cmd_matrix_json() {
        let out = cmd_matrix(&store(), ConsistencyRule::AllSame, OutputFormat::Json, "dev")
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["rule"], "all-same");
        assert_eq!(json["rows"][0]["app"], "web");
        assert_eq!(json["rows"][0]["all_same"], true);
    }

    #[tokio::test]
    async fn test_cmd_matrix_fetch_failure_is_error() {
        let store = store();
        store.set_fail_list(true);
        let err = cmd_matrix(&store, ConsistencyRule::Majority, OutputFormat::Text, "dev")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to fetch deployments"));
    }

    #[tokio::test]
    async fn test_cmd_history_lists_all_app_records() {
        let out = cmd_history(&store(), "web", OutputFormat::Json).await.unwrap();
        let json: Vec<DeploymentRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(json.len(), 3);

        let out = cmd_history(&store(), "ghost", OutputFormat::Text)
            .await
            .unwrap();
        assert!(out.contains("No deployments for this app."));
    }

    #[tokio::test]
    async fn test_cmd_delete_and_record() {
        let store = store();
        cmd_delete(&store, "2").await.unwrap();
        assert_eq!(store.records().len(), 2);
        assert!(cmd_delete(&store, "2").await.is_err());

        cmd_record(&store, &NewDeployment::new("api", "prod", "0.1"))
            .await
            .unwrap();
        assert_eq!(store.records()[0].app, "api");
    }

    #[tokio::test]
    async fn test_delete_status_messages() {
        let store = store();
        let state = DashboardState::shared();
        refresh(&store, &state).await.unwrap();

        let ok = delete_status(&store, &state, &DeploymentId::Numeric(1)).await;
        assert_eq!(ok, "Deleted deployment 1");
        assert_eq!(lock_state(&state).records().len(), 2);

        let failed = delete_status(&store, &state, &DeploymentId::Numeric(1)).await;
        assert!(failed.starts_with("Delete of 1 failed"));
    }

    #[test]
    fn test_resolve_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"API_URL":"http://file.example:8000","VERSION":"2.0"}"#)
            .unwrap();

        let config = resolve_config(&path, None).unwrap();
        assert_eq!(config.api_url, "http://file.example:8000");

        let config = resolve_config(&path, Some("https://cli.example")).unwrap();
        assert_eq!(config.api_url, "https://cli.example");
        assert_eq!(config.version, "2.0");

        assert!(resolve_config(&path, Some("not-a-url")).is_err());
    }

    #[test]
    fn test_resolve_config_missing_file_uses_defaults() {
        let config = resolve_config(std::path::Path::new("/nonexistent/config.json"), None).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_cli_parses_watch_defaults() {
        let cli = Cli::try_parse_from(["deploytrail", "watch"]).unwrap();
        match cli.command {
            Commands::Watch {
                interval_secs,
                rule,
                app,
            } => {
                assert_eq!(interval_secs, 10);
                assert_eq!(rule, ConsistencyRule::Majority);
                assert!(app.is_none());
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_cli_parses_record() {
        let cli = Cli::try_parse_from([
            "deploytrail",
            "record",
            "--app",
            "web",
            "-e",
            "prod",
            "--release",
            "1.4",
            "--note",
            "hotfix",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Record { .. }));
    }
}
