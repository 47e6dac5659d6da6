mod cli;
mod interactive;
mod presenter;

use std::{fs::OpenOptions, io, path::Path, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use search_core::{
    ClientConfig, QueryMode, QueryRequest, SearchClient, WorkspaceStore, config_from_env,
    telemetry::{self, ChronoRfc3339Utc},
};
use tracing::{Level, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cli::{Cli, Command, WorkspaceAction},
    presenter::Presenter,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; the environment and defaults still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut cfg = config_from_env().context("invalid SEARCH_* configuration")?;
    if let Some(base) = &cli.api_base {
        cfg = cfg.with_api_base(base.clone());
    }
    init_tracing(cli.verbose, cfg.log_file.as_deref())?;

    let store = WorkspaceStore::new(cfg.workspace_file.clone());
    let workspace = match &cli.workspace {
        Some(ws) => Some(ws.clone()),
        None => store.load().unwrap_or_else(|e| {
            warn!(file = %store.file().display(), error = %e, "could not read saved workspace");
            None
        }),
    };

    let code = match cli.command {
        Command::Search(args) => {
            let presenter = Presenter::new(args.json);
            let outcome = match QueryRequest::from_form(&args.to_form(workspace.as_deref())) {
                Ok(request) => match SearchClient::from_config(&cfg) {
                    Ok(client) => client.search(&request).await,
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            match outcome {
                Ok(result) => {
                    presenter.render(&result);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    presenter.report_error(&e);
                    ExitCode::FAILURE
                }
            }
        }

        Command::Health => {
            let status = connect(&cfg)?.health().await;
            if status.ok {
                println!("{} {} ({} ms)", "ok".green(), status.endpoint, status.latency_ms);
                ExitCode::SUCCESS
            } else {
                println!("{} {}: {}", "down".red(), status.endpoint, status.message);
                ExitCode::FAILURE
            }
        }

        Command::Index { kind, root } => {
            let Some(root) = root.or(workspace) else {
                eprintln!("{}", "no folder given and no workspace set".red());
                return Ok(ExitCode::FAILURE);
            };
            match connect(&cfg)?.build_index(kind, &root).await {
                Ok(ack) => {
                    let root = ack.root.unwrap_or(root);
                    println!("{} {kind} index built for {root}", "ok".green());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    Presenter::new(false).report_error(&e);
                    ExitCode::FAILURE
                }
            }
        }

        Command::Workspaces => match connect(&cfg)?.list_workspaces().await {
            Ok(list) if list.is_empty() => {
                println!("{}", "no indexed workspaces".dimmed());
                ExitCode::SUCCESS
            }
            Ok(list) => {
                for ws in list {
                    let current = workspace.as_deref() == Some(ws.as_str());
                    println!("{} {ws}", if current { "*" } else { " " });
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                Presenter::new(false).report_error(&e);
                ExitCode::FAILURE
            }
        },

        Command::Workspace { action } => {
            workspace_command(action, &cfg, &store, workspace).await?
        }

        Command::Open { path, remote } => {
            let presenter = Presenter::new(false);
            if remote {
                match connect(&cfg)?.open_file_remote(&path).await {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(e) => {
                        presenter.report_error(&e);
                        ExitCode::FAILURE
                    }
                }
            } else if presenter.open_resolved(&path, workspace.as_deref()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }

        Command::Interactive { agent } => {
            let mode = if agent { QueryMode::Agent } else { QueryMode::Router };
            interactive::run(Arc::new(connect(&cfg)?), store, mode, workspace).await?;
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

/// Builds the service client. Only commands that talk to the service call
/// this, so a bad `--api-base` does not break local commands.
fn connect(cfg: &ClientConfig) -> anyhow::Result<SearchClient> {
    SearchClient::from_config(cfg).context("invalid service endpoint")
}

async fn workspace_command(
    action: WorkspaceAction,
    cfg: &ClientConfig,
    store: &WorkspaceStore,
    current: Option<String>,
) -> anyhow::Result<ExitCode> {
    let presenter = Presenter::new(false);
    let code = match action {
        WorkspaceAction::Show => {
            match current {
                Some(ws) => println!("{ws}"),
                None => println!("{}", "(none)".dimmed()),
            }
            println!("{}", format!("saved in {}", store.file().display()).dimmed());
            ExitCode::SUCCESS
        }
        WorkspaceAction::Set { dir } => match store.save(&dir) {
            Ok(()) => {
                println!("workspace set to {}", dir.trim());
                ExitCode::SUCCESS
            }
            Err(e) => {
                presenter.report_error(&e);
                ExitCode::FAILURE
            }
        },
        WorkspaceAction::Pick => {
            let picked = match connect(cfg)?.pick_folder().await {
                Ok(picked) => picked,
                Err(e) => {
                    presenter.report_error(&e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let Some(dir) = picked else {
                println!("{}", "no folder selected".dimmed());
                return Ok(ExitCode::SUCCESS);
            };
            match store.save(&dir) {
                Ok(()) => {
                    println!("workspace set to {dir}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    presenter.report_error(&e);
                    ExitCode::FAILURE
                }
            }
        }
    };
    Ok(code)
}

/// Stderr gets library events through [`telemetry::layer`] and everything
/// else through a plain layer, both under `RUST_LOG` / `-v` (default `warn`).
/// Failure details are logged at `info`, so by default they only reach the
/// optional append-only log file.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let default = if verbose == 0 { "warn" } else { "info" };
    let env_filter = telemetry::env_filter_with_level(default, level);

    let app_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| !telemetry::is_core_event(meta)));
    let stderr_layers = telemetry::layer().and_then(app_layer).with_filter(env_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_timer(ChronoRfc3339Utc)
                    .with_ansi(false)
                    .with_filter(LevelFilter::INFO),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layers)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}
