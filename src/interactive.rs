//! Line-oriented session.
//!
//! Every non-command line starts a search without waiting for the previous
//! one. Outcomes come back over a channel tagged with their ticket, and only
//! the newest search may change what is on screen.

use std::{io::Write, sync::Arc};

use colored::Colorize;
use search_core::{
    ApiResult, DisplayedResult, QueryMode, QueryRequest, RequestSequencer, SearchClient,
    SearchResult, Sequenced, WorkspaceStore,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::debug;

use crate::presenter::Presenter;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Search(String),
    Mode(Option<QueryMode>),
    Workspace(Option<String>),
    Open(usize),
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(cmd) = line.strip_prefix(':') else {
        return Input::Search(line.to_string());
    };
    let (name, arg) = match cmd.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (cmd, ""),
    };
    let arg = (!arg.is_empty()).then(|| arg.to_string());
    match name {
        "q" | "quit" | "exit" => Input::Quit,
        "h" | "help" => Input::Help,
        "mode" => match arg {
            None => Input::Mode(None),
            Some(m) => match m.parse() {
                Ok(mode) => Input::Mode(Some(mode)),
                Err(_) => Input::Unknown(line.to_string()),
            },
        },
        "ws" => Input::Workspace(arg),
        "open" => match arg.as_deref().and_then(|n| n.parse().ok()) {
            Some(n) => Input::Open(n),
            None => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

fn print_help() {
    println!("  <question>      search (router or agent, see :mode)");
    println!("  :mode [router|agent]");
    println!("  :ws [DIR]       show or set the workspace");
    println!("  :open N         open entry N of the current result");
    println!("  :quit");
}

fn prompt(mode: QueryMode) {
    print!("{} ", format!("{mode}>").cyan());
    let _ = std::io::stdout().flush();
}

pub async fn run(
    client: Arc<SearchClient>,
    store: WorkspaceStore,
    mut mode: QueryMode,
    mut workspace: Option<String>,
) -> anyhow::Result<()> {
    let presenter = Presenter::new(false);
    let sequencer = Arc::new(RequestSequencer::new());
    let shown = DisplayedResult::<ApiResult>::new(sequencer.clone());
    let (tx, mut rx) = mpsc::unbounded_channel::<Sequenced<SearchResult<ApiResult>>>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("connected to {} (:help for commands)", client.api_base());
    prompt(mode);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Empty => {}
                    Input::Quit => break,
                    Input::Help => print_help(),
                    Input::Unknown(raw) => eprintln!("{} {raw}", "unknown command:".yellow()),
                    Input::Mode(None) => println!("mode: {mode}"),
                    Input::Mode(Some(m)) => mode = m,
                    Input::Workspace(None) => match &workspace {
                        Some(ws) => println!("workspace: {ws}"),
                        None => println!("{}", "no workspace set".dimmed()),
                    },
                    Input::Workspace(Some(dir)) => match store.save(&dir) {
                        Ok(()) => workspace = Some(dir),
                        Err(e) => presenter.report_error(&e),
                    },
                    Input::Open(n) => match shown.snapshot().await {
                        Some(result) => {
                            presenter.open_citation(&result, n, workspace.as_deref());
                        }
                        None => eprintln!("{}", "nothing to open yet".yellow()),
                    },
                    Input::Search(question) => {
                        match QueryRequest::new(mode, &question) {
                            Ok(request) => {
                                let request = request.with_workspace(workspace.as_deref());
                                let ticket = sequencer.issue();
                                debug!(ticket = ticket.get(), "search started");
                                let client = client.clone();
                                let tx = tx.clone();
                                tokio::spawn(async move {
                                    let outcome = client.search_sequenced(ticket, &request).await;
                                    let _ = tx.send(outcome);
                                });
                            }
                            Err(e) => presenter.report_error(&e),
                        }
                    }
                }
                prompt(mode);
            }
            Some(outcome) = rx.recv() => {
                if !sequencer.is_latest(outcome.ticket) {
                    debug!(ticket = outcome.ticket.get(), "dropping superseded result");
                    continue;
                }
                println!();
                match outcome.value {
                    Ok(result) => {
                        let view = result.clone();
                        if shown.apply(Sequenced::new(outcome.ticket, result)).await {
                            presenter.render(&view);
                        }
                    }
                    Err(e) => presenter.report_error(&e),
                }
                prompt(mode);
            }
        }
    }
    Ok(())
}
