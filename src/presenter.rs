//! Renders results in the terminal and opens files from them.

use std::io::{self, IsTerminal};

use colored::Colorize;
use search_core::{ApiResult, FileHit, SearchError, Via, path_resolver::resolve_detailed};
use tracing::{error, info};

/// What opening a path or numbered entry will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPlan {
    /// Resolved to an existing local file.
    Launch(String),
    /// Nothing exists under any resolution tier.
    Missing(String),
    /// The current result has no entry with this number.
    NoEntry(usize),
}

impl OpenPlan {
    pub fn for_path(api_path: &str, workspace: Option<&str>) -> Self {
        let resolved = resolve_detailed(api_path, workspace);
        if resolved.exists {
            OpenPlan::Launch(resolved.path)
        } else {
            OpenPlan::Missing(resolved.path)
        }
    }

    /// Entry `n` is 1-based, as numbered by [`Presenter::render`].
    pub fn for_entry(result: &ApiResult, n: usize, workspace: Option<&str>) -> Self {
        match result.path_at(n) {
            Some(path) => Self::for_path(path, workspace),
            None => OpenPlan::NoEntry(n),
        }
    }

    /// Text shown instead of opening anything.
    pub fn notice(&self) -> Option<String> {
        match self {
            OpenPlan::Launch(_) => None,
            OpenPlan::Missing(path) => Some(format!("path does not exist: {path}")),
            OpenPlan::NoEntry(n) => Some(format!("no entry {n}")),
        }
    }
}

/// The only text a user sees for a failure.
pub fn error_text(err: &SearchError) -> String {
    err.user_message()
}

fn hit_line(number: usize, hit: &FileHit) -> String {
    let page = if hit.page > 0 {
        format!(" p.{}", hit.page)
    } else {
        String::new()
    };
    let lexical = if hit.has_bm25 == Some(true) {
        " [bm25]"
    } else {
        ""
    };
    format!(
        "{number:>3}. {}{}{}",
        hit.path.bold(),
        page.dimmed(),
        lexical.cyan()
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    json: bool,
}

impl Presenter {
    pub fn new(json: bool) -> Self {
        colored::control::set_override(io::stdout().is_terminal());
        Self { json }
    }

    pub fn render(&self, result: &ApiResult) {
        if self.json {
            match serde_json::to_string_pretty(result) {
                Ok(s) => println!("{s}"),
                Err(e) => error!(error = %e, "failed to serialize result"),
            }
            return;
        }

        match result {
            ApiResult::FileList(files) => {
                if files.hits.is_empty() {
                    println!("{}", "no results".dimmed());
                }
                for (i, hit) in files.hits.iter().enumerate() {
                    println!("{}", hit_line(i + 1, hit));
                    if !hit.snippet.is_empty() {
                        println!("     {}", hit.snippet);
                    }
                }
            }
            ApiResult::Answer(answer) => {
                println!("{}", answer.text);
                if !answer.citations.is_empty() {
                    println!();
                    println!("{}", "Sources".underline());
                }
                for (i, c) in answer.citations.iter().enumerate() {
                    let page = format!("p.{}", c.page);
                    println!("{:>3}. {} {}", i + 1, c.path.bold(), page.dimmed());
                }
                if let Some(trace) = &answer.trace {
                    for step in trace {
                        println!("     {}", step.dimmed());
                    }
                }
            }
        }
        if let Some(via) = result.via() {
            let via = match via {
                Via::Router => "router",
                Via::Agent => "agent",
            };
            println!("{}", format!("via {via}").dimmed());
        }
    }

    /// Reports a failure the way the user should see it. Details go to the
    /// diagnostic log only.
    pub fn report_error(&self, err: &SearchError) {
        if !err.is_validation() {
            info!(error = %err, "search failed");
        }
        eprintln!("{}", error_text(err).red());
    }

    pub fn open_citation(&self, result: &ApiResult, n: usize, workspace: Option<&str>) -> bool {
        self.open(OpenPlan::for_entry(result, n, workspace))
    }

    /// Resolves `api_path` against `workspace` and opens it with the OS
    /// default handler. Returns whether a file was opened.
    pub fn open_resolved(&self, api_path: &str, workspace: Option<&str>) -> bool {
        self.open(OpenPlan::for_path(api_path, workspace))
    }

    fn open(&self, plan: OpenPlan) -> bool {
        let path = match plan {
            OpenPlan::Launch(path) => path,
            other => {
                if let Some(notice) = other.notice() {
                    eprintln!("{}", notice.yellow());
                }
                return false;
            }
        };
        match open::that_detached(&path) {
            Ok(()) => {
                println!("opened {path}");
                true
            }
            Err(e) => {
                info!(path = %path, error = %e, "failed to launch default handler");
                eprintln!("{} {path}", "could not open".red());
                false
            }
        }
    }
}
