use clap::{Args, Parser, Subcommand};
use search_core::{IndexKind, QueryForm, QueryMode};

/// Terminal front end for the local retrieval service.
#[derive(Debug, Parser)]
#[command(name = "ctxsearch", version, about)]
pub struct Cli {
    /// Service base URL (overrides SEARCH_API_URL / SEARCH_API_PORT).
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Workspace directory for this run (overrides the saved one).
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// More diagnostic output on stderr (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a question or look up files.
    Search(SearchArgs),
    /// Check that the service is reachable.
    Health,
    /// Build an index on the service for a folder.
    Index {
        /// `bm25` or `chroma`.
        kind: IndexKind,
        /// Folder to index (defaults to the current workspace).
        root: Option<String>,
    },
    /// List workspaces the service has indexed.
    Workspaces,
    /// Show or change the saved workspace.
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },
    /// Resolve a path reported by the service and open it.
    Open {
        path: String,
        /// Ask the service host to open it instead.
        #[arg(long)]
        remote: bool,
    },
    /// Line-oriented session; each line is a search.
    Interactive {
        /// Start in agent mode.
        #[arg(long)]
        agent: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum WorkspaceAction {
    Show,
    Set { dir: String },
    /// Use the service host's folder picker.
    Pick,
}

/// Numeric options stay as text; bad values fall back to defaults.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Use the multi-step agent instead of the router.
    #[arg(long)]
    pub agent: bool,
    #[arg(short = 'k', long = "k")]
    pub top_k: Option<String>,
    #[arg(long = "ck")]
    pub chunk_k: Option<String>,
    #[arg(long = "bk")]
    pub bm25_k: Option<String>,
    #[arg(long)]
    pub steps: Option<String>,
    /// Only documents before this date (YYYY-MM-DD).
    #[arg(long)]
    pub before: Option<String>,
    /// Print the normalized result as JSON.
    #[arg(long)]
    pub json: bool,
    #[arg(required = true)]
    pub question: Vec<String>,
}

impl SearchArgs {
    pub fn to_form(&self, workspace: Option<&str>) -> QueryForm {
        QueryForm {
            mode: if self.agent { QueryMode::Agent } else { QueryMode::Router },
            question: self.question.join(" "),
            top_k: self.top_k.clone(),
            chunk_k: self.chunk_k.clone(),
            bm25_k: self.bm25_k.clone(),
            before: self.before.clone(),
            steps: self.steps.clone(),
            workspace: workspace.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::QueryRequest;

    #[test]
    fn search_args_become_form() {
        let cli = Cli::parse_from([
            "ctxsearch", "search", "--agent", "-k", "abc", "--steps", "7", "who", "won?",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        let req = QueryRequest::from_form(&args.to_form(Some("/ws"))).unwrap();
        assert_eq!(req.mode(), QueryMode::Agent);
        assert_eq!(req.question(), "who won?");
        assert_eq!(req.top_k(), 6);
        assert_eq!(req.steps(), 7);
        assert_eq!(req.workspace(), Some("/ws"));
    }

    #[test]
    fn index_kind_is_parsed() {
        let cli = Cli::parse_from(["ctxsearch", "index", "bm25", "/data"]);
        assert!(matches!(
            cli.command,
            Command::Index { kind: IndexKind::Bm25, root: Some(_) }
        ));
    }
}
