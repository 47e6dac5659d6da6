use std::path::PathBuf;

/// Default base URL of the local retrieval service.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Default timeout for `/route` and `/agent` calls. The agent path runs
/// several LLM steps, so this is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default timeout for `/health` probes.
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Runtime configuration shared by both front ends.
///
/// # Fields
///
/// - `api_base`: base URL of the retrieval service (no trailing slash required).
/// - `timeout_secs`: request timeout for searches and utility calls.
/// - `health_timeout_secs`: request timeout for the health probe.
/// - `workspace_file`: single-line file holding the last selected workspace.
/// - `log_file`: optional diagnostic log file for full error details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `http://127.0.0.1:8000`.
    pub api_base: String,

    /// Timeout (seconds) for search and utility requests.
    pub timeout_secs: u64,

    /// Timeout (seconds) for health probes.
    pub health_timeout_secs: u64,

    /// Location of the persisted workspace selection.
    pub workspace_file: PathBuf,

    /// Optional diagnostic log file.
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            workspace_file: default_workspace_file(),
            log_file: None,
        }
    }
}

impl ClientConfig {
    /// Replaces the API base (CLI override).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// `<config dir>/ctxsearch/workspace.txt`, or `./workspace.txt` when the
/// platform has no config directory.
pub fn default_workspace_file() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ctxsearch").join("workspace.txt"))
        .unwrap_or_else(|| PathBuf::from("workspace.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_override() {
        let cfg = ClientConfig::default().with_api_base("http://10.0.0.5:9000");
        assert_eq!(cfg.api_base, "http://10.0.0.5:9000");
        assert_eq!(cfg.timeout_secs, 120);
        assert_eq!(cfg.health_timeout_secs, 5);
        assert!(cfg.workspace_file.ends_with("workspace.txt"));
        assert_eq!(cfg.log_file, None);
    }
}
