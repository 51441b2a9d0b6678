use std::env;
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://ai.huston.workers.dev/generate-image";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub endpoint: String,
    /// Per-request timeout. `None` leaves the request unbounded.
    pub timeout_secs: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let endpoint = env::var("SDSTUDIO_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.endpoint);
        let timeout_secs = env::var("SDSTUDIO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());
        let output_dir = env::var("SDSTUDIO_OUTPUT_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        StudioConfig {
            endpoint,
            timeout_secs,
            output_dir,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
