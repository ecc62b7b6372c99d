use std::fmt;
use std::path::PathBuf;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text three-panel dashboard.
    Dashboard,
    /// Printable HTML risk report.
    Html,
    /// JSON analysis snapshot.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Html => write!(f, "html"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A single output destination: format + file path.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub format: OutputFormat,
    pub path: PathBuf,
}

/// Configuration for output destinations and display options.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// File outputs (--report, --json).
    pub outputs: Vec<OutputSpec>,
    /// Show investor/developer guidance under each finding on the dashboard.
    pub show_guidance: bool,
    /// Print the dashboard to stdout.
    pub stdout: bool,
}
