pub mod config;
pub mod dashboard;
pub mod json;
pub mod manager;
pub mod present;
pub mod report;
pub mod traits;

pub use config::{OutputConfig, OutputFormat, OutputSpec};
pub use dashboard::DashboardFormatter;
pub use json::JsonFormatter;
pub use manager::OutputManager;
pub use present::{Delivered, FilePresenter, Presenter, StdoutPresenter, deliver};
pub use report::{HtmlReport, ReportGenerator};
pub use traits::{AnalysisFormatter, OutputError};
