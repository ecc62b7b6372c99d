use tracing::info;

use timemachine_core::Analysis;

use crate::config::{OutputConfig, OutputFormat};
use crate::dashboard::DashboardFormatter;
use crate::json::JsonFormatter;
use crate::present::{Delivered, FilePresenter, StdoutPresenter, deliver};
use crate::report::{HtmlReport, ReportGenerator};
use crate::traits::{AnalysisFormatter, OutputError};

/// Coordinates output to stdout and/or multiple file destinations.
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render the analysis for every configured destination.
    ///
    /// Formatting errors abort the run. Presentation failures do not: each
    /// document comes back in the result with its error attached.
    pub fn run(&self, analysis: &Analysis<'_>) -> Result<Vec<Delivered>, OutputError> {
        let mut delivered = Vec::with_capacity(self.config.outputs.len() + 1);

        if self.config.stdout {
            let output = DashboardFormatter::new(self.config.show_guidance).format(analysis)?;
            delivered.push(deliver(output, &StdoutPresenter));
        }

        for spec in &self.config.outputs {
            let presenter = FilePresenter::new(&spec.path);
            let result = match spec.format {
                OutputFormat::Html => ReportGenerator::new(presenter).generate(analysis)?,
                format => deliver(self.formatter_for(format).format(analysis)?, &presenter),
            };
            if result.presented() {
                info!(format = %spec.format, path = %spec.path.display(), "output written");
            }
            delivered.push(result);
        }

        Ok(delivered)
    }

    fn formatter_for(&self, format: OutputFormat) -> Box<dyn AnalysisFormatter> {
        match format {
            OutputFormat::Dashboard => Box::new(DashboardFormatter::new(self.config.show_guidance)),
            OutputFormat::Html => Box::new(HtmlReport),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}
