use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::traits::OutputError;

/// Hand-off surface for a finished document (file, terminal, print dialog).
pub trait Presenter {
    fn present(&self, document: &str) -> Result<(), OutputError>;

    /// Short name for logs.
    fn describe(&self) -> String;
}

/// A produced document and the outcome of handing it off.
///
/// Presentation failures never discard the document.
#[derive(Debug)]
pub struct Delivered {
    pub document: String,
    pub presentation_error: Option<OutputError>,
}

impl Delivered {
    pub fn presented(&self) -> bool {
        self.presentation_error.is_none()
    }
}

/// Present `document` and keep it regardless of the outcome.
pub fn deliver(document: String, presenter: &dyn Presenter) -> Delivered {
    let target = presenter.describe();
    match presenter.present(&document) {
        Ok(()) => {
            debug!(presenter = %target, bytes = document.len(), "document presented");
            Delivered {
                document,
                presentation_error: None,
            }
        }
        Err(e) => {
            warn!(presenter = %target, error = %e, "document presentation failed");
            let err = match e {
                OutputError::PresentationFailure(_) => e,
                other => OutputError::PresentationFailure(other.to_string()),
            };
            Delivered {
                document,
                presentation_error: Some(err),
            }
        }
    }
}

fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(OutputError::PresentationFailure(format!(
                "output path '{}' must not contain '..' components",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Writes the document to a file, e.g. an HTML report opened for print-to-PDF.
#[derive(Debug, Clone)]
pub struct FilePresenter {
    path: PathBuf,
}

impl FilePresenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Presenter for FilePresenter {
    fn present(&self, document: &str) -> Result<(), OutputError> {
        validate_output_path(&self.path)?;
        fs::write(&self.path, document).map_err(|e| {
            OutputError::PresentationFailure(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Prints the document to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn present(&self, document: &str) -> Result<(), OutputError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(document.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| OutputError::PresentationFailure(format!("stdout: {e}")))
    }

    fn describe(&self) -> String {
        "stdout".into()
    }
}
