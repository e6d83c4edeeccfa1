//! Error type shared by every stage of the listing pipeline.

use thiserror::Error;

pub type KitResult<T> = Result<T, KitError>;

#[derive(Debug, Error)]
pub enum KitError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Export is disabled for this listing")]
    ExportDisabled,

    #[error("Export format '{format}' is not enabled for this listing")]
    FormatNotSupported { format: String },

    #[error("Record {id} not found")]
    NotFound { id: i64 },

    #[error("Cannot display column '{column}': {message}")]
    Display { column: String, message: String },

    #[error("Invalid listing configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX generation failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KitError {
    /// True for the errors that must surface as a 403 at the HTTP boundary.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            KitError::Forbidden | KitError::ExportDisabled | KitError::FormatNotSupported { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_refusals_are_forbidden() {
        assert!(KitError::Forbidden.is_forbidden());
        assert!(KitError::ExportDisabled.is_forbidden());
        assert!(
            KitError::FormatNotSupported {
                format: "pdf".into()
            }
            .is_forbidden()
        );
        assert!(!KitError::NotFound { id: 3 }.is_forbidden());
    }

    #[test]
    fn test_format_not_supported_names_format() {
        let err = KitError::FormatNotSupported {
            format: "xlsx".into(),
        };
        assert!(err.to_string().contains("xlsx"));
    }
}
