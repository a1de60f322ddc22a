use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfDeskError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("No pages selected: {0}")]
    EmptySelection(String),

    #[error("Nothing to process: {0}")]
    NoInput(String),

    #[error("Failed to decode image: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

impl PdfDeskError {
    /// True when the error was caused by what the user submitted rather than
    /// by the document or the PDF backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PdfDeskError::InvalidRange(_) | PdfDeskError::EmptySelection(_) | PdfDeskError::NoInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        assert!(PdfDeskError::InvalidRange("b-2".into()).is_user_error());
        assert!(PdfDeskError::EmptySelection("none".into()).is_user_error());
        assert!(PdfDeskError::NoInput("no images".into()).is_user_error());
        assert!(!PdfDeskError::ParseError("bad xref".into()).is_user_error());
        assert!(!PdfDeskError::ImageError("truncated".into()).is_user_error());
    }
}
