//! Error types for report layout and PDF generation.
//!
//! Layout errors are fatal to the render in progress: the canvas is never
//! finalized once one of these has been returned.

/// Result type alias for report layout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while laying out or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A draw primitive was asked for a non-positive width or height
    #[error("Invalid geometry for {what}: width {width}, height {height}")]
    InvalidGeometry {
        /// The primitive that rejected the geometry
        what: &'static str,
        /// Requested width in user units
        width: f32,
        /// Requested height in user units
        height: f32,
    },

    /// A row does not match the declared column layout
    #[error("Row {row} does not match the table columns: {reason}")]
    DataShapeMismatch {
        /// Zero-based index of the offending row within its batch
        row: usize,
        /// What was missing or extra
        reason: String,
    },

    /// Content taller than a whole page, even straight after a page break
    #[error("Content of height {needed:.2} can never fit: a fresh page only offers {available:.2}")]
    OverflowNeverResolves {
        /// Height that had to be placed
        needed: f32,
        /// Height available on an empty page
        available: f32,
    },

    /// A table render call received no rows
    #[error("Table render called with no rows")]
    EmptyTable,

    /// Column-width fractions are unusable
    #[error("Invalid column widths: {0}")]
    InvalidColumnSpec(String),

    /// Image decoding or embedding error
    #[error("Image error: {0}")]
    Image(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report data could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::writer::ImageError> for Error {
    fn from(err: crate::writer::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_geometry_error() {
        let err = Error::InvalidGeometry {
            what: "cell",
            width: -1.0,
            height: 5.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("cell"));
        assert!(msg.contains("-1"));
    }

    #[test]
    fn test_data_shape_mismatch_names_row() {
        let err = Error::DataShapeMismatch {
            row: 3,
            reason: "missing column 'Actual'".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("Actual"));
    }

    #[test]
    fn test_overflow_error() {
        let err = Error::OverflowNeverResolves {
            needed: 400.0,
            available: 262.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("400.00"));
        assert!(msg.contains("262.00"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "logo.png");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
