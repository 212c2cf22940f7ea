//! Scan request input.
//!
//! A `ScanRequest` carries what the transport layer received: the required
//! `name` parameter, the uploaded file's original filename (if the upload
//! had one), and the file content.

use crate::core::error::{ScanError, ScanResult};

/// One uploaded file awaiting a verdict.
///
/// # Examples
///
/// ```rust
/// use clamgate::core::ScanRequest;
///
/// let request = ScanRequest::new("upload-42", vec![0x4D, 0x5A])
///     .with_filename("setup.exe");
/// assert_eq!(request.filename(), "setup.exe");
/// assert!(request.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct ScanRequest {
    name: String,
    filename: Option<String>,
    data: Vec<u8>,
}

impl std::fmt::Debug for ScanRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRequest")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ScanRequest {
    /// Creates a request from the `name` parameter and the file content.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            data: data.into(),
        }
    }

    /// Sets the original filename of the upload.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Returns the `name` parameter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the original filename, falling back to the `name` parameter.
    pub fn filename(&self) -> &str {
        match self.filename.as_deref() {
            Some(f) if !f.is_empty() => f,
            _ => &self.name,
        }
    }

    /// Returns the file content.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the content size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Rejects requests the pipeline must not process.
    ///
    /// The name check comes first, matching the order in which the
    /// parameters are required.
    pub fn validate(&self) -> ScanResult<()> {
        if self.name.trim().is_empty() {
            return Err(ScanError::missing_parameter("name"));
        }
        if self.data.is_empty() {
            return Err(ScanError::EmptyFile);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_falls_back_to_name() {
        let request = ScanRequest::new("report", b"data".to_vec());
        assert_eq!(request.filename(), "report");

        let request = request.with_filename("");
        assert_eq!(request.filename(), "report");

        let request = request.with_filename("report.pdf");
        assert_eq!(request.filename(), "report.pdf");
    }

    #[test]
    fn test_validate_empty_file() {
        let request = ScanRequest::new("report", Vec::new());
        assert!(matches!(request.validate(), Err(ScanError::EmptyFile)));
    }

    #[test]
    fn test_validate_missing_name() {
        let request = ScanRequest::new("  ", b"data".to_vec());
        assert!(matches!(
            request.validate(),
            Err(ScanError::MissingParameter { ref name }) if name == "name"
        ));
    }

    #[test]
    fn test_debug_hides_content() {
        let request = ScanRequest::new("n", vec![1, 2, 3]);
        let debug = format!("{:?}", request);
        assert!(debug.contains("data_len: 3"));
    }
}
