//! Logo upload part

use crate::ClientResult;
use reqwest::multipart::Part;

/// Image file attached to a points save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl LogoUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    pub(crate) fn into_part(self) -> ClientResult<Part> {
        let mime = self.mime_type();
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&mime)?)
    }
}
