//! File encoding helpers for multimodal payloads

use std::{fs, io, path::Path};

use base64::{engine::general_purpose, Engine as _};

use crate::error::{RagError, Result};

/// Read a file and encode its bytes as standard base64.
///
/// # Errors
///
/// Returns [`RagError::FileNotFound`] when the path does not exist and
/// [`RagError::Io`] for any other read failure.
pub fn encode_to_base64(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RagError::FileNotFound(path.to_path_buf()),
        _ => RagError::Io(e),
    })?;
    Ok(general_purpose::STANDARD.encode(data))
}

/// Like [`encode_to_base64`], but logs the failure and returns `None`.
#[must_use]
pub fn encode_to_base64_lossy(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match encode_to_base64(path) {
        Ok(encoded) => Some(encoded),
        Err(RagError::FileNotFound(_)) => {
            tracing::error!(path = %path.display(), "image file not found");
            None
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to encode image");
            None
        }
    }
}
