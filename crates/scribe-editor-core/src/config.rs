//! Editor configuration.

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::ConfigError;

/// Bucket pasted images are uploaded to unless configured otherwise.
pub const DEFAULT_BUCKET: &str = "note-images";

/// Default upper bound on a pasted image (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Attachment pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Object-store bucket; attachment URLs contain `/<bucket>/<path>`.
    pub bucket: SmolStr,
    /// Pasted images larger than this are refused without uploading.
    pub max_upload_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bucket: SmolStr::new_static(DEFAULT_BUCKET),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl EditorConfig {
    /// Parse a config from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
