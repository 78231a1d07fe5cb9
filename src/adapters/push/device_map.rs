use crate::error::PushError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Maps internal device ids to WeChat open ids.
///
/// The file is re-read on every lookup so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct DeviceMap {
    path: PathBuf,
}

impl DeviceMap {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Looks up the recipient for `device_id`.
    ///
    /// # Errors
    /// Returns `PushError::MapNotFound` if the file cannot be read,
    /// `PushError::MapUnmarshal` if it is not a JSON object of strings and
    /// `PushError::NoMapEntry` if the device is not listed.
    pub async fn resolve(&self, device_id: &str) -> Result<String, PushError> {
        let raw = tokio::fs::read(&self.path).await.map_err(PushError::MapNotFound)?;
        let mut entries: HashMap<String, String> = serde_json::from_slice(&raw).map_err(PushError::MapUnmarshal)?;
        entries.remove(device_id).ok_or_else(|| PushError::NoMapEntry(device_id.to_string()))
    }
}
