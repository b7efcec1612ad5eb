// Write-only preview archive.
//
// One file per {tier}/{domain}/{application}/{version}/preview-{state}.json,
// holding the portal's raw preview payload. Consumed by humans and other
// tools later; never read back by this crate.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CoreError;
use crate::model::{EnvironmentTier, VersionState};

#[derive(Debug, Clone)]
pub struct PreviewArchive {
    root: PathBuf,
}

impl PreviewArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist one preview payload, creating directories on demand.
    /// Returns the written path.
    pub fn store(
        &self,
        tier: EnvironmentTier,
        domain: &str,
        application: &str,
        version: &str,
        state: VersionState,
        payload: &serde_json::Value,
    ) -> Result<PathBuf, CoreError> {
        let dir = self
            .root
            .join(tier.to_string())
            .join(domain)
            .join(application)
            .join(version);
        let path = dir.join(format!("preview-{state}.json"));

        let io_err = |source: std::io::Error, path: &Path| CoreError::Archive {
            path: path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&dir).map_err(|e| io_err(e, &dir))?;
        let body = serde_json::to_string_pretty(payload).map_err(|e| CoreError::PreviewShape {
            message: format!("preview payload not serializable: {e}"),
        })?;
        std::fs::write(&path, body).map_err(|e| io_err(e, &path))?;

        info!(path = %path.display(), "preview archived");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stores_one_file_under_the_keyed_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = PreviewArchive::new(dir.path());

        let path = archive
            .store(
                EnvironmentTier::Tst,
                "payments",
                "orders",
                "1.2.0",
                VersionState::Released,
                &json!({"data": {"requested": []}}),
            )
            .expect("store");

        assert!(path.ends_with("tst/payments/orders/1.2.0/preview-released.json"));
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\"requested\""));
    }

    #[test]
    fn overwrites_on_repeat_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = PreviewArchive::new(dir.path());

        for payload in [json!({"n": 1}), json!({"n": 2})] {
            archive
                .store(
                    EnvironmentTier::Dev,
                    "d",
                    "a",
                    "1.0.0",
                    VersionState::Draft,
                    &payload,
                )
                .expect("store");
        }

        let path = dir
            .path()
            .join("dev/d/a/1.0.0/preview-draft.json");
        let written = std::fs::read_to_string(path).expect("read back");
        assert!(written.contains("\"n\": 2"));
    }
}
