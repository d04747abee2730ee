use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::PersistenceConfig;
use crate::errors::PersistError;
use crate::score::TrustSnapshot;

use super::sink::{ActivityLogEntry, PersistenceSink};

/// Snapshot as a pretty-printed JSON file, activity log as a flat text file.
#[derive(Debug)]
pub struct JsonFileSink {
    snapshot_path: PathBuf,
    activity_path: PathBuf,
    snapshot_lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(snapshot_path: impl Into<PathBuf>, activity_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            activity_path: activity_path.into(),
            snapshot_lock: Mutex::new(()),
        }
    }

    pub fn from_config(cfg: &PersistenceConfig) -> Self {
        Self::new(cfg.snapshot_path(), cfg.activity_path())
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn activity_path(&self) -> &Path {
        &self.activity_path
    }
}

async fn ensure_parent(path: &Path) -> Result<(), PersistError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PersistError::io(dir, e)),
        _ => Ok(()),
    }
}

/// Write to `.<name>.tmp.<uuid>` next to the target, then rename over it, so
/// a reader sees either the old snapshot or the new one.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    let tmp_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{}.tmp.{}", file_name, uuid::Uuid::new_v4()));

    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(PersistError::io(&tmp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(PersistError::io(path, e));
    }
    Ok(())
}

#[async_trait]
impl PersistenceSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn persist(&self, snapshot: &TrustSnapshot) -> Result<(), PersistError> {
        let body = serde_json::to_vec_pretty(snapshot).map_err(PersistError::Serialize)?;

        let _guard = self.snapshot_lock.lock().await;
        ensure_parent(&self.snapshot_path).await?;
        write_atomic(&self.snapshot_path, &body).await?;

        tracing::debug!(
            target: "proctor.persist",
            path = %self.snapshot_path.display(),
            score = snapshot.score,
            label = %snapshot.label,
            "trust snapshot written"
        );
        Ok(())
    }

    async fn append_activity(&self, entry: &ActivityLogEntry) -> Result<(), PersistError> {
        ensure_parent(&self.activity_path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.activity_path)
            .await
            .map_err(|e| PersistError::io(&self.activity_path, e))?;
        file.write_all(entry.to_line().as_bytes())
            .await
            .map_err(|e| PersistError::io(&self.activity_path, e))?;
        file.flush()
            .await
            .map_err(|e| PersistError::io(&self.activity_path, e))
    }

    async fn load(&self) -> Result<Option<TrustSnapshot>, PersistError> {
        let raw = match tokio::fs::read_to_string(&self.snapshot_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistError::io(&self.snapshot_path, e)),
        };

        let corrupt = |reason: String| PersistError::CorruptState {
            path: self.snapshot_path.display().to_string(),
            reason,
        };

        if raw.trim().is_empty() {
            return Err(corrupt("file is empty".to_string()));
        }
        let snapshot: TrustSnapshot =
            serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;
        snapshot.check().map_err(corrupt)?;
        Ok(Some(snapshot))
    }

    async fn read_activity(&self) -> Result<String, PersistError> {
        match tokio::fs::read_to_string(&self.activity_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(PersistError::io(&self.activity_path, e)),
        }
    }
}
