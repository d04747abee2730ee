mod load;
mod types;

pub use load::{load_default, load_from_path};
pub use types::*;

use std::path::PathBuf;

impl PersistenceConfig {
    /// `data_dir` with `~` and env vars expanded.
    pub fn resolved_data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::full(&self.data_dir).map_or_else(
            |_| self.data_dir.clone(),
            |expanded| expanded.into_owned(),
        ))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.snapshot_file)
    }

    pub fn activity_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.activity_file)
    }
}
