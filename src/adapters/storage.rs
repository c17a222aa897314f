use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path).try_exists()?)
    }

    async fn ensure_dir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
