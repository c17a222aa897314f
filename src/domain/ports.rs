use crate::domain::model::{LoadSummary, MtgSet, PageResponse, SetType, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Filesystem the icon assets are written into. Paths are relative to the storage root.
pub trait Storage: Send + Sync {
    fn resolve(&self, path: &str) -> PathBuf;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn ensure_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn sets_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn throttle(&self) -> Duration;
    fn request_timeout(&self) -> Option<Duration>;
    fn exclude_types(&self) -> &[SetType];
    fn exclude_digital(&self) -> bool;
    fn icon_root(&self) -> &str;
    fn database_path(&self) -> &str;
}

/// One page fetch; the pagination walker drives this.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<serde_json::Value>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PageResponse>;
    async fn transform(&self, pages: PageResponse) -> Result<TransformResult>;
    async fn load(&self, sets: Vec<MtgSet>) -> Result<LoadSummary>;
}
