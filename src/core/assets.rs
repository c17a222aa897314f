use crate::adapters::http::AuditedClient;
use crate::domain::model::{DownloadOutcome, MtgSet, SyncReport};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use tracing::{Instrument, Span};

pub const ICON_FILE_NAME: &str = "icon.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconStatus {
    Downloaded,
    AlreadyPresent,
    Failed,
}

/// Downloads one icon per set into `<root>/<code>/icon.svg`, skipping icons already on disk.
pub struct AssetSynchronizer<S: Storage> {
    storage: S,
    span: Span,
}

impl<S: Storage> AssetSynchronizer<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            span: tracing::info_span!("assets"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn icon_path(code: &str) -> String {
        format!("{}/{}", code, ICON_FILE_NAME)
    }

    /// Per-set download failures are counted and logged; filesystem and transport
    /// errors abort the whole sync.
    pub async fn sync(&self, client: &AuditedClient, sets: &[MtgSet]) -> Result<SyncReport> {
        async move {
            tracing::info!("Downloading icons for {} sets", sets.len());
            let mut report = SyncReport::default();

            for set in sets {
                match self.sync_one(client, set).await? {
                    IconStatus::Downloaded => report.downloaded += 1,
                    IconStatus::AlreadyPresent => report.skipped += 1,
                    IconStatus::Failed => report.failed += 1,
                }
            }

            tracing::info!(
                "Icons: {} downloaded, {} already present, {} failed",
                report.downloaded,
                report.skipped,
                report.failed
            );
            Ok(report)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn sync_one(&self, client: &AuditedClient, set: &MtgSet) -> Result<IconStatus> {
        if !is_safe_dir_name(&set.code) {
            tracing::warn!("Set {} has a code unusable as a directory, skipping icon", set);
            return Ok(IconStatus::Failed);
        }

        self.storage.ensure_dir(&set.code).await?;
        let icon_path = Self::icon_path(&set.code);

        if self.storage.exists(&icon_path).await? {
            tracing::info!("Icon for {} already exists, skipping download", set);
            return Ok(IconStatus::AlreadyPresent);
        }

        if let Err(e) = validate_url("icon_svg_uri", &set.icon_svg_uri) {
            tracing::warn!("Set {} has no usable icon URI: {}", set, e);
            return Ok(IconStatus::Failed);
        }

        tracing::info!("Downloading icon for set {}", set);
        match client
            .download(&set.icon_svg_uri, &self.storage, &icon_path)
            .await?
        {
            DownloadOutcome::Saved { .. } => Ok(IconStatus::Downloaded),
            DownloadOutcome::Failed { status } => {
                tracing::warn!("Icon for {} not saved (HTTP {})", set, status);
                Ok(IconStatus::Failed)
            }
        }
    }
}

fn is_safe_dir_name(code: &str) -> bool {
    !code.is_empty() && code != "." && code != ".." && !code.contains(['/', '\\', '\0'])
}
