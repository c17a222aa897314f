use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

/// Runs a pipeline once: extract, transform, load. Any error aborts the run.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting ETL process");

        tracing::info!("Extracting pages");
        let pages = self.pipeline.extract().await?;
        let page_count = pages.total;
        tracing::info!("Extracted {} pages", page_count);

        tracing::info!("Transforming sets");
        let transformed = self.pipeline.transform(pages).await?;
        let kept = transformed.sets.len();
        tracing::info!(
            "Kept {} sets, excluded {}",
            kept,
            transformed.excluded
        );

        tracing::info!("Loading sets");
        let loaded = self.pipeline.load(transformed.sets).await?;

        let summary = RunSummary {
            pages: page_count,
            normalized: kept + transformed.excluded,
            kept,
            excluded: transformed.excluded,
            icons: loaded.icons,
            persisted: loaded.persisted,
        };
        tracing::info!("ETL process finished: {:?}", summary);
        Ok(summary)
    }
}
