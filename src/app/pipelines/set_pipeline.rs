use crate::adapters::http::{AuditedClient, ClientSettings};
use crate::adapters::sqlite::Store;
use crate::core::assets::AssetSynchronizer;
use crate::core::filter::SetFilter;
use crate::core::normalize::normalize_pages;
use crate::core::persist::SetWriter;
use crate::core::{ConfigProvider, MtgSet, PageResponse, Pipeline, Storage, TransformResult};
use crate::domain::model::LoadSummary;
use crate::utils::error::Result;

/// Fetch, normalize, filter, sync icons, persist.
///
/// The store handle is shared by the audit log (inside the client) and the set writer.
pub struct SetPipeline<S: Storage, C: ConfigProvider> {
    config: C,
    client: AuditedClient,
    filter: SetFilter,
    assets: AssetSynchronizer<S>,
    writer: SetWriter,
}

impl<S: Storage, C: ConfigProvider> SetPipeline<S, C> {
    pub fn new(storage: S, config: C, store: Store) -> Result<Self> {
        let client = AuditedClient::new(store.clone(), ClientSettings::from_config(&config))?;
        let filter = SetFilter::new(
            config.exclude_types().iter().copied(),
            config.exclude_digital(),
        );

        Ok(Self {
            config,
            client,
            filter,
            assets: AssetSynchronizer::new(storage),
            writer: SetWriter::new(store),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SetPipeline<S, C> {
    async fn extract(&self) -> Result<PageResponse> {
        tracing::info!("Retrieving sets");
        self.client
            .fetch_paginated(self.config.sets_endpoint())
            .await
    }

    async fn transform(&self, pages: PageResponse) -> Result<TransformResult> {
        tracing::info!("Parsing sets from {} pages", pages.total);
        let sets = normalize_pages(&pages);
        tracing::info!("Parsed {} sets", sets.len());

        let (sets, excluded) = self.filter.apply(sets);
        Ok(TransformResult { sets, excluded })
    }

    async fn load(&self, sets: Vec<MtgSet>) -> Result<LoadSummary> {
        let icons = self.assets.sync(&self.client, &sets).await?;
        let persisted = self.writer.write(&sets).await?;
        Ok(LoadSummary { icons, persisted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::SetType;
    use httpmock::prelude::*;
    use std::time::Duration;
    use tempfile::TempDir;

    struct TestConfig {
        api_base: String,
        icon_root: String,
        exclude_types: Vec<SetType>,
        exclude_digital: bool,
    }

    impl ConfigProvider for TestConfig {
        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn sets_endpoint(&self) -> &str {
            "sets"
        }

        fn user_agent(&self) -> &str {
            "set-archive-test"
        }

        fn throttle(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn request_timeout(&self) -> Option<Duration> {
            Some(Duration::from_secs(5))
        }

        fn exclude_types(&self) -> &[SetType] {
            &self.exclude_types
        }

        fn exclude_digital(&self) -> bool {
            self.exclude_digital
        }

        fn icon_root(&self) -> &str {
            &self.icon_root
        }

        fn database_path(&self) -> &str {
            ":memory:"
        }
    }

    async fn pipeline(
        server: &MockServer,
        temp_dir: &TempDir,
        exclude_digital: bool,
    ) -> (SetPipeline<LocalStorage, TestConfig>, Store) {
        let store = Store::open_in_memory().unwrap();
        store.ensure_schema().await.unwrap();
        let config = TestConfig {
            api_base: server.base_url(),
            icon_root: temp_dir.path().to_str().unwrap().to_string(),
            exclude_types: vec![SetType::Funny],
            exclude_digital,
        };
        let storage = LocalStorage::new(config.icon_root.clone());
        (SetPipeline::new(storage, config, store.clone()).unwrap(), store)
    }

    #[tokio::test]
    async fn test_extract_sends_configured_user_agent() {
        let server = MockServer::start_async().await;
        let sets_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/sets")
                    .header("User-Agent", "set-archive-test");
                then.status(200)
                    .json_body(serde_json::json!({"data": [{"code": "lea"}], "has_more": false}));
            })
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&server, &temp_dir, true).await;

        let pages = pipeline.extract().await.unwrap();

        sets_mock.assert_async().await;
        assert_eq!(pages.total, 1);
        assert_eq!(store.request_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transform_normalizes_then_filters() {
        let server = MockServer::start_async().await;
        let temp_dir = TempDir::new().unwrap();
        let (pipeline, _store) = pipeline(&server, &temp_dir, true).await;

        let mut pages = PageResponse::default();
        pages.push(serde_json::json!({
            "data": [
                {"code": "unh", "set_type": "funny", "digital": false},
                {"code": "ha1", "set_type": "core", "digital": true},
                {"code": "m21", "set_type": "core", "digital": false},
                {"code": "new", "set_type": "brand_new_type"}
            ],
            "has_more": false
        }));

        let result = pipeline.transform(pages).await.unwrap();

        let codes: Vec<&str> = result.sets.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["m21", "new"]);
        assert_eq!(result.excluded, 2);
        assert_eq!(result.sets[1].set_type, SetType::Unknown);
    }

    #[tokio::test]
    async fn test_load_syncs_icons_then_persists() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/icons/m21.svg");
                then.status(200).body("<svg/>");
            })
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline(&server, &temp_dir, true).await;
        let sets = vec![MtgSet {
            code: "m21".to_string(),
            name: "Core Set 2021".to_string(),
            set_type: SetType::Core,
            digital: false,
            search_uri: "UNKNOWN".to_string(),
            released_at: "2020-07-03".to_string(),
            card_count: 397,
            icon_svg_uri: server.url("/icons/m21.svg"),
        }];

        let summary = pipeline.load(sets).await.unwrap();

        assert_eq!(summary.icons.downloaded, 1);
        assert_eq!(summary.persisted, 1);
        assert!(temp_dir.path().join("m21/icon.svg").is_file());
        assert_eq!(store.set_rows().await.unwrap()[0].code, "m21");
    }
}
