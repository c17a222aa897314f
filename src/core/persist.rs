use crate::adapters::sqlite::Store;
use crate::domain::model::{MtgSet, SetRow};
use crate::utils::error::Result;
use tracing::{Instrument, Span};

/// Appends sets to the `mtg_set` table.
///
/// There is no existence check: writing the same sets twice stores them twice.
pub struct SetWriter {
    store: Store,
    span: Span,
}

impl SetWriter {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            span: tracing::info_span!("writer"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn write(&self, sets: &[MtgSet]) -> Result<usize> {
        let rows: Vec<SetRow> = sets.iter().map(MtgSet::to_row).collect();
        async move {
            tracing::info!("Inserting {} sets into the database", rows.len());
            let inserted = self.store.insert_set_rows(&rows).await?;
            tracing::info!("Inserted {} sets", inserted);
            Ok(inserted)
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SetType;

    fn set(code: &str, set_type: SetType) -> MtgSet {
        MtgSet {
            code: code.to_string(),
            name: format!("Set {}", code),
            set_type,
            digital: false,
            search_uri: format!("https://api.scryfall.com/cards/search?q=e%3A{}", code),
            released_at: "2019-05-03".to_string(),
            card_count: 264,
            icon_svg_uri: format!("https://svgs.scryfall.io/sets/{}.svg", code),
        }
    }

    #[tokio::test]
    async fn test_write_stores_rows_in_column_order() {
        let store = Store::open_in_memory().unwrap();
        store.ensure_schema().await.unwrap();
        let writer = SetWriter::new(store.clone());

        let sets = vec![set("war", SetType::Expansion), set("c19", SetType::Commander)];
        assert_eq!(writer.write(&sets).await.unwrap(), 2);

        let rows = store
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name, code, set_type, digital, released_at, card_count, search_uri, icon_uri
                     FROM mtg_set ORDER BY id",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, bool>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, i64>(5)?,
                        ))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .unwrap();

        assert_eq!(
            rows[1],
            (
                "Set c19".to_string(),
                "c19".to_string(),
                "commander".to_string(),
                false,
                "2019-05-03".to_string(),
                264
            )
        );
    }

    #[tokio::test]
    async fn test_rewriting_duplicates_rows() {
        let store = Store::open_in_memory().unwrap();
        store.ensure_schema().await.unwrap();
        let writer = SetWriter::new(store.clone());
        let sets = vec![set("war", SetType::Expansion)];

        writer.write(&sets).await.unwrap();
        writer.write(&sets).await.unwrap();

        assert_eq!(store.set_rows().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_write_is_a_no_op() {
        let store = Store::open_in_memory().unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(SetWriter::new(store.clone()).write(&[]).await.unwrap(), 0);
        assert!(store.set_rows().await.unwrap().is_empty());
    }
}
