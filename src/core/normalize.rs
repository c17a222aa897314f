use crate::domain::model::{MtgSet, PageResponse, SetType, UNKNOWN, UNKNOWN_CARD_COUNT};
use serde_json::Value;

/// Decodes one raw set object. Each field falls back to its own default when it is
/// absent, null or of the wrong JSON type, so a single bad field never drops the record.
pub fn normalize_set(raw: &Value) -> MtgSet {
    MtgSet {
        code: text_field(raw, "code"),
        name: text_field(raw, "name"),
        set_type: raw
            .get("set_type")
            .and_then(Value::as_str)
            .map(SetType::from_tag)
            .unwrap_or(SetType::Unknown),
        digital: raw.get("digital").and_then(Value::as_bool).unwrap_or(false),
        search_uri: text_field(raw, "search_uri"),
        released_at: text_field(raw, "released_at"),
        card_count: raw
            .get("card_count")
            .and_then(Value::as_i64)
            .unwrap_or(UNKNOWN_CARD_COUNT),
        icon_svg_uri: text_field(raw, "icon_svg_uri"),
    }
}

fn text_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Flattens the `data` array of every page, keeping page order then item order.
pub fn normalize_pages(pages: &PageResponse) -> Vec<MtgSet> {
    let mut sets = Vec::new();

    for (index, page) in pages.pages.iter().enumerate() {
        match page.get("data").and_then(Value::as_array) {
            Some(items) => sets.extend(items.iter().map(normalize_set)),
            None => {
                tracing::warn!("Page {} has no data array, skipping it", index + 1);
            }
        }
    }

    sets
}
