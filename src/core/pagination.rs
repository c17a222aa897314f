use crate::domain::model::PageResponse;
use crate::domain::ports::PageSource;
use crate::utils::error::Result;
use serde_json::Value;

/// URL of the next page, if the body declares one.
///
/// Both `has_more: true` and a string `next_page` are required; a page that claims more
/// results without saying where they are ends the walk.
pub fn continuation(page: &Value) -> Option<&str> {
    let has_more = page.get("has_more").and_then(Value::as_bool).unwrap_or(false);
    if !has_more {
        return None;
    }
    page.get("next_page").and_then(Value::as_str)
}

/// Follows continuation links from `start_url` until the server reports no more pages.
/// Pages come back in fetch order. There is no page cap.
pub async fn walk<S: PageSource + ?Sized>(source: &S, start_url: &str) -> Result<PageResponse> {
    let mut pages = PageResponse::default();
    let mut next = Some(start_url.to_string());

    while let Some(url) = next.take() {
        let page = source.fetch_page(&url).await?;

        match continuation(&page) {
            Some(next_url) => next = Some(next_url.to_string()),
            None if page.get("has_more").and_then(Value::as_bool) == Some(true) => {
                tracing::warn!("Page {} declared more results without next_page", url);
            }
            None => {}
        }

        pages.push(page);
        tracing::debug!("Fetched page {} from {}", pages.total, url);
    }

    Ok(pages)
}
