//! Cursor-based pagination.
//!
//! List endpoints return a page of items plus an opaque cursor that the
//! client echoes back to fetch the next page. Cursors encode the sort key
//! of the first item beyond the page; the next fetch starts at that key,
//! so a page costs one query for `page_size + 1` rows.

use base64::{Engine, engine::general_purpose::URL_SAFE as BASE64_ENGINE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{future::Future, marker::PhantomData};

use crate::error::{AppError, AppResult};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    /// Items in this page, at most `page_size` of them.
    pub items: Vec<T>,
    /// Cursor for the next page, absent on the last page.
    pub next_cursor: Option<String>,
}

/// Drives cursor pagination over any keyed fetch function.
///
/// `fetch_fn` loads up to `limit` items starting at the given key
/// (inclusive) in the backing store's sort order. `key_fn` extracts the
/// sort key from an item. The paginator fetches one extra item per page to
/// decide whether a next cursor exists, and never exposes raw keys to
/// clients.
pub struct Paginator<F, C, K, Fut, T>
where
    F: Fn(usize, Option<K>) -> Fut,
    C: Fn(T) -> K,
    Fut: Future<Output = AppResult<Vec<T>>>,
    K: Serialize + DeserializeOwned,
{
    page_size: usize,
    fetch_fn: F,
    key_fn: C,
    _key_type: PhantomData<K>,
    _item_type: PhantomData<T>,
}

impl<F, C, K, Fut, T> Paginator<F, C, K, Fut, T>
where
    F: Fn(usize, Option<K>) -> Fut,
    C: Fn(T) -> K,
    Fut: Future<Output = AppResult<Vec<T>>>,
    K: Serialize + DeserializeOwned,
{
    /// Create a paginator with the given page size and fetch/key functions.
    pub const fn new(page_size: usize, fetch_fn: F, key_fn: C) -> Self {
        Self {
            page_size,
            fetch_fn,
            key_fn,
            _key_type: PhantomData,
            _item_type: PhantomData,
        }
    }

    /// Fetch one page, starting at the position encoded in `cursor`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadCursor`] if the cursor is not one previously
    /// issued by this paginator, or any error from the fetch function.
    pub async fn fetch_page(&self, cursor: Option<String>) -> AppResult<CursorPage<T>> {
        let decoded_cursor = match cursor {
            Some(encoded) => Some(decode_cursor(&encoded)?),
            None => None,
        };

        // Fetch one extra item to determine whether a next page exists.
        let fetch_size = self.page_size + 1;
        let mut items = (self.fetch_fn)(fetch_size, decoded_cursor).await?;

        let next_cursor = if items.len() > self.page_size {
            items
                .pop()
                .map(|overflow| {
                    let key = (self.key_fn)(overflow);
                    encode_cursor(&key)
                })
                .transpose()?
        } else {
            None
        };

        Ok(CursorPage { items, next_cursor })
    }
}

fn encode_cursor<K: Serialize>(key: &K) -> AppResult<String> {
    let json = serde_json::to_string(key)
        .map_err(|e| AppError::Internal(format!("Failed to encode cursor: {e}")))?;
    Ok(BASE64_ENGINE.encode(json))
}

fn decode_cursor<K: DeserializeOwned>(encoded: &str) -> AppResult<K> {
    let json_bytes = BASE64_ENGINE
        .decode(encoded)
        .map_err(|_| AppError::BadCursor)?;
    let json = String::from_utf8(json_bytes).map_err(|_| AppError::BadCursor)?;
    serde_json::from_str(&json).map_err(|_| AppError::BadCursor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn window(data: &[u32], limit: usize, from: Option<u32>) -> Vec<u32> {
        data.iter()
            .copied()
            .filter(|item| from.is_none_or(|f| *item >= f))
            .take(limit)
            .collect()
    }

    macro_rules! paginator_over {
        ($data:expr, $page_size:expr) => {
            Paginator::new(
                $page_size,
                |limit, from| {
                    let data = $data.clone();
                    async move { Ok(window(&data, limit, from)) }
                },
                |item: u32| item,
            )
        };
    }

    #[tokio::test]
    async fn test_first_page_has_next_cursor() {
        let data: Vec<u32> = (1..=10).collect();
        let paginator = paginator_over!(data, 3);

        let page = paginator.fetch_page(None).await.unwrap();

        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.next_cursor.is_some());
    }

    #[tokio::test]
    async fn test_cursor_resumes_where_page_ended() {
        let data: Vec<u32> = (1..=10).collect();
        let paginator = paginator_over!(data, 3);

        let first = paginator.fetch_page(None).await.unwrap();
        let second = paginator.fetch_page(first.next_cursor).await.unwrap();

        assert_eq!(second.items, vec![4, 5, 6]);
        assert!(second.next_cursor.is_some());
    }

    #[tokio::test]
    async fn test_last_page_has_no_next_cursor() {
        let data: Vec<u32> = (1..=5).collect();
        let paginator = paginator_over!(data, 3);

        let first = paginator.fetch_page(None).await.unwrap();
        let last = paginator.fetch_page(first.next_cursor).await.unwrap();

        assert_eq!(last.items, vec![4, 5]);
        assert!(last.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_boundary_has_no_next_cursor() {
        let data: Vec<u32> = (1..=3).collect();
        let paginator = paginator_over!(data, 3);

        let page = paginator.fetch_page(None).await.unwrap();

        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_empty_source() {
        let data: Vec<u32> = Vec::new();
        let paginator = paginator_over!(data, 3);

        let page = paginator.fetch_page(None).await.unwrap();

        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_garbage_cursor_is_rejected() {
        let data: Vec<u32> = (1..=10).collect();
        let paginator = paginator_over!(data, 3);

        let result = paginator
            .fetch_page(Some("not-a-cursor!!".to_string()))
            .await;

        match result {
            Err(AppError::BadCursor) => {}
            _ => panic!("Expected BadCursor error"),
        }
    }

    #[tokio::test]
    async fn test_valid_base64_of_wrong_payload_is_rejected() {
        let data: Vec<u32> = (1..=10).collect();
        let paginator = paginator_over!(data, 3);
        let cursor = BASE64_ENGINE.encode("{\"unexpected\":true}");

        let result = paginator.fetch_page(Some(cursor)).await;

        match result {
            Err(AppError::BadCursor) => {}
            _ => panic!("Expected BadCursor error"),
        }
    }

    #[test]
    fn test_cursor_roundtrip_is_opaque() {
        let encoded = encode_cursor(&("2025-01-01T00:00:00Z".to_string(), 42_u32)).unwrap();

        assert!(!encoded.contains("2025"));
        let decoded: (String, u32) = decode_cursor(&encoded).unwrap();
        assert_eq!(decoded.1, 42);
    }
}
