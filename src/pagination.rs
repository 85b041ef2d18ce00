//! Generic traversal of paginated collections.
//!
//! Every "list" endpoint of the Inter APIs is paginated, each family with its
//! own wire field names. Resource clients normalize their wire pages into
//! [`Page`] and hand a single-page fetch closure to [`collect_all`], which
//! owns the (historically copy-pasted, historically off-by-one) loop.

use crate::error::Error;
use std::future::Future;

/// One page of a paginated collection, normalized across API families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items of this page, in server order.
    pub items: Vec<T>,
    /// Zero-based index of this page.
    pub page_number: u32,
    /// Total number of pages in the collection.
    pub total_pages: u32,
    /// Total number of items across all pages.
    pub total_elements: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
}

/// Walks a paginated collection by repeatedly calling `fetch_page` with
/// increasing page indices, and returns all items in page order.
///
/// The first fetch always happens; the walk stops as soon as the next index
/// reaches the `total_pages` reported by the page just fetched, so a server
/// answering `total_pages` of 0 or 1 is consulted exactly once. `total_pages`
/// is assumed stable for the duration of one traversal.
pub async fn collect_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut items = Vec::new();
    let mut page_number = 0;

    loop {
        let page = fetch_page(page_number).await?;
        items.extend(page.items);

        page_number += 1;
        if page_number >= page.total_pages {
            break;
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn page(items: Vec<u32>, page_number: u32, total_pages: u32) -> Page<u32> {
        Page {
            items,
            page_number,
            total_pages,
            total_elements: 5,
            first: page_number == 0,
            last: page_number + 1 >= total_pages,
        }
    }

    #[tokio::test]
    async fn collects_every_page_in_order() {
        let fetches = AtomicU32::new(0);
        let items = collect_all(|n| {
            fetches.fetch_add(1, Ordering::SeqCst);
            async move {
                let page = match n {
                    0 => page(vec![1, 2], 0, 3),
                    1 => page(vec![3, 4], 1, 3),
                    2 => page(vec![5], 2, 3),
                    _ => panic!("fetched page {} past the end", n),
                };
                Ok(page)
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn a_single_page_collection_is_fetched_exactly_once() {
        let fetches = AtomicU32::new(0);
        let items = collect_all(|n| {
            fetches.fetch_add(1, Ordering::SeqCst);
            async move { Ok(page(vec![7, 8], n, 1)) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![7, 8]);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_total_pages_still_terminates_after_one_fetch() {
        let fetches = AtomicU32::new(0);
        let items = collect_all(|n| {
            fetches.fetch_add(1, Ordering::SeqCst);
            async move { Ok(page(vec![], n, 0)) }
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_failing_page_aborts_the_walk() {
        let err = collect_all(|n| async move {
            if n == 0 {
                Ok(page(vec![1, 2], 0, 3))
            } else {
                Err(Error::Api(ApiError {
                    title: "Nada encontrado".to_string(),
                    detail: None,
                    timestamp: None,
                    status: 404,
                    violations: vec![],
                }))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Api(e) if e.status == 404));
    }
}
