//! Lazy paginated execution of query specifications.
//!
//! A [`Cursor`] materializes one [`Query`] against the server: it fetches
//! pages on demand, caches the most recent page, and exposes sequential and
//! random-access views over the result set. Cursors are forward-state
//! objects owned by a single traversal; they are not meant to be shared.

use crate::errors::{PdkResult, RequestError, ResponseError};
use crate::query::Query;
use crate::types::{PagePayload, PageResponse, Record};
use std::ops::Range;
use tracing::{debug, warn};

/// A paginated cursor over one query's result set.
pub struct Cursor {
    query: Query,
    total_count: Option<u64>,
    page_size: u64,
    page_index: u64,
    current_page: Option<Vec<Record>>,
    offset: u64,
}

impl Cursor {
    pub(crate) fn new(query: Query) -> Self {
        let page_size = query.page_size;
        Self {
            query,
            total_count: None,
            page_size,
            page_index: 0,
            current_page: None,
            offset: 0,
        }
    }

    /// Fetches one page from the server and replaces the cached window.
    ///
    /// The server response also carries the total match count and the page
    /// size in effect, both of which are cached here. On failure the error
    /// propagates and no cached state changes.
    pub async fn load_page(&mut self, page_number: u64) -> PdkResult<()> {
        let token = self.query.session.bearer_token()?;

        let payload = PagePayload {
            token: &token,
            page_size: self.page_size,
            page_index: page_number,
            filters: self.query.serialized_filters()?,
            excludes: self.query.serialized_excludes()?,
            order_by: self.query.serialized_order_bys()?,
        };

        let response: PageResponse = self
            .query
            .session
            .executor
            .execute_form(self.query.resource.endpoint(), &payload)
            .await?;

        if response.page_size == 0 {
            return Err(ResponseError::UnexpectedFormat(
                "server reported a page size of zero".to_string(),
            )
            .into());
        }

        debug!(
            resource = ?self.query.resource,
            page_index = response.page_index,
            count = response.count,
            "loaded result page"
        );

        self.total_count = Some(response.count);
        self.page_index = response.page_index;
        self.page_size = response.page_size;
        self.current_page = Some(response.matches);

        Ok(())
    }

    /// Returns the total number of matches, fetching page zero if the count
    /// is not yet known. The count is cached; repeated calls do not fetch.
    pub async fn count(&mut self) -> PdkResult<u64> {
        if self.total_count.is_none() {
            self.load_page(0).await?;
        }

        Ok(self.total_count.unwrap_or(0))
    }

    /// Yields the next record in sequence, or `None` at the end of the
    /// result set.
    ///
    /// Crossing a page boundary fetches the next page; within a page no
    /// request is made.
    pub async fn next(&mut self) -> PdkResult<Option<Record>> {
        if self.current_page.is_none() {
            self.load_page(0).await?;
        }

        let total = self.total_count.unwrap_or(0);
        if self.offset >= total {
            return Ok(None);
        }

        let target_page = self.offset / self.page_size;
        if target_page != self.page_index {
            self.load_page(target_page).await?;
        }

        let slot = (self.offset % self.page_size) as usize;
        let record = self
            .current_page
            .as_ref()
            .and_then(|page| page.get(slot))
            .cloned()
            .ok_or_else(|| {
                ResponseError::UnexpectedFormat(format!(
                    "server page {} is missing item at offset {}",
                    self.page_index, slot
                ))
            })?;

        self.offset += 1;

        Ok(Some(record))
    }

    /// Returns the record at `index`.
    ///
    /// Negative indices are relative to the total count, so `item_at(-1)` is
    /// the last record. Access within the cached page returns directly;
    /// anything else fetches the containing page.
    pub async fn item_at(&mut self, index: i64) -> PdkResult<Record> {
        if self.current_page.is_none() {
            self.load_page(0).await?;
        }

        let total = self.total_count.unwrap_or(0) as i64;
        let absolute = if index < 0 { total + index } else { index };

        if absolute < 0 || absolute >= total {
            return Err(RequestError::OutOfRange(format!(
                "index {} out of range for {} matches",
                index, total
            ))
            .into());
        }

        let absolute = absolute as u64;
        let window_start = self.page_index * self.page_size;
        let window_end = window_start + self.page_size;

        if !(window_start..window_end).contains(&absolute) {
            self.load_page(absolute / self.page_size).await?;
        }

        let slot = (absolute % self.page_size) as usize;
        self.current_page
            .as_ref()
            .and_then(|page| page.get(slot))
            .cloned()
            .ok_or_else(|| {
                ResponseError::UnexpectedFormat(format!(
                    "server page {} is missing item at offset {}",
                    self.page_index, slot
                ))
                .into()
            })
    }

    /// Returns the first record.
    pub async fn first(&mut self) -> PdkResult<Record> {
        self.item_at(0).await
    }

    /// Returns the last record.
    pub async fn last(&mut self) -> PdkResult<Record> {
        self.item_at(-1).await
    }

    /// Range access is not supported by the PDK wire protocol.
    ///
    /// The request is logged and an empty result returned rather than
    /// raising; this mirrors the server API's known limitation.
    pub fn slice(&self, range: Range<u64>) -> Vec<Record> {
        warn!(
            start = range.start,
            end = range.end,
            "slice access is not supported; returning empty result"
        );
        Vec::new()
    }

    /// Drains the remaining records into a vector.
    pub async fn collect_all(&mut self) -> PdkResult<Vec<Record>> {
        let mut records = Vec::new();

        while let Some(record) = self.next().await? {
            records.push(record);
        }

        Ok(records)
    }

    /// Returns the cached total count, if a page has been fetched.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Returns the index of the cached page.
    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// Returns the page size in effect.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{connected_test_client, MockTransport};
    use crate::query::ClauseSet;
    use std::sync::Arc;

    const PAGE_SIZE: u64 = 100;

    fn paged_client(total: u64) -> (crate::client::PdkClient, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::serving_items(total));
        let client = connected_test_client(transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn test_sequential_iteration_yields_all_items_in_order() {
        let (client, transport) = paged_client(7);
        let query = client.query_data_points().with_page_size(3);

        let mut cursor = query.items().await.unwrap();
        let mut seen = Vec::new();
        while let Some(record) = cursor.next().await.unwrap() {
            seen.push(record["pk"].as_u64().unwrap());
        }

        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6]);
        // Pages 0, 1 and 2 fetched exactly once each.
        assert_eq!(transport.request_count(), 3);

        // The cursor is single-pass; a further call keeps returning None.
        assert!(cursor.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restarting_iteration_refetches_from_page_zero() {
        let (client, transport) = paged_client(4);
        let query = client.query_data_points().with_page_size(2);

        let first_pass = query.collect_all().await.unwrap();
        let second_pass = query.collect_all().await.unwrap();

        assert_eq!(first_pass.len(), 4);
        assert_eq!(second_pass.len(), 4);
        assert_eq!(transport.request_count(), 4);
    }

    #[tokio::test]
    async fn test_count_is_cached_after_one_fetch() {
        let (client, transport) = paged_client(42);
        let query = client.query_data_points().with_page_size(PAGE_SIZE);

        let mut cursor = query.cursor();
        assert_eq!(cursor.count().await.unwrap(), 42);
        assert_eq!(cursor.count().await.unwrap(), 42);
        assert_eq!(cursor.count().await.unwrap(), 42);

        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_item_at_matches_sequential_order() {
        let (client, _transport) = paged_client(10);
        let query = client.query_data_points().with_page_size(4);

        let sequential = query.collect_all().await.unwrap();

        let mut cursor = query.cursor();
        for (i, expected) in sequential.iter().enumerate() {
            let record = cursor.item_at(i as i64).await.unwrap();
            assert_eq!(&record, expected);
        }

        let last = cursor.item_at(-1).await.unwrap();
        assert_eq!(&last, sequential.last().unwrap());
    }

    #[tokio::test]
    async fn test_item_at_fetches_only_outside_cached_window() {
        let (client, transport) = paged_client(1000);
        let query = client.query_data_points().with_page_size(PAGE_SIZE);

        let mut cursor = query.cursor();

        // Page 0 to learn the count, then page 2 for the item itself.
        let record = cursor.item_at(250).await.unwrap();
        assert_eq!(record["pk"].as_u64().unwrap(), 250);
        assert_eq!(cursor.page_index(), 2);
        assert_eq!(transport.request_count(), 2);

        // Adjacent index sits in the cached window; no request is made.
        let record = cursor.item_at(251).await.unwrap();
        assert_eq!(record["pk"].as_u64().unwrap(), 251);
        assert_eq!(transport.request_count(), 2);

        let record = cursor.item_at(250).await.unwrap();
        assert_eq!(record["pk"].as_u64().unwrap(), 250);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_negative_index_resolves_against_total() {
        let (client, _transport) = paged_client(12);
        let query = client.query_data_points().with_page_size(5);

        let mut cursor = query.cursor();
        let last = cursor.item_at(-1).await.unwrap();
        let eleventh = cursor.item_at(11).await.unwrap();
        assert_eq!(last, eleventh);

        assert_eq!(query.first().await.unwrap()["pk"].as_u64().unwrap(), 0);
        assert_eq!(query.last().await.unwrap()["pk"].as_u64().unwrap(), 11);
    }

    #[tokio::test]
    async fn test_item_at_out_of_range() {
        let (client, _transport) = paged_client(3);
        let query = client.query_data_points().with_page_size(5);

        let mut cursor = query.cursor();
        assert!(cursor.item_at(3).await.is_err());
        assert!(cursor.item_at(-4).await.is_err());
    }

    #[tokio::test]
    async fn test_slice_returns_empty_and_does_not_error() {
        let (client, transport) = paged_client(50);
        let query = client.query_data_points();

        let cursor = query.cursor();
        assert!(cursor.slice(5..15).is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let (client, _transport) = paged_client(0);
        let query = client.query_data_points();

        let mut cursor = query.items().await.unwrap();
        assert_eq!(cursor.total_count(), Some(0));
        assert!(cursor.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filters_reach_the_wire() {
        let (client, transport) = paged_client(1);
        let query = client
            .query_data_points()
            .filter(ClauseSet::new().with("generator_id", "pdk-location"))
            .order_by(["-recorded"]);

        query.count().await.unwrap();

        let request = transport.last_request().unwrap();
        let fields: std::collections::HashMap<String, String> =
            serde_urlencoded::from_str(&request.body).unwrap();

        // The pre-seeded recorded__lte clause and the caller's clause travel
        // as separate sets within one JSON document.
        assert!(fields["filters"].contains("recorded__lte"));
        assert!(fields["filters"].contains(r#"{"generator_id":"pdk-location"}"#));
        assert_eq!(fields["order_by"], r#"[["-recorded"]]"#);
        assert_eq!(fields["token"], crate::mocks::TEST_TOKEN);
    }
}
