use std::time::Duration;

use axum::body::Bytes;
use moka::future::Cache;

/// Key of the rendered global post list. It does not depend on the query string.
pub const INDEX_PAGE: &str = "index_page";

/// A time-bounded cache of rendered response bodies.
///
/// Entries expire on their own after the configured time-to-live; writers that
/// change a cached view call [`PageCache::invalidate`] to drop it early.
#[derive(Clone)]
pub struct PageCache {
	inner: Cache<&'static str, Bytes>,
}

impl PageCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			inner: Cache::builder().max_capacity(64).time_to_live(ttl).build(),
		}
	}

	pub async fn get(&self, key: &'static str) -> Option<Bytes> {
		self.inner.get(&key).await
	}

	pub async fn insert(&self, key: &'static str, body: Bytes) {
		self.inner.insert(key, body).await;
	}

	pub async fn invalidate(&self, key: &'static str) {
		tracing::debug!(key, "invalidating cached page");

		self.inner.invalidate(&key).await;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_insert_and_invalidate() {
		let cache = PageCache::new(Duration::from_secs(60));

		assert!(cache.get(INDEX_PAGE).await.is_none());

		cache.insert(INDEX_PAGE, Bytes::from_static(b"first")).await;
		cache.insert(INDEX_PAGE, Bytes::from_static(b"second")).await;

		assert_eq!(cache.get(INDEX_PAGE).await.unwrap(), "second");

		cache.invalidate(INDEX_PAGE).await;

		assert!(cache.get(INDEX_PAGE).await.is_none());
	}

	#[tokio::test]
	async fn test_entries_expire() {
		let cache = PageCache::new(Duration::from_millis(50));

		cache.insert(INDEX_PAGE, Bytes::from_static(b"page")).await;
		assert!(cache.get(INDEX_PAGE).await.is_some());

		tokio::time::sleep(Duration::from_millis(120)).await;

		assert!(cache.get(INDEX_PAGE).await.is_none());
	}

	#[tokio::test]
	async fn test_clones_share_entries() {
		let cache = PageCache::new(Duration::from_secs(60));
		let clone = cache.clone();

		clone.insert(INDEX_PAGE, Bytes::from_static(b"page")).await;

		assert!(cache.get(INDEX_PAGE).await.is_some());
	}
}
