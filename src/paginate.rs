use schemars::JsonSchema;
use serde::Serialize;

/// Number of items on every page of every list view.
pub const PAGE_SIZE: i64 = 10;

/// Parses a requested page number. Absent or non-numeric values mean the first page.
pub fn page_number(raw: Option<&str>) -> i64 {
	raw.and_then(|raw| raw.trim().parse().ok()).unwrap_or(1)
}

/// Resolves a requested page against the size of the collection.
///
/// Requests below the first page land on the first page, requests past the
/// end land on the last one. An empty collection still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
	pub count: i64,
	pub number: i64,
	pub num_pages: i64,
}

impl Paginator {
	pub fn new(count: i64, requested: i64) -> Self {
		let count = count.max(0);
		let num_pages = ((count + PAGE_SIZE - 1) / PAGE_SIZE).max(1);

		Self {
			count,
			number: requested.clamp(1, num_pages),
			num_pages,
		}
	}

	pub fn offset(&self) -> i64 {
		(self.number - 1) * PAGE_SIZE
	}

	pub fn limit(&self) -> i64 {
		PAGE_SIZE
	}

	pub fn page<T>(self, items: Vec<T>) -> Page<T> {
		Page {
			items,
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			has_next: self.number < self.num_pages,
			has_previous: self.number > 1,
		}
	}
}

/// One page of an ordered result set.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The page number (1-indexed).
	pub number: i64,
	pub num_pages: i64,
	/// Total number of items across all pages.
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_page_number() {
		assert_eq!(page_number(None), 1);
		assert_eq!(page_number(Some("3")), 3);
		assert_eq!(page_number(Some("abc")), 1);
		assert_eq!(page_number(Some("")), 1);
		assert_eq!(page_number(Some("-2")), -2);
	}

	#[test]
	fn test_paginator_offset() {
		let paginator = Paginator::new(35, 1);

		assert_eq!(paginator.num_pages, 4);
		assert_eq!(paginator.offset(), 0);
		assert_eq!(paginator.limit(), PAGE_SIZE);

		assert_eq!(Paginator::new(35, 2).offset(), 10);
		assert_eq!(Paginator::new(35, 4).offset(), 30);
	}

	#[test]
	fn test_paginator_clamps() {
		assert_eq!(Paginator::new(35, 0).number, 1);
		assert_eq!(Paginator::new(35, -7).number, 1);
		assert_eq!(Paginator::new(35, 99).number, 4);
		assert_eq!(Paginator::new(20, 3).number, 2);
	}

	#[test]
	fn test_empty_collection_has_one_page() {
		let page = Paginator::new(0, 5).page(Vec::<i64>::new());

		assert_eq!(page.number, 1);
		assert_eq!(page.num_pages, 1);
		assert!(page.items.is_empty());
		assert!(!page.has_next);
		assert!(!page.has_previous);
	}

	#[test]
	fn test_page_flags() {
		let first = Paginator::new(13, 1).page(vec![0; 10]);

		assert!(first.has_next);
		assert!(!first.has_previous);

		let last = Paginator::new(13, 2).page(vec![0; 3]);

		assert!(!last.has_next);
		assert!(last.has_previous);
		assert_eq!(last.count, 13);
	}
}
