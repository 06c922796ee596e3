use std::borrow::Cow;

use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::paginate;

/// Rejects text that is empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		let mut error = ValidationError::new("required");
		error.message = Some(Cow::Borrowed("This field is required."));

		return Err(error);
	}

	Ok(())
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PageQuery {
	/// The page number to return (1-indexed). Missing or malformed numbers
	/// return the first page, numbers past the end return the last page.
	pub page: Option<String>,
}

impl PageQuery {
	pub fn number(&self) -> i64 {
		paginate::page_number(self.page.as_deref())
	}
}

/// An id taken from the path as written, so that ids which are not UUIDs can
/// be answered as missing rather than malformed.
#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: String,
}

impl IdInput {
	pub fn uuid(&self) -> Option<Uuid> {
		Uuid::parse_str(&self.id).ok()
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UsernameInput {
	pub username: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SlugInput {
	pub slug: String,
}
