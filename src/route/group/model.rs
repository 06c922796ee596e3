pub use crate::route::model::{PageQuery, SlugInput};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{paginate::Page, route::model::not_blank, route::post::model::PostView};

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
	if !slug
		.chars()
		.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
	{
		return Err(ValidationError::new(
			"slug may only contain letters, numbers, hyphens and underscores",
		));
	}

	Ok(())
}

/// A named category that posts can be filed under.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Group {
	#[serde(skip_deserializing)]
	pub id: Uuid,
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// The identifier of the group in URLs.
	#[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
	pub slug: String,
	#[validate(custom(function = "not_blank"))]
	pub description: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupPage {
	pub group: Group,
	pub page: Page<PostView>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	#[test]
	fn test_group_input_slug() {
		let mut input = GroupInput {
			title: "Classics".into(),
			slug: "classics_19-th".into(),
			description: "Old books".into(),
		};

		assert!(input.validate().is_ok());

		input.slug = "not a slug".into();
		assert!(input.validate().is_err());

		input.slug = String::new();
		assert!(input.validate().is_err());
	}
}
