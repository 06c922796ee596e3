pub use crate::route::model::{IdInput, PageQuery};

use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error, route::group::model::Group, route::model::not_blank};

/// Number of characters of a post's text used as its title.
pub const TITLE_LENGTH: usize = 30;

/// Builds a query over [`PostView`] rows, appending the given SQL fragments
/// (filters, ordering, limits) after the joins.
macro_rules! post_view_query {
	($($tail:literal),* $(,)?) => {
		concat!(
			r#"
				SELECT
					p.id, p.text, p.pub_date, p.image, p.author_id,
					u.username AS author,
					p.group_id, g.slug AS group_slug, g.title AS group_title
				FROM post p
				JOIN "user" u ON u.id = p.author_id
				LEFT JOIN "group" g ON g.id = p.group_id
			"#,
			$($tail),*
		)
	};
}

pub(crate) use post_view_query;

/// A single post, written by a user and optionally filed under a group.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The body of the post.
	#[serde(default)]
	#[validate(custom(function = "not_blank"))]
	pub text: String,
	/// The publication time of the post.
	#[serde(skip_deserializing)]
	pub pub_date: chrono::DateTime<chrono::Utc>,
	/// The user that wrote the post. Never changes after creation.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The group the post belongs to, if any.
	pub group_id: Option<Uuid>,
	/// Path of the attached image, relative to the media root.
	#[validate(length(min = 1, max = 255))]
	pub image: Option<String>,
}

/// A post joined with the names needed to display it.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostView {
	pub id: Uuid,
	pub text: String,
	pub pub_date: chrono::DateTime<chrono::Utc>,
	pub image: Option<String>,
	pub author_id: Uuid,
	/// Username of the author.
	pub author: String,
	pub group_id: Option<Uuid>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
}

/// A comment left on a post. Comments cannot be edited.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	#[serde(skip_deserializing)]
	pub id: Uuid,
	#[serde(skip_deserializing)]
	pub post_id: Uuid,
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The body of the comment.
	#[serde(default)]
	#[validate(custom(function = "not_blank"))]
	pub text: String,
	#[serde(skip_deserializing)]
	pub created: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct CommentView {
	pub id: Uuid,
	pub text: String,
	pub created: chrono::DateTime<chrono::Utc>,
	/// Username of the author.
	pub author: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetail {
	pub post: PostView,
	/// The first characters of the post, used as the page title.
	pub title: String,
	/// How many posts the author has written in total.
	pub author_posts: i64,
	/// Every comment on the post, oldest first.
	pub comments: Vec<CommentView>,
}

/// The post form, as shown for a new post or for editing an existing one.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostForm {
	pub is_edit: bool,
	/// The post being edited.
	pub post: Option<Post>,
	/// The submitted values, when the form is shown again after an invalid submission.
	pub input: Option<PostInput>,
	/// Groups the post can be filed under.
	pub groups: Vec<Group>,
	pub errors: Vec<error::Message<'static>>,
}

/// The title of a post: its first [`TITLE_LENGTH`] characters.
pub fn title(text: &str) -> String {
	text.chars().take(TITLE_LENGTH).collect()
}
