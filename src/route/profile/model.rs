pub use crate::route::model::{PageQuery, UsernameInput};

use schemars::JsonSchema;
use serde::Serialize;

use crate::{paginate::Page, route::auth::model::User, route::post::model::PostView};

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfilePage {
	pub author: User,
	/// How many posts the author has written in total.
	pub post_count: i64,
	/// Whether the viewer follows the author. Always false for anonymous viewers.
	pub following: bool,
	pub page: Page<PostView>,
}
