use aide::axum::ApiRouter;

use crate::AppState;

pub mod auth;
pub mod docs;
pub mod group;
pub mod model;
pub mod post;
pub mod profile;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.merge(post::routes())
		.merge(group::routes())
		.merge(profile::routes())
		.nest("/auth", auth::routes())
}
