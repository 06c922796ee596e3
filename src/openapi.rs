use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const GROUP: &str = "Group";
	pub const PROFILE: &str = "Profile";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Yatube")
		.summary("A blogging platform with groups, comments and author subscriptions")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Registration and sessions".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Posts and comments".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::GROUP.into(),
			description: Some("Post groups".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::PROFILE.into(),
			description: Some("Author profiles and subscriptions".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse::new(
				error::Message::new("unknown_post")
					.detail("post", "00000000-0000-0000-0000-000000000000")
					.into_vec(),
			))
		})
}
