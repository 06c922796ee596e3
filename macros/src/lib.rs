mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the original function with the suffix `_docs`.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates a new struct `XInput` holding the fields a user submits for the model.
/// Fields with #[serde(skip_deserializing)] or #[serde(skip)] are left out, all
/// other fields are included verbatim (including attributes). Row-only derives
/// such as `sqlx::FromRow` and #[sqlx(..)] attributes are not carried over.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
