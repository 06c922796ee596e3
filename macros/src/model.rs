use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Meta, Token};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Derives that only make sense on the stored row, never on submitted input.
const ROW_ONLY_DERIVES: &[&str] = &["FromRow"];

fn is_serde_skipped(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
	})
}

/// Rewrites `#[derive(..)]` lists without row-only derives and drops
/// `#[sqlx(..)]` attributes. Everything else is forwarded verbatim.
fn input_attrs(attrs: &[syn::Attribute]) -> syn::Result<Vec<proc_macro2::TokenStream>> {
	let mut out = Vec::with_capacity(attrs.len());

	for attr in attrs {
		if attr.path().is_ident("sqlx") {
			continue;
		}

		if attr.path().is_ident("derive") {
			let paths =
				attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)?;
			let kept = paths.into_iter().filter(|path| {
				path.segments
					.last()
					.map_or(true, |segment| !ROW_ONLY_DERIVES.iter().any(|d| segment.ident == *d))
			});

			out.push(quote!(#[derive(#(#kept),*)]));
			continue;
		}

		out.push(attr.to_token_stream());
	}

	Ok(out)
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let input_ident = format_ident!("{}Input", ident);

	let attrs = match input_attrs(&receiver.attrs) {
		Ok(attrs) => attrs,
		Err(e) => return e.into_compile_error().into(),
	};

	let fields = receiver.data.take_struct().expect("expected struct");
	let mut input_fields = Vec::new();

	for field in fields.iter() {
		let Some(ident) = field.ident.as_ref() else {
			continue;
		};

		// Server-assigned columns are not part of the submitted form
		if field.attrs.iter().any(is_serde_skipped) {
			continue;
		}

		let ty = &field.ty;
		let field_vis = &field.vis;
		let field_attrs = match input_attrs(&field.attrs) {
			Ok(attrs) => attrs,
			Err(e) => return e.into_compile_error().into(),
		};

		input_fields.push(quote! {
			#(#field_attrs)*
			#field_vis #ident: #ty,
		});
	}

	quote! {
		#input

		#(#attrs)*
		#vis struct #input_ident #generics {
			#(
				#input_fields
			)*
		}
	}
	.into()
}
