use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Attribute, ItemFn, ItemStruct, LitBool, LitStr};

const DEFAULT_RENAME: &str = "snake_case";

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<LitBool>,
}

#[derive(Default)]
struct SerdeFlags {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

/// `#[api_model]`: wire DTO with serde + `ToSchema` derives and strict decoding.
pub fn expand_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let args = match parse_model_args(args) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error(),
    };
    let serde = match serde_flags(&input.attrs) {
        Ok(flags) => flags,
        Err(err) => return err.to_compile_error(),
    };

    let derives = missing_derives(&input.attrs);
    let rename = match rename_attr(args.rename_all, serde.rename_all.as_ref()) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error(),
    };

    let deny = args.deny_unknown_fields.as_ref().is_none_or(LitBool::value);
    let deny = match (deny, serde.deny_unknown_fields) {
        (true, false) => quote! { #[serde(deny_unknown_fields)] },
        (false, true) => {
            return syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set via serde; remove it before disabling",
            )
            .to_compile_error();
        },
        _ => quote! {},
    };

    quote! {
        #derives
        #rename
        #deny
        #input
    }
}

/// `#[api_handler(..)]`: forwards its arguments to `utoipa::path`.
pub fn expand_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;
    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

fn parse_model_args(args: TokenStream) -> syn::Result<ModelArgs> {
    let mut parsed = ModelArgs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("rename_all") {
            if parsed.rename_all.is_some() {
                return Err(meta.error("duplicate argument"));
            }
            parsed.rename_all = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("deny_unknown_fields") {
            if parsed.deny_unknown_fields.is_some() {
                return Err(meta.error("duplicate argument"));
            }
            parsed.deny_unknown_fields = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported argument; expected rename_all or deny_unknown_fields"))
        }
    });
    syn::parse::Parser::parse2(parser, args)?;
    Ok(parsed)
}

fn serde_flags(attrs: &[Attribute]) -> syn::Result<SerdeFlags> {
    let mut flags = SerdeFlags::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                flags.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                flags.deny_unknown_fields = true;
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(flags)
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let present = derived_names(attrs);
    let wanted: Vec<TokenStream> = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ]
    .into_iter()
    .filter(|(name, _)| !present.contains(*name))
    .map(|(_, path)| path)
    .collect();

    if wanted.is_empty() { quote! {} } else { quote! { #[derive(#(#wanted),*)] } }
}

fn derived_names(attrs: &[Attribute]) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                names.insert(last.ident.to_string());
            }
            Ok(())
        });
    }
    names
}

fn rename_attr(requested: Option<LitStr>, existing: Option<&LitStr>) -> syn::Result<TokenStream> {
    let requested = requested.unwrap_or_else(|| LitStr::new(DEFAULT_RENAME, Span::call_site()));
    match existing {
        Some(existing) if existing.value() != requested.value() => Err(syn::Error::new_spanned(
            existing,
            "conflicting serde rename_all; remove it or pass the same value to api_model",
        )),
        Some(_) => Ok(quote! {}),
        None => Ok(quote! { #[serde(rename_all = #requested)] }),
    }
}
