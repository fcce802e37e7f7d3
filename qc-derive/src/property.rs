//! Implementation of the #[property] attribute macro

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    FnArg, Ident, ItemFn, Lit, Meta, MetaNameValue, Pat, Result, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Configuration for the property macro
#[derive(Default)]
struct PropertyConfig {
    iterations: Option<usize>,
    seed: Option<u64>,
}

fn int_literal<N>(value: &syn::Expr) -> Result<N>
where
    N: std::str::FromStr,
    N::Err: std::fmt::Display,
{
    if let syn::Expr::Lit(syn::ExprLit {
        lit: Lit::Int(lit_int),
        ..
    }) = value
    {
        lit_int.base10_parse()
    } else {
        Err(syn::Error::new_spanned(value, "Expected integer literal"))
    }
}

impl Parse for PropertyConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut config = PropertyConfig::default();

        if input.is_empty() {
            return Ok(config);
        }

        let punctuated: Punctuated<Meta, Token![,]> =
            input.parse_terminated(Meta::parse, Token![,])?;

        for meta in punctuated {
            match meta {
                Meta::NameValue(MetaNameValue { path, value, .. }) => {
                    let name = path.get_ident().ok_or_else(|| {
                        syn::Error::new_spanned(&path, "Expected simple identifier")
                    })?;

                    match name.to_string().as_str() {
                        "iterations" => config.iterations = Some(int_literal(&value)?),
                        "seed" => config.seed = Some(int_literal(&value)?),
                        _ => {
                            return Err(syn::Error::new_spanned(
                                name,
                                "Unknown configuration option. Supported: iterations, seed",
                            ));
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        meta,
                        "Expected name-value pairs like 'iterations = 100'",
                    ));
                }
            }
        }

        Ok(config)
    }
}

/// The single `ctx: &mut Context` parameter a property function takes
fn context_parameter(item_fn: &ItemFn) -> Result<Ident> {
    let inputs = &item_fn.sig.inputs;
    if inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            inputs,
            "Property functions take exactly one parameter: `ctx: &mut qc::Context`",
        ));
    }

    match &inputs[0] {
        FnArg::Typed(pat_type) => match pat_type.pat.as_ref() {
            Pat::Ident(pat_ident) => Ok(pat_ident.ident.clone()),
            Pat::Wild(_) => Ok(Ident::new("__qc_ctx", Span::call_site())),
            other => Err(syn::Error::new_spanned(
                other,
                "Property functions must have a simple parameter name",
            )),
        },
        arg @ FnArg::Receiver(_) => Err(syn::Error::new_spanned(
            arg,
            "Property functions cannot have self parameters",
        )),
    }
}

/// Generate test configuration from macro attributes
fn generate_test_config(config: &PropertyConfig) -> TokenStream2 {
    let iterations = match config.iterations {
        Some(iterations) => quote! { ::std::option::Option::Some(#iterations) },
        None => quote! { ::std::option::Option::None },
    };
    let seed = match config.seed {
        Some(seed) => quote! { ::std::option::Option::Some(#seed) },
        None => quote! { ::std::option::Option::None },
    };

    quote! {
        match ::qc::create_test_config_with_overrides(#iterations, #seed) {
            ::std::result::Result::Ok(config) => config,
            ::std::result::Result::Err(error) => {
                panic!("Invalid property configuration: {}", error)
            }
        }
    }
}

fn validate(item_fn: &ItemFn) -> Result<()> {
    if !item_fn.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item_fn.sig.generics,
            "Property functions cannot have generic parameters",
        ));
    }
    if let Some(asyncness) = &item_fn.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "Property functions cannot be async",
        ));
    }
    Ok(())
}

fn expand(config: &PropertyConfig, item_fn: ItemFn) -> Result<TokenStream2> {
    validate(&item_fn)?;
    context_parameter(&item_fn)?;

    let test_name = item_fn.sig.ident.clone();
    let vis = item_fn.vis.clone();
    let test_config = generate_test_config(config);

    // Keep the body as a plain function under a different name
    let body_fn_name = Ident::new(&format!("__{}_property", test_name), Span::call_site());
    let mut body_fn = item_fn;
    body_fn.sig.ident = body_fn_name.clone();
    let (test_attrs, body_attrs): (Vec<_>, Vec<_>) = body_fn
        .attrs
        .drain(..)
        .filter(|attr| !attr.path().is_ident("test"))
        .partition(|attr| {
            ["doc", "should_panic", "ignore"]
                .iter()
                .any(|name| attr.path().is_ident(name))
        });
    body_fn.attrs = body_attrs;

    Ok(quote! {
        #[allow(dead_code)]
        #body_fn

        #(#test_attrs)*
        #[test]
        #vis fn #test_name() {
            let config = #test_config;
            let result = ::qc::check_with_config(
                |ctx: &mut ::qc::Context| #body_fn_name(ctx),
                config,
            );
            if let ::std::result::Result::Err(failure) = result {
                panic!("{}", ::qc::TestRunner::create_panic_message(&failure));
            }
        }
    })
}

/// Generate the property test implementation
pub fn property_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let config = parse_macro_input!(args as PropertyConfig);
    let item_fn = parse_macro_input!(input as ItemFn);

    match expand(&config, item_fn) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
