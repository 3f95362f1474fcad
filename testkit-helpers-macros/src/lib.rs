//! Procedural macros for testkit-helpers
//!
//! This crate provides the `#[testkit_helpers::synchronize]` attribute macro,
//! which turns an `async fn` into a blocking `fn` with the same signature.
//!
//! # Example
//!
//! ```rust,ignore
//! #[testkit_helpers::synchronize]
//! async fn fetch(x: i32) -> i32 {
//!     if x == 5 { 10 } else { 0 }
//! }
//!
//! assert_eq!(fetch(5), 10);
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Ident, ItemFn, Lit, Token,
};

/// Configuration options for the synchronize macro.
#[derive(Default)]
struct BridgeArgs {
    /// Which async runtime to use ("tokio" or "smol")
    backend: Option<String>,
    /// Flavor for tokio runtime ("current_thread" or "multi_thread")
    flavor: Option<String>,
    /// Worker count, implies "multi_thread"
    worker_threads: Option<usize>,
}

impl Parse for BridgeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = BridgeArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let lit: Lit = input.parse()?;

            match (ident.to_string().as_str(), lit) {
                ("backend", Lit::Str(s)) => args.backend = Some(s.value()),
                ("flavor", Lit::Str(s)) => args.flavor = Some(s.value()),
                ("worker_threads", Lit::Int(i)) => {
                    args.worker_threads = Some(i.base10_parse()?);
                }
                ("backend" | "flavor" | "worker_threads", lit) => {
                    return Err(syn::Error::new(
                        lit.span(),
                        format!("unexpected value for `{ident}`"),
                    ));
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// Turn an `async fn` into a blocking `fn` with the same signature.
///
/// Every call builds a fresh runtime, drives the original body to completion
/// on it, and returns the output. Errors returned by the body come back
/// unchanged and panics unwind into the caller.
///
/// # Configuration Options
///
/// - `backend = "tokio"` or `backend = "smol"` - Select the runtime
/// - `flavor = "multi_thread"` - Tokio runtime flavor
/// - `worker_threads = 4` - Worker count (implies `multi_thread`)
///
/// `flavor` and `worker_threads` are Tokio-only and rejected with `backend = "smol"`.
///
/// ```rust,ignore
/// #[testkit_helpers::synchronize(flavor = "multi_thread", worker_threads = 2)]
/// async fn spawn_and_join() -> u32 {
///     tokio::spawn(async { 7 }).await.unwrap()
/// }
/// ```
///
/// Place it above `#[test]` to write a test body with `.await`:
///
/// ```rust,ignore
/// #[testkit_helpers::synchronize]
/// #[test]
/// async fn reads_config() {
///     assert_eq!(load().await, 3);
/// }
/// ```
#[proc_macro_attribute]
pub fn synchronize(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as BridgeArgs);
    let input = parse_macro_input!(item as ItemFn);

    expand_synchronize(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn config_tokens(args: &BridgeArgs) -> syn::Result<TokenStream2> {
    let mut config = quote! { ::testkit_helpers::bridge::BridgeConfig::new() };

    if args.backend.as_deref() == Some("smol")
        && (args.flavor.is_some() || args.worker_threads.is_some())
    {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "the \"smol\" backend runs on the calling thread; remove `flavor` and `worker_threads`",
        ));
    }

    match args.backend.as_deref() {
        None => {}
        Some("tokio") => {
            config = quote! { #config.backend(::testkit_helpers::bridge::Backend::Tokio) };
        }
        Some("smol") => {
            config = quote! { #config.backend(::testkit_helpers::bridge::Backend::Smol) };
        }
        Some(other) => {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("unsupported backend: {other}. Use \"tokio\" or \"smol\""),
            ));
        }
    }

    match (args.flavor.as_deref(), args.worker_threads) {
        (None | Some("multi_thread"), Some(workers)) => {
            config = quote! { #config.multi_thread(#workers) };
        }
        (Some("multi_thread"), None) => {
            config = quote! {
                #config.flavor(::testkit_helpers::bridge::Flavor::MultiThread)
            };
        }
        (None | Some("current_thread"), None) => {}
        (Some("current_thread"), Some(_)) => {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "`worker_threads` requires the \"multi_thread\" flavor",
            ));
        }
        (Some(other), _) => {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("unsupported flavor: {other}. Use \"current_thread\" or \"multi_thread\""),
            ));
        }
    }

    Ok(config)
}

fn expand_synchronize(args: BridgeArgs, input: ItemFn) -> syn::Result<TokenStream2> {
    let ItemFn {
        attrs,
        vis,
        mut sig,
        block,
    } = input;

    // Check if function is async
    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &sig,
            "#[synchronize] can only be applied to an async fn",
        ));
    }
    sig.asyncness = None;

    let config = config_tokens(&args)?;

    Ok(quote! {
        #(#attrs)*
        #vis #sig {
            ::testkit_helpers::bridge::Executor::block_on(
                &::testkit_helpers::bridge::Bridge::with_config(#config),
                async move #block,
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{config_tokens, expand_synchronize, BridgeArgs};

    #[test]
    fn test_args_parse_empty() {
        let args: BridgeArgs = syn::parse_str("").unwrap();
        assert!(args.backend.is_none());
        assert!(args.flavor.is_none());
        assert!(args.worker_threads.is_none());
    }

    #[test]
    fn test_args_parse_multiple() {
        let args: BridgeArgs =
            syn::parse_str("backend = \"smol\", flavor = \"multi_thread\", worker_threads = 3")
                .unwrap();
        assert_eq!(args.backend.as_deref(), Some("smol"));
        assert_eq!(args.flavor.as_deref(), Some("multi_thread"));
        assert_eq!(args.worker_threads, Some(3));
    }

    #[test]
    fn test_args_reject_unknown() {
        assert!(syn::parse_str::<BridgeArgs>("runtime = \"tokio\"").is_err());
        assert!(syn::parse_str::<BridgeArgs>("worker_threads = \"two\"").is_err());
    }

    #[test]
    fn test_config_rejects_bad_combinations() {
        let args: BridgeArgs =
            syn::parse_str("flavor = \"current_thread\", worker_threads = 2").unwrap();
        assert!(config_tokens(&args).is_err());

        let args: BridgeArgs = syn::parse_str("backend = \"async-std\"").unwrap();
        assert!(config_tokens(&args).is_err());
        let args: BridgeArgs =
            syn::parse_str("backend = \"smol\", flavor = \"multi_thread\"").unwrap();
        assert!(config_tokens(&args).is_err());

        let args: BridgeArgs = syn::parse_str("backend = \"smol\", worker_threads = 4").unwrap();
        let err = config_tokens(&args).unwrap_err();
        assert!(err.to_string().contains("smol"));
    }

    #[test]
    fn test_config_accepts_plain_smol() {
        let args: BridgeArgs = syn::parse_str("backend = \"smol\"").unwrap();
        let tokens = config_tokens(&args).unwrap().to_string();
        assert!(tokens.contains("Smol"));
    }

    #[test]
    fn test_expand_requires_async() {
        let item: syn::ItemFn = syn::parse_str("fn not_async() {}").unwrap();
        assert!(expand_synchronize(BridgeArgs::default(), item).is_err());
    }

    #[test]
    fn test_expand_strips_async() {
        let item: syn::ItemFn = syn::parse_str("pub async fn answer() -> u32 { 42 }").unwrap();
        let expanded = expand_synchronize(BridgeArgs::default(), item).unwrap();
        let output: syn::ItemFn = syn::parse2(expanded).unwrap();
        assert!(output.sig.asyncness.is_none());
        assert_eq!(output.sig.ident, "answer");
    }
}
