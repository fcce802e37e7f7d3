//! Procedural macros for the qc property testing library
//!
//! This crate provides the `#[property]` attribute, which turns a function
//! taking a `&mut qc::Context` into a standard `#[test]`.

use proc_macro::TokenStream;

mod property;

/// Attribute macro for writing property tests as plain functions
///
/// The annotated function receives the drawing context and runs once per
/// iteration. Every `ctx.int(..)`, `ctx.text(..)` and similar call keeps its
/// own generator across iterations, so the first iterations see the edge
/// cases of each call site.
///
/// # Basic Usage
///
/// ```rust
/// use qc::property;
///
/// #[property]
/// fn addition_is_commutative(ctx: &mut qc::Context) {
///     let a = ctx.int(-1000, 1000).unwrap();
///     let b = ctx.int(-1000, 1000).unwrap();
///     assert_eq!(a + b, b + a);
/// }
/// ```
///
/// # Configuration
///
/// ```rust
/// use qc::property;
///
/// #[property(iterations = 500, seed = 42)]
/// fn text_is_bounded(ctx: &mut qc::Context) -> Result<(), qc::PropertyError> {
///     let text = ctx.text(None, Some(32))?;
///     if text.chars().count() > 32 {
///         return Err(qc::PropertyError::property_failed("text too long"));
///     }
///     Ok(())
/// }
/// ```
///
/// # Supported Options
///
/// - `iterations = N`: Number of iterations (defaults to the global configuration)
/// - `seed = N`: Seed for a reproducible run; without it a fresh seed is
///   chosen and printed when the property fails
///
/// The function may return `()`, `bool`, or a `Result<(), E>` whose error
/// converts into `qc::PropertyError`. Generic and async functions are
/// rejected.
#[proc_macro_attribute]
pub fn property(args: TokenStream, input: TokenStream) -> TokenStream {
    property::property_impl(args, input)
}
