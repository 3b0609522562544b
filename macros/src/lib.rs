mod log;
mod loggable;

use proc_macro::TokenStream;

/// Emits a loggable value through `tracing` at the level it declares.
///
/// `log!(value)` or `log!(value, context)`; the context is recorded with `Debug`.
#[proc_macro]
pub fn log(input: TokenStream) -> TokenStream {
    log::log_impl(input)
}

/// Declares an error or event enum whose variants carry a message and a `tracing::Level`.
#[proc_macro]
pub fn loggable(input: TokenStream) -> TokenStream {
    loggable::loggable_impl(input)
}
