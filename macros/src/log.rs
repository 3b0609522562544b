use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, Expr, Token};

struct LogInput {
    entry: Expr,
    context: Option<Expr>,
}

impl Parse for LogInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let entry = input.parse::<Expr>()?;

        let context = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                None
            } else {
                Some(input.parse::<Expr>()?)
            }
        } else {
            None
        };

        Ok(LogInput { entry, context })
    }
}

pub fn log_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LogInput);

    let entry_expr = &input.entry;

    match &input.context {
        Some(context) => quote! {
            {
                let entry = &#entry_expr;
                let level = entry.level();
                let message = entry.to_string();
                let context = &#context;

                if level == tracing::Level::ERROR {
                    tracing::error!(message = %message, context = ?context);
                } else if level == tracing::Level::WARN {
                    tracing::warn!(message = %message, context = ?context);
                } else if level == tracing::Level::INFO {
                    tracing::info!(message = %message, context = ?context);
                } else if level == tracing::Level::DEBUG {
                    tracing::debug!(message = %message, context = ?context);
                } else {
                    tracing::trace!(message = %message, context = ?context);
                }
            }
        },
        None => quote! {
            {
                let entry = &#entry_expr;
                let level = entry.level();
                let message = entry.to_string();

                if level == tracing::Level::ERROR {
                    tracing::error!("{}", message);
                } else if level == tracing::Level::WARN {
                    tracing::warn!("{}", message);
                } else if level == tracing::Level::INFO {
                    tracing::info!("{}", message);
                } else if level == tracing::Level::DEBUG {
                    tracing::debug!("{}", message);
                } else {
                    tracing::trace!("{}", message);
                }
            }
        },
    }
    .into()
}
