use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, parse_macro_input, Attribute, Expr, Field, Fields, FieldsNamed, Ident, LitStr, Token};

struct LoggableInput {
    enum_name: Ident,
    variants: Vec<LoggableVariant>,
}

struct LoggableVariant {
    docs: Vec<Attribute>,
    message: LitStr,
    name: Ident,
    fields: Fields,
    level: Expr,
}

impl Parse for LoggableInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let enum_name = input.parse::<Ident>()?;

        let content;
        braced!(content in input);

        let mut variants = Vec::new();

        while !content.is_empty() {
            let attrs = content.call(Attribute::parse_outer)?;
            let message = attrs
                .iter()
                .find(|attr| attr.path().is_ident("error"))
                .ok_or_else(|| content.error("Expected #[error(...)] attribute"))?
                .parse_args::<LitStr>()?;
            let docs = attrs
                .into_iter()
                .filter(|attr| attr.path().is_ident("doc"))
                .collect();

            let name = content.parse::<Ident>()?;

            let fields = if content.peek(syn::token::Brace) {
                let field_content;
                let brace_token = braced!(field_content in content);
                let named: Punctuated<Field, Token![,]> =
                    field_content.parse_terminated(Field::parse_named, Token![,])?;
                Fields::Named(FieldsNamed { brace_token, named })
            } else {
                Fields::Unit
            };

            content.parse::<Token![=>]>()?;
            let level = content.parse::<Expr>()?;

            if content.peek(Token![,]) {
                content.parse::<Token![,]>()?;
            }

            variants.push(LoggableVariant {
                docs,
                message,
                name,
                fields,
                level,
            });
        }

        Ok(LoggableInput {
            enum_name,
            variants,
        })
    }
}

pub fn loggable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LoggableInput);

    let enum_name = &input.enum_name;
    let variants = &input.variants;

    let enum_variants = variants.iter().map(|variant| {
        let docs = &variant.docs;
        let name = &variant.name;
        let message = &variant.message;
        let fields = &variant.fields;

        quote! {
            #(#docs)*
            #[error(#message)]
            #name #fields
        }
    });

    let level_match_arms = variants.iter().map(|variant| {
        let name = &variant.name;
        let level = &variant.level;
        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { { .. } },
            _ => quote! {},
        };

        quote! {
            Self::#name #pattern => #level
        }
    });

    quote! {
        #[allow(dead_code)]
        #[derive(Debug, Clone, PartialEq, thiserror::Error)]
        pub enum #enum_name {
            #(#enum_variants,)*
        }

        impl #enum_name {
            #[allow(dead_code)]
            pub fn level(&self) -> tracing::Level {
                match self {
                    #(#level_match_arms,)*
                }
            }
        }
    }
    .into()
}
