use darling::ast::{Data, Fields, Style};
use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Generics, Ident};

#[derive(FromDeriveInput)]
#[darling(attributes(api_exception), supports(struct_any, enum_any))]
struct ApiExceptionInput {
    ident: Ident,
    generics: Generics,
    data: Data<ApiExceptionVariant, ()>,
    #[darling(default)]
    status: Option<u16>,
}

#[derive(FromVariant)]
#[darling(attributes(api_exception))]
struct ApiExceptionVariant {
    ident: Ident,
    fields: Fields<()>,
    #[darling(default)]
    status: Option<u16>,
}

pub fn derive_api_exception(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let parsed = match ApiExceptionInput::from_derive_input(&input) {
        Ok(parsed) => parsed,
        Err(e) => return e.write_errors().into(),
    };

    match generate_api_exception_impl(&parsed) {
        Ok(expanded) => expanded.into(),
        Err(e) => e.write_errors().into(),
    }
}

fn check_status(status: u16, span: &Ident) -> darling::Result<u16> {
    if (100..=599).contains(&status) {
        Ok(status)
    } else {
        Err(darling::Error::custom(format!(
            "status must be between 100 and 599, got {status}"
        ))
        .with_span(span))
    }
}

fn generate_api_exception_impl(input: &ApiExceptionInput) -> darling::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let status_body = match &input.data {
        Data::Struct(_) => {
            let status = input.status.ok_or_else(|| {
                darling::Error::custom("missing #[api_exception(status = ...)]").with_span(name)
            })?;
            let status = check_status(status, name)?;
            quote!(#status)
        }
        Data::Enum(variants) => {
            let mut errors = darling::Error::accumulator();
            let arms: Vec<TokenStream2> = variants
                .iter()
                .filter_map(|variant| {
                    errors.handle_in(|| {
                        let status = variant.status.or(input.status).ok_or_else(|| {
                            darling::Error::custom(
                                "missing #[api_exception(status = ...)] on variant or enum",
                            )
                            .with_span(&variant.ident)
                        })?;
                        let status = check_status(status, &variant.ident)?;
                        let ident = &variant.ident;
                        let pattern = match variant.fields.style {
                            Style::Tuple => quote!(Self::#ident(..)),
                            Style::Struct => quote!(Self::#ident { .. }),
                            Style::Unit => quote!(Self::#ident),
                        };
                        Ok(quote!(#pattern => #status))
                    })
                })
                .collect();
            errors.finish()?;
            quote! {
                match self {
                    #(#arms,)*
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::simple_exceptions::exception::ApiException for #name #ty_generics #where_clause {
            fn status_code(&self) -> ::simple_exceptions::axum::http::StatusCode {
                let code: u16 = #status_body;
                ::simple_exceptions::axum::http::StatusCode::from_u16(code)
                    .unwrap_or(::simple_exceptions::axum::http::StatusCode::INTERNAL_SERVER_ERROR)
            }
        }

        impl #impl_generics ::std::convert::From<#name #ty_generics>
            for ::simple_exceptions::exception::Exception #where_clause
        {
            fn from(error: #name #ty_generics) -> Self {
                ::simple_exceptions::exception::Exception::api(error)
            }
        }
    })
}
