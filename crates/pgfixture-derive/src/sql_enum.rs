//! `#[derive(SqlEnum)]`: symbolic name and ordinal for each unit variant.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    let rename_all = match string_attr(&input.attrs, "rename_all")? {
        Some(lit) => Some(RenameRule::parse(&lit)?),
        None => None,
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut name_arms = Vec::new();
    let mut ordinal_arms = Vec::new();

    for (ordinal, variant) in variants.iter().enumerate() {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants must be unit variants (no fields)",
            ));
        }

        let variant_ident = &variant.ident;
        let written = variant_ident.to_string();
        let sql_name = match string_attr(&variant.attrs, "rename")? {
            Some(lit) => lit.value(),
            None => match rename_all {
                Some(rule) => rule.apply(&written),
                None => written,
            },
        };
        let ordinal = u32::try_from(ordinal)
            .map_err(|_| syn::Error::new_spanned(variant, "too many variants"))?;

        name_arms.push(quote! {
            Self::#variant_ident => #sql_name,
        });
        ordinal_arms.push(quote! {
            Self::#variant_ident => #ordinal,
        });
    }

    let expanded = quote! {
        impl #impl_generics ::pgfixture::SqlEnum for #name #ty_generics #where_clause {
            fn variant_name(&self) -> &'static str {
                match *self {
                    #(#name_arms)*
                }
            }

            fn ordinal(&self) -> u32 {
                match *self {
                    #(#ordinal_arms)*
                }
            }
        }

        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::pgfixture::Value
        #where_clause
        {
            fn from(value: #name #ty_generics) -> Self {
                ::pgfixture::Value::enumeration(&value)
            }
        }

        impl #impl_generics ::core::convert::From<&#name #ty_generics> for ::pgfixture::Value
        #where_clause
        {
            fn from(value: &#name #ty_generics) -> Self {
                ::pgfixture::Value::enumeration(value)
            }
        }
    };

    Ok(expanded)
}

#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Snake,
    ScreamingSnake,
    Kebab,
    Camel,
    Pascal,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "camelCase" => Self::Camel,
            "PascalCase" => Self::Pascal,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!("unknown rename_all rule \"{other}\""),
                ));
            }
        })
    }

    fn apply(self, ident: &str) -> String {
        match self {
            Self::Lower => ident.to_lowercase(),
            Self::Upper => ident.to_uppercase(),
            Self::Snake => ident.to_snake_case(),
            Self::ScreamingSnake => ident.to_shouty_snake_case(),
            Self::Kebab => ident.to_kebab_case(),
            Self::Camel => ident.to_lower_camel_case(),
            Self::Pascal => ident.to_upper_camel_case(),
        }
    }
}

/// Find `#[fixture(key = "...")]` among `attrs`.
fn string_attr(attrs: &[Attribute], key: &str) -> Result<Option<LitStr>> {
    for attr in attrs {
        if !attr.path().is_ident("fixture") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in &nested {
            let Meta::NameValue(nv) = meta else {
                return Err(syn::Error::new_spanned(meta, "expected `key = \"value\"`"));
            };
            if !nv.path.is_ident(key) {
                continue;
            }
            return match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Ok(Some(s.clone())),
                other => Err(syn::Error::new_spanned(other, "expected a string literal")),
            };
        }
    }
    Ok(None)
}
