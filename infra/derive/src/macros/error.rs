use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, Type};

const CONTEXT_TYPE: &str = "Option<Cow<'static,str>>";
const INTERNAL: &str = "Internal";

/// What the expansion needs to know about one enum variant.
struct ErrorVariant {
    ident: Ident,
    source: Option<(Ident, Type)>,
    has_context: bool,
    has_message: bool,
    cfg: Vec<Attribute>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    match expand_inner(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand_inner(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new(input.ident.span(), "outclick_error only supports enums"));
    };

    let variants = data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let ext = format_ident!("{}Ext", name);

    let derives = missing_derives(&input.attrs);
    let context_trait = context_trait(name, &ext, &variants);
    let conversions = variants.iter().filter_map(|v| source_conversion(name, &ext, v));
    let internal = internal_conversions(name, &variants);

    Ok(quote! {
        #derives
        #input

        #context_trait
        #(#conversions)*
        #internal

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    })
}

impl ErrorVariant {
    fn parse(variant: &syn::Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "outclick_error variants must use named fields",
            ));
        };

        let mut source = None;
        let mut has_context = false;
        let mut has_message = false;

        for field in &fields.named {
            let Some(ident) = field.ident.as_ref() else { continue };
            if ident == "context" {
                if normalized(&field.ty) != CONTEXT_TYPE {
                    return Err(syn::Error::new(
                        field.ty.span(),
                        "context field must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if ident == "message" {
                has_message = true;
            } else if is_source(ident, field) {
                source = Some((ident.clone(), field.ty.clone()));
            }
        }

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "variants wrapping a source error need `context: Option<Cow<'static, str>>`",
            ));
        }

        Ok(Self {
            ident: variant.ident.clone(),
            source,
            has_context,
            has_message,
            cfg: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
        })
    }
}

fn is_source(ident: &Ident, field: &Field) -> bool {
    ident == "source"
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

fn normalized(ty: &Type) -> String {
    let mut text = quote!(#ty).to_string();
    text.retain(|c| !c.is_whitespace());
    text.replace("std::option::", "").replace("std::borrow::", "")
}

fn missing_derives(attrs: &[Attribute]) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(last) = meta.path.segments.last() {
                present.insert(last.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote!(Debug));
    }
    if !present.contains("Error") {
        derives.push(quote!(::thiserror::Error));
    }

    if derives.is_empty() { quote!() } else { quote!(#[derive(#(#derives),*)]) }
}

fn context_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = &v.ident;
        let cfg = &v.cfg;
        quote! { #(#cfg)* #name::#ident { context, .. } => *context = Some(value.into()), }
    });

    quote! {
        /// Attaches a human-readable context to an error result.
        pub trait #ext<T> {
            fn context(self, value: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for std::result::Result<T, #name> {
            #[inline]
            fn context(self, value: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#arms)*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn source_conversion(name: &Ident, ext: &Ident, v: &ErrorVariant) -> Option<TokenStream> {
    if v.ident == INTERNAL {
        return None;
    }
    let (field, ty) = v.source.as_ref()?;
    let ident = &v.ident;
    let cfg = &v.cfg;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl<T> #ext<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, value: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(value.into()) })
            }
        }
    })
}

fn internal_conversions(name: &Ident, variants: &[ErrorVariant]) -> TokenStream {
    let Some(internal) =
        variants.iter().find(|v| v.ident == INTERNAL && v.has_message && v.has_context)
    else {
        return quote!();
    };
    let cfg = &internal.cfg;

    quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}
