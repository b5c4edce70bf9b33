use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitInt, LitStr, Path, Type, parse_macro_input};

#[proc_macro_derive(FormModel, attributes(field))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return Err(syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            ));
        }
    };

    let leadform = leadform_path();
    let mut descriptors = Vec::new();
    let mut assignments = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        ensure_string(&field.ty)?;
        let options = FieldOptions::parse(&field)?;
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| field_ident.to_string());

        descriptors.push(options.descriptor(&leadform, &name));
        assignments.push(quote! {
            #field_ident: values.value(#name).to_owned()
        });
    }

    Ok(quote! {
        impl #leadform::form::FormModel for #model_ident {
            fn descriptors() -> ::std::vec::Vec<#leadform::form::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn from_values(values: &#leadform::form::FormValues) -> Self {
                Self {
                    #(#assignments,)*
                }
            }
        }
    })
}

#[derive(Default)]
struct FieldOptions {
    kind: Option<Ident>,
    id: Option<String>,
    name: Option<String>,
    label: Option<String>,
    placeholder: Option<String>,
    prefix: Option<String>,
    required: bool,
    max_length: Option<usize>,
    validator: Option<Path>,
}

impl FieldOptions {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("field")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("required") {
                    options.required = true;
                    return Ok(());
                }
                if meta.path.is_ident("kind") {
                    let lit: LitStr = meta.value()?.parse()?;
                    options.kind = Some(kind_variant(&lit)?);
                    return Ok(());
                }
                if meta.path.is_ident("max_length") {
                    let lit: LitInt = meta.value()?.parse()?;
                    options.max_length = Some(lit.base10_parse::<usize>()?);
                    return Ok(());
                }
                if meta.path.is_ident("validator") {
                    options.validator = Some(meta.value()?.parse::<Path>()?);
                    return Ok(());
                }

                let slot = if meta.path.is_ident("id") {
                    &mut options.id
                } else if meta.path.is_ident("name") {
                    &mut options.name
                } else if meta.path.is_ident("label") {
                    &mut options.label
                } else if meta.path.is_ident("placeholder") {
                    &mut options.placeholder
                } else if meta.path.is_ident("prefix") {
                    &mut options.prefix
                } else {
                    return Err(meta.error("unsupported field attribute"));
                };
                let lit: LitStr = meta.value()?.parse()?;
                *slot = Some(lit.value());
                Ok(())
            })?;
        }
        Ok(options)
    }

    fn descriptor(&self, leadform: &TokenStream2, name: &str) -> TokenStream2 {
        let kind = self
            .kind
            .clone()
            .unwrap_or_else(|| Ident::new("Text", Span::call_site()));
        let mut chain = quote! {
            #leadform::form::FieldDescriptor::new(#name, #leadform::form::FieldKind::#kind)
        };
        if let Some(id) = &self.id {
            chain = quote!(#chain.id(#id));
        }
        if let Some(label) = &self.label {
            chain = quote!(#chain.label(#label));
        }
        if let Some(placeholder) = &self.placeholder {
            chain = quote!(#chain.placeholder(#placeholder));
        }
        if let Some(prefix) = &self.prefix {
            chain = quote!(#chain.prefix(#prefix));
        }
        if self.required {
            chain = quote!(#chain.required(true));
        }
        if let Some(max_length) = self.max_length {
            chain = quote!(#chain.max_length(#max_length));
        }
        if let Some(validator) = &self.validator {
            chain = quote!(#chain.validator(#validator));
        }
        chain
    }
}

fn kind_variant(lit: &LitStr) -> syn::Result<Ident> {
    let variant = match lit.value().as_str() {
        "text" => "Text",
        "email" => "Email",
        "textarea" => "Textarea",
        "prefixed_text" | "prefixed-text" => "PrefixedText",
        _ => {
            return Err(syn::Error::new_spanned(
                lit,
                "expected one of: text, email, textarea, prefixed_text",
            ));
        }
    };
    Ok(Ident::new(variant, lit.span()))
}

fn ensure_string(ty: &Type) -> syn::Result<()> {
    let is_string = match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "String" && segment.arguments.is_empty()),
        _ => false,
    };
    if is_string {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            ty,
            "FormModel fields must be `String`",
        ))
    }
}

fn leadform_path() -> TokenStream2 {
    match crate_name("leadform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::leadform),
    }
}
