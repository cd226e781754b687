//! Procedural macros for `trellis`.
//!
//! Provides `#[derive(Template)]`, which turns a struct with named fields
//! into a template schema the tree walker can consume.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input, parse_quote};

/// Derives `Template` and `Shape` for a struct with named fields.
///
/// Every field becomes one descriptor, in declaration order. Metadata is
/// declared with `#[dom(key = "value", ...)]`; the recognized keys are
/// `tag`, `id`, `text`, `class`, `href` and `style`, and any other key is
/// kept in the descriptor for custom walkers. A field named `me` describes
/// the root element.
///
/// A field whose type also derives `Template` contributes its own fields as
/// nested children, so templates compose by nesting structs. Generic
/// templates require every field type to implement `Shape`.
///
/// ```
/// use trellis::Template;
///
/// #[derive(Template)]
/// struct List {
///     #[dom(tag = "ul")]
///     me: (),
///     #[dom(tag = "li", id = "first", text = "A")]
///     item: (),
/// }
///
/// let schema = List::schema();
/// assert_eq!(schema.name, "List");
/// assert_eq!(schema.fields[1].get("id"), "first");
/// ```
#[proc_macro_derive(Template, attributes(dom))]
pub fn derive_template(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_template(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand_template(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Template can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Template can only be derived for structs",
            ));
        }
    };

    let descriptors = fields
        .iter()
        .map(field_descriptor)
        .collect::<syn::Result<Vec<_>>>()?;

    // Field types of generic templates only resolve their nested fields once
    // the parameters are known.
    let mut generics = input.generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for field in fields {
            let field_type = &field.ty;
            where_clause
                .predicates
                .push(parse_quote!(#field_type: ::trellis::Shape));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::trellis::Template for #name #ty_generics #where_clause {
            fn schema() -> ::trellis::TemplateSchema {
                ::trellis::TemplateSchema {
                    name: ::std::string::String::from(#name_str),
                    fields: ::std::vec![#(#descriptors),*],
                }
            }
        }

        impl #impl_generics ::trellis::Shape for #name #ty_generics #where_clause {
            fn nested() -> ::core::option::Option<::std::vec::Vec<::trellis::FieldDescriptor>> {
                ::core::option::Option::Some(
                    <Self as ::trellis::Template>::schema().fields,
                )
            }
        }
    })
}

/// Builds the descriptor expression for one field.
fn field_descriptor(field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "field must be named"));
    };
    let field_name = ident.to_string();
    let field_type = &field.ty;

    let entries = dom_entries(field)?;
    let keys = entries.iter().map(|(key, _)| key);
    let values = entries.iter().map(|(_, value)| value);

    Ok(quote! {
        {
            let mut descriptor = ::trellis::FieldDescriptor::new(#field_name);
            #(
                descriptor = descriptor.with(#keys, #values);
            )*
            descriptor.children = <#field_type as ::trellis::Shape>::nested();
            descriptor
        }
    })
}

/// Collects the `key = "value"` pairs of every `#[dom(...)]` on a field.
fn dom_entries(field: &Field) -> syn::Result<Vec<(String, LitStr)>> {
    let mut entries = Vec::new();
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("dom")) {
        attr.parse_nested_meta(|meta| {
            let Some(key) = meta.path.get_ident() else {
                return Err(meta.error("expected a plain key such as `tag` or `id`"));
            };
            let value: LitStr = meta.value()?.parse()?;
            let key = key.to_string();
            if entries.iter().any(|(seen, _)| *seen == key) {
                return Err(meta.error(format!("`{key}` is declared more than once")));
            }
            entries.push((key, value));
            Ok(())
        })?;
    }
    Ok(entries)
}
