//! ColumnField derive macro implementation
//!
//! This module contains the implementation of the ColumnField derive macro,
//! which generates name-based getters and setters for record columns.

use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::utils::{is_bool_type, to_lower_camel};

/// Receiver for the struct that derives ColumnField
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(column), supports(struct_named))]
pub struct ColumnFieldReceiver {
    /// The struct identifier
    ident: syn::Ident,
    /// The struct data with parsed fields
    data: ast::Data<(), ColumnFieldFieldReceiver>,
}

/// Receiver for the fields in the struct
#[derive(Debug, FromField)]
#[darling(attributes(column))]
pub struct ColumnFieldFieldReceiver {
    /// The field identifier
    ident: Option<syn::Ident>,
    /// The field type
    ty: syn::Type,
    /// External column name
    #[darling(default)]
    name: Option<String>,
    /// Marker text for boolean flag columns
    #[darling(default)]
    marker: Option<String>,
    /// Nested struct whose columns are spliced in
    #[darling(default)]
    flatten: bool,
    /// Field is not exported
    #[darling(default)]
    skip: bool,
}

impl ColumnFieldFieldReceiver {
    /// External name of the column carried by this field
    pub fn column_name(&self) -> Option<String> {
        let ident = self.ident.as_ref()?;
        Some(
            self.name
                .clone()
                .unwrap_or_else(|| to_lower_camel(&ident.to_string())),
        )
    }
}

/// Process the ColumnField derive macro
pub fn process_derive_column_field(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let receiver = match ColumnFieldReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("Darling ensures this is a struct")
    };

    // Markers only make sense on bool fields
    for field in fields.iter() {
        if field.marker.is_some() && !is_bool_type(&field.ty) {
            let span = field.ident.as_ref().map_or_else(
                proc_macro2::Span::call_site,
                syn::Ident::span,
            );
            return syn::Error::new(span, "`marker` requires a bool field")
                .to_compile_error()
                .into();
        }
    }

    TokenStream::from(generate_column_field_impl(&receiver.ident, fields))
}

/// Generate the ColumnField trait implementation
fn generate_column_field_impl(
    struct_name: &syn::Ident,
    fields: &ast::Fields<ColumnFieldFieldReceiver>,
) -> proc_macro2::TokenStream {
    let mut name_pushes = Vec::new();
    let mut getter_arms = Vec::new();
    let mut setter_arms = Vec::new();
    let mut nested_getters = Vec::new();
    let mut nested_setters = Vec::new();

    for field in fields.iter().filter(|f| !f.skip) {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;

        if field.flatten {
            name_pushes.push(quote! {
                names.extend(<#field_type as crate::models::columns::ColumnField>::column_names());
            });
            nested_getters.push(quote! {
                if let Some(value) = crate::models::columns::ColumnField::column_value(&self.#field_name, column) {
                    return Some(value);
                }
            });
            nested_setters.push(quote! {
                if crate::models::columns::ColumnField::set_column(&mut self.#field_name, column, value)? {
                    return Ok(true);
                }
            });
            continue;
        }

        let Some(column_name) = field.column_name() else {
            continue;
        };
        name_pushes.push(quote! { names.push(#column_name); });

        if let Some(marker) = &field.marker {
            getter_arms.push(quote! {
                #column_name => {
                    return Some(if self.#field_name { #marker.to_string() } else { String::new() });
                }
            });
            setter_arms.push(quote! {
                #column_name => {
                    self.#field_name = value.trim() == #marker;
                    return Ok(true);
                }
            });
        } else {
            getter_arms.push(quote! {
                #column_name => {
                    return Some(crate::models::columns::ColumnValue::to_column(&self.#field_name));
                }
            });
            setter_arms.push(quote! {
                #column_name => {
                    self.#field_name = <#field_type as crate::models::columns::ColumnValue>::from_column(value)
                        .ok_or_else(|| format!("invalid value '{}' for column '{}'", value, column))?;
                    return Ok(true);
                }
            });
        }
    }

    quote! {
        impl crate::models::columns::ColumnField for #struct_name {
            fn column_names() -> Vec<&'static str> {
                let mut names: Vec<&'static str> = Vec::new();
                #(#name_pushes)*
                names
            }

            fn column_value(&self, column: &str) -> Option<String> {
                match column {
                    #(#getter_arms)*
                    _ => {}
                }
                #(#nested_getters)*
                None
            }

            fn set_column(&mut self, column: &str, value: &str) -> std::result::Result<bool, String> {
                match column {
                    #(#setter_arms)*
                    _ => {}
                }
                #(#nested_setters)*
                Ok(false)
            }
        }
    }
}
