//! Procedural macros for the pmi-synth crate
//!
//! This crate provides the column reflection derive used by the record
//! types, so records can be read and written by external column name.

use proc_macro::TokenStream;

mod column_field_impl;
mod utils;

#[cfg(test)]
mod tests;

/// Derive macro for generating column reflection
///
/// This macro implements `crate::models::columns::ColumnField` for a struct
/// with named fields. Every field becomes a column whose external name is the
/// lowerCamelCase form of the field name unless overridden.
///
/// # Attributes
///
/// * `#[column(name = "UR")]` - external column name
/// * `#[column(marker = "D")]` - boolean field rendered as the marker or empty
/// * `#[column(flatten)]` - nested struct that itself derives `ColumnField`
/// * `#[column(skip)]` - field is not a column
///
/// # Example
///
/// ```rust,ignore
/// #[derive(ColumnField)]
/// struct PersonRecord {
///     #[column(name = "PID")]
///     pid: u64,
///
///     #[column(name = "Deleted", marker = "D")]
///     deleted: bool,
///
///     family_name: String,
///
///     #[column(flatten)]
///     address: Address,
/// }
/// ```
#[proc_macro_derive(ColumnField, attributes(column))]
pub fn derive_column_field(input: TokenStream) -> TokenStream {
    column_field_impl::process_derive_column_field(input)
}
