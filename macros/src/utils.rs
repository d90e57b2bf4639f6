//! Utility functions for procedural macros
//!
//! This module contains utility functions used by the procedural macros,
//! such as type checking and column name derivation.

use syn::Type;

/// Check if a type is a plain `bool`
pub fn is_bool_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => {
            let path = &type_path.path;
            path.segments.len() == 1 && path.segments[0].ident == "bool"
        }
        _ => false,
    }
}

/// Convert a snake_case field name to the lowerCamelCase column name
///
/// `family_name` becomes `familyName`, `sa1` stays `sa1`.
pub fn to_lower_camel(field_name: &str) -> String {
    let mut out = String::with_capacity(field_name.len());
    let mut upper_next = false;
    for ch in field_name.trim_start_matches("r#").chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
