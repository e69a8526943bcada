//! Naming convention between field-space identifiers and column names
//!
//! Columns are snake_case; field names are camelCase or PascalCase. Both
//! directions are pure functions. They are not exact inverses for
//! identifiers with runs of uppercase letters (`HTTPCode` becomes
//! `h_t_t_p_code`) or leading underscores.

/// PascalCase or camelCase to snake_case: `_` goes before every uppercase
/// letter that is not the first character, then everything is lowercased.
/// Identifiers already in snake_case come back unchanged.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// snake_case to camelCase: split on `_`, capitalize every segment after the
/// first, then lowercase the first letter of the result.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('_').enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}
