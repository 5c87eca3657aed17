//! Derived forms of a field name.

use std::borrow::Cow;

/// The lower-camel variant of a field name: first character lowercased,
/// remainder untouched.
///
/// Borrows when the name is already in that form, so callers can cheaply
/// detect that the variant collides with the exact name.
pub fn lower_camel(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Cow::Borrowed(name);
    };

    let mut lowered: String = first.to_lowercase().collect();
    if lowered.len() == first.len_utf8() && lowered.starts_with(first) {
        return Cow::Borrowed(name);
    }

    lowered.push_str(chars.as_str());
    Cow::Owned(lowered)
}

/// The identifier-safe key under which an accessor for `name` is installed.
///
/// Every character outside `[A-Za-z0-9_$]` becomes `_`, then the result is
/// lowercased. Distinct field names may map to the same key.
pub fn sanitize_accessor_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
