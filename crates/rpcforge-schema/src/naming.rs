//! Identifier shaping shared by every emitter.

use convert_case::{Case, Casing};

/// Uppercase the first character, leaving the rest untouched.
#[must_use]
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `user_info_list` -> `UserInfoList`; existing capitals are kept.
#[must_use]
pub fn pretty_name(s: &str) -> String {
    s.split('_').map(upper_first).collect()
}

/// `UserInfo` -> `user_info`, used for file and module names.
#[must_use]
pub fn snake_name(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Lowercased pretty name, the stem of descriptor and stub files.
#[must_use]
pub fn file_stem(s: &str) -> String {
    pretty_name(s).to_lowercase()
}

/// True for names usable as identifiers in generated code.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

///
/// TESTS
///
