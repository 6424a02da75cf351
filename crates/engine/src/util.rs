//! Internal helpers for input validation and id generation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every store operation enforces the same rules.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const INVITE_CODE_LEN: usize = 10;

/// Trim a required display name and reject it when empty.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim and uppercase an invite code typed by a user.
pub(crate) fn normalize_invite_code(value: &str) -> ResultEngine<String> {
    let code = value.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Err(EngineError::InvalidId("invite code must not be empty".to_string()));
    }
    Ok(code)
}

/// Search key: lowercase, accents stripped, whitespace collapsed.
///
/// `"  Café  Ñandú "` and `"cafe nandu"` share the same key.
pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
            continue;
        }
        prev_space = false;
        out.extend(ch.to_lowercase());
    }
    out
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn new_invite_code() -> String {
    Uuid::new_v4().simple().to_string()[..INVITE_CODE_LEN].to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_folds_case_and_accents() {
        assert_eq!(normalize_key("  Café  Ñandú "), "cafe nandu");
        assert_eq!(normalize_key("SÚPER"), "super");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Piso  ", "group name").unwrap(), "Piso");
        assert_eq!(
            normalize_required_name("   ", "group name"),
            Err(EngineError::InvalidName("group name must not be empty".to_string()))
        );
    }

    #[test]
    fn invite_codes_are_uppercase_alphanumeric() {
        let code = new_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_eq!(normalize_invite_code(" ab12 ").unwrap(), "AB12");
    }
}
