//! Short code generation.
//!
//! Codes are either supplied by the client or cut from a random v4 UUID.

use uuid::Uuid;

/// Length of a generated short code.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Returns the short code for a new mapping.
///
/// A non-empty `custom` code is returned verbatim. Otherwise the first
/// [`GENERATED_CODE_LENGTH`] characters of a random UUID are used (hex digits,
/// 24 bits of entropy).
///
/// No uniqueness check is made here or by the caller: writing a code that is
/// already in use replaces the previous mapping.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(generate_code(Some("promo")), "promo");
/// assert_eq!(generate_code(None).len(), 6);
/// ```
pub fn generate_code(custom: Option<&str>) -> String {
    match custom {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => {
            let mut code = Uuid::new_v4().to_string();
            code.truncate(GENERATED_CODE_LENGTH);
            code
        }
    }
}
