//! CPT modifier helpers.
//!
//! Modifiers are appended to a code as a `-NN` suffix (e.g. `69436-50`).
//! Catalog lookups always use the base code.
//!
//! # Examples
//!
//! ```
//! use cpt_types::modifier;
//!
//! assert_eq!(modifier::with_modifier("69436", modifier::BILATERAL), "69436-50");
//! assert_eq!(modifier::base_code("69436-50"), "69436");
//! assert_eq!(modifier::base_code("69436"), "69436");
//! ```

/// Modifier 50: bilateral procedure.
pub const BILATERAL: &str = "50";

/// Modifier 51: multiple procedures.
pub const MULTIPLE_PROCEDURES: &str = "51";

/// Returns the code with any trailing `-NN` modifier removed.
pub fn base_code(code: &str) -> &str {
    match code.rsplit_once('-') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() == 2
                && suffix.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            base
        }
        _ => code,
    }
}

/// Appends a modifier suffix to a code.
pub fn with_modifier(code: &str, modifier: &str) -> String {
    format!("{}-{}", code, modifier)
}

/// Returns true if the code already carries the given modifier.
pub fn has_modifier(code: &str, modifier: &str) -> bool {
    code.len() > modifier.len() + 1
        && code.ends_with(modifier)
        && code.as_bytes()[code.len() - modifier.len() - 1] == b'-'
}
