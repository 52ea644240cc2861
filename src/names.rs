//! XML name validation and emitted-unit naming
//!
//! NCName checks plus the identifier mangling applied to schema names
//! before they appear as unit names in the generated artifacts.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\-\.0-9]*$")
        .unwrap()
});

/// Suffix for type-definition unit names
pub const DEF_SUFFIX: &str = "_Def";

/// Suffix for element-declaration unit names
pub const DEC_SUFFIX: &str = "_Dec";

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.is_empty() && !name.contains(':') && NCNAME.is_match(name)
}

/// Validate an NCName and return an error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid NCName: '{}'", name)))
    }
}

/// Split a prefixed name into prefix and local name
pub fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Mangle a schema name into an identifier-safe unit name.
///
/// Characters outside `[A-Za-z0-9_]` become underscores and a leading
/// digit gets an underscore prefix, so `my-element.1` emits as
/// `my_element_1`.
pub fn mangle(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if i == 0 && c.is_ascii_digit() {
                out.push('_');
            }
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Unit name for a type definition
pub fn type_unit_name(name: &str, simple_naming: bool) -> String {
    if simple_naming {
        mangle(name)
    } else {
        format!("{}{}", mangle(name), DEF_SUFFIX)
    }
}

/// Unit name for an element declaration
pub fn element_unit_name(name: &str, simple_naming: bool) -> String {
    if simple_naming {
        mangle(name)
    } else {
        format!("{}{}", mangle(name), DEC_SUFFIX)
    }
}

/// Holder field name for a particle (the "aname")
pub fn field_name(name: &str) -> String {
    let mut out = mangle(name);
    if !out.starts_with('_') {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("element"));
        assert!(is_valid_ncname("my-element"));
        assert!(is_valid_ncname("_element"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("prefix:element"));
        assert!(!is_valid_ncname("123element"));
    }

    #[test]
    fn test_split_prefixed() {
        assert_eq!(split_prefixed("element"), (None, "element"));
        assert_eq!(split_prefixed("xs:element"), (Some("xs"), "element"));
    }

    #[test]
    fn test_mangle() {
        assert_eq!(mangle("simple"), "simple");
        assert_eq!(mangle("my-element.1"), "my_element_1");
        assert_eq!(mangle("1st"), "_1st");
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(type_unit_name("Person", false), "Person_Def");
        assert_eq!(type_unit_name("Person", true), "Person");
        assert_eq!(element_unit_name("Person", false), "Person_Dec");
        assert_eq!(field_name("name"), "_name");
    }
}
