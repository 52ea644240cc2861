//! Built-in schema types
//!
//! The XSD and SOAP-encoding built-in types the compiler can resolve
//! without a user definition, with the native holder base each one
//! marshals to.

use crate::namespaces::{QName, SOAP_ENC12_NAMESPACE, SOAP_ENC_NAMESPACE, XSD_NAMESPACE};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Native holder base a built-in codec yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeBase {
    /// Character data
    String,
    /// Fixed-width integral value
    Int,
    /// Wide integral value
    Long,
    /// Floating-point value
    Float,
    /// Boolean value
    Bool,
    /// Calendar/time tuple
    TimeTuple,
}

impl fmt::Display for NativeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "integer"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "boolean"),
            Self::TimeTuple => write!(f, "tuple"),
        }
    }
}

/// One built-in type entry
#[derive(Debug, Clone, Copy)]
pub struct BuiltinType {
    /// Local name in the XSD (or SOAP-encoding) namespace
    pub local_name: &'static str,
    /// Native holder base, None for the structural any types
    pub native: Option<NativeBase>,
}

const STRING_TYPES: &[&str] = &[
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "NMTOKEN",
    "NMTOKENS",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "anyURI",
    "QName",
    "NOTATION",
    "base64Binary",
    "hexBinary",
];

const INT_TYPES: &[&str] = &[
    "int",
    "integer",
    "nonPositiveInteger",
    "negativeInteger",
    "nonNegativeInteger",
    "positiveInteger",
    "short",
    "unsignedShort",
    "byte",
    "unsignedByte",
    "unsignedInt",
];

const LONG_TYPES: &[&str] = &["long", "unsignedLong"];

const FLOAT_TYPES: &[&str] = &["float", "double", "decimal"];

const TIME_TYPES: &[&str] = &[
    "duration",
    "dateTime",
    "date",
    "time",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
];

static BUILTINS: Lazy<HashMap<&'static str, BuiltinType>> = Lazy::new(|| {
    let mut map = HashMap::new();
    let mut add = |names: &[&'static str], native: Option<NativeBase>| {
        for name in names {
            map.insert(
                *name,
                BuiltinType {
                    local_name: name,
                    native,
                },
            );
        }
    };
    add(STRING_TYPES, Some(NativeBase::String));
    add(INT_TYPES, Some(NativeBase::Int));
    add(LONG_TYPES, Some(NativeBase::Long));
    add(FLOAT_TYPES, Some(NativeBase::Float));
    add(&["boolean"], Some(NativeBase::Bool));
    add(TIME_TYPES, Some(NativeBase::TimeTuple));
    add(&["anyType", "anySimpleType"], None);
    // structural SOAP-encoding types
    add(&["Array", "Struct", "arrayType"], None);
    map
});

/// True if the namespace carries built-in type definitions
pub fn is_builtin_namespace(namespace: &str) -> bool {
    namespace == XSD_NAMESPACE
        || namespace == SOAP_ENC_NAMESPACE
        || namespace == SOAP_ENC12_NAMESPACE
}

/// Look up a built-in type by qualified name.
///
/// SOAP-encoding mirrors the XSD value types, so both namespaces share
/// one table.
pub fn builtin(qname: &QName) -> Option<&'static BuiltinType> {
    let ns = qname.namespace()?;
    if !is_builtin_namespace(ns) {
        return None;
    }
    BUILTINS.get(qname.local_name.as_str())
}

/// Native holder base for a built-in type QName, if it has one
pub fn native_base(qname: &QName) -> Option<NativeBase> {
    builtin(qname).and_then(|b| b.native)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xsd_builtins() {
        let string = builtin(&QName::namespaced(XSD_NAMESPACE, "string")).unwrap();
        assert_eq!(string.native, Some(NativeBase::String));

        assert_eq!(
            native_base(&QName::namespaced(XSD_NAMESPACE, "int")),
            Some(NativeBase::Int)
        );
        assert_eq!(
            native_base(&QName::namespaced(XSD_NAMESPACE, "dateTime")),
            Some(NativeBase::TimeTuple)
        );
    }

    #[test]
    fn test_soap_encoding_mirror() {
        assert!(builtin(&QName::namespaced(SOAP_ENC_NAMESPACE, "string")).is_some());
        assert!(builtin(&QName::namespaced(SOAP_ENC12_NAMESPACE, "int")).is_some());
        let array = builtin(&QName::namespaced(SOAP_ENC_NAMESPACE, "Array")).unwrap();
        assert_eq!(array.native, None);
    }

    #[test]
    fn test_user_namespace_is_not_builtin() {
        assert!(builtin(&QName::namespaced("urn:example", "string")).is_none());
        assert!(builtin(&QName::local("string")).is_none());
    }

    #[test]
    fn test_any_type_has_no_native_base() {
        assert_eq!(native_base(&QName::namespaced(XSD_NAMESPACE, "anyType")), None);
    }
}
