//! XML namespace handling
//!
//! Qualified names, prefix scopes, and the per-run namespace alias
//! registry used to qualify cross-namespace type references in emitted
//! artifacts.

use crate::error::{Error, Result};
use crate::names::is_valid_ncname;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// SOAP 1.1 encoding namespace
pub const SOAP_ENC_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// SOAP 1.2 encoding namespace
pub const SOAP_ENC12_NAMESPACE: &str = "http://www.w3.org/2003/05/soap-encoding";

/// WSDL 1.1 namespace
pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// WSDL SOAP binding extension namespace
pub const WSDL_SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Namespace URI as a str
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True if this QName is in the given namespace
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// True if (namespace, local) matches exactly
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.in_namespace(namespace) && self.local_name == local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes at one element scope
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<String, String>,
    /// Default namespace (no prefix)
    default_namespace: Option<String>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Iterate over declared (prefix, namespace) pairs
    pub fn iter_prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Overlay declarations from an inner scope onto a copy of this one
    pub fn child(&self, inner: &NamespaceContext) -> NamespaceContext {
        let mut merged = self.clone();
        for (p, n) in &inner.prefixes {
            merged.prefixes.insert(p.clone(), n.clone());
        }
        if let Some(ns) = &inner.default_namespace {
            merged.default_namespace = Some(ns.clone());
        }
        merged
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }
}

/// Trim the trailing slash some WSDL authors leave on namespace URIs
pub fn normalize_namespace(uri: &str) -> &str {
    uri.strip_suffix('/').filter(|s| !s.is_empty()).unwrap_or(uri)
}

/// Per-run namespace alias registry.
///
/// Assigns a stable short alias to each distinct target namespace in
/// first-seen order. Owned by a single generation run; a fresh run starts
/// from an empty registry.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    aliases: IndexMap<String, String>,
}

impl NamespaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace, optionally honoring a recommended prefix.
    ///
    /// The recommended prefix is used only when it is a valid NCName and
    /// no earlier namespace claimed it; otherwise the alias is `ns{n}`
    /// with `n` the 1-based first-seen index. Re-registering a namespace
    /// never reassigns its alias.
    pub fn add(&mut self, namespace: &str, recommended: Option<&str>) -> &str {
        let key = normalize_namespace(namespace).to_string();
        let fallback = format!("ns{}", self.aliases.len() + 1);
        let candidate = recommended
            .filter(|p| is_valid_ncname(p) && !self.aliases.values().any(|a| a == *p))
            .map(str::to_string);
        self.aliases
            .entry(key)
            .or_insert_with(|| candidate.unwrap_or(fallback))
    }

    /// Look up the alias for a registered namespace
    pub fn alias(&self, namespace: &str) -> Result<&str> {
        self.aliases
            .get(normalize_namespace(namespace))
            .map(|s| s.as_str())
            .ok_or_else(|| Error::Namespace(format!("no alias registered for '{}'", namespace)))
    }

    /// True if the namespace has an alias
    pub fn contains(&self, namespace: &str) -> bool {
        self.aliases.contains_key(normalize_namespace(namespace))
    }

    /// Iterate (namespace, alias) pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(n, a)| (n.as_str(), a.as_str()))
    }

    /// Number of registered namespaces
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True if no namespace has been registered yet
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");
        assert_eq!(QName::local("element").to_string(), "element");
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", XSD_NAMESPACE);

        let qname = ctx.resolve("xs:element").unwrap();
        assert_eq!(qname.namespace(), Some(XSD_NAMESPACE));
        assert_eq!(qname.local_name, "element");
        assert!(ctx.resolve("missing:element").is_err());
    }

    #[test]
    fn test_context_child_overlay() {
        let mut outer = NamespaceContext::new();
        outer.add_prefix("tns", "urn:outer");
        outer.set_default_namespace("urn:default");

        let mut inner = NamespaceContext::new();
        inner.add_prefix("tns", "urn:inner");

        let merged = outer.child(&inner);
        assert_eq!(merged.get_namespace("tns"), Some("urn:inner"));
        assert_eq!(merged.get_default_namespace(), Some("urn:default"));
    }

    #[test]
    fn test_registry_first_seen_order() {
        let mut reg = NamespaceRegistry::new();
        assert_eq!(reg.add("urn:a", None), "ns1");
        assert_eq!(reg.add("urn:b", None), "ns2");
        // re-registering never reassigns
        assert_eq!(reg.add("urn:a", Some("tns")), "ns1");

        let order: Vec<_> = reg.iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["urn:a", "urn:b"]);
    }

    #[test]
    fn test_registry_recommended_prefix() {
        let mut reg = NamespaceRegistry::new();
        assert_eq!(reg.add("urn:a", Some("tns")), "tns");
        // claimed prefix falls back to positional alias
        assert_eq!(reg.add("urn:b", Some("tns")), "ns2");
        // invalid NCName is ignored
        assert_eq!(reg.add("urn:c", Some("not:valid")), "ns3");
    }

    #[test]
    fn test_normalize_namespace() {
        assert_eq!(normalize_namespace("urn:a/"), "urn:a");
        assert_eq!(normalize_namespace("urn:a"), "urn:a");
        assert_eq!(normalize_namespace("/"), "/");
    }
}
