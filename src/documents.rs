//! XML document handling
//!
//! Parses WSDL/XSD documents into an owned element tree. Each element
//! keeps its fully merged in-scope namespace context so QName-valued
//! attributes (`type="tns:Foo"`) can be resolved after parsing.

use crate::error::{Error, Result};
use crate::namespaces::{NamespaceContext, QName};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes (namespace declarations excluded)
    pub attributes: HashMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Fully merged in-scope namespace context
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: HashMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an unqualified attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.namespace.is_none() && qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Resolve a QName-valued attribute against this element's scope
    pub fn resolve_attribute_qname(&self, name: &str) -> Result<Option<QName>> {
        match self.get_attribute(name) {
            Some(value) => Ok(Some(self.namespaces.resolve(value.trim())?)),
            None => Ok(None),
        }
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// Find the first child element with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.local_name() == local_name)
    }
}

/// XML Document representation
#[derive(Debug)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut root = None;
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = Self::parse_element(&e, element_stack.last())?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.children.push(current);
                        } else {
                            root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::parse_element(&e, element_stack.last())?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.children.push(element);
                    } else {
                        root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?
                            .to_string();
                        if !text.trim().is_empty() {
                            current.text = Some(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // comments, processing instructions, etc.
            }
            buf.clear();
        }

        Ok(Document { root })
    }

    /// Parse element from a BytesStart event, merging the parent scope
    fn parse_element(start: &BytesStart, parent: Option<&Element>) -> Result<Element> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        // First pass: collect namespace declarations and raw attributes
        let mut declared = NamespaceContext::new();
        let mut raw_attrs: Vec<(String, String)> = Vec::new();
        for attr_result in start.attributes() {
            let attr =
                attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;
            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();
            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                declared.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                declared.add_prefix(prefix, &attr_value);
            } else {
                raw_attrs.push((attr_name, attr_value));
            }
        }

        let scope = match parent {
            Some(p) => p.namespaces.child(&declared),
            None => declared,
        };

        // Element name resolves against the merged scope
        let qname = match name.split_once(':') {
            Some((prefix, local)) => {
                let ns = scope
                    .get_namespace(prefix)
                    .ok_or_else(|| Error::Xml(format!("Unknown element prefix: {}", prefix)))?;
                QName::namespaced(ns, local)
            }
            None => QName::new(scope.get_default_namespace(), name.as_str()),
        };

        let mut element = Element::new(qname);
        element.namespaces = scope;

        // Unprefixed attributes are in no namespace (not the default one)
        for (attr_name, attr_value) in raw_attrs {
            let attr_qname = match attr_name.split_once(':') {
                Some((prefix, local)) => {
                    let ns = element.namespaces.get_namespace(prefix).ok_or_else(|| {
                        Error::Xml(format!("Unknown attribute prefix: {}", prefix))
                    })?;
                    QName::namespaced(ns, local)
                }
                None => QName::local(attr_name.as_str()),
            };
            element.attributes.insert(attr_qname, attr_value);
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::XSD_NAMESPACE;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("value2"));
    }

    #[test]
    fn test_element_namespace_resolution() {
        let xml = format!(
            r#"<xs:schema xmlns:xs="{ns}"><xs:element name="a"/></xs:schema>"#,
            ns = XSD_NAMESPACE
        );
        let doc = Document::from_string(&xml).unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.namespace(), Some(XSD_NAMESPACE));
        assert_eq!(root.children[0].local_name(), "element");
        assert_eq!(root.children[0].namespace(), Some(XSD_NAMESPACE));
    }

    #[test]
    fn test_qname_attribute_resolution_inherits_scope() {
        let xml = r#"<schema xmlns:tns="urn:example"><element type="tns:Foo"/></schema>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();
        let elem = &root.children[0];
        let qname = elem.resolve_attribute_qname("type").unwrap().unwrap();
        assert_eq!(qname, QName::namespaced("urn:example", "Foo"));
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let xml = r#"<root xmlns="urn:default" name="x"/>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.namespace(), Some("urn:default"));
        assert_eq!(root.get_attribute("name"), Some("x"));
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><a/><b/><a/></root>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.find_children("a").len(), 2);
        assert!(root.find_child("b").is_some());
    }
}
