//! WSDL service model
//!
//! The message/portType/binding/service object model the operation
//! assembler consumes, plus the parser that builds it (with its inline
//! `<types>` schemas) from a WSDL document.

pub mod parsing;

pub use parsing::parse_wsdl;

use crate::namespaces::{normalize_namespace, QName};
use crate::schema::SchemaSet;
use indexmap::IndexMap;

/// A parsed WSDL definitions document
#[derive(Debug, Default)]
pub struct WsdlDocument {
    /// `name` attribute of the definitions element
    pub name: Option<String>,
    /// Target namespace of the definitions
    pub target_namespace: Option<String>,
    /// Schemas collected from the `<types>` section
    pub schemas: SchemaSet,
    /// Messages in declaration order
    pub messages: IndexMap<String, Message>,
    /// Port types in declaration order
    pub port_types: IndexMap<String, PortType>,
    /// Bindings in declaration order
    pub bindings: IndexMap<String, Binding>,
    /// Services in declaration order
    pub services: IndexMap<String, Service>,
}

impl WsdlDocument {
    fn in_target_namespace(&self, qname: &QName) -> bool {
        match (qname.namespace(), self.target_namespace.as_deref()) {
            (Some(a), Some(b)) => normalize_namespace(a) == normalize_namespace(b),
            (None, _) => true,
            _ => false,
        }
    }

    /// Look up a message by qualified name
    pub fn message(&self, qname: &QName) -> Option<&Message> {
        if !self.in_target_namespace(qname) {
            return None;
        }
        self.messages.get(&qname.local_name)
    }

    /// Look up a portType by qualified name
    pub fn port_type(&self, qname: &QName) -> Option<&PortType> {
        if !self.in_target_namespace(qname) {
            return None;
        }
        self.port_types.get(&qname.local_name)
    }

    /// Look up a binding by qualified name
    pub fn binding(&self, qname: &QName) -> Option<&Binding> {
        if !self.in_target_namespace(qname) {
            return None;
        }
        self.bindings.get(&qname.local_name)
    }
}

/// A WSDL message definition
#[derive(Debug, Clone)]
pub struct Message {
    /// Message name
    pub name: String,
    /// Parts in declaration order
    pub parts: Vec<Part>,
}

/// One part of a message
#[derive(Debug, Clone)]
pub struct Part {
    /// Part name
    pub name: String,
    /// `element=` reference to a global element declaration
    pub element: Option<QName>,
    /// `type=` reference to a type definition
    pub type_ref: Option<QName>,
}

/// A WSDL portType (abstract interface)
#[derive(Debug, Clone)]
pub struct PortType {
    /// PortType name
    pub name: String,
    /// Operations in declaration order
    pub operations: IndexMap<String, PortTypeOperation>,
}

/// An abstract operation on a portType
#[derive(Debug, Clone)]
pub struct PortTypeOperation {
    /// Operation name
    pub name: String,
    /// Input message reference
    pub input: Option<QName>,
    /// Output message reference (absent for one-way operations)
    pub output: Option<QName>,
}

/// SOAP binding extension on a `<binding>`
#[derive(Debug, Clone, Default)]
pub struct SoapBinding {
    /// Default style (`rpc` or `document`)
    pub style: Option<String>,
    /// Transport URI
    pub transport: Option<String>,
}

/// SOAP operation extension on a binding operation
#[derive(Debug, Clone, Default)]
pub struct SoapOperation {
    /// soapAction URI
    pub action: Option<String>,
    /// Style override for this operation
    pub style: Option<String>,
}

/// `<soap:body>` binding for one message role
#[derive(Debug, Clone, Default)]
pub struct SoapBody {
    /// `use` attribute (`literal` or `encoded`)
    pub use_mode: Option<String>,
    /// Wrapper namespace for rpc-style bodies
    pub namespace: Option<String>,
    /// Encoding style URI for encoded bodies
    pub encoding_style: Option<String>,
}

/// `<soap:header>` binding entry
#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Message carrying the header part
    pub message: QName,
    /// Part name within that message
    pub part: String,
    /// `use` attribute
    pub use_mode: Option<String>,
    /// Header namespace
    pub namespace: Option<String>,
    /// Encoding style URI
    pub encoding_style: Option<String>,
}

/// Input or output binding of one binding operation
#[derive(Debug, Clone, Default)]
pub struct MessageRoleBinding {
    /// The soap:body binding, when present
    pub body: Option<SoapBody>,
    /// soap:header entries in declaration order
    pub headers: Vec<SoapHeader>,
}

/// One `<operation>` under a `<binding>`
#[derive(Debug, Clone)]
pub struct BindingOperation {
    /// Operation name
    pub name: String,
    /// soap:operation extension, when present
    pub soap_operation: Option<SoapOperation>,
    /// Input role binding
    pub input: Option<MessageRoleBinding>,
    /// Output role binding
    pub output: Option<MessageRoleBinding>,
}

/// A `<binding>` definition
#[derive(Debug, Clone)]
pub struct Binding {
    /// Binding name
    pub name: String,
    /// The portType this binding implements
    pub port_type: Option<QName>,
    /// soap:binding extension, absent for non-SOAP bindings
    pub soap_binding: Option<SoapBinding>,
    /// Operations in declaration order
    pub operations: Vec<BindingOperation>,
}

impl Binding {
    /// Effective style for an operation: operation-level overrides
    /// binding-level, defaulting to document.
    pub fn effective_style(&self, operation: &BindingOperation) -> String {
        operation
            .soap_operation
            .as_ref()
            .and_then(|o| o.style.clone())
            .or_else(|| self.soap_binding.as_ref().and_then(|b| b.style.clone()))
            .unwrap_or_else(|| "document".to_string())
    }
}

/// A service port bound to an address
#[derive(Debug, Clone)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Binding reference
    pub binding: QName,
    /// soap:address location, absent for non-SOAP ports
    pub address: Option<String>,
}

/// A `<service>` definition
#[derive(Debug, Clone)]
pub struct Service {
    /// Service name
    pub name: String,
    /// Ports in declaration order
    pub ports: Vec<Port>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_style_override() {
        let binding = Binding {
            name: "B".into(),
            port_type: None,
            soap_binding: Some(SoapBinding {
                style: Some("document".into()),
                transport: None,
            }),
            operations: Vec::new(),
        };
        let mut op = BindingOperation {
            name: "op".into(),
            soap_operation: None,
            input: None,
            output: None,
        };
        assert_eq!(binding.effective_style(&op), "document");

        op.soap_operation = Some(SoapOperation {
            action: None,
            style: Some("rpc".into()),
        });
        assert_eq!(binding.effective_style(&op), "rpc");
    }

    #[test]
    fn test_message_lookup_checks_namespace() {
        let mut doc = WsdlDocument {
            target_namespace: Some("urn:svc".into()),
            ..Default::default()
        };
        doc.messages.insert(
            "In".into(),
            Message {
                name: "In".into(),
                parts: Vec::new(),
            },
        );
        assert!(doc.message(&QName::namespaced("urn:svc", "In")).is_some());
        assert!(doc.message(&QName::namespaced("urn:other", "In")).is_none());
    }
}
