//! Codec and operation descriptors
//!
//! The compiled intermediate representation. Builders produce these as
//! pure data; the emitter renders them in a separate pass. Descriptors
//! are immutable once inserted into the table and reference each other
//! by qualified name, never by ownership, except for local anonymous
//! definitions which are owned by their parent's nested list.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::schema::{MaxOccurs, NativeBase};
use indexmap::IndexMap;

/// How a particle was declared in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleStyle {
    /// Ordinary local element declaration
    Declaration,
    /// `<element ref="..."/>`
    Reference,
    /// `<any/>` wildcard
    Wildcard,
}

impl std::fmt::Display for ParticleStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declaration => write!(f, "declaration"),
            Self::Reference => write!(f, "reference"),
            Self::Wildcard => write!(f, "wildcard"),
        }
    }
}

/// Reference to the codec a particle or derivation marshals with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A built-in primitive codec
    Builtin(QName),
    /// A global descriptor, looked up by qualified name
    Descriptor(QName),
    /// A local descriptor owned by the referring descriptor's nested list
    Local(usize),
    /// Untyped content, marshalled as any
    Any,
}

/// One flattened occurrence slot
#[derive(Debug, Clone)]
pub struct Particle {
    /// Wire-local name
    pub name: String,
    /// Wire namespace when qualified
    pub namespace: Option<String>,
    /// Holder field name
    pub field: String,
    /// Codec this slot marshals with
    pub type_ref: TypeRef,
    /// Effective minimum occurrence
    pub min_occurs: u32,
    /// Effective maximum occurrence
    pub max_occurs: MaxOccurs,
    /// Effective nillable flag
    pub nillable: bool,
    /// Namespace-qualify the wire name
    pub qualified: bool,
    /// Declaration style
    pub style: ParticleStyle,
    /// Encoding style URI carried by rpc/encoded wrapper children
    pub encoding_style: Option<String>,
}

/// Simple-type derivation variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
    /// `<restriction>` of a primitive or user simple type
    Restriction,
    /// `<union>` of member types
    Union,
    /// `<list>` of an item type
    List,
}

/// Complex-content derivation variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationKind {
    /// Restriction replaces the base child list
    Restriction,
    /// Extension appends to the base child list
    Extension,
    /// SOAP-encoding Array idiom
    Array,
}

/// Descriptor kind, one per codec-builder variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Global complexType with model-group (or empty) content
    GlobalComplexType,
    /// Global simpleType
    GlobalSimpleType(SimpleKind),
    /// Anonymous complexType inlined in an element declaration, with
    /// its derivation variant when the inline content is a derivation
    LocalComplexElement(Option<DerivationKind>),
    /// Anonymous simpleType inlined in an element declaration
    LocalSimpleElement,
    /// Global element declaration
    GlobalElement,
    /// complexType/complexContent derivation
    ComplexContent(DerivationKind),
    /// complexType/simpleContent derivation
    SimpleContent,
}

impl std::fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GlobalComplexType => write!(f, "complexType"),
            Self::GlobalSimpleType(SimpleKind::Restriction) => write!(f, "simpleType/restriction"),
            Self::GlobalSimpleType(SimpleKind::Union) => write!(f, "simpleType/union"),
            Self::GlobalSimpleType(SimpleKind::List) => write!(f, "simpleType/list"),
            Self::LocalComplexElement(_) => write!(f, "localComplexElement"),
            Self::LocalSimpleElement => write!(f, "localSimpleElement"),
            Self::GlobalElement => write!(f, "element"),
            Self::ComplexContent(DerivationKind::Restriction) => {
                write!(f, "complexContent/restriction")
            }
            Self::ComplexContent(DerivationKind::Extension) => {
                write!(f, "complexContent/extension")
            }
            Self::ComplexContent(DerivationKind::Array) => write!(f, "complexContent/array"),
            Self::SimpleContent => write!(f, "simpleContent"),
        }
    }
}

/// One attribute-map entry
#[derive(Debug, Clone)]
pub struct AttributeEntry {
    /// Attribute wire name (namespace only when qualified)
    pub qname: QName,
    /// Attribute codec reference
    pub type_ref: TypeRef,
    /// True for the anyAttribute wildcard entry
    pub wildcard: bool,
}

/// Native value holder specification
#[derive(Debug, Clone, Copy)]
pub struct HolderSpec {
    /// Primitive base, None for structural holders
    pub base: Option<NativeBase>,
}

/// The compiled specification of one type or element's wire shape
#[derive(Debug, Clone)]
pub struct CodecDescriptor {
    /// Qualified identity (synthesized for locals)
    pub qname: QName,
    /// Emitted unit name
    pub unit_name: String,
    /// Builder variant that produced this descriptor
    pub kind: DescriptorKind,
    /// Ordered child particles (empty for simple kinds)
    pub particles: Vec<Particle>,
    /// Attribute map in accumulation order
    pub attributes: Vec<AttributeEntry>,
    /// Base codec for derivations
    pub base: Option<TypeRef>,
    /// Item codec for SOAP-encoding array derivations
    pub array_item: Option<TypeRef>,
    /// Union member types, verbatim
    pub member_types: Vec<QName>,
    /// List item type
    pub item_type: Option<QName>,
    /// Mixed content flag
    pub mixed: bool,
    /// Native value holder, None for element wrappers
    pub holder: Option<HolderSpec>,
    /// Local anonymous descriptors owned by this one
    pub nested: Vec<CodecDescriptor>,
    /// Element substitution group linkage
    pub substitution_group: Option<QName>,
    /// The type a global element marshals with
    pub element_type: Option<TypeRef>,
}

impl CodecDescriptor {
    /// Create an empty descriptor of the given kind
    pub fn new(qname: QName, unit_name: impl Into<String>, kind: DescriptorKind) -> Self {
        Self {
            qname,
            unit_name: unit_name.into(),
            kind,
            particles: Vec::new(),
            attributes: Vec::new(),
            base: None,
            array_item: None,
            member_types: Vec::new(),
            item_type: None,
            mixed: false,
            holder: None,
            nested: Vec::new(),
            substitution_group: None,
            element_type: None,
        }
    }

    /// True for element-declaration descriptors
    pub fn is_element(&self) -> bool {
        matches!(
            self.kind,
            DescriptorKind::GlobalElement
                | DescriptorKind::LocalComplexElement(_)
                | DescriptorKind::LocalSimpleElement
        )
    }
}

/// Key separating the type and element descriptor spaces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorKey {
    /// Type definition identity
    Type(QName),
    /// Element declaration identity
    Element(QName),
}

impl std::fmt::Display for DescriptorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(q) => write!(f, "type {}", q),
            Self::Element(q) => write!(f, "element {}", q),
        }
    }
}

/// Descriptor lookup table for one compilation run.
///
/// Insertion order is discovery order; the emitter relies on it.
#[derive(Debug, Default)]
pub struct DescriptorTable {
    descriptors: IndexMap<DescriptorKey, CodecDescriptor>,
}

impl DescriptorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor under its identity.
    ///
    /// Each distinct schema component is built exactly once.
    pub fn insert(&mut self, key: DescriptorKey, descriptor: CodecDescriptor) -> Result<()> {
        if self.descriptors.contains_key(&key) {
            return Err(Error::Other(format!(
                "descriptor already built for {}",
                key
            )));
        }
        self.descriptors.insert(key, descriptor);
        Ok(())
    }

    /// Look up a type descriptor
    pub fn type_descriptor(&self, qname: &QName) -> Option<&CodecDescriptor> {
        self.descriptors.get(&DescriptorKey::Type(qname.clone()))
    }

    /// Look up an element descriptor
    pub fn element_descriptor(&self, qname: &QName) -> Option<&CodecDescriptor> {
        self.descriptors.get(&DescriptorKey::Element(qname.clone()))
    }

    /// True if either space holds the identity
    pub fn contains(&self, key: &DescriptorKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// All descriptors in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&DescriptorKey, &CodecDescriptor)> {
        self.descriptors.iter()
    }

    /// Descriptors in one target namespace, discovery order preserved
    pub fn in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a CodecDescriptor> {
        self.descriptors
            .values()
            .filter(move |d| d.qname.namespace() == Some(namespace))
    }

    /// Number of descriptors built
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True before any descriptor has been built
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Wire style of a binding operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStyle {
    /// rpc style, literal use
    RpcLiteral,
    /// rpc style, encoded use
    RpcEncoded,
    /// document style, literal use
    DocumentLiteral,
}

impl WireStyle {
    /// True for the rpc styles
    pub fn is_rpc(&self) -> bool {
        matches!(self, Self::RpcLiteral | Self::RpcEncoded)
    }

    /// True for the encoded use
    pub fn is_encoded(&self) -> bool {
        matches!(self, Self::RpcEncoded)
    }
}

impl std::fmt::Display for WireStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RpcLiteral => write!(f, "rpc/literal"),
            Self::RpcEncoded => write!(f, "rpc/encoded"),
            Self::DocumentLiteral => write!(f, "document/literal"),
        }
    }
}

/// Request or response wrapper of one operation
#[derive(Debug, Clone)]
pub struct MessageWrapper {
    /// Wrapper unit name
    pub name: String,
    /// Document/literal: the global element descriptor wrapping the body
    pub reference: Option<QName>,
    /// Rpc: synthesized wrapper children, one per message part
    pub parts: Vec<Particle>,
    /// Rpc wrapper element namespace
    pub namespace: Option<String>,
    /// Encoding style URI for encoded wrappers
    pub encoding_style: Option<String>,
}

/// One bound SOAP header part
#[derive(Debug, Clone)]
pub struct HeaderPart {
    /// Message carrying the part
    pub message: QName,
    /// Part name
    pub part: String,
    /// The part's global element, when element-typed
    pub element: Option<QName>,
    /// The part's type, when type-typed
    pub type_ref: Option<QName>,
}

/// One assembled binding operation
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// Operation name
    pub name: String,
    /// Selected wire style
    pub style: WireStyle,
    /// soapAction URI
    pub soap_action: Option<String>,
    /// Request wrapper, absent when the sole part carries no element
    pub input: Option<MessageWrapper>,
    /// Response wrapper, absent for one-way operations
    pub output: Option<MessageWrapper>,
    /// Bound header parts
    pub headers: Vec<HeaderPart>,
}

/// One service port in the locator
#[derive(Debug, Clone)]
pub struct PortDescriptor {
    /// Port name
    pub name: String,
    /// Binding local name
    pub binding: String,
    /// soap:address location
    pub address: Option<String>,
}

/// One binding block in the client artifact
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// Binding local name
    pub name: String,
    /// Bound portType local name
    pub port_type: Option<String>,
    /// Non-skipped operations in declaration order
    pub operations: Vec<OperationDescriptor>,
}

/// One service block in the client artifact
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Service name
    pub name: String,
    /// Ports in declaration order
    pub ports: Vec<PortDescriptor>,
    /// Distinct bindings in first-reference order
    pub bindings: Vec<BindingDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rejects_duplicate_identity() {
        let mut table = DescriptorTable::new();
        let qname = QName::namespaced("urn:x", "T");
        let d = CodecDescriptor::new(qname.clone(), "T_Def", DescriptorKind::GlobalComplexType);
        table
            .insert(DescriptorKey::Type(qname.clone()), d.clone())
            .unwrap();
        assert!(table.insert(DescriptorKey::Type(qname.clone()), d).is_err());
        assert!(table.type_descriptor(&qname).is_some());
        assert!(table.element_descriptor(&qname).is_none());
    }

    #[test]
    fn test_in_namespace_preserves_order() {
        let mut table = DescriptorTable::new();
        for name in ["A", "B", "C"] {
            let q = QName::namespaced("urn:x", name);
            table
                .insert(
                    DescriptorKey::Type(q.clone()),
                    CodecDescriptor::new(q, name, DescriptorKind::GlobalComplexType),
                )
                .unwrap();
        }
        let names: Vec<_> = table.in_namespace("urn:x").map(|d| d.unit_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_wire_style_display() {
        assert_eq!(WireStyle::RpcEncoded.to_string(), "rpc/encoded");
        assert!(WireStyle::RpcEncoded.is_rpc());
        assert!(WireStyle::RpcEncoded.is_encoded());
        assert!(!WireStyle::DocumentLiteral.is_rpc());
    }
}
