//! Schema component tree
//!
//! The parsed XSD component graph the compiler consumes. Components live
//! in a flat arena addressed by [`ComponentId`]; [`Component`] is a
//! cheap handle carrying the predicate/accessor surface the classifier,
//! flattener and occurs resolver dispatch on. Identity for global
//! components is (target namespace, local name); local components are
//! addressed only through their parent.

use crate::namespaces::{normalize_namespace, QName};
use indexmap::IndexMap;
use std::fmt;

/// Index of a component in the schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub u32);

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Ordered sequence of particles
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Maximum occurrence bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    /// A finite bound
    Bounded(u32),
    /// `maxOccurs="unbounded"`
    Unbounded,
}

impl MaxOccurs {
    /// True if the bound is unbounded
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Multiply two bounds; unbounded absorbs
    pub fn multiply(self, other: MaxOccurs) -> MaxOccurs {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => Self::Bounded(a.saturating_mul(b)),
            _ => Self::Unbounded,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{}", n),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Structural kind of a schema component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Element declaration or element reference (`ref` set)
    Element,
    /// `<any>` element wildcard
    Any,
    /// Attribute declaration or reference
    Attribute,
    /// `<anyAttribute>` wildcard
    AnyAttribute,
    /// Named attribute group definition
    AttributeGroup,
    /// `sequence` / `choice` / `all`
    ModelGroup(ModelKind),
    /// Named `<group>` definition (content holds its model group)
    GroupDefinition,
    /// `<group ref="...">`
    GroupReference,
    /// complexType definition
    ComplexType,
    /// simpleType definition
    SimpleType,
    /// `<complexContent>` wrapper
    ComplexContent,
    /// `<simpleContent>` wrapper
    SimpleContent,
    /// `<restriction>` derivation step
    Restriction,
    /// `<extension>` derivation step
    Extension,
    /// simpleType `<union>`
    Union,
    /// simpleType `<list>`
    List,
}

impl ComponentKind {
    /// XSD tag name, used for item traces
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Any => "any",
            Self::Attribute => "attribute",
            Self::AnyAttribute => "anyAttribute",
            Self::AttributeGroup => "attributeGroup",
            Self::ModelGroup(ModelKind::Sequence) => "sequence",
            Self::ModelGroup(ModelKind::Choice) => "choice",
            Self::ModelGroup(ModelKind::All) => "all",
            Self::GroupDefinition | Self::GroupReference => "group",
            Self::ComplexType => "complexType",
            Self::SimpleType => "simpleType",
            Self::ComplexContent => "complexContent",
            Self::SimpleContent => "simpleContent",
            Self::Restriction => "restriction",
            Self::Extension => "extension",
            Self::Union => "union",
            Self::List => "list",
        }
    }
}

/// One node in the schema component arena
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// Structural kind
    pub kind: ComponentKind,
    /// Local name, when declared
    pub name: Option<String>,
    /// Target namespace of the declaring schema
    pub target_namespace: Option<String>,
    /// Parent component (None for globals)
    pub parent: Option<ComponentId>,
    /// True when declared inside another component
    pub local: bool,
    /// Declared minOccurs (default 1)
    pub min_occurs: u32,
    /// Declared maxOccurs (default 1)
    pub max_occurs: MaxOccurs,
    /// Declared nillable flag
    pub nillable: bool,
    /// Mixed content flag (complex types)
    pub mixed: bool,
    /// Effective form: namespace-qualify the wire name
    pub qualified: bool,
    /// `type=` attribute
    pub type_ref: Option<QName>,
    /// `base=` attribute (restriction/extension)
    pub base: Option<QName>,
    /// `ref=` attribute
    pub reference: Option<QName>,
    /// `substitutionGroup=` attribute (global elements)
    pub substitution_group: Option<QName>,
    /// `itemType=` attribute (list)
    pub item_type: Option<QName>,
    /// `memberTypes=` attribute (union), in declaration order
    pub member_types: Vec<QName>,
    /// `wsdl:arrayType=` annotation attribute (SOAP-encoding arrays)
    pub array_type: Option<QName>,
    /// Element/model content children, in declaration order
    pub content: Vec<ComponentId>,
    /// Attribute content children, in declaration order
    pub attributes: Vec<ComponentId>,
}

impl ComponentNode {
    /// Create a node of the given kind with defaults
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            name: None,
            target_namespace: None,
            parent: None,
            local: false,
            min_occurs: 1,
            max_occurs: MaxOccurs::default(),
            nillable: false,
            mixed: false,
            qualified: true,
            type_ref: None,
            base: None,
            reference: None,
            substitution_group: None,
            item_type: None,
            member_types: Vec::new(),
            array_type: None,
            content: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// One schema document's global declarations
#[derive(Debug, Default)]
pub struct Schema {
    /// Target namespace
    pub target_namespace: Option<String>,
    /// elementFormDefault="qualified"
    pub element_form_qualified: bool,
    /// attributeFormDefault="qualified"
    pub attribute_form_qualified: bool,
    /// A prefix bound to the target namespace in the source document
    pub recommended_prefix: Option<String>,
    /// Global type definitions in declaration order
    pub types: IndexMap<String, ComponentId>,
    /// Global element declarations in declaration order
    pub elements: IndexMap<String, ComponentId>,
    /// Global attribute declarations
    pub attributes: IndexMap<String, ComponentId>,
    /// Named model group definitions
    pub groups: IndexMap<String, ComponentId>,
    /// Named attribute group definitions
    pub attribute_groups: IndexMap<String, ComponentId>,
}

/// All schemas reachable from a service definition, plus the component
/// arena they share. Keyed by normalized target namespace in first-seen
/// order.
#[derive(Debug, Default)]
pub struct SchemaSet {
    nodes: Vec<ComponentNode>,
    /// Loaded schemas by normalized target namespace
    pub schemas: IndexMap<String, Schema>,
}

impl SchemaSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its id
    pub fn alloc(&mut self, node: ComponentNode) -> ComponentId {
        let id = ComponentId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Borrow a node
    pub fn node(&self, id: ComponentId) -> &ComponentNode {
        &self.nodes[id.0 as usize]
    }

    /// Borrow a node mutably (parser use)
    pub fn node_mut(&mut self, id: ComponentId) -> &mut ComponentNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Handle for a component
    pub fn component(&self, id: ComponentId) -> Component<'_> {
        Component { set: self, id }
    }

    /// Schema for a target namespace, if loaded
    pub fn schema(&self, namespace: &str) -> Option<&Schema> {
        self.schemas.get(normalize_namespace(namespace))
    }

    fn global(&self, qname: &QName, pick: impl Fn(&Schema) -> Option<ComponentId>) -> Option<ComponentId> {
        let schema = self.schema(qname.namespace()?)?;
        pick(schema)
    }

    /// Look up a global type definition by qualified name
    pub fn type_definition(&self, qname: &QName) -> Option<ComponentId> {
        self.global(qname, |s| s.types.get(&qname.local_name).copied())
    }

    /// Look up a global element declaration by qualified name
    pub fn element_declaration(&self, qname: &QName) -> Option<ComponentId> {
        self.global(qname, |s| s.elements.get(&qname.local_name).copied())
    }

    /// Look up a global attribute declaration by qualified name
    pub fn attribute_declaration(&self, qname: &QName) -> Option<ComponentId> {
        self.global(qname, |s| s.attributes.get(&qname.local_name).copied())
    }

    /// Look up a named model group definition by qualified name
    pub fn group_definition(&self, qname: &QName) -> Option<ComponentId> {
        self.global(qname, |s| s.groups.get(&qname.local_name).copied())
    }

    /// Look up a named attribute group definition by qualified name
    pub fn attribute_group_definition(&self, qname: &QName) -> Option<ComponentId> {
        self.global(qname, |s| s.attribute_groups.get(&qname.local_name).copied())
    }
}

/// Cheap handle onto one component in a [`SchemaSet`]
#[derive(Clone, Copy)]
pub struct Component<'a> {
    set: &'a SchemaSet,
    /// Arena index of this component
    pub id: ComponentId,
}

impl<'a> Component<'a> {
    /// The underlying node
    pub fn node(&self) -> &'a ComponentNode {
        self.set.node(self.id)
    }

    /// The owning schema set
    pub fn set(&self) -> &'a SchemaSet {
        self.set
    }

    /// Structural kind
    pub fn kind(&self) -> ComponentKind {
        self.node().kind
    }

    /// Local name, when declared
    pub fn name(&self) -> Option<&'a str> {
        self.node().name.as_deref()
    }

    /// Target namespace of the declaring schema
    pub fn target_namespace(&self) -> Option<&'a str> {
        self.node().target_namespace.as_deref()
    }

    /// Qualified identity for global components
    pub fn qname(&self) -> Option<QName> {
        Some(QName::new(
            self.node().target_namespace.clone(),
            self.name()?,
        ))
    }

    // - predicates

    /// Element declaration or reference
    pub fn is_element(&self) -> bool {
        matches!(self.kind(), ComponentKind::Element | ComponentKind::Any)
    }

    /// `<any>` wildcard
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind(), ComponentKind::Any | ComponentKind::AnyAttribute)
    }

    /// Attribute declaration, reference, group or wildcard
    pub fn is_attribute(&self) -> bool {
        matches!(
            self.kind(),
            ComponentKind::Attribute | ComponentKind::AnyAttribute | ComponentKind::AttributeGroup
        )
    }

    /// Attribute group definition or reference
    pub fn is_attribute_group(&self) -> bool {
        matches!(self.kind(), ComponentKind::AttributeGroup)
    }

    /// sequence/choice/all, or a named group definition/reference
    pub fn is_model_group(&self) -> bool {
        matches!(
            self.kind(),
            ComponentKind::ModelGroup(_)
                | ComponentKind::GroupDefinition
                | ComponentKind::GroupReference
        )
    }

    /// `<sequence>`
    pub fn is_sequence(&self) -> bool {
        self.kind() == ComponentKind::ModelGroup(ModelKind::Sequence)
    }

    /// `<choice>`
    pub fn is_choice(&self) -> bool {
        self.kind() == ComponentKind::ModelGroup(ModelKind::Choice)
    }

    /// `<all>`
    pub fn is_all(&self) -> bool {
        self.kind() == ComponentKind::ModelGroup(ModelKind::All)
    }

    /// Carries a `ref=` attribute (or is a group reference)
    pub fn is_reference(&self) -> bool {
        self.node().reference.is_some() || self.kind() == ComponentKind::GroupReference
    }

    /// Declares rather than references
    pub fn is_declaration(&self) -> bool {
        !self.is_reference()
    }

    /// Named group definition
    pub fn is_group_definition(&self) -> bool {
        self.kind() == ComponentKind::GroupDefinition
    }

    /// complexType definition
    pub fn is_complex(&self) -> bool {
        self.kind() == ComponentKind::ComplexType
    }

    /// simpleType definition
    pub fn is_simple(&self) -> bool {
        self.kind() == ComponentKind::SimpleType
    }

    /// Type definition (simple or complex)
    pub fn is_type_definition(&self) -> bool {
        self.is_simple() || self.is_complex()
    }

    /// Declared inside another component
    pub fn is_local(&self) -> bool {
        self.node().local
    }

    /// `<restriction>` derivation step
    pub fn is_restriction(&self) -> bool {
        self.kind() == ComponentKind::Restriction
    }

    /// `<extension>` derivation step
    pub fn is_extension(&self) -> bool {
        self.kind() == ComponentKind::Extension
    }

    /// simpleType `<union>`
    pub fn is_union(&self) -> bool {
        self.kind() == ComponentKind::Union
    }

    /// simpleType `<list>`
    pub fn is_list(&self) -> bool {
        self.kind() == ComponentKind::List
    }

    /// `<complexContent>` wrapper
    pub fn is_complex_content(&self) -> bool {
        self.kind() == ComponentKind::ComplexContent
    }

    /// `<simpleContent>` wrapper
    pub fn is_simple_content(&self) -> bool {
        self.kind() == ComponentKind::SimpleContent
    }

    // - navigation

    /// Parent component
    pub fn parent(&self) -> Option<Component<'a>> {
        self.node().parent.map(|id| self.set.component(id))
    }

    /// Element/model content children
    pub fn content(&self) -> impl Iterator<Item = Component<'a>> + '_ {
        self.node().content.iter().map(|id| self.set.component(*id))
    }

    /// First content child (derivation steps, simpleType content)
    pub fn content_first(&self) -> Option<Component<'a>> {
        self.node().content.first().map(|id| self.set.component(*id))
    }

    /// Attribute content children
    pub fn attribute_content(&self) -> impl Iterator<Item = Component<'a>> + '_ {
        self.node()
            .attributes
            .iter()
            .map(|id| self.set.component(*id))
    }

    /// Resolve this component's `type=` attribute to a global definition
    pub fn type_definition(&self) -> Option<Component<'a>> {
        let qname = self.node().type_ref.as_ref()?;
        self.set.type_definition(qname).map(|id| self.set.component(id))
    }

    /// Resolve a group reference to its named definition
    pub fn resolve_group_reference(&self) -> Option<Component<'a>> {
        let qname = self.node().reference.as_ref()?;
        self.set.group_definition(qname).map(|id| self.set.component(id))
    }

    /// Resolve an attribute reference to its global declaration
    pub fn resolve_attribute_reference(&self) -> Option<Component<'a>> {
        let qname = self.node().reference.as_ref()?;
        self.set
            .attribute_declaration(qname)
            .map(|id| self.set.component(id))
    }

    /// Resolve an attribute group reference to its definition
    pub fn resolve_attribute_group(&self) -> Option<Component<'a>> {
        let qname = self.node().reference.as_ref()?;
        self.set
            .attribute_group_definition(qname)
            .map(|id| self.set.component(id))
    }

    /// XML path from the schema root, for error context
    pub fn item_trace(&self) -> String {
        let mut parts = Vec::new();
        let mut current = Some(*self);
        while let Some(c) = current {
            let tag = c.kind().tag();
            match c.name() {
                Some(name) => parts.push(format!("{}[{}]", tag, name)),
                None => parts.push(tag.to_string()),
            }
            current = c.parent();
        }
        parts.reverse();
        format!("/schema/{}", parts.join("/"))
    }
}

impl fmt::Debug for Component<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
