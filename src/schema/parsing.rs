//! XSD component parsing
//!
//! Builds the schema component arena from parsed `<schema>` element
//! trees. Only the constructs the compiler classifies are materialized;
//! annotation and documentation elements are skipped.

use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::{QName, WSDL_NAMESPACE, XSD_NAMESPACE};
use crate::schema::components::{
    ComponentId, ComponentKind, ComponentNode, MaxOccurs, ModelKind, Schema, SchemaSet,
};

/// Schema-wide defaults threaded through component parsing
#[derive(Clone, Copy)]
struct SchemaScope<'a> {
    target_namespace: Option<&'a str>,
    element_form_qualified: bool,
    attribute_form_qualified: bool,
}

fn is_xsd(element: &Element) -> bool {
    element.namespace() == Some(XSD_NAMESPACE)
}

fn parse_occurs(element: &Element) -> Result<(u32, MaxOccurs)> {
    let min = match element.get_attribute("minOccurs") {
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| Error::Xml(format!("invalid minOccurs value '{}'", v)))?,
        None => 1,
    };
    let max = match element.get_attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => MaxOccurs::Bounded(
            v.parse::<u32>()
                .map_err(|_| Error::Xml(format!("invalid maxOccurs value '{}'", v)))?,
        ),
        None => MaxOccurs::Bounded(1),
    };
    Ok((min, max))
}

fn form_qualified(element: &Element, default: bool) -> bool {
    match element.get_attribute("form") {
        Some("qualified") => true,
        Some(_) => false,
        None => default,
    }
}

/// Parse one `<schema>` element into the set.
///
/// A second document for the same target namespace merges into the
/// existing schema entry, matching how WSDL files split one namespace
/// across several inline `<types>` sections.
pub fn parse_schema(element: &Element, set: &mut SchemaSet) -> Result<()> {
    if !is_xsd(element) || element.local_name() != "schema" {
        return Err(Error::Xml(format!(
            "expected an XML Schema <schema> element, found <{}>",
            element.local_name()
        )));
    }

    let target_namespace = element.get_attribute("targetNamespace").map(str::to_string);
    let scope = SchemaScope {
        target_namespace: target_namespace.as_deref(),
        element_form_qualified: element.get_attribute("elementFormDefault") == Some("qualified"),
        attribute_form_qualified: element.get_attribute("attributeFormDefault")
            == Some("qualified"),
    };

    // A prefix the document binds to its own target namespace becomes
    // the recommended alias for emitted output.
    let recommended_prefix = target_namespace.as_deref().and_then(|tns| {
        element
            .namespaces
            .iter_prefixes()
            .find(|(_, ns)| *ns == tns)
            .map(|(p, _)| p.to_string())
    });

    // schemas are keyed by normalized namespace, like lookups
    let key = target_namespace
        .as_deref()
        .map(crate::namespaces::normalize_namespace)
        .unwrap_or_default()
        .to_string();
    if !set.schemas.contains_key(&key) {
        set.schemas.insert(
            key.clone(),
            Schema {
                target_namespace: target_namespace.clone(),
                element_form_qualified: scope.element_form_qualified,
                attribute_form_qualified: scope.attribute_form_qualified,
                recommended_prefix,
                ..Default::default()
            },
        );
    }

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        match child.local_name() {
            "element" => {
                let id = parse_element_decl(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.elements.insert(n, id);
                }, id)?;
            }
            "complexType" => {
                let id = parse_complex_type(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.types.insert(n, id);
                }, id)?;
            }
            "simpleType" => {
                let id = parse_simple_type(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.types.insert(n, id);
                }, id)?;
            }
            "group" => {
                let id = parse_group(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.groups.insert(n, id);
                }, id)?;
            }
            "attribute" => {
                let id = parse_attribute(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.attributes.insert(n, id);
                }, id)?;
            }
            "attributeGroup" => {
                let id = parse_attribute_group(child, set, scope, None)?;
                register_global(set, &key, child, |s, n, id| {
                    s.attribute_groups.insert(n, id);
                }, id)?;
            }
            // import/include targets must be supplied to the run
            // separately; annotations carry nothing the compiler reads
            "import" | "include" | "annotation" | "notation" | "redefine" => {}
            other => {
                return Err(Error::Xml(format!(
                    "unexpected schema-level element <{}>",
                    other
                )))
            }
        }
    }
    Ok(())
}

fn register_global(
    set: &mut SchemaSet,
    key: &str,
    element: &Element,
    insert: impl FnOnce(&mut Schema, String, ComponentId),
    id: ComponentId,
) -> Result<()> {
    let name = element
        .get_attribute("name")
        .ok_or_else(|| {
            Error::Xml(format!(
                "global <{}> is missing a name attribute",
                element.local_name()
            ))
        })?
        .to_string();
    let schema = set
        .schemas
        .get_mut(key)
        .ok_or_else(|| Error::Xml(format!("schema entry missing for namespace '{}'", key)))?;
    insert(schema, name, id);
    Ok(())
}

fn base_node(
    kind: ComponentKind,
    element: &Element,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> ComponentNode {
    let mut node = ComponentNode::new(kind);
    node.name = element.get_attribute("name").map(str::to_string);
    node.target_namespace = scope.target_namespace.map(str::to_string);
    node.parent = parent;
    node.local = parent.is_some();
    node
}

fn parse_element_decl(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let mut node = base_node(ComponentKind::Element, element, scope, parent);
    let (min, max) = parse_occurs(element)?;
    node.min_occurs = min;
    node.max_occurs = max;
    node.nillable = element.get_attribute("nillable") == Some("true");
    node.reference = element.resolve_attribute_qname("ref")?;
    node.type_ref = element.resolve_attribute_qname("type")?;
    node.substitution_group = element.resolve_attribute_qname("substitutionGroup")?;
    // globals are always qualified on the wire
    node.qualified = parent.is_none() || form_qualified(element, scope.element_form_qualified);

    let id = set.alloc(node);
    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        let content = match child.local_name() {
            "complexType" => Some(parse_complex_type(child, set, scope, Some(id))?),
            "simpleType" => Some(parse_simple_type(child, set, scope, Some(id))?),
            "annotation" | "key" | "keyref" | "unique" => None,
            other => {
                return Err(Error::Xml(format!(
                    "unexpected element content <{}>",
                    other
                )))
            }
        };
        if let Some(content_id) = content {
            set.node_mut(id).content.push(content_id);
        }
    }
    Ok(id)
}

fn parse_any(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let mut node = base_node(ComponentKind::Any, element, scope, parent);
    let (min, max) = parse_occurs(element)?;
    node.min_occurs = min;
    node.max_occurs = max;
    Ok(set.alloc(node))
}

fn parse_complex_type(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let mut node = base_node(ComponentKind::ComplexType, element, scope, parent);
    node.mixed = element.get_attribute("mixed") == Some("true");
    let id = set.alloc(node);

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        match child.local_name() {
            "sequence" | "choice" | "all" => {
                let group = parse_model_group(child, set, scope, Some(id))?;
                set.node_mut(id).content.push(group);
            }
            "group" => {
                let group = parse_group(child, set, scope, Some(id))?;
                set.node_mut(id).content.push(group);
            }
            "complexContent" => {
                let content = parse_content_wrapper(
                    child,
                    set,
                    scope,
                    Some(id),
                    ComponentKind::ComplexContent,
                )?;
                set.node_mut(id).content.push(content);
            }
            "simpleContent" => {
                let content = parse_content_wrapper(
                    child,
                    set,
                    scope,
                    Some(id),
                    ComponentKind::SimpleContent,
                )?;
                set.node_mut(id).content.push(content);
            }
            "attribute" | "attributeGroup" | "anyAttribute" => {
                parse_attribute_item(child, set, scope, id)?;
            }
            "annotation" => {}
            other => {
                return Err(Error::Xml(format!(
                    "unexpected complexType content <{}>",
                    other
                )))
            }
        }
    }
    Ok(id)
}

fn parse_content_wrapper(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
    kind: ComponentKind,
) -> Result<ComponentId> {
    let mut node = base_node(kind, element, scope, parent);
    node.mixed = element.get_attribute("mixed") == Some("true");
    let id = set.alloc(node);

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        match child.local_name() {
            "restriction" => {
                let step = parse_derivation(child, set, scope, id, ComponentKind::Restriction)?;
                set.node_mut(id).content.push(step);
            }
            "extension" => {
                let step = parse_derivation(child, set, scope, id, ComponentKind::Extension)?;
                set.node_mut(id).content.push(step);
            }
            "annotation" => {}
            other => {
                return Err(Error::Xml(format!(
                    "unexpected content-model child <{}>",
                    other
                )))
            }
        }
    }
    Ok(id)
}

fn parse_derivation(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: ComponentId,
    kind: ComponentKind,
) -> Result<ComponentId> {
    let mut node = base_node(kind, element, scope, Some(parent));
    node.base = element.resolve_attribute_qname("base")?;
    let id = set.alloc(node);

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        match child.local_name() {
            "sequence" | "choice" | "all" => {
                let group = parse_model_group(child, set, scope, Some(id))?;
                set.node_mut(id).content.push(group);
            }
            "group" => {
                let group = parse_group(child, set, scope, Some(id))?;
                set.node_mut(id).content.push(group);
            }
            "attribute" | "attributeGroup" | "anyAttribute" => {
                parse_attribute_item(child, set, scope, id)?;
            }
            // facets constrain values, not structure
            "annotation" | "enumeration" | "pattern" | "length" | "minLength" | "maxLength"
            | "minInclusive" | "maxInclusive" | "minExclusive" | "maxExclusive" | "totalDigits"
            | "fractionDigits" | "whiteSpace" | "simpleType" => {}
            other => {
                return Err(Error::Xml(format!(
                    "unexpected derivation content <{}>",
                    other
                )))
            }
        }
    }
    Ok(id)
}

fn parse_model_group(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let model = match element.local_name() {
        "sequence" => ModelKind::Sequence,
        "choice" => ModelKind::Choice,
        "all" => ModelKind::All,
        other => {
            return Err(Error::Xml(format!(
                "expected a model group, found <{}>",
                other
            )))
        }
    };
    let mut node = base_node(ComponentKind::ModelGroup(model), element, scope, parent);
    let (min, max) = parse_occurs(element)?;
    node.min_occurs = min;
    node.max_occurs = max;
    let id = set.alloc(node);

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        let particle = match child.local_name() {
            "element" => parse_element_decl(child, set, scope, Some(id))?,
            "sequence" | "choice" | "all" => parse_model_group(child, set, scope, Some(id))?,
            "group" => parse_group(child, set, scope, Some(id))?,
            "any" => parse_any(child, set, scope, Some(id))?,
            "annotation" => continue,
            other => {
                return Err(Error::Xml(format!(
                    "unexpected model group content <{}>",
                    other
                )))
            }
        };
        set.node_mut(id).content.push(particle);
    }
    Ok(id)
}

fn parse_group(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let reference = element.resolve_attribute_qname("ref")?;
    let kind = if reference.is_some() {
        ComponentKind::GroupReference
    } else {
        ComponentKind::GroupDefinition
    };
    let mut node = base_node(kind, element, scope, parent);
    let (min, max) = parse_occurs(element)?;
    node.min_occurs = min;
    node.max_occurs = max;
    node.reference = reference;
    let id = set.alloc(node);

    if kind == ComponentKind::GroupDefinition {
        for child in &element.children {
            if !is_xsd(child) {
                continue;
            }
            match child.local_name() {
                "sequence" | "choice" | "all" => {
                    let group = parse_model_group(child, set, scope, Some(id))?;
                    set.node_mut(id).content.push(group);
                }
                "annotation" => {}
                other => {
                    return Err(Error::Xml(format!(
                        "unexpected group content <{}>",
                        other
                    )))
                }
            }
        }
    }
    Ok(id)
}

fn parse_simple_type(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let node = base_node(ComponentKind::SimpleType, element, scope, parent);
    let id = set.alloc(node);

    for child in &element.children {
        if !is_xsd(child) {
            continue;
        }
        let content = match child.local_name() {
            "restriction" => {
                let mut step = base_node(ComponentKind::Restriction, child, scope, Some(id));
                step.base = child.resolve_attribute_qname("base")?;
                let step_id = set.alloc(step);
                // a nested simpleType stands in for the base attribute
                for inner in child.find_children("simpleType") {
                    let inner_id = parse_simple_type(inner, set, scope, Some(step_id))?;
                    set.node_mut(step_id).content.push(inner_id);
                }
                Some(step_id)
            }
            "union" => {
                let mut step = base_node(ComponentKind::Union, child, scope, Some(id));
                if let Some(members) = child.get_attribute("memberTypes") {
                    for member in members.split_whitespace() {
                        step.member_types.push(child.namespaces.resolve(member)?);
                    }
                }
                let step_id = set.alloc(step);
                for inner in child.find_children("simpleType") {
                    let inner_id = parse_simple_type(inner, set, scope, Some(step_id))?;
                    set.node_mut(step_id).content.push(inner_id);
                }
                Some(step_id)
            }
            "list" => {
                let mut step = base_node(ComponentKind::List, child, scope, Some(id));
                step.item_type = child.resolve_attribute_qname("itemType")?;
                let step_id = set.alloc(step);
                for inner in child.find_children("simpleType") {
                    let inner_id = parse_simple_type(inner, set, scope, Some(step_id))?;
                    set.node_mut(step_id).content.push(inner_id);
                }
                Some(step_id)
            }
            "annotation" => None,
            other => {
                return Err(Error::Xml(format!(
                    "unexpected simpleType content <{}>",
                    other
                )))
            }
        };
        if let Some(content_id) = content {
            set.node_mut(id).content.push(content_id);
        }
    }
    Ok(id)
}

fn parse_attribute(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let mut node = base_node(ComponentKind::Attribute, element, scope, parent);
    node.reference = element.resolve_attribute_qname("ref")?;
    node.type_ref = element.resolve_attribute_qname("type")?;
    node.qualified = parent.is_none() || form_qualified(element, scope.attribute_form_qualified);
    // the SOAP-encoding array item annotation rides on the reference
    if let Some(raw) = element.get_attribute_qname(&QName::namespaced(WSDL_NAMESPACE, "arrayType"))
    {
        let stripped = raw.split('[').next().unwrap_or(raw).trim();
        node.array_type = Some(element.namespaces.resolve(stripped)?);
    }
    let id = set.alloc(node);
    for child in element.find_children("simpleType") {
        let inner = parse_simple_type(child, set, scope, Some(id))?;
        set.node_mut(id).content.push(inner);
    }
    Ok(id)
}

fn parse_attribute_group(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: Option<ComponentId>,
) -> Result<ComponentId> {
    let mut node = base_node(ComponentKind::AttributeGroup, element, scope, parent);
    node.reference = element.resolve_attribute_qname("ref")?;
    let id = set.alloc(node);
    if set.node(id).reference.is_none() {
        for child in &element.children {
            if !is_xsd(child) {
                continue;
            }
            match child.local_name() {
                "attribute" | "attributeGroup" | "anyAttribute" => {
                    parse_attribute_item(child, set, scope, id)?;
                }
                "annotation" => {}
                other => {
                    return Err(Error::Xml(format!(
                        "unexpected attributeGroup content <{}>",
                        other
                    )))
                }
            }
        }
    }
    Ok(id)
}

fn parse_attribute_item(
    element: &Element,
    set: &mut SchemaSet,
    scope: SchemaScope<'_>,
    parent: ComponentId,
) -> Result<()> {
    let id = match element.local_name() {
        "attribute" => parse_attribute(element, set, scope, Some(parent))?,
        "attributeGroup" => parse_attribute_group(element, set, scope, Some(parent))?,
        "anyAttribute" => {
            let node = base_node(ComponentKind::AnyAttribute, element, scope, Some(parent));
            set.alloc(node)
        }
        other => {
            return Err(Error::Xml(format!(
                "expected attribute content, found <{}>",
                other
            )))
        }
    };
    set.node_mut(parent).attributes.push(id);
    Ok(())
}

/// Parse a standalone schema document string into a fresh set
pub fn parse_schema_document(xml: &str) -> Result<SchemaSet> {
    let document = crate::documents::Document::from_string(xml)?;
    let root = document
        .root()
        .ok_or_else(|| Error::Xml("empty schema document".into()))?;
    let mut set = SchemaSet::new();
    parse_schema(root, &mut set)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::XSD_NAMESPACE;

    const PERSON_SCHEMA: &str = r#"
        <xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    xmlns:tns="urn:example"
                    targetNamespace="urn:example"
                    elementFormDefault="qualified">
          <xsd:complexType name="Person">
            <xsd:sequence>
              <xsd:element name="name" type="xsd:string"/>
              <xsd:element name="age" type="xsd:int"/>
            </xsd:sequence>
          </xsd:complexType>
          <xsd:element name="Person" type="tns:Person"/>
        </xsd:schema>
    "#;

    #[test]
    fn test_parse_person_schema() {
        let set = parse_schema_document(PERSON_SCHEMA).unwrap();
        let schema = set.schema("urn:example").unwrap();
        assert_eq!(schema.recommended_prefix.as_deref(), Some("tns"));
        assert!(schema.element_form_qualified);

        let person = set
            .type_definition(&QName::namespaced("urn:example", "Person"))
            .unwrap();
        let person = set.component(person);
        assert!(person.is_complex());
        assert!(!person.is_local());

        let seq = person.content_first().unwrap();
        assert!(seq.is_sequence());
        let fields: Vec<_> = seq.content().map(|c| c.name().unwrap().to_string()).collect();
        assert_eq!(fields, vec!["name", "age"]);

        let name = seq.content().next().unwrap();
        assert_eq!(
            name.node().type_ref,
            Some(QName::namespaced(XSD_NAMESPACE, "string"))
        );
        assert!(name.is_local());
        assert!(name.node().qualified);
    }

    #[test]
    fn test_parse_occurs_and_nillable() {
        let xml = r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:x">
              <complexType name="T">
                <sequence maxOccurs="3">
                  <element name="e" minOccurs="0" maxOccurs="unbounded" nillable="true"/>
                </sequence>
              </complexType>
            </schema>
        "#;
        let set = parse_schema_document(xml).unwrap();
        let t = set
            .type_definition(&QName::namespaced("urn:x", "T"))
            .unwrap();
        let seq = set.component(t).content_first().unwrap();
        assert_eq!(seq.node().max_occurs, MaxOccurs::Bounded(3));
        let e = seq.content().next().unwrap();
        assert_eq!(e.node().min_occurs, 0);
        assert!(e.node().max_occurs.is_unbounded());
        assert!(e.node().nillable);
    }

    #[test]
    fn test_parse_group_definition_and_reference() {
        let xml = r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:tns="urn:x" targetNamespace="urn:x">
              <group name="NameGroup">
                <sequence>
                  <element name="first" type="string"/>
                  <element name="last" type="string"/>
                </sequence>
              </group>
              <complexType name="T">
                <sequence>
                  <group ref="tns:NameGroup"/>
                </sequence>
              </complexType>
            </schema>
        "#;
        let set = parse_schema_document(xml).unwrap();
        let def = set
            .group_definition(&QName::namespaced("urn:x", "NameGroup"))
            .unwrap();
        assert!(set.component(def).is_group_definition());

        let t = set.type_definition(&QName::namespaced("urn:x", "T")).unwrap();
        let seq = set.component(t).content_first().unwrap();
        let group_ref = seq.content().next().unwrap();
        assert!(group_ref.is_reference());
        assert_eq!(
            group_ref.resolve_group_reference().unwrap().id,
            def
        );
    }

    #[test]
    fn test_parse_array_type_annotation() {
        let xml = r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    xmlns:soapenc="http://schemas.xmlsoap.org/soap/encoding/"
                    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                    targetNamespace="urn:x">
              <complexType name="StringArray">
                <complexContent>
                  <restriction base="soapenc:Array">
                    <attribute ref="soapenc:arrayType" wsdl:arrayType="xsd:string[]"/>
                  </restriction>
                </complexContent>
              </complexType>
            </schema>
        "#;
        let set = parse_schema_document(xml).unwrap();
        let t = set
            .type_definition(&QName::namespaced("urn:x", "StringArray"))
            .unwrap();
        let content = set.component(t).content_first().unwrap();
        let restriction = content.content_first().unwrap();
        assert!(restriction.is_restriction());
        let attr = restriction.attribute_content().next().unwrap();
        assert_eq!(
            attr.node().array_type,
            Some(QName::namespaced(XSD_NAMESPACE, "string"))
        );
    }

    #[test]
    fn test_simple_type_union_members() {
        let xml = r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <simpleType name="U">
                <union memberTypes="xsd:int xsd:string"/>
              </simpleType>
            </schema>
        "#;
        let set = parse_schema_document(xml).unwrap();
        let u = set.type_definition(&QName::namespaced("urn:x", "U")).unwrap();
        let union = set.component(u).content_first().unwrap();
        assert!(union.is_union());
        assert_eq!(union.node().member_types.len(), 2);
    }
}
