//! Particle flattening
//!
//! Converts nested model-group content into a flat ordered list of
//! element components. Nested sequence/choice groups are spliced in
//! place so flattening needs no explicit recursion; group references
//! and definitions are resolved during the same scan.

use crate::error::{ClassificationError, Result};
use crate::schema::{Component, ComponentId};

fn unexpected(component: &Component<'_>) -> ClassificationError {
    let mut err = ClassificationError::new(format!(
        "unexpected schema item <{}>",
        component.kind().tag()
    ))
    .with_path(component.item_trace());
    if let Some(ns) = component.target_namespace() {
        err = err.with_namespace(ns);
    }
    if let Some(name) = component.name() {
        err = err.with_name(name);
    }
    err
}

/// Flatten the content of a complex type or derivation step.
///
/// A top-level `<all>` group's content is used directly as the flat
/// list; the generator treats it as already ordered. An `<all>` nested
/// anywhere below top level is rejected.
pub fn flatten_content(content: Component<'_>) -> Result<Vec<ComponentId>> {
    if content.is_all() {
        return Ok(content.node().content.clone());
    }
    if content.is_element() {
        return Ok(vec![content.id]);
    }
    if !content.is_model_group() {
        return Err(unexpected(&content).into());
    }

    let set = content.set();
    let mut items: Vec<ComponentId> = match content.kind() {
        crate::schema::ComponentKind::GroupReference => {
            vec![content.id]
        }
        _ => content.node().content.clone(),
    };

    // Scan-splice loop: the cursor only advances past elements, so a
    // spliced-in group is re-examined at the same position.
    let mut i = 0;
    while i < items.len() {
        let item = set.component(items[i]);
        if item.is_element() {
            i += 1;
            continue;
        }
        if item.is_all() {
            return Err(unexpected(&item).into());
        }
        if item.kind() == crate::schema::ComponentKind::GroupReference {
            let definition = item.resolve_group_reference().ok_or_else(|| {
                ClassificationError::new(format!(
                    "unresolvable group reference '{}'",
                    item.node()
                        .reference
                        .as_ref()
                        .map(|q| q.to_string())
                        .unwrap_or_default()
                ))
                .with_path(item.item_trace())
            })?;
            items[i] = definition.id;
            continue;
        }
        if item.is_group_definition() {
            let children = item.node().content.clone();
            items.splice(i..=i, children);
            continue;
        }
        if item.is_sequence() || item.is_choice() {
            let children = item.node().content.clone();
            items.splice(i..=i, children);
            continue;
        }
        return Err(unexpected(&item).into());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;
    use crate::schema::{parse_schema_document, SchemaSet};

    fn content_of<'a>(set: &'a SchemaSet, name: &str) -> Component<'a> {
        let id = set
            .type_definition(&QName::namespaced("urn:x", name))
            .unwrap();
        set.component(id).content_first().unwrap()
    }

    fn names(set: &SchemaSet, ids: &[ComponentId]) -> Vec<String> {
        ids.iter()
            .map(|id| set.component(*id).name().unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn test_already_flat_content_is_unchanged() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence>
                  <element name="a" type="xsd:string"/>
                  <element name="b" type="xsd:string"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let flat = flatten_content(content_of(&set, "T")).unwrap();
        assert_eq!(names(&set, &flat), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_sequence_and_choice_are_spliced_in_place() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence>
                  <element name="a" type="xsd:string"/>
                  <choice>
                    <element name="b" type="xsd:string"/>
                    <sequence>
                      <element name="c" type="xsd:string"/>
                    </sequence>
                  </choice>
                  <element name="d" type="xsd:string"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let flat = flatten_content(content_of(&set, "T")).unwrap();
        assert_eq!(names(&set, &flat), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_group_reference_resolves_through_definition() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    xmlns:tns="urn:x" targetNamespace="urn:x">
              <group name="G">
                <sequence>
                  <element name="x" type="xsd:string"/>
                  <element name="y" type="xsd:string"/>
                </sequence>
              </group>
              <complexType name="T">
                <sequence>
                  <element name="a" type="xsd:string"/>
                  <group ref="tns:G"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let flat = flatten_content(content_of(&set, "T")).unwrap();
        assert_eq!(names(&set, &flat), vec!["a", "x", "y"]);
    }

    #[test]
    fn test_top_level_all_content_is_used_directly() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <all>
                  <element name="a" type="xsd:string"/>
                  <element name="b" type="xsd:string"/>
                </all>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let flat = flatten_content(content_of(&set, "T")).unwrap();
        assert_eq!(names(&set, &flat), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_all_is_rejected() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence>
                  <all>
                    <element name="a" type="xsd:string"/>
                  </all>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let err = flatten_content(content_of(&set, "T")).unwrap_err();
        assert!(err.to_string().contains("unexpected schema item"));
    }
}
