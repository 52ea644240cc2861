//! Effective occurrence bounds
//!
//! Resolves one particle's (minOccurs, maxOccurs, nillable) by walking
//! its model-group ancestry in the schema component tree.

use crate::schema::{Component, MaxOccurs};

/// Effective occurrence bounds of one particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Effective minimum occurrence
    pub min: u32,
    /// Effective maximum occurrence
    pub max: MaxOccurs,
    /// Declared nillable flag
    pub nillable: bool,
}

/// Resolve the effective bounds of one particle component.
///
/// `maxOccurs` multiplies through every model-group ancestor, with
/// unbounded absorbing at any level. `minOccurs` collapses to zero as
/// soon as a choice ancestor appears: an optional alternative can never
/// force a mandatory occurrence. The `all_optional` override forces
/// (0, unbounded) for derivation-compatibility cases.
pub fn resolve_occurs(component: Component<'_>, all_optional: bool) -> Occurs {
    let nillable = component.node().nillable;
    if all_optional {
        return Occurs {
            min: 0,
            max: MaxOccurs::Unbounded,
            nillable,
        };
    }

    let mut max = component.node().max_occurs;
    if !max.is_unbounded() {
        let mut ancestor = component.parent();
        while let Some(parent) = ancestor {
            if !parent.is_model_group() {
                break;
            }
            max = max.multiply(parent.node().max_occurs);
            if max.is_unbounded() {
                break;
            }
            ancestor = parent.parent();
        }
    }

    let mut min = component.node().min_occurs;
    let mut ancestor = component.parent();
    while let Some(parent) = ancestor {
        if !parent.is_model_group() {
            break;
        }
        if parent.is_choice() {
            min = 0;
            break;
        }
        ancestor = parent.parent();
    }

    Occurs { min, max, nillable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;
    use crate::schema::{parse_schema_document, SchemaSet};

    fn first_leaf<'a>(set: &'a SchemaSet, type_name: &str) -> Component<'a> {
        let id = set
            .type_definition(&QName::namespaced("urn:x", type_name))
            .unwrap();
        let mut c = set.component(id).content_first().unwrap();
        while !c.is_element() {
            let next = c.content().next().unwrap();
            c = next;
        }
        c
    }

    #[test]
    fn test_max_occurs_multiplies_through_ancestors() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence maxOccurs="3">
                  <element name="e" type="xsd:string" maxOccurs="2"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), false);
        assert_eq!(occurs.max, MaxOccurs::Bounded(6));
        assert_eq!(occurs.min, 1);
    }

    #[test]
    fn test_unbounded_ancestor_absorbs() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence maxOccurs="unbounded">
                  <sequence maxOccurs="2">
                    <element name="e" type="xsd:string"/>
                  </sequence>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), false);
        assert!(occurs.max.is_unbounded());
    }

    #[test]
    fn test_choice_ancestor_forces_min_zero() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <choice>
                  <element name="e" type="xsd:string" minOccurs="5"/>
                </choice>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), false);
        assert_eq!(occurs.min, 0);
    }

    #[test]
    fn test_deep_choice_ancestor_also_forces_min_zero() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <choice>
                  <sequence>
                    <element name="e" type="xsd:string"/>
                  </sequence>
                </choice>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), false);
        assert_eq!(occurs.min, 0);
    }

    #[test]
    fn test_nillable_and_declared_min() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence>
                  <element name="e" type="xsd:string" minOccurs="0" nillable="true"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), false);
        assert_eq!(occurs.min, 0);
        assert_eq!(occurs.max, MaxOccurs::Bounded(1));
        assert!(occurs.nillable);
    }

    #[test]
    fn test_all_optional_override() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    targetNamespace="urn:x">
              <complexType name="T">
                <sequence>
                  <element name="e" type="xsd:string" minOccurs="1" maxOccurs="1"/>
                </sequence>
              </complexType>
            </schema>
            "#,
        )
        .unwrap();
        let occurs = resolve_occurs(first_leaf(&set, "T"), true);
        assert_eq!(occurs.min, 0);
        assert!(occurs.max.is_unbounded());
    }
}
