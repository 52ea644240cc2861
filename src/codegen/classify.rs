//! Shape classification
//!
//! Maps each schema component onto exactly one codec-builder variant.
//! The dispatch is a closed enum so a component that fits no shape (or
//! more than an unsupported one) fails loudly instead of falling
//! through to a partially-matching builder.

use crate::error::{ClassificationError, Result};
use crate::namespaces::{SOAP_ENC12_NAMESPACE, SOAP_ENC_NAMESPACE};
use crate::schema::Component;

/// The codec-builder variant a component dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// complexType with model-group or empty content
    ComplexType,
    /// complexContent restriction of a schema base
    ComplexContentRestriction,
    /// complexContent extension of a schema base
    ComplexContentExtension,
    /// complexContent derivation of the SOAP-encoding Array base
    ComplexContentArray,
    /// complexType/simpleContent derivation
    SimpleContent,
    /// simpleType restriction
    SimpleRestriction,
    /// simpleType union
    SimpleUnion,
    /// simpleType list
    SimpleList,
    /// element with a declared `type=` (built-in or global)
    ElementDeclaredType,
    /// element with an inline anonymous simpleType
    ElementLocalSimpleType,
    /// element with an inline anonymous complexType
    ElementLocalComplexType,
}

fn error_for(component: &Component<'_>, message: impl Into<String>) -> ClassificationError {
    let mut err = ClassificationError::new(message).with_path(component.item_trace());
    if let Some(ns) = component.target_namespace() {
        err = err.with_namespace(ns);
    }
    if let Some(name) = component.name() {
        err = err.with_name(name);
    }
    err
}

/// True if the QName names the SOAP-encoding Array base (1.1 or 1.2)
pub fn is_soap_array_base(qname: &crate::namespaces::QName) -> bool {
    qname.is(SOAP_ENC_NAMESPACE, "Array") || qname.is(SOAP_ENC12_NAMESPACE, "Array")
}

/// Classify a type definition or element declaration into its shape
pub fn classify(component: Component<'_>) -> Result<Shape> {
    if component.is_element() {
        return classify_element(component);
    }
    if component.is_complex() {
        return classify_complex_type(component);
    }
    if component.is_simple() {
        return classify_simple_type(component);
    }
    Err(error_for(&component, "unexpected schema item").into())
}

fn classify_element(component: Component<'_>) -> Result<Shape> {
    if let Some(inline) = component.content_first() {
        if inline.is_complex() {
            return Ok(Shape::ElementLocalComplexType);
        }
        if inline.is_simple() {
            return Ok(Shape::ElementLocalSimpleType);
        }
        return Err(error_for(&component, "unknown element declaration").into());
    }
    // no inline type: a declared type=, or untyped (marshals as any)
    Ok(Shape::ElementDeclaredType)
}

fn classify_complex_type(component: Component<'_>) -> Result<Shape> {
    let content = match component.content_first() {
        // attribute-only or empty type
        None => return Ok(Shape::ComplexType),
        Some(c) => c,
    };
    if content.is_model_group() {
        return Ok(Shape::ComplexType);
    }
    if content.is_simple_content() {
        return Ok(Shape::SimpleContent);
    }
    if content.is_complex_content() {
        let step = content.content_first().ok_or_else(|| {
            error_for(&component, "complexContent without restriction or extension")
        })?;
        let base = step.node().base.as_ref().ok_or_else(|| {
            error_for(&component, "complexContent derivation without a base")
        })?;
        if is_soap_array_base(base) {
            return Ok(Shape::ComplexContentArray);
        }
        if step.is_restriction() {
            return Ok(Shape::ComplexContentRestriction);
        }
        if step.is_extension() {
            return Ok(Shape::ComplexContentExtension);
        }
        return Err(error_for(&component, "unknown complex type definition").into());
    }
    Err(error_for(&component, "unknown complex type definition").into())
}

fn classify_simple_type(component: Component<'_>) -> Result<Shape> {
    let content = component
        .content_first()
        .ok_or_else(|| error_for(&component, "unknown simple type definition"))?;
    if content.is_restriction() {
        return Ok(Shape::SimpleRestriction);
    }
    if content.is_union() {
        return Ok(Shape::SimpleUnion);
    }
    if content.is_list() {
        return Ok(Shape::SimpleList);
    }
    Err(error_for(&component, "unknown simple type definition").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;
    use crate::schema::{parse_schema_document, SchemaSet};

    fn shape_of(set: &SchemaSet, name: &str) -> Result<Shape> {
        let id = set
            .type_definition(&QName::namespaced("urn:x", name))
            .or_else(|| set.element_declaration(&QName::namespaced("urn:x", name)))
            .unwrap();
        classify(set.component(id))
    }

    #[test]
    fn test_classify_all_shapes() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema"
                    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                    xmlns:tns="urn:x"
                    xmlns:soapenc="http://schemas.xmlsoap.org/soap/encoding/"
                    targetNamespace="urn:x">
              <complexType name="Plain">
                <sequence><element name="a" type="xsd:string"/></sequence>
              </complexType>
              <complexType name="Empty"/>
              <complexType name="Ext">
                <complexContent>
                  <extension base="tns:Plain">
                    <sequence><element name="b" type="xsd:string"/></sequence>
                  </extension>
                </complexContent>
              </complexType>
              <complexType name="Restr">
                <complexContent>
                  <restriction base="tns:Plain"/>
                </complexContent>
              </complexType>
              <complexType name="Arr">
                <complexContent>
                  <restriction base="soapenc:Array">
                    <attribute ref="soapenc:arrayType"/>
                  </restriction>
                </complexContent>
              </complexType>
              <complexType name="Simple">
                <simpleContent>
                  <extension base="xsd:string">
                    <attribute name="lang" type="xsd:string"/>
                  </extension>
                </simpleContent>
              </complexType>
              <simpleType name="SR"><restriction base="xsd:string"/></simpleType>
              <simpleType name="SU"><union memberTypes="xsd:int xsd:string"/></simpleType>
              <simpleType name="SL"><list itemType="xsd:int"/></simpleType>
              <element name="Declared" type="tns:Plain"/>
              <element name="LocalComplex">
                <complexType>
                  <sequence><element name="a" type="xsd:string"/></sequence>
                </complexType>
              </element>
              <element name="LocalSimple">
                <simpleType><restriction base="xsd:string"/></simpleType>
              </element>
            </schema>
            "#,
        )
        .unwrap();

        assert_eq!(shape_of(&set, "Plain").unwrap(), Shape::ComplexType);
        assert_eq!(shape_of(&set, "Empty").unwrap(), Shape::ComplexType);
        assert_eq!(shape_of(&set, "Ext").unwrap(), Shape::ComplexContentExtension);
        assert_eq!(shape_of(&set, "Restr").unwrap(), Shape::ComplexContentRestriction);
        assert_eq!(shape_of(&set, "Arr").unwrap(), Shape::ComplexContentArray);
        assert_eq!(shape_of(&set, "Simple").unwrap(), Shape::SimpleContent);
        assert_eq!(shape_of(&set, "SR").unwrap(), Shape::SimpleRestriction);
        assert_eq!(shape_of(&set, "SU").unwrap(), Shape::SimpleUnion);
        assert_eq!(shape_of(&set, "SL").unwrap(), Shape::SimpleList);
        assert_eq!(shape_of(&set, "Declared").unwrap(), Shape::ElementDeclaredType);
        assert_eq!(
            shape_of(&set, "LocalComplex").unwrap(),
            Shape::ElementLocalComplexType
        );
        assert_eq!(
            shape_of(&set, "LocalSimple").unwrap(),
            Shape::ElementLocalSimpleType
        );
    }

    #[test]
    fn test_empty_simple_type_fails() {
        let set = parse_schema_document(
            r#"
            <schema xmlns="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:x">
              <simpleType name="Bad"/>
            </schema>
            "#,
        )
        .unwrap();
        let err = shape_of(&set, "Bad").unwrap_err();
        assert!(err.to_string().contains("unknown simple type definition"));
    }
}
