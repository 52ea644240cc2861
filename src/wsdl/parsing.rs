//! WSDL document parsing
//!
//! Reads a `<definitions>` element tree into the [`WsdlDocument`]
//! model, parsing inline `<types>` schemas into the shared schema set.

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::namespaces::{WSDL_NAMESPACE, WSDL_SOAP_NAMESPACE, XSD_NAMESPACE};
use crate::schema::parse_schema;
use crate::wsdl::{
    Binding, BindingOperation, Message, MessageRoleBinding, Part, Port, PortType,
    PortTypeOperation, Service, SoapBinding, SoapBody, SoapHeader, SoapOperation, WsdlDocument,
};
use indexmap::IndexMap;

fn is_wsdl(element: &Element) -> bool {
    element.namespace() == Some(WSDL_NAMESPACE)
}

fn is_soap(element: &Element) -> bool {
    element.namespace() == Some(WSDL_SOAP_NAMESPACE)
}

fn required_name(element: &Element) -> Result<String> {
    element
        .get_attribute("name")
        .map(str::to_string)
        .ok_or_else(|| {
            Error::WsdlFormat(format!(
                "<{}> is missing a name attribute",
                element.local_name()
            ))
        })
}

/// Parse a WSDL document from its XML text
pub fn parse_wsdl(xml: &str) -> Result<WsdlDocument> {
    let document = Document::from_string(xml)?;
    let root = document
        .root()
        .ok_or_else(|| Error::WsdlFormat("empty WSDL document".into()))?;
    parse_definitions(root)
}

/// Parse a `<definitions>` element tree
pub fn parse_definitions(root: &Element) -> Result<WsdlDocument> {
    if !is_wsdl(root) || root.local_name() != "definitions" {
        return Err(Error::WsdlFormat(format!(
            "expected a WSDL <definitions> element, found <{}>",
            root.local_name()
        )));
    }

    let mut doc = WsdlDocument {
        name: root.get_attribute("name").map(str::to_string),
        target_namespace: root.get_attribute("targetNamespace").map(str::to_string),
        ..Default::default()
    };

    for child in &root.children {
        if !is_wsdl(child) {
            continue;
        }
        match child.local_name() {
            "types" => {
                for schema in &child.children {
                    if schema.namespace() == Some(XSD_NAMESPACE)
                        && schema.local_name() == "schema"
                    {
                        parse_schema(schema, &mut doc.schemas)?;
                    }
                }
            }
            "message" => {
                let message = parse_message(child)?;
                doc.messages.insert(message.name.clone(), message);
            }
            "portType" => {
                let port_type = parse_port_type(child)?;
                doc.port_types.insert(port_type.name.clone(), port_type);
            }
            "binding" => {
                let binding = parse_binding(child)?;
                doc.bindings.insert(binding.name.clone(), binding);
            }
            "service" => {
                let service = parse_service(child)?;
                doc.services.insert(service.name.clone(), service);
            }
            "import" | "documentation" => {}
            other => {
                return Err(Error::WsdlFormat(format!(
                    "unexpected definitions child <{}>",
                    other
                )))
            }
        }
    }
    Ok(doc)
}

fn parse_message(element: &Element) -> Result<Message> {
    let mut parts = Vec::new();
    for part in element.find_children("part") {
        parts.push(Part {
            name: required_name(part)?,
            element: part.resolve_attribute_qname("element")?,
            type_ref: part.resolve_attribute_qname("type")?,
        });
    }
    Ok(Message {
        name: required_name(element)?,
        parts,
    })
}

fn parse_port_type(element: &Element) -> Result<PortType> {
    let mut operations = IndexMap::new();
    for op in element.find_children("operation") {
        let name = required_name(op)?;
        let input = match op.find_child("input") {
            Some(input) => input.resolve_attribute_qname("message")?,
            None => None,
        };
        let output = match op.find_child("output") {
            Some(output) => output.resolve_attribute_qname("message")?,
            None => None,
        };
        operations.insert(
            name.clone(),
            PortTypeOperation {
                name,
                input,
                output,
            },
        );
    }
    Ok(PortType {
        name: required_name(element)?,
        operations,
    })
}

fn parse_binding(element: &Element) -> Result<Binding> {
    let soap_binding = element
        .children
        .iter()
        .find(|c| is_soap(c) && c.local_name() == "binding")
        .map(|c| SoapBinding {
            style: c.get_attribute("style").map(str::to_string),
            transport: c.get_attribute("transport").map(str::to_string),
        });

    let mut operations = Vec::new();
    for op in element.find_children("operation") {
        if !is_wsdl(op) {
            continue;
        }
        operations.push(parse_binding_operation(op)?);
    }

    Ok(Binding {
        name: required_name(element)?,
        port_type: element.resolve_attribute_qname("type")?,
        soap_binding,
        operations,
    })
}

fn parse_binding_operation(element: &Element) -> Result<BindingOperation> {
    let soap_operation = element
        .children
        .iter()
        .find(|c| is_soap(c) && c.local_name() == "operation")
        .map(|c| SoapOperation {
            action: c.get_attribute("soapAction").map(str::to_string),
            style: c.get_attribute("style").map(str::to_string),
        });

    let input = match element.find_child("input") {
        Some(role) => Some(parse_role_binding(role)?),
        None => None,
    };
    let output = match element.find_child("output") {
        Some(role) => Some(parse_role_binding(role)?),
        None => None,
    };

    Ok(BindingOperation {
        name: required_name(element)?,
        soap_operation,
        input,
        output,
    })
}

fn parse_role_binding(element: &Element) -> Result<MessageRoleBinding> {
    let mut role = MessageRoleBinding::default();
    for child in &element.children {
        if !is_soap(child) {
            continue;
        }
        match child.local_name() {
            "body" => {
                role.body = Some(SoapBody {
                    use_mode: child.get_attribute("use").map(str::to_string),
                    namespace: child.get_attribute("namespace").map(str::to_string),
                    encoding_style: child.get_attribute("encodingStyle").map(str::to_string),
                });
            }
            "header" => {
                let message = child.resolve_attribute_qname("message")?.ok_or_else(|| {
                    Error::WsdlFormat("soap:header is missing a message attribute".into())
                })?;
                let part = child
                    .get_attribute("part")
                    .ok_or_else(|| {
                        Error::WsdlFormat("soap:header is missing a part attribute".into())
                    })?
                    .to_string();
                role.headers.push(SoapHeader {
                    message,
                    part,
                    use_mode: child.get_attribute("use").map(str::to_string),
                    namespace: child.get_attribute("namespace").map(str::to_string),
                    encoding_style: child.get_attribute("encodingStyle").map(str::to_string),
                });
            }
            _ => {}
        }
    }
    Ok(role)
}

fn parse_service(element: &Element) -> Result<Service> {
    let mut ports = Vec::new();
    for port in element.find_children("port") {
        let binding = port.resolve_attribute_qname("binding")?.ok_or_else(|| {
            Error::WsdlFormat(format!(
                "port '{}' is missing a binding attribute",
                port.get_attribute("name").unwrap_or("?")
            ))
        })?;
        let address = port
            .children
            .iter()
            .find(|c| is_soap(c) && c.local_name() == "address")
            .and_then(|c| c.get_attribute("location"))
            .map(str::to_string);
        ports.push(Port {
            name: required_name(port)?,
            binding,
            address,
        });
    }
    Ok(Service {
        name: required_name(element)?,
        ports,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::namespaces::QName;

    pub(crate) const PERSON_WSDL: &str = r#"
<wsdl:definitions name="PersonService"
    targetNamespace="urn:person"
    xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema"
    xmlns:tns="urn:person">
  <wsdl:types>
    <xsd:schema targetNamespace="urn:person" elementFormDefault="qualified"
                xmlns:tns="urn:person">
      <xsd:complexType name="Person">
        <xsd:sequence>
          <xsd:element name="name" type="xsd:string"/>
          <xsd:element name="age" type="xsd:int"/>
        </xsd:sequence>
      </xsd:complexType>
      <xsd:element name="Person" type="tns:Person"/>
    </xsd:schema>
  </wsdl:types>
  <wsdl:message name="GetPersonRequest">
    <wsdl:part name="body" element="tns:Person"/>
  </wsdl:message>
  <wsdl:message name="GetPersonResponse">
    <wsdl:part name="body" element="tns:Person"/>
  </wsdl:message>
  <wsdl:portType name="PersonPortType">
    <wsdl:operation name="GetPerson">
      <wsdl:input message="tns:GetPersonRequest"/>
      <wsdl:output message="tns:GetPersonResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="PersonBinding" type="tns:PersonPortType">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="GetPerson">
      <soap:operation soapAction="urn:person#GetPerson"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="PersonService">
    <wsdl:port name="PersonPort" binding="tns:PersonBinding">
      <soap:address location="http://localhost/person"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>
"#;

    #[test]
    fn test_parse_person_wsdl() {
        let doc = parse_wsdl(PERSON_WSDL).unwrap();
        assert_eq!(doc.name.as_deref(), Some("PersonService"));
        assert_eq!(doc.target_namespace.as_deref(), Some("urn:person"));

        let message = doc.message(&QName::namespaced("urn:person", "GetPersonRequest")).unwrap();
        assert_eq!(message.parts.len(), 1);
        assert_eq!(
            message.parts[0].element,
            Some(QName::namespaced("urn:person", "Person"))
        );

        let binding = doc.binding(&QName::namespaced("urn:person", "PersonBinding")).unwrap();
        assert_eq!(binding.operations.len(), 1);
        let op = &binding.operations[0];
        assert_eq!(binding.effective_style(op), "document");
        assert_eq!(
            op.input.as_ref().unwrap().body.as_ref().unwrap().use_mode.as_deref(),
            Some("literal")
        );
        assert_eq!(
            op.soap_operation.as_ref().unwrap().action.as_deref(),
            Some("urn:person#GetPerson")
        );

        let schema = doc.schemas.schema("urn:person").unwrap();
        assert!(schema.types.contains_key("Person"));
        assert!(schema.elements.contains_key("Person"));

        let service = doc.services.get("PersonService").unwrap();
        assert_eq!(service.ports[0].address.as_deref(), Some("http://localhost/person"));
    }

    #[test]
    fn test_binding_without_soap_extension() {
        let xml = r#"
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
    xmlns:tns="urn:x" targetNamespace="urn:x" name="S">
  <binding name="HttpBinding" type="tns:PT">
    <operation name="get"/>
  </binding>
</definitions>
"#;
        let doc = parse_wsdl(xml).unwrap();
        let binding = doc.bindings.get("HttpBinding").unwrap();
        assert!(binding.soap_binding.is_none());
    }
}
