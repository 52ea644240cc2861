//! End-to-end compilation of a small document/literal service

use pretty_assertions::assert_eq;
use soapgen::codegen::{
    assemble_services, build_type, BuildContext, DescriptorKind, TypeRef, WireStyle,
};
use soapgen::namespaces::{NamespaceRegistry, QName};
use soapgen::schema::MaxOccurs;
use soapgen::wsdl::parse_wsdl;
use soapgen::{Generator, GeneratorConfig};

const PERSON_WSDL: &str = r#"
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
fn person_type_compiles_to_two_particles() {
    let doc = parse_wsdl(PERSON_WSDL).unwrap();
    let config = GeneratorConfig::default();
    let mut registry = NamespaceRegistry::new();
    let mut diagnostics = Vec::new();
    let mut ctx = BuildContext {
        set: &doc.schemas,
        config: &config,
        registry: &mut registry,
        diagnostics: &mut diagnostics,
        all_optional: false,
    };

    let id = doc
        .schemas
        .type_definition(&QName::namespaced("urn:person", "Person"))
        .unwrap();
    let descriptor = build_type(&mut ctx, doc.schemas.component(id)).unwrap();

    assert_eq!(descriptor.kind, DescriptorKind::GlobalComplexType);
    assert_eq!(descriptor.particles.len(), 2);
    for (particle, expected) in descriptor.particles.iter().zip(["name", "age"]) {
        assert_eq!(particle.name, expected);
        assert_eq!(particle.min_occurs, 1);
        assert_eq!(particle.max_occurs, MaxOccurs::Bounded(1));
        assert!(!particle.nillable);
        assert!(particle.qualified);
    }
    assert!(matches!(
        descriptor.particles[0].type_ref,
        TypeRef::Builtin(ref q) if q.local_name == "string"
    ));
    assert!(diagnostics.is_empty());
}

#[test]
fn get_person_operation_is_document_literal_with_element_wrapper() {
    let doc = parse_wsdl(PERSON_WSDL).unwrap();
    let config = GeneratorConfig::default();
    let mut registry = NamespaceRegistry::new();
    let mut diagnostics = Vec::new();
    let services = {
        let mut ctx = BuildContext {
            set: &doc.schemas,
            config: &config,
            registry: &mut registry,
            diagnostics: &mut diagnostics,
            all_optional: false,
        };
        assemble_services(&mut ctx, &doc).unwrap()
    };

    assert_eq!(services.len(), 1);
    let binding = &services[0].bindings[0];
    assert_eq!(binding.operations.len(), 1);
    let op = &binding.operations[0];
    assert_eq!(op.style, WireStyle::DocumentLiteral);
    assert_eq!(
        op.input.as_ref().unwrap().reference,
        Some(QName::namespaced("urn:person", "Person"))
    );
    assert_eq!(
        op.output.as_ref().unwrap().reference,
        Some(QName::namespaced("urn:person", "Person"))
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn full_generation_renders_both_artifacts() {
    let generation = Generator::default()
        .generate_from_wsdl_str(PERSON_WSDL)
        .unwrap();

    assert!(generation.diagnostics.is_empty());

    let types = &generation.types_artifact;
    assert!(types.contains("namespace tns \"urn:person\" {"));
    assert!(types.contains("complexType Person_Def qname={urn:person}Person {"));
    assert!(types.contains("particle name field=_name type=xsd:string occurs=1..1 qualified"));
    assert!(types.contains("particle age field=_age type=xsd:int occurs=1..1 qualified"));
    assert!(types.contains("element Person_Dec type=ref tns:Person qname={urn:person}Person"));

    let client = &generation.client_artifact;
    assert!(client.contains("service PersonService {"));
    assert!(client.contains("locator PersonService {"));
    assert!(client
        .contains("port PersonPort binding=PersonBinding address=\"http://localhost/person\""));
    assert!(client.contains("binding PersonBinding portType=PersonPortType {"));
    assert!(client.contains(
        "operation GetPerson style=document/literal action=\"urn:person#GetPerson\" {"
    ));
    assert!(client.contains("input element=tns:Person"));
    assert!(client.contains("output element=tns:Person"));
}

#[test]
fn simple_naming_drops_unit_suffixes() {
    let generator = Generator::new(GeneratorConfig {
        simple_naming: true,
        ..GeneratorConfig::default()
    });
    let generation = generator.generate_from_wsdl_str(PERSON_WSDL).unwrap();
    assert!(generation.types_artifact.contains("complexType Person qname="));
    assert!(!generation.types_artifact.contains("Person_Def"));
}
