//! Artifact rendering
//!
//! Renders the descriptor graph to the two textual artifacts. The
//! output is a language-agnostic descriptor notation; ordering is a
//! pure function of descriptor discovery order and the namespace
//! registry's first-seen order, so identical input renders
//! byte-identical output.

use crate::codegen::descriptor::{
    AttributeEntry, CodecDescriptor, DerivationKind, DescriptorKind, DescriptorTable,
    MessageWrapper, OperationDescriptor, Particle, ParticleStyle, ServiceDescriptor, SimpleKind,
    TypeRef,
};
use crate::config::GeneratorConfig;
use crate::namespaces::{
    NamespaceRegistry, QName, SOAP_ENC12_NAMESPACE, SOAP_ENC_NAMESPACE, XSD_NAMESPACE,
};
use crate::schema::NativeBase;

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_qname(registry: &NamespaceRegistry, qname: &QName) -> String {
    match qname.namespace() {
        Some(XSD_NAMESPACE) => format!("xsd:{}", qname.local_name),
        Some(SOAP_ENC_NAMESPACE) => format!("soapenc:{}", qname.local_name),
        Some(SOAP_ENC12_NAMESPACE) => format!("soapenc12:{}", qname.local_name),
        Some(ns) => match registry.alias(ns) {
            Ok(alias) => format!("{}:{}", alias, qname.local_name),
            Err(_) => qname.to_string(),
        },
        None => qname.local_name.clone(),
    }
}

fn render_type_ref(registry: &NamespaceRegistry, type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Builtin(q) => render_qname(registry, q),
        TypeRef::Descriptor(q) => format!("ref {}", render_qname(registry, q)),
        TypeRef::Local(i) => format!("local#{}", i),
        TypeRef::Any => "any".to_string(),
    }
}

fn render_holder(base: Option<NativeBase>) -> String {
    match base {
        Some(b) => format!("holder {}", b),
        None => "holder structural".to_string(),
    }
}

fn render_particle(out: &mut String, registry: &NamespaceRegistry, p: &Particle, depth: usize) {
    indent(out, depth);
    out.push_str(&format!(
        "particle {} field={} type={} occurs={}..{}",
        p.name,
        p.field,
        render_type_ref(registry, &p.type_ref),
        p.min_occurs,
        p.max_occurs
    ));
    if p.qualified {
        out.push_str(" qualified");
    }
    if p.nillable {
        out.push_str(" nillable");
    }
    match p.style {
        ParticleStyle::Declaration => {}
        ParticleStyle::Reference => out.push_str(" style=reference"),
        ParticleStyle::Wildcard => out.push_str(" style=wildcard"),
    }
    if let Some(uri) = &p.encoding_style {
        out.push_str(&format!(" encoding=\"{}\"", uri));
    }
    out.push('\n');
}

fn render_attribute(
    out: &mut String,
    registry: &NamespaceRegistry,
    entry: &AttributeEntry,
    depth: usize,
) {
    indent(out, depth);
    if entry.wildcard {
        out.push_str("attribute wildcard\n");
        return;
    }
    out.push_str(&format!(
        "attribute {} type={}\n",
        render_qname(registry, &entry.qname),
        render_type_ref(registry, &entry.type_ref)
    ));
}

fn unit_header(registry: &NamespaceRegistry, d: &CodecDescriptor) -> String {
    match d.kind {
        DescriptorKind::GlobalComplexType => format!("complexType {}", d.unit_name),
        DescriptorKind::ComplexContent(kind) => {
            let derivation = match kind {
                DerivationKind::Restriction => "restriction",
                DerivationKind::Extension => "extension",
                DerivationKind::Array => "array",
            };
            let base = d
                .base
                .as_ref()
                .map(|b| render_type_ref(registry, b))
                .unwrap_or_else(|| "any".to_string());
            let mut header = format!(
                "complexType {} derivation={} base={}",
                d.unit_name, derivation, base
            );
            if kind == DerivationKind::Array {
                match &d.array_item {
                    Some(item) => {
                        header.push_str(&format!(" item={}", render_type_ref(registry, item)))
                    }
                    None => header.push_str(" item=undeclared"),
                }
            }
            header
        }
        DescriptorKind::SimpleContent => {
            let base = d
                .base
                .as_ref()
                .map(|b| render_type_ref(registry, b))
                .unwrap_or_else(|| "any".to_string());
            format!("simpleType {} derivation=simpleContent base={}", d.unit_name, base)
        }
        DescriptorKind::GlobalSimpleType(SimpleKind::Restriction) => {
            let base = d
                .base
                .as_ref()
                .map(|b| render_type_ref(registry, b))
                .unwrap_or_else(|| "any".to_string());
            format!("simpleType {} derivation=restriction base={}", d.unit_name, base)
        }
        DescriptorKind::GlobalSimpleType(SimpleKind::Union) => {
            let members: Vec<String> = d
                .member_types
                .iter()
                .map(|m| render_qname(registry, m))
                .collect();
            format!(
                "simpleType {} derivation=union members={}",
                d.unit_name,
                members.join(",")
            )
        }
        DescriptorKind::GlobalSimpleType(SimpleKind::List) => {
            let item = d
                .item_type
                .as_ref()
                .map(|q| render_qname(registry, q))
                .unwrap_or_else(|| "any".to_string());
            format!("simpleType {} derivation=list item={}", d.unit_name, item)
        }
        DescriptorKind::GlobalElement => {
            let type_ref = d
                .element_type
                .as_ref()
                .map(|t| render_type_ref(registry, t))
                .unwrap_or_else(|| "any".to_string());
            let mut header = format!("element {} type={}", d.unit_name, type_ref);
            if let Some(head) = &d.substitution_group {
                header.push_str(&format!(
                    " substitutionGroup={}",
                    render_qname(registry, head)
                ));
            }
            header
        }
        DescriptorKind::LocalComplexElement(derivation) => {
            let mut header = format!("localElement {}", d.unit_name);
            if let Some(kind) = derivation {
                let derivation = match kind {
                    DerivationKind::Restriction => "restriction",
                    DerivationKind::Extension => "extension",
                    DerivationKind::Array => "array",
                };
                let base = d
                    .base
                    .as_ref()
                    .map(|b| render_type_ref(registry, b))
                    .unwrap_or_else(|| "any".to_string());
                header.push_str(&format!(" derivation={} base={}", derivation, base));
                if kind == DerivationKind::Array {
                    match &d.array_item {
                        Some(item) => {
                            header.push_str(&format!(" item={}", render_type_ref(registry, item)))
                        }
                        None => header.push_str(" item=undeclared"),
                    }
                }
            }
            header
        }
        DescriptorKind::LocalSimpleElement => {
            let base = d
                .base
                .as_ref()
                .map(|b| render_type_ref(registry, b))
                .unwrap_or_else(|| "any".to_string());
            format!("localElement {} base={}", d.unit_name, base)
        }
    }
}

fn render_descriptor(
    out: &mut String,
    registry: &NamespaceRegistry,
    d: &CodecDescriptor,
    depth: usize,
) {
    let header = unit_header(registry, d);
    let body_empty = d.particles.is_empty()
        && d.attributes.is_empty()
        && d.nested.is_empty()
        && d.holder.is_none()
        && !d.mixed;

    indent(out, depth);
    if body_empty {
        out.push_str(&format!("{} qname={}\n", header, d.qname));
        return;
    }
    out.push_str(&format!("{} qname={} {{\n", header, d.qname));
    if d.mixed {
        indent(out, depth + 1);
        out.push_str("mixed\n");
    }
    for particle in &d.particles {
        render_particle(out, registry, particle, depth + 1);
    }
    for attribute in &d.attributes {
        render_attribute(out, registry, attribute, depth + 1);
    }
    // local anonymous descriptors stay inside their parent's block
    for nested in &d.nested {
        render_descriptor(out, registry, nested, depth + 1);
    }
    if let Some(holder) = d.holder {
        indent(out, depth + 1);
        out.push_str(&render_holder(holder.base));
        out.push('\n');
    }
    indent(out, depth);
    out.push_str("}\n");
}

/// Render the type artifact: one block per target namespace in
/// registry first-seen order, descriptors in discovery order.
pub fn emit_types(
    table: &DescriptorTable,
    registry: &NamespaceRegistry,
    config: &GeneratorConfig,
) -> String {
    let mut out = String::new();
    out.push_str("// type descriptors\n");
    if config.effective_lazy() {
        out.push_str("pragma lazy\n");
    }
    for (namespace, alias) in registry.iter() {
        let descriptors: Vec<&CodecDescriptor> = table.in_namespace(namespace).collect();
        if descriptors.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("namespace {} \"{}\" {{\n", alias, namespace));
        for descriptor in descriptors {
            render_descriptor(&mut out, registry, descriptor, 1);
        }
        out.push_str("}\n");
    }
    // descriptors from a schema with no target namespace
    let orphans: Vec<&CodecDescriptor> = table
        .iter()
        .map(|(_, d)| d)
        .filter(|d| d.qname.namespace.is_none())
        .collect();
    if !orphans.is_empty() {
        out.push('\n');
        out.push_str("namespace (none) {\n");
        for descriptor in orphans {
            render_descriptor(&mut out, registry, descriptor, 1);
        }
        out.push_str("}\n");
    }
    out
}

fn render_wrapper(
    out: &mut String,
    registry: &NamespaceRegistry,
    role: &str,
    wrapper: &MessageWrapper,
    depth: usize,
) {
    indent(out, depth);
    match &wrapper.reference {
        Some(element) => {
            out.push_str(&format!(
                "{} element={}\n",
                role,
                render_qname(registry, element)
            ));
        }
        None => {
            out.push_str(&format!("{} wrapper={}\n", role, wrapper.name));
        }
    }
}

fn render_operation(
    out: &mut String,
    registry: &NamespaceRegistry,
    config: &GeneratorConfig,
    op: &OperationDescriptor,
    depth: usize,
) {
    indent(out, depth);
    out.push_str(&format!("operation {} style={}", op.name, op.style));
    if let Some(action) = &op.soap_action {
        out.push_str(&format!(" action=\"{}\"", action));
    }
    if config.address {
        out.push_str(" wsaddressing");
    }
    out.push_str(" {\n");
    if let Some(input) = &op.input {
        render_wrapper(out, registry, "input", input, depth + 1);
    }
    if let Some(output) = &op.output {
        render_wrapper(out, registry, "output", output, depth + 1);
    }
    for header in &op.headers {
        indent(out, depth + 1);
        out.push_str(&format!(
            "header message={} part={}",
            render_qname(registry, &header.message),
            header.part
        ));
        if let Some(element) = &header.element {
            out.push_str(&format!(" element={}", render_qname(registry, element)));
        }
        if let Some(type_ref) = &header.type_ref {
            out.push_str(&format!(" type={}", render_qname(registry, type_ref)));
        }
        out.push('\n');
    }
    indent(out, depth);
    out.push_str("}\n");
}

fn render_message_block(
    out: &mut String,
    registry: &NamespaceRegistry,
    wrapper: &MessageWrapper,
    depth: usize,
) {
    indent(out, depth);
    out.push_str(&format!("message {}", wrapper.name));
    if let Some(ns) = &wrapper.namespace {
        out.push_str(&format!(" namespace=\"{}\"", ns));
    }
    if let Some(uri) = &wrapper.encoding_style {
        out.push_str(&format!(" encoding=\"{}\"", uri));
    }
    out.push_str(" {\n");
    for part in &wrapper.parts {
        render_particle(out, registry, part, depth + 1);
    }
    indent(out, depth);
    out.push_str("}\n");
}

/// Render the client artifact: one locator per service, one block per
/// distinct binding, and one wrapper block per synthesized rpc message.
pub fn emit_client(
    services: &[ServiceDescriptor],
    registry: &NamespaceRegistry,
    config: &GeneratorConfig,
) -> String {
    let mut out = String::new();
    out.push_str("// client descriptors\n");
    for service in services {
        out.push('\n');
        out.push_str(&format!("service {} {{\n", service.name));

        indent(&mut out, 1);
        out.push_str(&format!("locator {} {{\n", service.name));
        for port in &service.ports {
            indent(&mut out, 2);
            out.push_str(&format!("port {} binding={}", port.name, port.binding));
            if let Some(address) = &port.address {
                out.push_str(&format!(" address=\"{}\"", address));
            }
            out.push('\n');
        }
        indent(&mut out, 1);
        out.push_str("}\n");

        for binding in &service.bindings {
            indent(&mut out, 1);
            out.push_str(&format!("binding {}", binding.name));
            if let Some(port_type) = &binding.port_type {
                out.push_str(&format!(" portType={}", port_type));
            }
            out.push_str(" {\n");
            for operation in &binding.operations {
                render_operation(&mut out, registry, config, operation, 2);
            }
            indent(&mut out, 1);
            out.push_str("}\n");
        }

        // synthesized rpc wrappers get their own message blocks;
        // document/literal wrappers live in the type artifact already
        for binding in &service.bindings {
            for operation in &binding.operations {
                for wrapper in [&operation.input, &operation.output].into_iter().flatten() {
                    if wrapper.reference.is_none() {
                        render_message_block(&mut out, registry, wrapper, 1);
                    }
                }
            }
        }
        out.push_str("}\n");
    }
    out
}
