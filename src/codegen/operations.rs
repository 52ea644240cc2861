//! Message and operation assembly
//!
//! Walks each service's ports and bindings, selects a wire style per
//! binding operation, and builds the request/response wrapper
//! descriptors. Operations without a usable SOAP binding are skipped
//! with a recorded diagnostic; malformed style combinations are fatal.

use crate::codegen::builders::BuildContext;
use crate::codegen::descriptor::{
    BindingDescriptor, HeaderPart, MessageWrapper, OperationDescriptor, Particle, ParticleStyle,
    PortDescriptor, ServiceDescriptor, WireStyle,
};
use crate::error::{ClassificationError, Diagnostic, Error, Result};
use crate::names::field_name;
use crate::namespaces::{QName, SOAP_ENC_NAMESPACE};
use crate::schema::MaxOccurs;
use crate::wsdl::{Binding, BindingOperation, MessageRoleBinding, WsdlDocument};
use indexmap::IndexMap;

/// Assemble the client-side descriptors for every service in the document
pub fn assemble_services(
    ctx: &mut BuildContext<'_>,
    doc: &WsdlDocument,
) -> Result<Vec<ServiceDescriptor>> {
    let mut services = Vec::new();
    for service in doc.services.values() {
        let mut ports = Vec::new();
        let mut bindings: IndexMap<String, BindingDescriptor> = IndexMap::new();

        for port in &service.ports {
            let Some(binding) = doc.binding(&port.binding) else {
                ctx.diagnostics.push(Diagnostic::binding_skip(format!(
                    "port '{}' references unknown binding '{}'",
                    port.name, port.binding
                )));
                continue;
            };
            if port.address.is_none() {
                ctx.diagnostics.push(Diagnostic::binding_skip(format!(
                    "port '{}' has no SOAP address; leaving it out of the locator",
                    port.name
                )));
                continue;
            }
            ports.push(PortDescriptor {
                name: port.name.clone(),
                binding: binding.name.clone(),
                address: port.address.clone(),
            });

            // bindings referenced from several ports emit once
            if !bindings.contains_key(&binding.name) {
                if let Some(descriptor) = assemble_binding(ctx, doc, binding)? {
                    bindings.insert(binding.name.clone(), descriptor);
                }
            }
        }

        services.push(ServiceDescriptor {
            name: service.name.clone(),
            ports,
            bindings: bindings.into_values().collect(),
        });
    }
    Ok(services)
}

fn assemble_binding(
    ctx: &mut BuildContext<'_>,
    doc: &WsdlDocument,
    binding: &Binding,
) -> Result<Option<BindingDescriptor>> {
    if binding.soap_binding.is_none() {
        ctx.diagnostics.push(Diagnostic::binding_skip(format!(
            "binding '{}' has no SOAP binding extension; skipping it",
            binding.name
        )));
        return Ok(None);
    }
    let port_type = binding
        .port_type
        .as_ref()
        .and_then(|q| doc.port_type(q));
    let Some(port_type) = port_type else {
        ctx.diagnostics.push(Diagnostic::binding_skip(format!(
            "binding '{}' references no resolvable portType; skipping it",
            binding.name
        )));
        return Ok(None);
    };

    let mut operations = Vec::new();
    for operation in &binding.operations {
        if let Some(descriptor) = assemble_operation(ctx, doc, binding, operation, port_type)? {
            operations.push(descriptor);
        }
    }
    Ok(Some(BindingDescriptor {
        name: binding.name.clone(),
        port_type: Some(port_type.name.clone()),
        operations,
    }))
}

fn assemble_operation(
    ctx: &mut BuildContext<'_>,
    doc: &WsdlDocument,
    binding: &Binding,
    operation: &BindingOperation,
    port_type: &crate::wsdl::PortType,
) -> Result<Option<OperationDescriptor>> {
    let Some(soap_operation) = &operation.soap_operation else {
        ctx.diagnostics.push(Diagnostic::binding_skip(format!(
            "operation '{}' has no soap:operation binding; skipping it",
            operation.name
        )));
        return Ok(None);
    };
    let Some(abstract_op) = port_type.operations.get(&operation.name) else {
        ctx.diagnostics.push(Diagnostic::binding_skip(format!(
            "operation '{}' has no matching portType operation; skipping it",
            operation.name
        )));
        return Ok(None);
    };

    // use comes from the input body, or the output body for
    // notification-style operations
    let body = operation
        .input
        .as_ref()
        .and_then(|r| r.body.as_ref())
        .or_else(|| operation.output.as_ref().and_then(|r| r.body.as_ref()));
    let Some(body) = body else {
        ctx.diagnostics.push(Diagnostic::binding_skip(format!(
            "operation '{}' has no soap:body binding; skipping it",
            operation.name
        )));
        return Ok(None);
    };

    let rpc = binding.effective_style(operation) == "rpc";
    let style = match (rpc, body.use_mode.as_deref()) {
        (true, Some("literal")) => WireStyle::RpcLiteral,
        (true, Some("encoded")) => WireStyle::RpcEncoded,
        (false, Some("literal")) => WireStyle::DocumentLiteral,
        (false, Some("encoded")) => {
            return Err(ClassificationError::new(format!(
                "operation '{}' declares document/encoded, which is unsupported",
                operation.name
            ))
            .into())
        }
        (_, _) => {
            ctx.diagnostics.push(Diagnostic::binding_skip(format!(
                "operation '{}' declares no use on its soap:body; skipping it",
                operation.name
            )));
            return Ok(None);
        }
    };

    // input precedes output; a one-way operation stops after input
    let input = match (&abstract_op.input, &operation.input) {
        (Some(message), Some(role)) => {
            build_wrapper(ctx, doc, style, &operation.name, message, role, false)?
        }
        _ => None,
    };
    let output = match (&abstract_op.output, &operation.output) {
        (Some(message), Some(role)) => {
            build_wrapper(ctx, doc, style, &operation.name, message, role, true)?
        }
        _ => None,
    };

    let mut headers = Vec::new();
    for role in [&operation.input, &operation.output].into_iter().flatten() {
        collect_headers(ctx, doc, role, &mut headers);
    }

    Ok(Some(OperationDescriptor {
        name: operation.name.clone(),
        style,
        soap_action: soap_operation.action.clone(),
        input,
        output,
        headers,
    }))
}

fn collect_headers(
    ctx: &mut BuildContext<'_>,
    doc: &WsdlDocument,
    role: &MessageRoleBinding,
    headers: &mut Vec<HeaderPart>,
) {
    for header in &role.headers {
        let Some(message) = doc.message(&header.message) else {
            ctx.diagnostics.push(Diagnostic::binding_skip(format!(
                "soap:header references unknown message '{}'; dropping the header",
                header.message
            )));
            continue;
        };
        let Some(part) = message.parts.iter().find(|p| p.name == header.part) else {
            ctx.diagnostics.push(Diagnostic::binding_skip(format!(
                "soap:header references unknown part '{}' of message '{}'; dropping the header",
                header.part, header.message
            )));
            continue;
        };
        headers.push(HeaderPart {
            message: header.message.clone(),
            part: part.name.clone(),
            element: part.element.clone(),
            type_ref: part.type_ref.clone(),
        });
    }
}

fn build_wrapper(
    ctx: &mut BuildContext<'_>,
    doc: &WsdlDocument,
    style: WireStyle,
    operation_name: &str,
    message_qname: &QName,
    role: &MessageRoleBinding,
    response: bool,
) -> Result<Option<MessageWrapper>> {
    let message = doc.message(message_qname).ok_or_else(|| {
        Error::WsdlFormat(format!(
            "operation '{}' references unknown message '{}'",
            operation_name, message_qname
        ))
    })?;

    if style.is_rpc() {
        return build_rpc_wrapper(ctx, style, operation_name, message, role, response).map(Some);
    }

    // document/literal: the wrapper is the sole element-typed part's
    // global element
    let mut element_parts = Vec::new();
    for part in &message.parts {
        if part.type_ref.is_some() {
            return Err(ClassificationError::new(format!(
                "document/literal part '{}' of message '{}' uses a type attribute",
                part.name, message.name
            ))
            .into());
        }
        if part.element.is_some() {
            element_parts.push(part);
        }
    }
    let part = match element_parts.len() {
        0 => return Ok(None),
        1 => element_parts[0],
        n => {
            return Err(ClassificationError::new(format!(
                "document/literal message '{}' has {} element parts, expected one",
                message.name, n
            ))
            .into())
        }
    };
    let Some(element) = part.element.clone() else {
        return Ok(None);
    };
    if ctx.set.element_declaration(&element).is_none() {
        return Err(Error::WsdlFormat(format!(
            "part '{}' of message '{}' references unknown element '{}'",
            part.name, message.name, element
        )));
    }
    if let Some(ns) = element.namespace() {
        ctx.register_namespace(ns);
    }
    Ok(Some(MessageWrapper {
        name: element.local_name.clone(),
        reference: Some(element),
        parts: Vec::new(),
        namespace: None,
        encoding_style: None,
    }))
}

fn build_rpc_wrapper(
    ctx: &mut BuildContext<'_>,
    style: WireStyle,
    operation_name: &str,
    message: &crate::wsdl::Message,
    role: &MessageRoleBinding,
    response: bool,
) -> Result<MessageWrapper> {
    let body = role.body.as_ref();
    let namespace = body.and_then(|b| b.namespace.clone());
    if namespace.is_none() {
        return Err(Error::Interop {
            rule: "R2717",
            message: format!(
                "rpc operation '{}' declares no namespace on its soap:body",
                operation_name
            ),
        });
    }
    let encoding_style = if style.is_encoded() {
        Some(
            body.and_then(|b| b.encoding_style.clone())
                .unwrap_or_else(|| SOAP_ENC_NAMESPACE.to_string()),
        )
    } else {
        None
    };

    let mut parts = Vec::with_capacity(message.parts.len());
    for part in &message.parts {
        if part.element.is_some() {
            return Err(Error::Interop {
                rule: "R2203",
                message: format!(
                    "rpc part '{}' of message '{}' uses an element attribute",
                    part.name, message.name
                ),
            });
        }
        let type_ref = match &part.type_ref {
            Some(type_qname) => ctx.type_reference(type_qname)?,
            None => crate::codegen::descriptor::TypeRef::Any,
        };
        parts.push(Particle {
            name: part.name.clone(),
            namespace: None,
            field: field_name(&part.name),
            type_ref,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            nillable: false,
            qualified: false,
            style: ParticleStyle::Declaration,
            encoding_style: encoding_style.clone(),
        });
    }

    let name = if response {
        format!("{}Response", operation_name)
    } else {
        operation_name.to_string()
    };
    Ok(MessageWrapper {
        name,
        reference: None,
        parts,
        namespace,
        encoding_style,
    })
}
