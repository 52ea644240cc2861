//! Codec builders
//!
//! One builder per classified shape. Each consumes a schema component
//! plus its flattened particles and effective occurs, and produces an
//! immutable [`CodecDescriptor`]. Local anonymous types discovered while
//! building a parent are built recursively and owned by the parent's
//! nested list.

use crate::codegen::classify::{classify, is_soap_array_base, Shape};
use crate::codegen::descriptor::{
    AttributeEntry, CodecDescriptor, DerivationKind, DescriptorKind, HolderSpec, Particle,
    ParticleStyle, SimpleKind, TypeRef,
};
use crate::codegen::flatten::flatten_content;
use crate::codegen::occurs::resolve_occurs;
use crate::config::GeneratorConfig;
use crate::error::{ClassificationError, DerivationError, Diagnostic, Result};
use crate::names::{element_unit_name, field_name, type_unit_name};
use crate::namespaces::{
    NamespaceRegistry, QName, SOAP_ENC12_NAMESPACE, SOAP_ENC_NAMESPACE, XSD_NAMESPACE,
};
use crate::schema::{builtin, native_base, Component, ComponentKind, SchemaSet};

/// Mutable state shared by the builders of one compilation run
pub struct BuildContext<'a> {
    /// The schema component arena
    pub set: &'a SchemaSet,
    /// Run configuration, read-only
    pub config: &'a GeneratorConfig,
    /// Per-run namespace alias registry
    pub registry: &'a mut NamespaceRegistry,
    /// Non-fatal findings collected during the run
    pub diagnostics: &'a mut Vec<Diagnostic>,
    /// Force every particle to (0, unbounded)
    pub all_optional: bool,
}

impl<'a> BuildContext<'a> {
    /// Register a namespace, honoring the schema's recommended prefix
    pub fn register_namespace(&mut self, namespace: &str) {
        let recommended = self
            .set
            .schema(namespace)
            .and_then(|s| s.recommended_prefix.clone());
        self.registry.add(namespace, recommended.as_deref());
    }

    /// Resolve a type QName to a built-in or user codec reference
    pub fn type_reference(&mut self, qname: &QName) -> Result<TypeRef> {
        if builtin(qname).is_some() {
            return Ok(TypeRef::Builtin(qname.clone()));
        }
        if self.set.type_definition(qname).is_some() {
            if let Some(ns) = qname.namespace() {
                self.register_namespace(ns);
            }
            return Ok(TypeRef::Descriptor(qname.clone()));
        }
        Err(DerivationError::new(format!(
            "unresolvable type reference '{}'",
            qname
        ))
        .into())
    }
}

fn classification_error(component: &Component<'_>, message: impl Into<String>) -> ClassificationError {
    let mut err = ClassificationError::new(message).with_path(component.item_trace());
    if let Some(ns) = component.target_namespace() {
        err = err.with_namespace(ns);
    }
    if let Some(name) = component.name() {
        err = err.with_name(name);
    }
    err
}

fn derivation_error(component: &Component<'_>, message: impl Into<String>) -> DerivationError {
    let mut err = DerivationError::new(message).with_path(component.item_trace());
    if let Some(ns) = component.target_namespace() {
        err = err.with_namespace(ns);
    }
    if let Some(name) = component.name() {
        err = err.with_name(name);
    }
    err
}

/// Build the descriptor for a global type definition
pub fn build_type(ctx: &mut BuildContext<'_>, component: Component<'_>) -> Result<CodecDescriptor> {
    match classify(component)? {
        Shape::ComplexType => build_complex_type(ctx, component),
        Shape::ComplexContentRestriction => {
            build_complex_content(ctx, component, DerivationKind::Restriction)
        }
        Shape::ComplexContentExtension => {
            build_complex_content(ctx, component, DerivationKind::Extension)
        }
        Shape::ComplexContentArray => build_array(ctx, component),
        Shape::SimpleContent => build_simple_content(ctx, component),
        Shape::SimpleRestriction => build_simple_type(ctx, component, SimpleKind::Restriction),
        Shape::SimpleUnion => build_simple_type(ctx, component, SimpleKind::Union),
        Shape::SimpleList => build_simple_type(ctx, component, SimpleKind::List),
        shape => Err(classification_error(
            &component,
            format!("element shape {:?} where a type definition was expected", shape),
        )
        .into()),
    }
}

/// Build the descriptor for a global element declaration
pub fn build_global_element(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed global element"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed global element"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }

    let mut descriptor = CodecDescriptor::new(
        qname,
        element_unit_name(name, ctx.config.simple_naming),
        DescriptorKind::GlobalElement,
    );
    descriptor.substitution_group = component.node().substitution_group.clone();

    descriptor.element_type = Some(match classify(component)? {
        Shape::ElementDeclaredType => match &component.node().type_ref {
            Some(type_qname) => ctx.type_reference(type_qname)?,
            None => match &descriptor.substitution_group {
                // an untyped member marshals with its group head's codec
                Some(head) => TypeRef::Descriptor(head.clone()),
                None => TypeRef::Any,
            },
        },
        Shape::ElementLocalComplexType | Shape::ElementLocalSimpleType => {
            let local = build_local_element_type(ctx, component)?;
            descriptor.nested.push(local);
            TypeRef::Local(descriptor.nested.len() - 1)
        }
        shape => {
            return Err(classification_error(
                &component,
                format!("type shape {:?} where an element was expected", shape),
            )
            .into())
        }
    });
    Ok(descriptor)
}

/// Build the local descriptor for an element's inline anonymous type.
///
/// The inline type is classified like a global one, so derivation
/// shapes (complexContent, simpleContent, the Array idiom) route to
/// the same bodies instead of being read as model-group content.
fn build_local_element_type(
    ctx: &mut BuildContext<'_>,
    element: Component<'_>,
) -> Result<CodecDescriptor> {
    let name = element
        .name()
        .ok_or_else(|| classification_error(&element, "unnamed element with inline type"))?;
    let inline = element
        .content_first()
        .ok_or_else(|| classification_error(&element, "element without inline type"))?;
    let qname = QName::new(element.node().target_namespace.clone(), name);

    if inline.is_complex() {
        let (mut descriptor, derivation) = match classify(inline)? {
            Shape::ComplexType => (build_complex_body(ctx, inline, qname)?, None),
            Shape::ComplexContentRestriction => (
                build_complex_content_body(ctx, inline, qname, DerivationKind::Restriction)?,
                Some(DerivationKind::Restriction),
            ),
            Shape::ComplexContentExtension => (
                build_complex_content_body(ctx, inline, qname, DerivationKind::Extension)?,
                Some(DerivationKind::Extension),
            ),
            Shape::ComplexContentArray => (
                build_array_body(ctx, inline, qname)?,
                Some(DerivationKind::Array),
            ),
            Shape::SimpleContent => {
                let mut descriptor = build_simple_content_body(ctx, inline, qname)?;
                descriptor.unit_name = element_unit_name(name, ctx.config.simple_naming);
                descriptor.kind = DescriptorKind::LocalSimpleElement;
                return Ok(descriptor);
            }
            shape => {
                return Err(classification_error(
                    &element,
                    format!("shape {:?} where an inline type was expected", shape),
                )
                .into())
            }
        };
        descriptor.unit_name = element_unit_name(name, ctx.config.simple_naming);
        descriptor.kind = DescriptorKind::LocalComplexElement(derivation);
        Ok(descriptor)
    } else {
        let mut descriptor = CodecDescriptor::new(
            qname,
            element_unit_name(name, ctx.config.simple_naming),
            DescriptorKind::LocalSimpleElement,
        );
        let (base, holder) = simple_restriction_base(ctx, inline)?;
        descriptor.base = Some(base);
        descriptor.holder = holder;
        Ok(descriptor)
    }
}

fn build_complex_type(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }
    let mut descriptor = build_complex_body(ctx, component, qname.clone())?;
    descriptor.qname = qname;
    descriptor.unit_name = type_unit_name(name, ctx.config.simple_naming);
    descriptor.kind = DescriptorKind::GlobalComplexType;
    Ok(descriptor)
}

/// Shared body for complex types: particles from model-group content
/// (possibly none), the attribute map, mixed flag and structural holder.
fn build_complex_body(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    qname: QName,
) -> Result<CodecDescriptor> {
    let mut descriptor =
        CodecDescriptor::new(qname, "", DescriptorKind::GlobalComplexType);
    descriptor.mixed = component.node().mixed;
    descriptor.holder = Some(HolderSpec { base: None });

    let mut nested = Vec::new();
    if let Some(content) = component.content_first() {
        descriptor.particles = build_particles(ctx, content, &mut nested)?;
    }
    descriptor.attributes = build_attributes(ctx, component)?;
    descriptor.nested = nested;
    Ok(descriptor)
}

fn build_complex_content(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    kind: DerivationKind,
) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }
    let mut descriptor = build_complex_content_body(ctx, component, qname, kind)?;
    descriptor.unit_name = type_unit_name(name, ctx.config.simple_naming);
    Ok(descriptor)
}

/// Shared body for complexContent derivations: base resolution,
/// particles and attributes from the derivation step.
fn build_complex_content_body(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    qname: QName,
    kind: DerivationKind,
) -> Result<CodecDescriptor> {
    let wrapper = component.content_first().ok_or_else(|| {
        classification_error(&component, "complexContent without derivation step")
    })?;
    let step = wrapper.content_first().ok_or_else(|| {
        classification_error(&component, "complexContent without derivation step")
    })?;
    let base_qname = step
        .node()
        .base
        .clone()
        .ok_or_else(|| classification_error(&component, "derivation without a base"))?;

    let base = if base_qname.is(XSD_NAMESPACE, "anyType") {
        TypeRef::Builtin(base_qname)
    } else if ctx.set.type_definition(&base_qname).is_some() {
        if let Some(ns) = base_qname.namespace() {
            ctx.register_namespace(ns);
        }
        TypeRef::Descriptor(base_qname)
    } else {
        return Err(derivation_error(
            &component,
            format!("unsupported derivation base '{}'", base_qname),
        )
        .into());
    };

    let mut descriptor =
        CodecDescriptor::new(qname, "", DescriptorKind::ComplexContent(kind));
    descriptor.base = Some(base);
    descriptor.mixed = wrapper.node().mixed || component.node().mixed;
    descriptor.holder = Some(HolderSpec { base: None });

    let mut nested = Vec::new();
    if let Some(content) = step.content_first() {
        descriptor.particles = build_particles(ctx, content, &mut nested)?;
    }
    descriptor.attributes = build_attributes(ctx, step)?;
    descriptor.nested = nested;
    Ok(descriptor)
}

/// Build a SOAP-encoding array derivation.
///
/// The item type comes from the `wsdl:arrayType` annotation on the
/// `soapenc:arrayType` attribute reference; a missing annotation leaves
/// the item undeclared with a recorded warning, an annotation that
/// resolves to nothing is fatal.
fn build_array(ctx: &mut BuildContext<'_>, component: Component<'_>) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed array type"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed array type"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }
    let mut descriptor = build_array_body(ctx, component, qname)?;
    descriptor.unit_name = type_unit_name(name, ctx.config.simple_naming);
    Ok(descriptor)
}

fn build_array_body(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    qname: QName,
) -> Result<CodecDescriptor> {
    let wrapper = component.content_first().ok_or_else(|| {
        classification_error(&component, "complexContent without derivation step")
    })?;
    let step = wrapper.content_first().ok_or_else(|| {
        classification_error(&component, "complexContent without derivation step")
    })?;
    let base_qname = step
        .node()
        .base
        .clone()
        .ok_or_else(|| classification_error(&component, "derivation without a base"))?;
    debug_assert!(is_soap_array_base(&base_qname));

    let mut descriptor = CodecDescriptor::new(
        qname,
        "",
        DescriptorKind::ComplexContent(DerivationKind::Array),
    );
    descriptor.base = Some(TypeRef::Builtin(base_qname));
    descriptor.holder = Some(HolderSpec { base: None });

    let array_type = step
        .attribute_content()
        .filter(|attr| attr.kind() == ComponentKind::Attribute)
        .find(|attr| {
            attr.node().reference.as_ref().is_some_and(|r| {
                r.is(SOAP_ENC_NAMESPACE, "arrayType") || r.is(SOAP_ENC12_NAMESPACE, "arrayType")
            })
        })
        .and_then(|attr| attr.node().array_type.clone());

    descriptor.array_item = match array_type {
        Some(item) => Some(ctx.type_reference(&item).map_err(|_| {
            derivation_error(
                &component,
                format!("unresolvable array item type '{}'", item),
            )
        })?),
        None => {
            ctx.diagnostics.push(Diagnostic::interop(format!(
                "array type '{}' declares no wsdl:arrayType item; emitting an undeclared array",
                descriptor.qname
            )));
            None
        }
    };

    // the arrayType reference itself never lands in the attribute map
    descriptor.attributes = build_attributes(ctx, step)?;
    Ok(descriptor)
}

fn build_simple_content(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed complex type"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }
    let mut descriptor = build_simple_content_body(ctx, component, qname)?;
    descriptor.unit_name = type_unit_name(name, ctx.config.simple_naming);
    Ok(descriptor)
}

fn build_simple_content_body(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    qname: QName,
) -> Result<CodecDescriptor> {
    let wrapper = component.content_first().ok_or_else(|| {
        classification_error(&component, "simpleContent without derivation step")
    })?;
    let step = wrapper.content_first().ok_or_else(|| {
        classification_error(&component, "simpleContent without derivation step")
    })?;
    let base_qname = step
        .node()
        .base
        .clone()
        .ok_or_else(|| classification_error(&component, "derivation without a base"))?;

    let mut descriptor = CodecDescriptor::new(qname, "", DescriptorKind::SimpleContent);
    descriptor.base = Some(ctx.type_reference(&base_qname)?);
    descriptor.holder = Some(HolderSpec {
        base: native_base(&base_qname),
    });
    descriptor.attributes = build_attributes(ctx, step)?;
    Ok(descriptor)
}

fn build_simple_type(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    kind: SimpleKind,
) -> Result<CodecDescriptor> {
    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed simple type"))?;
    let qname = component
        .qname()
        .ok_or_else(|| classification_error(&component, "unnamed simple type"))?;
    if let Some(ns) = qname.namespace() {
        ctx.register_namespace(ns);
    }

    let mut descriptor = CodecDescriptor::new(
        qname,
        type_unit_name(name, ctx.config.simple_naming),
        DescriptorKind::GlobalSimpleType(kind),
    );
    let step = component
        .content_first()
        .ok_or_else(|| classification_error(&component, "unknown simple type definition"))?;

    match kind {
        SimpleKind::Restriction => {
            let (base, holder) = simple_restriction_base(ctx, step)?;
            descriptor.base = Some(base);
            descriptor.holder = holder;
        }
        SimpleKind::Union => {
            // members are recorded verbatim; disambiguation is a
            // runtime concern of the generated codec
            descriptor.member_types = step.node().member_types.clone();
        }
        SimpleKind::List => {
            descriptor.item_type = step.node().item_type.clone();
        }
    }
    Ok(descriptor)
}

/// Resolve a simple restriction step's base.
///
/// An absent or unresolvable base (restriction of a nested anonymous
/// restriction, or a dangling QName) degrades to the xsd string
/// primitive with a recorded warning.
fn simple_restriction_base(
    ctx: &mut BuildContext<'_>,
    step: Component<'_>,
) -> Result<(TypeRef, Option<HolderSpec>)> {
    let step = if step.is_simple() {
        step.content_first()
            .ok_or_else(|| classification_error(&step, "unknown simple type definition"))?
    } else {
        step
    };
    if let Some(base_qname) = &step.node().base {
        if builtin(base_qname).is_some() {
            return Ok((
                TypeRef::Builtin(base_qname.clone()),
                Some(HolderSpec {
                    base: native_base(base_qname),
                }),
            ));
        }
        if ctx.set.type_definition(base_qname).is_some() {
            if let Some(ns) = base_qname.namespace() {
                ctx.register_namespace(ns);
            }
            return Ok((TypeRef::Descriptor(base_qname.clone()), None));
        }
    }
    let fallback = QName::namespaced(XSD_NAMESPACE, "string");
    ctx.diagnostics.push(Diagnostic::interop(format!(
        "unresolvable simple restriction base at {}; falling back to {}",
        step.item_trace(),
        fallback
    )));
    Ok((
        TypeRef::Builtin(fallback.clone()),
        Some(HolderSpec {
            base: native_base(&fallback),
        }),
    ))
}

/// Flatten model-group content and build one particle per slot
pub fn build_particles(
    ctx: &mut BuildContext<'_>,
    content: Component<'_>,
    nested: &mut Vec<CodecDescriptor>,
) -> Result<Vec<Particle>> {
    let flat = flatten_content(content)?;
    let mut particles = Vec::with_capacity(flat.len());
    for id in flat {
        let component = ctx.set.component(id);
        particles.push(build_particle(ctx, component, nested)?);
    }
    Ok(particles)
}

fn build_particle(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    nested: &mut Vec<CodecDescriptor>,
) -> Result<Particle> {
    let occurs = resolve_occurs(component, ctx.all_optional);

    if component.kind() == ComponentKind::Any {
        return Ok(Particle {
            name: "any".into(),
            namespace: None,
            field: field_name("any"),
            type_ref: TypeRef::Any,
            min_occurs: occurs.min,
            max_occurs: occurs.max,
            nillable: occurs.nillable,
            qualified: false,
            style: ParticleStyle::Wildcard,
            encoding_style: None,
        });
    }

    if let Some(reference) = component.node().reference.clone() {
        let target = ctx.set.element_declaration(&reference).ok_or_else(|| {
            derivation_error(
                &component,
                format!("unresolvable element reference '{}'", reference),
            )
        })?;
        let target = ctx.set.component(target);
        if let Some(ns) = reference.namespace() {
            ctx.register_namespace(ns);
        }
        return Ok(Particle {
            name: reference.local_name.clone(),
            namespace: reference.namespace.clone(),
            field: field_name(&reference.local_name),
            type_ref: TypeRef::Descriptor(reference),
            min_occurs: occurs.min,
            max_occurs: occurs.max,
            // nillable rides on the referenced declaration
            nillable: occurs.nillable || target.node().nillable,
            qualified: true,
            style: ParticleStyle::Reference,
            encoding_style: None,
        });
    }

    let name = component
        .name()
        .ok_or_else(|| classification_error(&component, "unnamed element particle"))?;

    let type_ref = if let Some(type_qname) = &component.node().type_ref {
        ctx.type_reference(type_qname)?
    } else if component.content_first().is_some() {
        let local = build_local_element_type(ctx, component)?;
        nested.push(local);
        TypeRef::Local(nested.len() - 1)
    } else {
        TypeRef::Any
    };

    let qualified = component.node().qualified;
    Ok(Particle {
        name: name.to_string(),
        namespace: if qualified {
            component.node().target_namespace.clone()
        } else {
            None
        },
        field: field_name(name),
        type_ref,
        min_occurs: occurs.min,
        max_occurs: occurs.max,
        nillable: occurs.nillable,
        qualified,
        style: ParticleStyle::Declaration,
        encoding_style: None,
    })
}

/// Build the attribute map of a component, flattening attribute groups
pub fn build_attributes(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
) -> Result<Vec<AttributeEntry>> {
    let mut entries = Vec::new();
    collect_attributes(ctx, component, &mut entries)?;
    Ok(entries)
}

fn collect_attributes(
    ctx: &mut BuildContext<'_>,
    component: Component<'_>,
    entries: &mut Vec<AttributeEntry>,
) -> Result<()> {
    for attr in component.attribute_content() {
        match attr.kind() {
            ComponentKind::Attribute => {
                if let Some(reference) = attr.node().reference.clone() {
                    // arrayType references feed the array item, never
                    // the attribute map
                    if reference.is(SOAP_ENC_NAMESPACE, "arrayType")
                        || reference.is(SOAP_ENC12_NAMESPACE, "arrayType")
                    {
                        continue;
                    }
                    match attr.resolve_attribute_reference() {
                        Some(declaration) => {
                            entries.push(attribute_entry(ctx, declaration)?);
                        }
                        None => {
                            ctx.diagnostics.push(Diagnostic::interop(format!(
                                "unresolvable attribute reference '{}'; dropping it",
                                reference
                            )));
                        }
                    }
                } else {
                    entries.push(attribute_entry(ctx, attr)?);
                }
            }
            ComponentKind::AnyAttribute => {
                entries.push(AttributeEntry {
                    qname: QName::local("any"),
                    type_ref: TypeRef::Any,
                    wildcard: true,
                });
            }
            ComponentKind::AttributeGroup => {
                if attr.node().reference.is_some() {
                    let definition = attr.resolve_attribute_group().ok_or_else(|| {
                        classification_error(
                            &attr,
                            format!(
                                "unresolvable attribute group reference '{}'",
                                attr.node()
                                    .reference
                                    .as_ref()
                                    .map(|q| q.to_string())
                                    .unwrap_or_default()
                            ),
                        )
                    })?;
                    collect_attributes(ctx, definition, entries)?;
                } else {
                    collect_attributes(ctx, attr, entries)?;
                }
            }
            _ => {
                return Err(classification_error(&attr, "unexpected schema item").into());
            }
        }
    }
    Ok(())
}

fn attribute_entry(
    ctx: &mut BuildContext<'_>,
    declaration: Component<'_>,
) -> Result<AttributeEntry> {
    let name = declaration
        .name()
        .ok_or_else(|| classification_error(&declaration, "unnamed attribute"))?;
    let qname = if declaration.node().qualified {
        QName::new(declaration.node().target_namespace.clone(), name)
    } else {
        QName::local(name)
    };

    let type_ref = match &declaration.node().type_ref {
        Some(type_qname) => match ctx.type_reference(type_qname) {
            Ok(t) => t,
            Err(_) => {
                let fallback = QName::namespaced(XSD_NAMESPACE, "string");
                ctx.diagnostics.push(Diagnostic::interop(format!(
                    "unresolvable attribute type '{}'; falling back to {}",
                    type_qname, fallback
                )));
                TypeRef::Builtin(fallback)
            }
        },
        None => match declaration.content_first() {
            // inline anonymous simple type collapses to its base
            Some(inline) => simple_restriction_base(ctx, inline)?.0,
            None => TypeRef::Builtin(QName::namespaced(XSD_NAMESPACE, "string")),
        },
    };

    Ok(AttributeEntry {
        qname,
        type_ref,
        wildcard: false,
    })
}
