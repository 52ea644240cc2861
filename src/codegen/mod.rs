//! Schema-to-codec compilation
//!
//! The compiler core: classification, flattening, occurrence
//! resolution, descriptor building, operation assembly and artifact
//! rendering.

pub mod builders;
pub mod classify;
pub mod descriptor;
pub mod emit;
pub mod flatten;
pub mod occurs;
pub mod operations;

pub use builders::{build_global_element, build_type, BuildContext};
pub use classify::{classify, Shape};
pub use descriptor::{
    AttributeEntry, BindingDescriptor, CodecDescriptor, DerivationKind, DescriptorKey,
    DescriptorKind, DescriptorTable, HeaderPart, HolderSpec, MessageWrapper, OperationDescriptor,
    Particle, ParticleStyle, PortDescriptor, ServiceDescriptor, SimpleKind, TypeRef, WireStyle,
};
pub use emit::{emit_client, emit_types};
pub use flatten::flatten_content;
pub use occurs::{resolve_occurs, Occurs};
pub use operations::assemble_services;
