//! Schema component model
//!
//! The parsed XSD side of the compiler input: the component arena, the
//! built-in type table, and the parser that populates the arena from
//! `<schema>` element trees.

pub mod builtins;
pub mod components;
pub mod parsing;

pub use builtins::{builtin, native_base, BuiltinType, NativeBase};
pub use components::{
    Component, ComponentId, ComponentKind, ComponentNode, MaxOccurs, ModelKind, Schema, SchemaSet,
};
pub use parsing::{parse_schema, parse_schema_document};
