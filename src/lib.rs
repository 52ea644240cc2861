//! # soapgen
//!
//! A WSDL/XML-Schema-driven code generator: compiles a parsed
//! service/schema description into deterministic codec descriptors for
//! a runtime SOAP marshalling layer.
//!
//! The pipeline classifies each schema component into one of a fixed
//! set of shapes, flattens nested model groups into ordered particle
//! lists, resolves effective occurrence bounds and type derivations
//! (including the SOAP-encoding Array idiom), assembles WSDL binding
//! operations into wire-style wrappers, and renders two textual
//! artifacts: a type module and a client module.
//!
//! ## Example
//!
//! ```rust,ignore
//! use soapgen::{Generator, GeneratorConfig};
//!
//! let generator = Generator::new(GeneratorConfig::default());
//! let generation = generator.generate_from_wsdl_str(&wsdl_text)?;
//! println!("{}", generation.types_artifact);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub mod names;
pub mod namespaces;

pub mod config;
pub mod documents;

pub mod schema;
pub mod wsdl;

pub mod codegen;
pub mod generator;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use error::{Diagnostic, DiagnosticKind, Error, Result};
pub use generator::{Generation, Generator};

/// Version of the soapgen library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
