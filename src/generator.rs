//! Generation runs
//!
//! Drives one compilation: parse input, build every global descriptor
//! in schema declaration order, assemble the service operations, and
//! render the two artifacts. All mutable state (namespace registry,
//! descriptor table, diagnostics) is owned by the run and dropped with
//! it; a fresh run starts empty.

use crate::codegen::{
    assemble_services, build_global_element, build_type, emit_client, emit_types, BuildContext,
    DescriptorKey, DescriptorTable, ServiceDescriptor,
};
use crate::config::GeneratorConfig;
use crate::error::{Diagnostic, Error, Result};
use crate::namespaces::{NamespaceRegistry, QName};
use crate::schema::SchemaSet;
use crate::wsdl::{parse_wsdl, WsdlDocument};

/// Output of one successful generation run
#[derive(Debug)]
pub struct Generation {
    /// The rendered type artifact
    pub types_artifact: String,
    /// The rendered client artifact (empty for schema-only input)
    pub client_artifact: String,
    /// Non-fatal findings recorded during the run
    pub diagnostics: Vec<Diagnostic>,
}

/// A configured generator
#[derive(Debug, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with the given configuration
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The configuration this generator runs with
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compile a WSDL document text into the two artifacts
    pub fn generate_from_wsdl_str(&self, xml: &str) -> Result<Generation> {
        let document = parse_wsdl(xml)?;
        self.generate(&document)
    }

    /// Compile a parsed WSDL document into the two artifacts
    pub fn generate(&self, document: &WsdlDocument) -> Result<Generation> {
        if self.config.strict_schema {
            self.check_strict(document)?;
        }

        let mut registry = NamespaceRegistry::new();
        let mut diagnostics = Vec::new();
        let mut table = DescriptorTable::new();

        {
            let mut ctx = BuildContext {
                set: &document.schemas,
                config: &self.config,
                registry: &mut registry,
                diagnostics: &mut diagnostics,
                all_optional: false,
            };
            build_schema_descriptors(&mut ctx, &document.schemas, &mut table)?;
        }

        let services = {
            let mut ctx = BuildContext {
                set: &document.schemas,
                config: &self.config,
                registry: &mut registry,
                diagnostics: &mut diagnostics,
                all_optional: false,
            };
            assemble_services(&mut ctx, document)?
        };

        Ok(Generation {
            types_artifact: emit_types(&table, &registry, &self.config),
            client_artifact: emit_client(&services, &registry, &self.config),
            diagnostics,
        })
    }

    /// Compile a standalone schema set (type artifact only)
    pub fn generate_types(&self, set: &SchemaSet) -> Result<Generation> {
        let mut registry = NamespaceRegistry::new();
        let mut diagnostics = Vec::new();
        let mut table = DescriptorTable::new();
        {
            let mut ctx = BuildContext {
                set,
                config: &self.config,
                registry: &mut registry,
                diagnostics: &mut diagnostics,
                all_optional: false,
            };
            build_schema_descriptors(&mut ctx, set, &mut table)?;
        }
        Ok(Generation {
            types_artifact: emit_types(&table, &registry, &self.config),
            client_artifact: String::new(),
            diagnostics,
        })
    }

    fn check_strict(&self, document: &WsdlDocument) -> Result<()> {
        if document.target_namespace.is_none() {
            return Err(Error::WsdlFormat(
                "strict mode: definitions declare no targetNamespace".into(),
            ));
        }
        if document.schemas.schemas.is_empty() {
            return Err(Error::WsdlFormat(
                "strict mode: definitions carry no schema types".into(),
            ));
        }
        if document.services.is_empty() {
            return Err(Error::WsdlFormat(
                "strict mode: definitions declare no service".into(),
            ));
        }
        Ok(())
    }
}

/// Build descriptors for every global type and element, schemas in
/// first-seen order, declarations in document order.
fn build_schema_descriptors(
    ctx: &mut BuildContext<'_>,
    set: &SchemaSet,
    table: &mut DescriptorTable,
) -> Result<()> {
    let entries: Vec<(QName, crate::schema::ComponentId, bool)> = set
        .schemas
        .values()
        .flat_map(|schema| {
            let tns = schema.target_namespace.clone();
            let types = schema
                .types
                .iter()
                .map(move |(name, id)| (QName::new(tns.clone(), name.as_str()), *id, true));
            let tns2 = schema.target_namespace.clone();
            let elements = schema
                .elements
                .iter()
                .map(move |(name, id)| (QName::new(tns2.clone(), name.as_str()), *id, false));
            types.chain(elements).collect::<Vec<_>>()
        })
        .collect();

    for (qname, id, is_type) in entries {
        let key = if is_type {
            DescriptorKey::Type(qname)
        } else {
            DescriptorKey::Element(qname)
        };
        if table.contains(&key) {
            continue;
        }
        let component = set.component(id);
        let descriptor = if is_type {
            build_type(ctx, component)?
        } else {
            build_global_element(ctx, component)?
        };
        table.insert(key, descriptor)?;
    }
    Ok(())
}
