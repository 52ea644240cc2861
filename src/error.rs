//! Error types for soapgen
//!
//! Fatal errors abort a generation run and carry the offending schema
//! component's context for diagnosis. Non-fatal findings are collected as
//! [`Diagnostic`] values and returned alongside successful output.

use std::fmt;
use thiserror::Error;

/// Result type alias using the soapgen Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for generation runs
#[derive(Error, Debug)]
pub enum Error {
    /// A schema component matched no known shape, or an unsupported one
    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    /// Type derivation could not be resolved
    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    /// Malformed WSDL structure (missing message, part, portType match)
    #[error("wsdl format error: {0}")]
    WsdlFormat(String),

    /// WS-I Basic Profile violation (e.g. R2717, R2203)
    #[error("ws-i violation {rule}: {message}")]
    Interop {
        /// WS-I Basic Profile rule identifier
        rule: &'static str,
        /// Description of the violation
        message: String,
    },

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// A schema component that matched no known shape, or an unsupported one.
///
/// Fatal: unwinds out of the current builder and aborts the whole run.
#[derive(Debug, Clone)]
pub struct ClassificationError {
    /// Error message
    pub message: String,
    /// Target namespace of the offending component
    pub namespace: Option<String>,
    /// Local name of the offending component
    pub name: Option<String>,
    /// XML item trace (path from the schema root)
    pub path: Option<String>,
}

impl ClassificationError {
    /// Create a new classification error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            namespace: None,
            name: None,
            path: None,
        }
    }

    /// Set the component's target namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the component's local name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the XML item trace
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(ns), Some(name)) = (&self.namespace, &self.name) {
            write!(f, " ({{{}}}{})", ns, name)?;
        } else if let Some(name) = &self.name {
            write!(f, " ({})", name)?;
        }
        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClassificationError {}

/// Unsupported base type, missing required attribute reference for an
/// array derivation, or a missing type definition target.
///
/// Fatal, same context requirement as [`ClassificationError`].
#[derive(Debug, Clone)]
pub struct DerivationError {
    /// Error message
    pub message: String,
    /// Target namespace of the offending component
    pub namespace: Option<String>,
    /// Local name of the offending component
    pub name: Option<String>,
    /// XML item trace
    pub path: Option<String>,
}

impl DerivationError {
    /// Create a new derivation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            namespace: None,
            name: None,
            path: None,
        }
    }

    /// Set the component's target namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the component's local name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the XML item trace
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for DerivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let (Some(ns), Some(name)) = (&self.namespace, &self.name) {
            write!(f, " ({{{}}}{})", ns, name)?;
        }
        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for DerivationError {}

/// Severity/category of a non-fatal finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A binding operation was dropped for lack of a usable SOAP binding
    BindingSkip,
    /// A lossy fallback substitution was applied and compilation continued
    InteropWarning,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindingSkip => write!(f, "binding-skip"),
            Self::InteropWarning => write!(f, "interop-warning"),
        }
    }
}

/// A non-fatal finding recorded during a generation run
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Finding category
    pub kind: DiagnosticKind,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Record a skipped binding operation
    pub fn binding_skip(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::BindingSkip,
            message: message.into(),
        }
    }

    /// Record an applied fallback substitution
    pub fn interop(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::InteropWarning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_error_display() {
        let err = ClassificationError::new("unexpected schema item")
            .with_namespace("urn:example")
            .with_name("Thing")
            .with_path("/schema/complexType[Thing]/all");

        let msg = format!("{}", err);
        assert!(msg.contains("unexpected schema item"));
        assert!(msg.contains("{urn:example}Thing"));
        assert!(msg.contains("Path:"));
    }

    #[test]
    fn test_derivation_error_conversion() {
        let err: Error = DerivationError::new("unsupported base").into();
        assert!(matches!(err, Error::Derivation(_)));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::binding_skip("operation(getFoo) has no SOAP binding");
        assert_eq!(
            format!("{}", d),
            "binding-skip: operation(getFoo) has no SOAP binding"
        );
    }
}
