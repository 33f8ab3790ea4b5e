//! Error types for manifest parsing and catalog lookups.

use thiserror::Error;

/// Error type for manifest parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Unknown element encountered.
    #[error("unknown element '{element}' in context '{context}'")]
    UnknownElement {
        /// Element name.
        element: String,
        /// Parent context.
        context: String,
    },

    /// Malformed type expression.
    #[error("invalid type expression '{expr}': {message}")]
    InvalidTypeExpression {
        /// The expression as written.
        expr: String,
        /// What went wrong.
        message: String,
    },

    /// Duplicate definition.
    #[error("duplicate type definition: '{name}'")]
    DuplicateDefinition {
        /// Full name of the duplicate.
        name: String,
    },

    /// Invalid manifest structure.
    #[error("invalid manifest structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Error type for catalog lookups and shape validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Type not found in the catalog.
    #[error("type '{name}' not found")]
    UnknownType {
        /// Full type name.
        name: String,
    },

    /// Type exists but has no member list to serialize.
    #[error("type '{name}' is not a class or struct")]
    NotAnObjectType {
        /// Full type name.
        name: String,
    },

    /// Generic argument list does not match its definition.
    #[error("malformed generic '{definition}': {message}")]
    MalformedGeneric {
        /// Generic definition name.
        definition: String,
        /// Error message.
        message: String,
    },

    /// Duplicate definition.
    #[error("duplicate type definition: '{name}'")]
    DuplicateDefinition {
        /// Full name of the duplicate.
        name: String,
    },

    /// A field references a type the catalog cannot resolve.
    #[error("field '{field}' of '{owner}' is invalid: {source}")]
    InvalidField {
        /// Declaring type full name.
        owner: String,
        /// Field name.
        field: String,
        /// Underlying error.
        #[source]
        source: Box<SchemaError>,
    },
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown element error.
    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// Creates an invalid type expression error.
    pub fn type_expr(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeExpression {
            expr: expr.into(),
            message: message.into(),
        }
    }
}

impl SchemaError {
    /// Creates an unknown type error.
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// Creates a malformed generic error.
    pub fn malformed_generic(definition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedGeneric {
            definition: definition.into(),
            message: message.into(),
        }
    }
}
