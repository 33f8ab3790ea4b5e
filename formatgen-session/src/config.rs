//! Generator configuration.

use crate::error::ConfigError;
use formatgen_codegen::{DEFAULT_EXTENSION, DEFAULT_NAMESPACE, DEFAULT_OUTPUT_ROOT, Emitter};
use std::path::{Path, PathBuf};

/// Validated generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    output_root: PathBuf,
    namespace: String,
    file_extension: String,
    scan_existing: bool,
}

impl GeneratorConfig {
    /// Starts building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }

    /// Directory formatters are written to.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Namespace of generated formatters.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Generated file extension, without the dot.
    #[must_use]
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Whether sessions scan the output root for earlier formatters.
    #[must_use]
    pub const fn scan_existing(&self) -> bool {
        self.scan_existing
    }

    /// Creates the emitter for this configuration.
    #[must_use]
    pub fn emitter(&self) -> Emitter {
        Emitter::new(&self.output_root, &self.namespace).with_extension(&self.file_extension)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            namespace: DEFAULT_NAMESPACE.to_string(),
            file_extension: DEFAULT_EXTENSION.to_string(),
            scan_existing: true,
        }
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    /// Sets the output root.
    #[must_use]
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.output_root = root.into();
        self
    }

    /// Sets the namespace of generated formatters.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Sets the generated file extension.
    #[must_use]
    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.file_extension = extension.into();
        self
    }

    /// Enables or disables the start-up scan for generated formatters.
    #[must_use]
    pub fn scan_existing(mut self, scan: bool) -> Self {
        self.config.scan_existing = scan;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if the output root or extension is empty, the
    /// extension contains a separator, or the namespace is not a dotted
    /// identifier path.
    pub fn build(self) -> Result<GeneratorConfig, ConfigError> {
        let config = self.config;
        if config.output_root.as_os_str().is_empty() {
            tracing::error!("Output root must not be empty");
            return Err(ConfigError::EmptyOutputRoot);
        }
        if !is_namespace(&config.namespace) {
            tracing::error!("Invalid namespace '{}'", config.namespace);
            return Err(ConfigError::InvalidNamespace {
                namespace: config.namespace,
            });
        }
        let extension_ok = !config.file_extension.is_empty()
            && !config
                .file_extension
                .contains(|c: char| matches!(c, '.' | '/' | '\\') || c.is_whitespace());
        if !extension_ok {
            tracing::error!("Invalid file extension '{}'", config.file_extension);
            return Err(ConfigError::InvalidExtension {
                extension: config.file_extension,
            });
        }
        Ok(config)
    }
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && namespace.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
