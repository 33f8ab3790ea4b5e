//! Writes rendered formatters to disk.

use crate::error::CodegenError;
use crate::info::ObjectSerializationInfo;
use crate::template::FormatterTemplate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "Assets/Scripts/Formatters";

/// Default namespace of generated formatters.
pub const DEFAULT_NAMESPACE: &str = "Utf8Json.Formatters";

/// Default generated file extension.
pub const DEFAULT_EXTENSION: &str = "cs";

/// One formatter about to be written.
#[derive(Debug, Clone)]
pub struct GenerationUnit {
    /// Type being generated.
    pub info: ObjectSerializationInfo,
    /// Destination file.
    pub path: PathBuf,
}

impl GenerationUnit {
    /// Renders the unit's source text.
    #[must_use]
    pub fn render(&self, namespace: &str) -> String {
        FormatterTemplate::new(namespace, vec![self.info.clone()]).transform_text()
    }
}

/// Renders formatters and writes them under an output root.
#[derive(Debug, Clone)]
pub struct Emitter {
    output_root: PathBuf,
    namespace: String,
    file_extension: String,
}

impl Emitter {
    /// Creates a new emitter.
    ///
    /// # Arguments
    /// * `output_root` - Directory generated files are written to
    /// * `namespace` - Namespace of the generated formatters
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            namespace: namespace.into(),
            file_extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Sets the generated file extension, without the dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Returns the output root.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Returns the target namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the file a type's formatter is written to.
    #[must_use]
    pub fn output_path(&self, info: &ObjectSerializationInfo) -> PathBuf {
        self.output_root
            .join(format!("{}.{}", info.formatter_name(), self.file_extension))
    }

    /// Builds the unit for `info`.
    #[must_use]
    pub fn unit(&self, info: ObjectSerializationInfo) -> GenerationUnit {
        let path = self.output_path(&info);
        GenerationUnit { info, path }
    }

    /// Renders and writes a formatter, overwriting any previous file.
    ///
    /// # Returns
    /// The path written.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the directory cannot be created or the
    /// file cannot be written.
    pub fn emit(&self, info: ObjectSerializationInfo) -> Result<PathBuf, CodegenError> {
        let unit = self.unit(info);
        let text = unit.render(&self.namespace);

        std::fs::create_dir_all(&self.output_root)
            .map_err(|e| CodegenError::io(&self.output_root, e))?;
        std::fs::write(&unit.path, text).map_err(|e| CodegenError::io(&unit.path, e))?;

        info!("Gen {} -> {}", unit.info.full_name, unit.path.display());
        Ok(unit.path)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_ROOT, DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::SerializationInfoBuilder;
    use formatgen_resolver::read_target_marker;
    use formatgen_schema::{FieldDef, PrimitiveType, TypeCatalog, TypeDef, TypeRef};
    use std::fs;
    use tempfile::tempdir;

    fn player_info() -> ObjectSerializationInfo {
        let catalog = TypeCatalog::new()
            .with_type(
                TypeDef::class("Player", "Game")
                    .with_field(FieldDef::new("id", PrimitiveType::Int32))
                    .with_field(FieldDef::new("name", TypeRef::string()))
                    .with_field(FieldDef::new("tags", TypeRef::list(TypeRef::string()))),
            )
            .unwrap();
        SerializationInfoBuilder::new(&catalog)
            .describe(&TypeRef::named("Game.Player"))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let emitter = Emitter::default();
        assert_eq!(emitter.output_root(), Path::new("Assets/Scripts/Formatters"));
        assert_eq!(emitter.namespace(), "Utf8Json.Formatters");
        assert_eq!(
            emitter.output_path(&player_info()),
            Path::new("Assets/Scripts/Formatters/PlayerFormatter.cs")
        );
    }

    #[test]
    fn test_emit_creates_directories() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("Assets").join("Scripts").join("Formatters");
        let emitter = Emitter::new(&root, "Utf8Json.Formatters");

        let path = emitter.emit(player_info()).unwrap();
        assert_eq!(path, root.join("PlayerFormatter.cs"));

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(read_target_marker(&text), Some("Game.Player"));
        assert!(text.contains("namespace Utf8Json.Formatters"));
        assert!(text.contains("writer.WriteInt32(value.id);"));
        assert!(text.contains("writer.WriteString(value.name);"));
        assert!(text.contains("GetFormatterWithVerify<System.Collections.Generic.List<string>>()"));
    }

    #[test]
    fn test_emit_overwrites() {
        let dir = tempdir().unwrap();
        let emitter = Emitter::new(dir.path(), "Out").with_extension("txt");
        let path = dir.path().join("PlayerFormatter.txt");
        fs::write(&path, "stale contents").unwrap();

        assert_eq!(emitter.emit(player_info()).unwrap(), path);
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale contents"));
        assert!(text.contains("namespace Out"));
    }

    #[test]
    fn test_emit_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let emitter = Emitter::new(blocker.join("Formatters"), "Out");
        let err = emitter.emit(player_info()).unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
    }
}
