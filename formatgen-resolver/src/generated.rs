//! Formatters produced by earlier generation passes.
//!
//! Every generated file carries a marker line naming its target type. At
//! session start the output root is scanned for these markers so that a
//! crash mid-batch converges on the next run instead of regenerating
//! everything.

use crate::error::LookupError;
use crate::resolver::{FormatterHandle, FormatterResolver};
use formatgen_schema::{TypeCatalog, TypeRef, parse_type_expr};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Comment prefix written into every generated file, followed by the target
/// type in manifest syntax.
pub const TARGET_MARKER: &str = "// formatgen:target=";

/// Extracts the target type expression from generated file contents.
#[must_use]
pub fn read_target_marker(contents: &str) -> Option<&str> {
    contents
        .lines()
        .find_map(|line| line.trim().strip_prefix(TARGET_MARKER))
        .map(str::trim)
        .filter(|expr| !expr.is_empty())
}

/// Registry of generated formatters, keyed by target type.
pub struct GeneratedFormatterResolver {
    targets: RwLock<HashMap<TypeRef, PathBuf>>,
}

impl GeneratedFormatterResolver {
    /// Provider name.
    pub const NAME: &'static str = "generated";

    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: RwLock::new(HashMap::new()),
        }
    }

    /// Records a formatter written for `target` at `path`.
    ///
    /// Re-registering a target replaces the previous path.
    pub fn register(&self, target: TypeRef, path: impl Into<PathBuf>) {
        self.targets.write().insert(target, path.into());
    }

    /// Returns true if a generated formatter exists for `target`.
    #[must_use]
    pub fn contains(&self, target: &TypeRef) -> bool {
        self.targets.read().contains_key(target)
    }

    /// Returns the target whose formatter was written to `path`, if any.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<TypeRef> {
        self.targets
            .read()
            .iter()
            .find(|(_, written)| written.as_path() == path)
            .map(|(target, _)| target.clone())
    }

    /// Returns the number of registered formatters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    /// Scans `root` for generated formatter files and registers their targets.
    ///
    /// Only files named `*Formatter.<extension>` are read. Files without a
    /// readable target marker are skipped. A missing root is not an error.
    ///
    /// # Arguments
    /// * `root` - Output directory of earlier passes
    /// * `extension` - Generated file extension, without the dot
    ///
    /// # Returns
    /// The number of formatters registered.
    ///
    /// # Errors
    /// Returns `LookupError::Configuration` if the root exists but cannot be
    /// listed, or a candidate file cannot be read.
    pub fn scan_directory(&self, root: &Path, extension: &str) -> Result<usize, LookupError> {
        if !root.exists() {
            debug!("No generated formatters under {}", root.display());
            return Ok(0);
        }

        let entries = std::fs::read_dir(root).map_err(|e| {
            error!("Cannot scan {}: {}", root.display(), e);
            LookupError::configuration(format!("cannot scan {}: {e}", root.display()))
        })?;

        let suffix = format!("Formatter.{extension}");
        let mut found = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    error!("Cannot scan {}: {}", root.display(), e);
                    LookupError::configuration(format!("cannot scan {}: {e}", root.display()))
                })?
                .path();
            let is_candidate = path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(&suffix));
            if !is_candidate {
                continue;
            }

            let contents = std::fs::read_to_string(&path).map_err(|e| {
                error!("Cannot read {}: {}", path.display(), e);
                LookupError::configuration(format!("cannot read {}: {e}", path.display()))
            })?;

            let Some(expr) = read_target_marker(&contents) else {
                debug!("{} has no target marker, skipping", path.display());
                continue;
            };
            match parse_type_expr(expr) {
                Ok(target) => {
                    debug!("Found generated formatter for {} at {}", target, path.display());
                    self.register(target, path);
                    found += 1;
                }
                Err(e) => warn!("Ignoring {}: bad target marker: {}", path.display(), e),
            }
        }
        Ok(found)
    }
}

impl Default for GeneratedFormatterResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterResolver for GeneratedFormatterResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_formatter(
        &self,
        ty: &TypeRef,
        _catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        let targets = self.targets.read();
        let Some(path) = targets.get(ty) else {
            return Ok(None);
        };
        let formatter = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map_or_else(|| format!("{}Formatter", ty.short_name()), str::to_string);
        Ok(Some(FormatterHandle::new(ty.clone(), formatter, Self::NAME)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_target_marker() {
        let contents = "#pragma warning disable 618\n// formatgen:target=Game.Player\nnamespace X {}";
        assert_eq!(read_target_marker(contents), Some("Game.Player"));
        assert_eq!(read_target_marker("namespace X {}"), None);
        assert_eq!(read_target_marker("// formatgen:target=   \n"), None);
    }

    #[test]
    fn test_register_and_lookup() {
        let resolver = GeneratedFormatterResolver::new();
        let catalog = TypeCatalog::new();
        let player = TypeRef::named("Game.Player");
        assert!(resolver.is_empty());
        assert!(resolver.get_formatter(&player, &catalog).unwrap().is_none());

        resolver.register(player.clone(), "out/PlayerFormatter.cs");
        assert!(resolver.contains(&player));
        assert_eq!(resolver.len(), 1);

        let handle = resolver.get_formatter(&player, &catalog).unwrap().unwrap();
        assert_eq!(handle.formatter, "PlayerFormatter");
        assert_eq!(handle.provider, GeneratedFormatterResolver::NAME);
    }

    #[test]
    fn test_owner_of_path() {
        let resolver = GeneratedFormatterResolver::new();
        let item = TypeRef::named("Game.Item");
        let path = Path::new("out/ItemFormatter.cs");
        assert_eq!(resolver.owner_of(path), None);

        resolver.register(item.clone(), path);
        assert_eq!(resolver.owner_of(path), Some(item));
        assert_eq!(resolver.owner_of(Path::new("out/ShopFormatter.cs")), None);
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempdir().unwrap();
        let resolver = GeneratedFormatterResolver::new();
        let found = resolver
            .scan_directory(&dir.path().join("does-not-exist"), "cs")
            .unwrap();
        assert_eq!(found, 0);
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("PlayerFormatter.cs"),
            "// formatgen:target=Game.Player\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("PairFormatter.cs"),
            "// formatgen:target=Game.Pair`2[int,string]\n",
        )
        .unwrap();
        fs::write(dir.path().join("HandWrittenFormatter.cs"), "class X {}\n").unwrap();
        fs::write(dir.path().join("BrokenFormatter.cs"), "// formatgen:target=List[\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "// formatgen:target=Game.Other\n").unwrap();

        let resolver = GeneratedFormatterResolver::new();
        let found = resolver.scan_directory(dir.path(), "cs").unwrap();
        assert_eq!(found, 2);
        assert!(resolver.contains(&TypeRef::named("Game.Player")));
        assert!(resolver.contains(&TypeRef::generic(
            "Game.Pair`2",
            vec![
                TypeRef::Primitive(formatgen_schema::PrimitiveType::Int32),
                TypeRef::string()
            ],
        )));
        assert!(!resolver.contains(&TypeRef::named("Game.Other")));
    }

    #[test]
    fn test_scan_root_is_a_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Formatters");
        fs::write(&file, "not a directory").unwrap();

        let resolver = GeneratedFormatterResolver::new();
        let err = resolver.scan_directory(&file, "cs").unwrap_err();
        assert!(err.is_fatal());
    }
}
