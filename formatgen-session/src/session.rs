//! Generation session.
//!
//! A session ties one catalog, one formatter registry and one scheduler
//! together for the lifetime of a generation pass. Requests walk the type
//! graph into the pending set; flushes emit it.

use crate::config::GeneratorConfig;
use crate::error::{FlushError, GenerateError};
use crate::host::{HostEnvironment, HostMode};
use crate::reflect::Reflected;
use crate::scheduler::{Scheduler, SchedulerState};
use crate::walker::{TypeWalker, WalkOutcome};
use formatgen_codegen::{CodegenError, Emitter, SerializationInfoBuilder};
use formatgen_resolver::FormatterRegistry;
use formatgen_schema::{TypeCatalog, TypeRef, validate_catalog};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Explicit state of one generation pass.
pub struct GenerationSession {
    config: GeneratorConfig,
    catalog: Arc<TypeCatalog>,
    registry: FormatterRegistry,
    emitter: Emitter,
    scheduler: Scheduler,
    host: Arc<dyn HostEnvironment>,
    uncovered: Mutex<Vec<TypeRef>>,
}

impl GenerationSession {
    /// Creates a session with the standard provider stack.
    ///
    /// # Errors
    /// Returns `GenerateError::Lookup` if the output root exists but cannot
    /// be scanned for earlier formatters.
    pub fn new(
        config: GeneratorConfig,
        catalog: Arc<TypeCatalog>,
        host: Arc<dyn HostEnvironment>,
    ) -> Result<Self, GenerateError> {
        Self::with_registry(config, catalog, FormatterRegistry::standard(), host)
    }

    /// Creates a session with a custom formatter registry.
    ///
    /// # Errors
    /// Returns `GenerateError::Lookup` if the output root exists but cannot
    /// be scanned for earlier formatters.
    pub fn with_registry(
        config: GeneratorConfig,
        catalog: Arc<TypeCatalog>,
        registry: FormatterRegistry,
        host: Arc<dyn HostEnvironment>,
    ) -> Result<Self, GenerateError> {
        if config.scan_existing() {
            let found = registry
                .generated()
                .scan_directory(config.output_root(), config.file_extension())?;
            info!(
                "Found {} generated formatters under {}",
                found,
                config.output_root().display()
            );
        }

        Ok(Self {
            emitter: config.emitter(),
            scheduler: Scheduler::new(Arc::clone(&host)),
            config,
            catalog,
            registry,
            host,
            uncovered: Mutex::new(Vec::new()),
        })
    }

    /// Checks that every field of every catalog type references something
    /// the catalog or a provider knows.
    ///
    /// # Errors
    /// Returns `GenerateError::Schema` naming the first invalid field.
    pub fn validate(&self) -> Result<(), GenerateError> {
        validate_catalog(&self.catalog, |name| self.registry.is_external(name))?;
        Ok(())
    }

    /// Enqueues `ty` and every dependency lacking a formatter, then asks
    /// the scheduler for a flush.
    ///
    /// Requesting a type that is still pending, for example one that failed
    /// in an earlier flush, asks for a flush again.
    ///
    /// # Errors
    /// Returns `GenerateError::Schema` if a reachable type cannot be
    /// inspected, or `GenerateError::Lookup` if the provider stack fails.
    /// Types enqueued before the failing one stay pending.
    pub fn request_generation(&self, ty: &TypeRef) -> Result<WalkOutcome, GenerateError> {
        let outcome = TypeWalker::new(&self.catalog, &self.registry, &self.scheduler)
            .walk(ty)
            .inspect_err(|e| {
                if e.is_fatal() {
                    error!("Generation pass aborted for {}: {}", ty, e);
                }
            })?;

        if !outcome.uncovered_containers.is_empty() {
            let mut uncovered = self.uncovered.lock();
            for container in &outcome.uncovered_containers {
                if !uncovered.contains(container) {
                    warn!("No formatter provider covers {}; it will not be generated", container);
                    uncovered.push(container.clone());
                }
            }
        }

        if !outcome.enqueued.is_empty() || self.scheduler.contains(ty) {
            self.scheduler.request_flush();
        }
        Ok(outcome)
    }

    /// Enqueues the catalog type a Rust type stands for.
    ///
    /// # Errors
    /// See [`GenerationSession::request_generation`].
    pub fn request_generation_of<T: Reflected>(&self) -> Result<WalkOutcome, GenerateError> {
        self.request_generation(&T::type_ref())
    }

    /// Emits every pending type now.
    ///
    /// Each unit is described and written independently. Written types are
    /// registered as generated and leave the pending set; failed types stay
    /// pending. The host is told to refresh and reload if anything was
    /// written.
    ///
    /// # Returns
    /// The files written.
    ///
    /// # Errors
    /// Returns `GenerateError::Flush` listing every failed unit.
    pub fn flush(&self) -> Result<Vec<PathBuf>, GenerateError> {
        match self.scheduler.begin_flush() {
            Some(snapshot) => self.emit_all(snapshot),
            None => Ok(Vec::new()),
        }
    }

    /// Runs the deferred flush registered with the host.
    ///
    /// Does nothing unless a flush was requested.
    ///
    /// # Errors
    /// Returns `GenerateError::Flush` listing every failed unit.
    pub fn on_idle(&self) -> Result<Vec<PathBuf>, GenerateError> {
        match self.scheduler.begin_requested_flush() {
            Some(snapshot) => self.emit_all(snapshot),
            None => Ok(Vec::new()),
        }
    }

    /// Handles a host mode change.
    ///
    /// Regaining interactive control with work pending flushes immediately.
    ///
    /// # Errors
    /// Returns `GenerateError::Flush` listing every failed unit.
    pub fn on_mode_changed(&self, mode: HostMode) -> Result<Vec<PathBuf>, GenerateError> {
        debug!("Host mode changed to {:?}", mode);
        if mode == HostMode::Interactive && self.scheduler.pending_len() > 0 {
            return self.flush();
        }
        Ok(Vec::new())
    }

    fn emit_all(&self, snapshot: Vec<TypeRef>) -> Result<Vec<PathBuf>, GenerateError> {
        let builder = SerializationInfoBuilder::new(&self.catalog);
        let mut written = Vec::with_capacity(snapshot.len());
        let mut completed = Vec::with_capacity(snapshot.len());
        let mut failures = Vec::new();

        for ty in snapshot {
            let result = builder.describe(&ty).and_then(|info| {
                let path = self.emitter.output_path(&info);
                match self.registry.generated().owner_of(&path) {
                    Some(existing) if existing != ty => {
                        Err(CodegenError::PathCollision { path, existing })
                    }
                    _ => self.emitter.emit(info),
                }
            });
            match result {
                Ok(path) => {
                    self.registry.generated().register(ty.clone(), &path);
                    completed.push(ty);
                    written.push(path);
                }
                Err(e) => {
                    warn!("Failed to generate formatter for {}: {}", ty, e);
                    failures.push((ty, e));
                }
            }
        }

        self.scheduler.finish_flush(&completed);

        if !written.is_empty() {
            self.host.refresh_file_index();
            self.host.reload_compiled_code();
        }

        if failures.is_empty() {
            Ok(written)
        } else {
            Err(FlushError { written, failures }.into())
        }
    }

    /// Returns the pending types in insertion order.
    #[must_use]
    pub fn pending(&self) -> Vec<TypeRef> {
        self.scheduler.pending()
    }

    /// Returns the scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Returns every generic container or array seen so far that no
    /// provider covers. These never get a formatter.
    #[must_use]
    pub fn uncovered_containers(&self) -> Vec<TypeRef> {
        self.uncovered.lock().clone()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// Returns the formatter registry.
    #[must_use]
    pub fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ChannelHost, HostEvents, HostSignal};
    use crossbeam_channel::{Receiver, Sender, bounded};
    use formatgen_resolver::{FormatterHandle, FormatterResolver, LookupError};
    use formatgen_schema::{FieldDef, PrimitiveType, SchemaError, TypeDef};
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    struct Player;

    impl Reflected for Player {
        fn type_ref() -> TypeRef {
            TypeRef::named("Game.Player")
        }
    }

    fn int() -> TypeRef {
        TypeRef::Primitive(PrimitiveType::Int32)
    }

    fn game_catalog() -> Arc<TypeCatalog> {
        let mut catalog = TypeCatalog::new();
        for def in [
            TypeDef::class("Player", "Game")
                .with_field(FieldDef::new("id", int()))
                .with_field(FieldDef::new("name", TypeRef::string()))
                .with_field(FieldDef::new("tags", TypeRef::list(TypeRef::string()))),
            TypeDef::class("Team", "Game")
                .with_field(FieldDef::new("members", TypeRef::list(TypeRef::named("Game.Player"))))
                .with_field(FieldDef::new("captain", TypeRef::named("Game.Player"))),
            TypeDef::structure("Score", "Game").with_field(FieldDef::new("value", int())),
        ] {
            catalog.add_type(def).unwrap();
        }
        Arc::new(catalog)
    }

    fn config(root: &Path) -> GeneratorConfig {
        GeneratorConfig::builder().output_root(root).build().unwrap()
    }

    fn new_session(
        dir: &TempDir,
        catalog: Arc<TypeCatalog>,
        mode: HostMode,
    ) -> (GenerationSession, Arc<ChannelHost>, HostEvents) {
        let (host, events) = ChannelHost::new(mode);
        let host = Arc::new(host);
        let session =
            GenerationSession::new(config(&dir.path().join("Formatters")), catalog, host.clone())
                .unwrap();
        (session, host, events)
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempdir().unwrap();
        let (session, _host, events) = new_session(&dir, game_catalog(), HostMode::Interactive);

        let outcome = session.request_generation_of::<Player>().unwrap();
        assert_eq!(outcome.enqueued, vec![TypeRef::named("Game.Player")]);
        assert_eq!(session.pending(), vec![TypeRef::named("Game.Player")]);
        assert_eq!(session.state(), SchedulerState::FlushRequested);
        assert_eq!(events.drain(), vec![HostSignal::ScheduleFlush]);

        let written = session.on_idle().unwrap();
        assert_eq!(written, vec![dir.path().join("Formatters").join("PlayerFormatter.cs")]);

        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("writer.WriteInt32(value.id);"));
        assert!(text.contains("writer.WriteString(value.name);"));
        assert!(text.contains("GetFormatterWithVerify<System.Collections.Generic.List<string>>()"));
        assert_eq!(text.matches("writer.WriteRaw(").count(), 3);

        assert!(session.pending().is_empty());
        assert_eq!(session.state(), SchedulerState::Idle);
        assert_eq!(
            events.drain(),
            vec![HostSignal::RefreshFileIndex, HostSignal::ReloadCompiledCode]
        );
    }

    #[test]
    fn test_generated_type_not_requeued() {
        let dir = tempdir().unwrap();
        let (session, _host, _events) = new_session(&dir, game_catalog(), HostMode::Interactive);

        session.request_generation(&TypeRef::named("Game.Player")).unwrap();
        session.flush().unwrap();

        let again = session.request_generation(&TypeRef::named("Game.Player")).unwrap();
        assert!(again.enqueued.is_empty());

        let team = session.request_generation(&TypeRef::named("Game.Team")).unwrap();
        assert_eq!(team.enqueued, vec![TypeRef::named("Game.Team")]);
    }

    #[test]
    fn test_existing_formatters_scanned_at_start() {
        let dir = tempdir().unwrap();
        {
            let (session, _host, _events) = new_session(&dir, game_catalog(), HostMode::Interactive);
            session.request_generation(&TypeRef::named("Game.Team")).unwrap();
            assert_eq!(session.flush().unwrap().len(), 2);
        }

        let (session, _host, _events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        assert_eq!(session.registry().generated().len(), 2);
        let outcome = session.request_generation(&TypeRef::named("Game.Team")).unwrap();
        assert!(outcome.enqueued.is_empty());
    }

    #[test]
    fn test_non_interactive_flushes_on_mode_change() {
        let dir = tempdir().unwrap();
        let (session, host, events) = new_session(&dir, game_catalog(), HostMode::NonInteractive);

        session.request_generation(&TypeRef::named("Game.Score")).unwrap();
        assert_eq!(session.state(), SchedulerState::Accumulating);
        assert!(events.is_empty());
        assert!(session.on_idle().unwrap().is_empty());

        host.set_mode(HostMode::Interactive);
        let written = session.on_mode_changed(HostMode::Interactive).unwrap();
        assert_eq!(written.len(), 1);
        assert!(session.pending().is_empty());

        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(!text.contains("if (value == null)"));
    }

    #[test]
    fn test_mode_change_without_pending_is_noop() {
        let dir = tempdir().unwrap();
        let (session, _host, events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        assert!(session.on_mode_changed(HostMode::Interactive).unwrap().is_empty());
        assert!(session.on_mode_changed(HostMode::NonInteractive).unwrap().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_best_effort_flush() {
        let dir = tempdir().unwrap();
        let (session, _host, events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        session.request_generation(&TypeRef::named("Game.Player")).unwrap();
        session.request_generation(&TypeRef::named("Game.Score")).unwrap();
        events.drain();

        // A file where the Score formatter should go makes that write fail.
        fs::create_dir_all(dir.path().join("Formatters").join("ScoreFormatter.cs")).unwrap();

        let err = session.flush().unwrap_err();
        let GenerateError::Flush(flush) = err else {
            panic!("expected flush error, got {err}");
        };
        assert_eq!(flush.written.len(), 1);
        assert_eq!(flush.failed_types(), vec![&TypeRef::named("Game.Score")]);
        assert!(matches!(flush.failures[0].1, CodegenError::Io { .. }));

        assert_eq!(session.pending(), vec![TypeRef::named("Game.Score")]);
        assert_eq!(session.state(), SchedulerState::Accumulating);
        assert!(session.registry().generated().contains(&TypeRef::named("Game.Player")));
        assert_eq!(
            events.drain(),
            vec![HostSignal::RefreshFileIndex, HostSignal::ReloadCompiledCode]
        );
    }

    #[test]
    fn test_rerequest_schedules_failed_unit() {
        let dir = tempdir().unwrap();
        let (session, _host, events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        let score = TypeRef::named("Game.Score");
        let blocker = dir.path().join("Formatters").join("ScoreFormatter.cs");
        session.request_generation(&score).unwrap();
        fs::create_dir_all(&blocker).unwrap();
        assert!(session.on_idle().is_err());
        assert_eq!(session.state(), SchedulerState::Accumulating);
        events.drain();

        fs::remove_dir(&blocker).unwrap();
        let outcome = session.request_generation(&score).unwrap();
        assert!(outcome.enqueued.is_empty());
        assert_eq!(session.state(), SchedulerState::FlushRequested);
        assert_eq!(events.drain(), vec![HostSignal::ScheduleFlush]);

        assert_eq!(session.on_idle().unwrap(), vec![blocker.clone()]);
        assert!(blocker.is_file());
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_same_simple_name_collision_reported() {
        let dir = tempdir().unwrap();
        let mut catalog = TypeCatalog::new();
        for def in [
            TypeDef::class("Root", "Game")
                .with_field(FieldDef::new("gi", TypeRef::named("Game.Item")))
                .with_field(FieldDef::new("si", TypeRef::named("Shop.Item"))),
            TypeDef::class("Item", "Game").with_field(FieldDef::new("id", int())),
            TypeDef::class("Item", "Shop").with_field(FieldDef::new("price", int())),
        ] {
            catalog.add_type(def).unwrap();
        }
        let (session, _host, _events) = new_session(&dir, Arc::new(catalog), HostMode::Interactive);
        session.request_generation(&TypeRef::named("Game.Root")).unwrap();

        let err = session.flush().unwrap_err();
        let GenerateError::Flush(flush) = err else {
            panic!("expected flush error, got {err}");
        };
        let item_path = dir.path().join("Formatters").join("ItemFormatter.cs");
        assert_eq!(flush.written.len(), 2);
        assert_eq!(flush.failed_types(), vec![&TypeRef::named("Shop.Item")]);
        match &flush.failures[0].1 {
            CodegenError::PathCollision { path, existing } => {
                assert_eq!(path, &item_path);
                assert_eq!(existing, &TypeRef::named("Game.Item"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let text = fs::read_to_string(&item_path).unwrap();
        assert!(text.contains("// formatgen:target=Game.Item"));
        assert_eq!(session.pending(), vec![TypeRef::named("Shop.Item")]);
        assert!(!session.registry().generated().contains(&TypeRef::named("Shop.Item")));
    }

    #[test]
    fn test_failed_request_keeps_valid_types_pending() {
        let dir = tempdir().unwrap();
        let mut catalog = TypeCatalog::new();
        catalog
            .add_type(
                TypeDef::class("Broken", "Game")
                    .with_field(FieldDef::new("ok", TypeRef::named("Game.Fine")))
                    .with_field(FieldDef::new("missing", TypeRef::named("Game.Nowhere"))),
            )
            .unwrap();
        catalog.add_type(TypeDef::class("Fine", "Game")).unwrap();
        let (session, _host, events) = new_session(&dir, Arc::new(catalog), HostMode::Interactive);

        let err = session.request_generation(&TypeRef::named("Game.Broken")).unwrap_err();
        assert!(matches!(err, GenerateError::Schema(SchemaError::InvalidField { .. })));
        assert!(!err.is_fatal());
        assert_eq!(
            session.pending(),
            vec![TypeRef::named("Game.Broken"), TypeRef::named("Game.Fine")]
        );
        assert_eq!(session.state(), SchedulerState::Accumulating);
        assert!(events.is_empty());
    }

    /// Blocks lookups of one type until released.
    struct GateResolver {
        blocked: TypeRef,
        reached: Sender<()>,
        release: Receiver<()>,
    }

    impl FormatterResolver for GateResolver {
        fn name(&self) -> &str {
            "gate"
        }

        fn get_formatter(
            &self,
            ty: &TypeRef,
            _catalog: &TypeCatalog,
        ) -> Result<Option<FormatterHandle>, LookupError> {
            if *ty == self.blocked {
                self.reached.send(()).unwrap();
                self.release.recv().unwrap();
            }
            Ok(None)
        }
    }

    #[test]
    fn test_failed_request_keeps_concurrent_request() {
        let dir = tempdir().unwrap();
        let mut catalog = TypeCatalog::new();
        for def in [
            TypeDef::class("Player", "Game").with_field(FieldDef::new("id", int())),
            TypeDef::class("Team", "Game")
                .with_field(FieldDef::new("captain", TypeRef::named("Game.Player")))
                .with_field(FieldDef::new("bad", TypeRef::named("Game.Missing"))),
        ] {
            catalog.add_type(def).unwrap();
        }

        let (reached_tx, reached_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let registry = FormatterRegistry::builder()
            .resolver(Arc::new(GateResolver {
                blocked: TypeRef::named("Game.Missing"),
                reached: reached_tx,
                release: release_rx,
            }))
            .build()
            .unwrap();
        let (host, _events) = ChannelHost::new(HostMode::Interactive);
        let session = Arc::new(
            GenerationSession::with_registry(
                config(&dir.path().join("Formatters")),
                Arc::new(catalog),
                registry,
                Arc::new(host),
            )
            .unwrap(),
        );

        let walker = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.request_generation(&TypeRef::named("Game.Team")))
        };
        reached_rx.recv().unwrap();

        // Player is already pending through Team's walk.
        let player = session.request_generation(&TypeRef::named("Game.Player")).unwrap();
        assert!(player.enqueued.is_empty());

        release_tx.send(()).unwrap();
        let err = walker.join().unwrap().unwrap_err();
        assert!(matches!(err, GenerateError::Schema(SchemaError::InvalidField { .. })));

        assert_eq!(
            session.pending(),
            vec![TypeRef::named("Game.Team"), TypeRef::named("Game.Player")]
        );
    }

    #[test]
    fn test_uncovered_containers_tracked() {
        let dir = tempdir().unwrap();
        let mut catalog = TypeCatalog::new();
        catalog
            .add_type(TypeDef::class("Bag", "Game").with_field(FieldDef::new(
                "items",
                TypeRef::generic("Game.Box`1", vec![int()]),
            )))
            .unwrap();
        let (session, _host, _events) = new_session(&dir, Arc::new(catalog), HostMode::Interactive);

        session.request_generation(&TypeRef::named("Game.Bag")).unwrap();
        session.request_generation(&TypeRef::named("Game.Bag")).unwrap();
        assert_eq!(
            session.uncovered_containers(),
            vec![TypeRef::generic("Game.Box`1", vec![int()])]
        );
    }

    #[test]
    fn test_concurrent_requests() {
        let dir = tempdir().unwrap();
        let (session, _host, _events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        let session = Arc::new(session);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        session.request_generation(&TypeRef::named("Game.Team")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            session.pending(),
            vec![TypeRef::named("Game.Team"), TypeRef::named("Game.Player")]
        );
    }

    #[test]
    fn test_validate() {
        let dir = tempdir().unwrap();
        let (session, _host, _events) = new_session(&dir, game_catalog(), HostMode::Interactive);
        assert!(session.validate().is_ok());

        let mut catalog = TypeCatalog::new();
        catalog
            .add_type(
                TypeDef::class("Event", "Game")
                    .with_field(FieldDef::new("at", TypeRef::named("System.DateTime")))
                    .with_field(FieldDef::new("where", TypeRef::named("Game.Place"))),
            )
            .unwrap();
        let (session, _host, _events) = new_session(&dir, Arc::new(catalog), HostMode::Interactive);
        assert!(matches!(
            session.validate(),
            Err(GenerateError::Schema(SchemaError::InvalidField { .. }))
        ));
    }
}
