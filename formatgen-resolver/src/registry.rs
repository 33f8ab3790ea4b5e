//! Formatter lookup service.

use crate::builtin::{
    AttributeFormatterResolver, BuiltinResolver, DynamicGenericResolver, EnumResolver,
    PlatformResolver,
};
use crate::error::LookupError;
use crate::generated::GeneratedFormatterResolver;
use crate::resolver::{FormatterHandle, FormatterResolver};
use formatgen_schema::{TypeCatalog, TypeRef};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Builder for a [`FormatterRegistry`] with extra formatters or providers.
pub struct RegistryBuilder {
    formatters: Vec<FormatterHandle>,
    resolvers: Vec<Arc<dyn FormatterResolver>>,
    generated: Option<Arc<GeneratedFormatterResolver>>,
}

impl RegistryBuilder {
    /// Creates a builder with only the fixed providers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formatters: Vec::new(),
            resolvers: Vec::new(),
            generated: None,
        }
    }

    /// Registers an already-instantiated formatter for exactly one type.
    #[must_use]
    pub fn formatter(mut self, handle: FormatterHandle) -> Self {
        self.formatters.push(handle);
        self
    }

    /// Appends a provider queried after the fixed ones.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn FormatterResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Shares an existing generated-formatter registry.
    #[must_use]
    pub fn generated(mut self, generated: Arc<GeneratedFormatterResolver>) -> Self {
        self.generated = Some(generated);
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    /// Returns `LookupError::Configuration` if two formatters claim the same
    /// target, or two providers share a name.
    pub fn build(self) -> Result<FormatterRegistry, LookupError> {
        let mut formatters: HashMap<TypeRef, FormatterHandle> =
            HashMap::with_capacity(self.formatters.len());
        for handle in self.formatters {
            if let Some(existing) = formatters.get(&handle.target) {
                let message = format!(
                    "formatters {} and {} both target {}",
                    existing.formatter, handle.formatter, handle.target
                );
                tracing::error!("{}", message);
                return Err(LookupError::configuration(message));
            }
            formatters.insert(handle.target.clone(), handle);
        }

        let generated = self.generated.unwrap_or_default();
        let mut resolvers = FormatterRegistry::fixed_resolvers(&generated);
        resolvers.extend(self.resolvers);

        let mut names = HashSet::with_capacity(resolvers.len());
        for resolver in &resolvers {
            if !names.insert(resolver.name().to_string()) {
                let message = format!("duplicate provider name '{}'", resolver.name());
                tracing::error!("{}", message);
                return Err(LookupError::configuration(message));
            }
        }

        Ok(FormatterRegistry {
            formatters,
            resolvers,
            generated,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers whether a formatter exists for a type.
///
/// Registered formatter instances are consulted first, then providers in
/// priority order: builtin, platform, enum, dynamic-generic, attribute,
/// generated, then user providers in registration order. The first provider
/// to answer wins.
pub struct FormatterRegistry {
    formatters: HashMap<TypeRef, FormatterHandle>,
    resolvers: Vec<Arc<dyn FormatterResolver>>,
    generated: Arc<GeneratedFormatterResolver>,
}

impl FormatterRegistry {
    /// Creates a registry with the fixed providers and nothing else.
    #[must_use]
    pub fn standard() -> Self {
        let generated = Arc::new(GeneratedFormatterResolver::new());
        Self {
            formatters: HashMap::new(),
            resolvers: Self::fixed_resolvers(&generated),
            generated,
        }
    }

    /// Starts building a customized registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn fixed_resolvers(
        generated: &Arc<GeneratedFormatterResolver>,
    ) -> Vec<Arc<dyn FormatterResolver>> {
        vec![
            Arc::new(BuiltinResolver) as Arc<dyn FormatterResolver>,
            Arc::new(PlatformResolver),
            Arc::new(EnumResolver),
            Arc::new(DynamicGenericResolver),
            Arc::new(AttributeFormatterResolver),
            Arc::clone(generated) as Arc<dyn FormatterResolver>,
        ]
    }

    /// Returns the formatter for `ty`, or `None` if every provider declines.
    ///
    /// # Errors
    /// Propagates the first provider error.
    pub fn get_formatter(
        &self,
        ty: &TypeRef,
        catalog: &TypeCatalog,
    ) -> Result<Option<FormatterHandle>, LookupError> {
        if let Some(handle) = self.formatters.get(ty) {
            return Ok(Some(handle.clone()));
        }
        for resolver in &self.resolvers {
            if let Some(handle) = resolver.get_formatter(ty, catalog)? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// Returns true if some formatter covers `ty`.
    ///
    /// # Errors
    /// Propagates the first provider error.
    pub fn has_formatter(&self, ty: &TypeRef, catalog: &TypeCatalog) -> Result<bool, LookupError> {
        Ok(self.get_formatter(ty, catalog)?.is_some())
    }

    /// Returns true if `full_name` lives outside the catalog but is still
    /// covered, so catalog validation can accept references to it.
    #[must_use]
    pub fn is_external(&self, full_name: &str) -> bool {
        if BuiltinResolver::is_well_known(full_name) || PlatformResolver::is_platform_type(full_name)
        {
            return true;
        }
        let named = TypeRef::named(full_name);
        self.formatters.contains_key(&named) || self.generated.contains(&named)
    }

    /// Returns the generated-formatter registry.
    #[must_use]
    pub fn generated(&self) -> &Arc<GeneratedFormatterResolver> {
        &self.generated
    }

    /// Returns provider names in query order.
    #[must_use]
    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formatgen_schema::{PrimitiveType, TypeDef};

    struct FixedResolver {
        name: &'static str,
        target: TypeRef,
    }

    impl FormatterResolver for FixedResolver {
        fn name(&self) -> &str {
            self.name
        }

        fn get_formatter(
            &self,
            ty: &TypeRef,
            _catalog: &TypeCatalog,
        ) -> Result<Option<FormatterHandle>, LookupError> {
            Ok((*ty == self.target).then(|| FormatterHandle::new(ty.clone(), "Fixed", self.name)))
        }
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with_type(TypeDef::class("Player", "Game"))
            .and_then(|c| c.with_type(TypeDef::enumeration("Color", "Game")))
            .and_then(|c| {
                c.with_type(TypeDef::class("Money", "Game").with_formatter("MoneyFormatter"))
            })
            .unwrap()
    }

    #[test]
    fn test_standard_order() {
        let registry = FormatterRegistry::standard();
        assert_eq!(
            registry.resolver_names(),
            vec!["builtin", "platform", "enum", "dynamic-generic", "attribute", "generated"]
        );
    }

    #[test]
    fn test_lookup_through_providers() {
        let registry = FormatterRegistry::standard();
        let catalog = catalog();

        let int = TypeRef::Primitive(PrimitiveType::Int32);
        assert_eq!(
            registry.get_formatter(&int, &catalog).unwrap().unwrap().provider,
            "builtin"
        );
        assert_eq!(
            registry
                .get_formatter(&TypeRef::named("Game.Color"), &catalog)
                .unwrap()
                .unwrap()
                .provider,
            "enum"
        );
        assert_eq!(
            registry
                .get_formatter(&TypeRef::named("Game.Money"), &catalog)
                .unwrap()
                .unwrap()
                .provider,
            "attribute"
        );
        assert!(!registry.has_formatter(&TypeRef::named("Game.Player"), &catalog).unwrap());
    }

    #[test]
    fn test_generated_registration_is_visible() {
        let registry = FormatterRegistry::standard();
        let catalog = catalog();
        let player = TypeRef::named("Game.Player");

        assert!(!registry.has_formatter(&player, &catalog).unwrap());
        registry.generated().register(player.clone(), "PlayerFormatter.cs");
        let handle = registry.get_formatter(&player, &catalog).unwrap().unwrap();
        assert_eq!(handle.provider, "generated");
    }

    #[test]
    fn test_instances_preempt_providers() {
        let int = TypeRef::Primitive(PrimitiveType::Int32);
        let registry = FormatterRegistry::builder()
            .formatter(FormatterHandle::new(int.clone(), "MyIntFormatter", "instance"))
            .build()
            .unwrap();
        let handle = registry.get_formatter(&int, &catalog()).unwrap().unwrap();
        assert_eq!(handle.formatter, "MyIntFormatter");
    }

    #[test]
    fn test_earlier_providers_preempt_user_providers() {
        let catalog = catalog();
        let registry = FormatterRegistry::builder()
            .resolver(Arc::new(FixedResolver {
                name: "user-color",
                target: TypeRef::named("Game.Color"),
            }))
            .resolver(Arc::new(FixedResolver {
                name: "user-player",
                target: TypeRef::named("Game.Player"),
            }))
            .build()
            .unwrap();

        let color = registry
            .get_formatter(&TypeRef::named("Game.Color"), &catalog)
            .unwrap()
            .unwrap();
        assert_eq!(color.provider, "enum");

        let player = registry
            .get_formatter(&TypeRef::named("Game.Player"), &catalog)
            .unwrap()
            .unwrap();
        assert_eq!(player.provider, "user-player");
    }

    #[test]
    fn test_duplicate_targets_rejected() {
        let player = TypeRef::named("Game.Player");
        let result = FormatterRegistry::builder()
            .formatter(FormatterHandle::new(player.clone(), "A", "instance"))
            .formatter(FormatterHandle::new(player, "B", "instance"))
            .build();
        assert!(matches!(result, Err(LookupError::Configuration { .. })));
    }

    #[test]
    fn test_duplicate_provider_names_rejected() {
        let result = FormatterRegistry::builder()
            .resolver(Arc::new(FixedResolver {
                name: "enum",
                target: TypeRef::named("Game.Player"),
            }))
            .build();
        let err = result.err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_shared_generated_registry() {
        let generated = Arc::new(GeneratedFormatterResolver::new());
        let registry = FormatterRegistry::builder()
            .generated(Arc::clone(&generated))
            .build()
            .unwrap();
        generated.register(TypeRef::named("Game.Player"), "PlayerFormatter.cs");
        assert!(registry.is_external("Game.Player"));
        assert!(registry.is_external("System.Guid"));
        assert!(registry.is_external("UnityEngine.Rect"));
        assert!(!registry.is_external("Game.Other"));
    }
}
