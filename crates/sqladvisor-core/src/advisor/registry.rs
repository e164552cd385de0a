//! Rule registry: (engine, rule type) to checker factory

use indexmap::IndexMap;

use crate::dialect::Engine;

use super::checker::Checker;
use super::rules::{self, RuleType};

/// Creates a fresh checker for one rule evaluation
pub type CheckerFactory = fn() -> Box<dyn Checker>;

/// A registered checker and its position in registration order
#[derive(Clone, Copy)]
pub struct Registration {
    pub order: usize,
    pub factory: CheckerFactory,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Registry of checker factories.
///
/// Populated once during startup and read-only afterwards. Registration order
/// is kept and used to break ties between advice on the same line.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<(Engine, RuleType), CheckerFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        rules::register_builtin(&mut registry);
        registry
    }

    /// Register a checker factory.
    ///
    /// # Panics
    ///
    /// Panics when the (engine, rule type) pair is already registered. This is
    /// a programming error in the startup code, not a runtime condition.
    pub fn register(&mut self, engine: Engine, rule_type: RuleType, factory: CheckerFactory) {
        if self.entries.contains_key(&(engine, rule_type)) {
            panic!(
                "checker for rule '{}' on engine {} registered twice",
                rule_type, engine
            );
        }
        self.entries.insert((engine, rule_type), factory);
    }

    pub fn lookup(&self, engine: Engine, rule_type: RuleType) -> Option<Registration> {
        self.entries
            .get_full(&(engine, rule_type))
            .map(|(order, _, factory)| Registration {
                order,
                factory: *factory,
            })
    }

    pub fn contains(&self, engine: Engine, rule_type: RuleType) -> bool {
        self.entries.contains_key(&(engine, rule_type))
    }

    /// Registered pairs in registration order
    pub fn entries(&self) -> impl Iterator<Item = (Engine, RuleType)> + '_ {
        self.entries.keys().copied()
    }

    /// Rule types registered for one engine, in registration order
    pub fn rules_for(&self, engine: Engine) -> Vec<RuleType> {
        self.entries()
            .filter(|(e, _)| *e == engine)
            .map(|(_, rule)| rule)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::rules::statement::DisallowMixNonTransactional;

    fn mix() -> Box<dyn Checker> {
        Box::new(DisallowMixNonTransactional::default())
    }

    #[test]
    fn test_lookup_returns_registration_order() {
        let mut registry = Registry::new();
        registry.register(Engine::TiDb, RuleType::StatementDisallowMixNonTransactional, mix);
        registry.register(Engine::MySql, RuleType::StatementDisallowMixNonTransactional, mix);

        let found = registry
            .lookup(Engine::MySql, RuleType::StatementDisallowMixNonTransactional)
            .unwrap();
        assert_eq!(found.order, 1);
        assert!(registry
            .lookup(Engine::Postgres, RuleType::StatementDisallowMixNonTransactional)
            .is_none());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = Registry::new();
        registry.register(Engine::MySql, RuleType::StatementDisallowMixNonTransactional, mix);
        registry.register(Engine::MySql, RuleType::StatementDisallowMixNonTransactional, mix);
    }

    #[test]
    fn test_builtin_registrations() {
        let registry = Registry::builtin();
        for engine in [Engine::MySql, Engine::TiDb, Engine::MariaDb] {
            assert!(registry.contains(engine, RuleType::ColumnAutoIncrementMustUnsigned));
            assert!(registry.contains(engine, RuleType::ColumnAutoIncrementMustInteger));
        }
        assert!(registry.contains(Engine::MySql, RuleType::ColumnDisallowZerofill));
        assert!(!registry.contains(Engine::TiDb, RuleType::ColumnDisallowZerofill));
        assert!(!registry.contains(Engine::Postgres, RuleType::ColumnAutoIncrementMustUnsigned));
        for engine in Engine::ALL {
            assert!(registry.contains(engine, RuleType::StatementDisallowMixNonTransactional));
        }
    }
}
