// 📚 Operation Registry - name → implementation
// One registration per name, looked up case-insensitively

use crate::error::{CalcError, Result};
use crate::operations::{Builtin, Operation};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of every operation the dispatcher can run
///
/// Owned by the dispatcher and passed around explicitly; there is no
/// process-wide instance. Registrations are permanent for the life of
/// the registry.
pub struct OperationRegistry {
    operations: BTreeMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        OperationRegistry {
            operations: BTreeMap::new(),
        }
    }

    /// Registry with all builtin operations registered
    pub fn with_builtins() -> Result<Self> {
        let mut registry = OperationRegistry::new();
        register_builtin_operations(&mut registry)?;
        Ok(registry)
    }

    /// Register an operation under `name`
    ///
    /// Fails with `Duplicate` if the name (case-insensitive) is taken; the
    /// existing registration is left untouched.
    pub fn register(&mut self, name: &str, operation: Arc<dyn Operation>) -> Result<()> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(CalcError::type_error(
                name,
                "name",
                "str",
                "Operation name must not be blank.",
            ));
        }

        if self.operations.contains_key(&key) {
            return Err(CalcError::Duplicate { name: key });
        }

        debug!(operation = %key, arity = operation.arity().as_str(), "registering operation");
        self.operations.insert(key, operation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Operation>> {
        let key = normalize(name);
        self.operations
            .get(&key)
            .cloned()
            .ok_or(CalcError::NotFound { name: key })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(&normalize(name))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }

    /// (name, operation) pairs, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Operation>)> {
        self.operations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn reset(&mut self) {
        self.operations.clear();
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Startup registration list for the builtin operations
pub fn register_builtin_operations(registry: &mut OperationRegistry) -> Result<()> {
    for builtin in Builtin::ALL {
        registry.register(builtin.key(), Arc::new(builtin))?;
    }
    info!(count = Builtin::ALL.len(), "builtin operations registered");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Arity;
    use rust_decimal::Decimal;

    /// Test double that always answers 42
    struct Answer;

    impl Operation for Answer {
        fn name(&self) -> &str {
            "answer"
        }

        fn arity(&self) -> Arity {
            Arity::Variadic
        }

        fn execute(&self, _operands: &[Decimal]) -> Result<Decimal> {
            Ok(Decimal::from(42))
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = OperationRegistry::with_builtins().unwrap();

        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.names(),
            vec!["add", "divide", "mean", "median", "multiply", "std_dev", "subtract", "variance"]
        );
    }

    #[test]
    fn test_register_duplicate_keeps_first() {
        let mut registry = OperationRegistry::new();
        registry.register("mock", Arc::new(Answer)).unwrap();

        let err = registry.register("mock", Arc::new(Builtin::Add)).unwrap_err();
        assert!(matches!(err, CalcError::Duplicate { ref name } if name == "mock"));
        assert_eq!(err.to_string(), "Operation 'mock' already registered");

        let op = registry.get("mock").unwrap();
        assert_eq!(op.execute(&[]).unwrap(), Decimal::from(42));
    }

    #[test]
    fn test_duplicate_check_is_case_insensitive() {
        let mut registry = OperationRegistry::with_builtins().unwrap();
        let err = registry.register("ADD", Arc::new(Answer)).unwrap_err();
        assert!(matches!(err, CalcError::Duplicate { .. }));
    }

    #[test]
    fn test_get_unknown_operation() {
        let registry = OperationRegistry::with_builtins().unwrap();
        let err = registry.get("unknown").err().unwrap();
        assert!(matches!(err, CalcError::NotFound { ref name } if name == "unknown"));
        assert_eq!(err.to_string(), "Operation 'unknown' not found");
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let registry = OperationRegistry::with_builtins().unwrap();
        assert!(registry.contains(" Divide "));
        assert_eq!(registry.get("MEAN").unwrap().name(), "mean");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = OperationRegistry::new();
        let err = registry.register("   ", Arc::new(Answer)).unwrap_err();
        assert!(matches!(err, CalcError::Type { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reset_then_reregister() {
        let mut registry = OperationRegistry::with_builtins().unwrap();
        registry.reset();
        assert!(registry.is_empty());

        register_builtin_operations(&mut registry).unwrap();
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_builtins_cannot_register_twice() {
        let mut registry = OperationRegistry::with_builtins().unwrap();
        assert!(register_builtin_operations(&mut registry).is_err());
        assert_eq!(registry.len(), 8);
    }
}
