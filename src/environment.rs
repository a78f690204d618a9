//! Scoped configuration handed to every build and update call.
//!
//! An [`Environment`] is an immutable map from typed keys to values. Scopes are
//! layered by [`Environment::with`] and [`Environment::merge`]: the child sees
//! every value of its parent unless it overrides it. Reading a key that was
//! never set returns that key's default.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A typed environment key.
pub trait EnvironmentKey: 'static {
    type Value: Clone + Send + Sync + 'static;

    /// Name used in debug output.
    const NAME: &'static str;

    fn default_value() -> Self::Value;
}

#[derive(Clone)]
struct Entry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

#[derive(Clone, Default)]
pub struct Environment {
    entries: Arc<HashMap<TypeId, Entry>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<K: EnvironmentKey>(&self) -> K::Value {
        self.entries
            .get(&TypeId::of::<K>())
            .and_then(|entry| entry.value.downcast_ref::<K::Value>())
            .cloned()
            .unwrap_or_else(K::default_value)
    }

    pub fn contains<K: EnvironmentKey>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<K>())
    }

    /// Child scope with `K` bound to `value`.
    #[must_use]
    pub fn with<K: EnvironmentKey>(&self, value: K::Value) -> Self {
        let mut entries = HashMap::clone(&self.entries);
        entries.insert(
            TypeId::of::<K>(),
            Entry {
                name: K::NAME,
                value: Arc::new(value),
            },
        );
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Layer `child` over `self`; values in `child` win.
    #[must_use]
    pub fn merge(&self, child: &Self) -> Self {
        if child.entries.is_empty() {
            return self.clone();
        }
        if self.entries.is_empty() {
            return child.clone();
        }
        let mut entries = HashMap::clone(&self.entries);
        entries.extend(child.entries.iter().map(|(k, v)| (*k, v.clone())));
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.values().map(|e| e.name).collect();
        names.sort_unstable();
        f.debug_struct("Environment").field("keys", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Answer;

    impl EnvironmentKey for Answer {
        type Value = u32;
        const NAME: &'static str = "Answer";

        fn default_value() -> u32 {
            42
        }
    }

    struct Greeting;

    impl EnvironmentKey for Greeting {
        type Value = String;
        const NAME: &'static str = "Greeting";

        fn default_value() -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_default_when_unset() {
        let env = Environment::new();
        assert_eq!(env.get::<Answer>(), 42);
        assert!(!env.contains::<Answer>());
    }

    #[test]
    fn test_child_scope_does_not_touch_parent() {
        let parent = Environment::new().with::<Answer>(1);
        let child = parent.with::<Answer>(2);
        assert_eq!(parent.get::<Answer>(), 1);
        assert_eq!(child.get::<Answer>(), 2);
    }

    #[test]
    fn test_merge_child_wins() {
        let parent = Environment::new()
            .with::<Answer>(1)
            .with::<Greeting>("parent".to_string());
        let child = Environment::new().with::<Answer>(7);
        let merged = parent.merge(&child);
        assert_eq!(merged.get::<Answer>(), 7);
        assert_eq!(merged.get::<Greeting>(), "parent");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_debug_lists_keys() {
        let env = Environment::new().with::<Greeting>("hi".to_string());
        assert_eq!(format!("{env:?}"), r#"Environment { keys: ["Greeting"] }"#);
    }
}
