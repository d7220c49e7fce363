//! The binding environment: the named values visible during a render.
//!
//! [`Bindings`] is the root scope, supplied by the caller and read-only
//! for the duration of the render. [`Scope`] layers loop-local values
//! (`this`, `@index`, `@first`, `@last`) on top of it; each `{{#each}}`
//! iteration pushes a fresh layer with a parent pointer rather than
//! mutating anything in place.
use super::error::Error;
use super::lexer::{ToTemplateValue, Value};

use std::collections::HashMap;
use std::ops::Index;

/// Caller-supplied root scope: name to value pairs.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl ToTemplateValue) -> Result<&mut Self, Error> {
        self.values
            .insert(key.to_string(), value.to_template_value()?);
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl Index<&str> for Bindings {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        self.values.get(key).unwrap_or(&Value::Null)
    }
}

impl TryFrom<&Bindings> for Bindings {
    type Error = Error;

    fn try_from(bindings: &Bindings) -> Result<Bindings, Self::Error> {
        Ok(bindings.clone())
    }
}

impl<V: ToTemplateValue> TryFrom<HashMap<String, V>> for Bindings {
    type Error = Error;

    fn try_from(values: HashMap<String, V>) -> Result<Bindings, Self::Error> {
        let mut result = HashMap::new();
        for (key, value) in values {
            result.insert(key, value.to_template_value()?);
        }

        Ok(Bindings { values: result })
    }
}

impl<V: ToTemplateValue> TryFrom<HashMap<&str, V>> for Bindings {
    type Error = Error;

    fn try_from(values: HashMap<&str, V>) -> Result<Bindings, Self::Error> {
        let mut result = HashMap::new();
        for (key, value) in values {
            result.insert(key.to_string(), value.to_template_value()?);
        }

        Ok(Bindings { values: result })
    }
}

impl<V: ToTemplateValue> TryFrom<Vec<(&str, V)>> for Bindings {
    type Error = Error;

    fn try_from(values: Vec<(&str, V)>) -> Result<Bindings, Self::Error> {
        let mut result = HashMap::new();
        for (key, value) in values {
            result.insert(key.to_string(), value.to_template_value()?);
        }

        Ok(Bindings { values: result })
    }
}

impl<V: ToTemplateValue, const N: usize> TryFrom<[(&str, V); N]> for Bindings {
    type Error = Error;

    fn try_from(values: [(&str, V); N]) -> Result<Bindings, Self::Error> {
        let mut result = HashMap::new();
        for (key, value) in values {
            result.insert(key.to_string(), value.to_template_value()?);
        }

        Ok(Bindings { values: result })
    }
}

impl TryFrom<serde_json::Value> for Bindings {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Bindings, Self::Error> {
        match Value::from(value) {
            Value::Hash(values) => Ok(Bindings { values }),
            value => Err(Error::Serialization(format!(
                "bindings must be a JSON object, got {}",
                value
            ))),
        }
    }
}

/// One layer of the scope chain. The root layer wraps the caller's
/// [`Bindings`]; every `{{#each}}` iteration adds a layer holding the
/// current item and its position.
pub struct Scope<'a> {
    bindings: &'a Bindings,
    frame: Option<LoopFrame>,
    parent: Option<&'a Scope<'a>>,
}

struct LoopFrame {
    item: Value,
    index: usize,
    len: usize,
}

impl<'a> Scope<'a> {
    /// The root scope of a render call.
    pub fn root(bindings: &'a Bindings) -> Self {
        Self {
            bindings,
            frame: None,
            parent: None,
        }
    }

    /// Push a loop iteration scope. The parent is borrowed, not copied;
    /// the child is discarded when the iteration ends.
    pub fn child(&'a self, item: Value, index: usize, len: usize) -> Scope<'a> {
        Scope {
            bindings: self.bindings,
            frame: Some(LoopFrame { item, index, len }),
            parent: Some(self),
        }
    }

    /// Resolve a dot-separated path against the scope chain,
    /// innermost layer first. Returns `None` if the head is not in
    /// scope or any intermediate step is absent.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let mut parts = path.split('.');
        let head = parts.next()?;
        let mut value = self.lookup(head)?;

        for part in parts {
            value = match value {
                Value::Hash(hash) => hash.get(part)?.clone(),
                Value::List(list) => {
                    let index = part.parse::<usize>().ok()?;
                    list.get(index)?.clone()
                }
                _ => return None,
            };
        }

        Some(value)
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(frame) = &self.frame {
            match name {
                "this" => return Some(frame.item.clone()),
                "@index" => return Some(Value::Integer(frame.index as i64)),
                "@first" => return Some(Value::Boolean(frame.index == 0)),
                "@last" => return Some(Value::Boolean(frame.index + 1 == frame.len)),
                _ => (),
            }
        }

        match self.parent {
            Some(parent) => parent.lookup(name),
            None => self.bindings.get(name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bindings_set_get() -> Result<(), Error> {
        let mut bindings = Bindings::new();
        bindings.set("name", "value")?.set("count", 5)?;

        assert_eq!(bindings.get("name"), Some(Value::String("value".into())));
        assert_eq!(bindings["count"], Value::Integer(5));
        assert_eq!(bindings["missing"], Value::Null);

        Ok(())
    }

    #[test]
    fn test_dot_path_resolution() -> Result<(), Error> {
        let mut bindings = Bindings::new();
        bindings.set(
            "user",
            Value::Hash(HashMap::from([(
                "name".to_string(),
                Value::String("Alice".into()),
            )])),
        )?;
        bindings.set("items", vec!["a", "b"])?;

        let scope = Scope::root(&bindings);

        assert_eq!(
            scope.resolve("user.name"),
            Some(Value::String("Alice".into()))
        );
        assert_eq!(scope.resolve("items.1"), Some(Value::String("b".into())));
        assert_eq!(scope.resolve("user.missing"), None);
        assert_eq!(scope.resolve("user.name.deeper"), None);
        assert_eq!(scope.resolve("missing"), None);

        Ok(())
    }

    #[test]
    fn test_loop_scope_chain() -> Result<(), Error> {
        let mut bindings = Bindings::new();
        bindings.set("outer", "root value")?;

        let root = Scope::root(&bindings);
        let first = root.child(Value::String("item".into()), 0, 2);

        assert_eq!(first.resolve("this"), Some(Value::String("item".into())));
        assert_eq!(first.resolve("@index"), Some(Value::Integer(0)));
        assert_eq!(first.resolve("@first"), Some(Value::Boolean(true)));
        assert_eq!(first.resolve("@last"), Some(Value::Boolean(false)));

        // Root values stay reachable from a loop body.
        assert_eq!(
            first.resolve("outer"),
            Some(Value::String("root value".into()))
        );

        // A nested loop shadows the implicit names.
        let second = first.child(Value::Integer(42), 1, 2);
        assert_eq!(second.resolve("this"), Some(Value::Integer(42)));
        assert_eq!(second.resolve("@last"), Some(Value::Boolean(true)));
        assert_eq!(
            second.resolve("outer"),
            Some(Value::String("root value".into()))
        );

        Ok(())
    }

    #[test]
    fn test_from_json() -> Result<(), Error> {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"name": "api", "replicas": 3}"#)
                .map_err(|e| Error::Serialization(e.to_string()))?;

        let bindings = Bindings::try_from(json)?;
        assert_eq!(bindings["name"], Value::String("api".into()));
        assert_eq!(bindings["replicas"], Value::Integer(3));

        let err = Bindings::try_from(serde_json::Value::Bool(true))
            .err()
            .expect("not an object");
        assert!(matches!(err, Error::Serialization(_)));

        Ok(())
    }
}
