//! Named pure functions callable from template expressions.
//!
//! Helpers receive already-resolved argument values and return a value.
//! They get no handle to anything else: no bindings, no engine, no I/O
//! capability, which is what keeps renders pure and repeatable.
use super::error::Error;
use super::escape::EscapeContext;
use super::lexer::Value;

use std::collections::HashMap;
use std::sync::Arc;

/// A registered helper function.
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// Registry of named helpers. Built once at engine construction,
/// immutable during rendering.
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: HashMap<String, HelperFn>,
}

impl HelperRegistry {
    /// Empty registry, no helpers at all.
    pub fn new() -> Self {
        Self {
            helpers: HashMap::new(),
        }
    }

    /// Registry with the built-in helpers.
    pub fn defaults() -> Self {
        let mut registry = Self::new();

        registry.register("equals", |args| {
            exact("equals", args, 2)?;
            Ok(Value::Boolean(args[0] == args[1]))
        });

        registry.register("not_equals", |args| {
            exact("not_equals", args, 2)?;
            Ok(Value::Boolean(args[0] != args[1]))
        });

        registry.register("less_than", |args| compare("less_than", args, |o| o.is_lt()));
        registry.register("greater_than", |args| {
            compare("greater_than", args, |o| o.is_gt())
        });
        registry.register("less_or_equal", |args| {
            compare("less_or_equal", args, |o| o.is_le())
        });
        registry.register("greater_or_equal", |args| {
            compare("greater_or_equal", args, |o| o.is_ge())
        });

        registry.register("and", |args| {
            Ok(Value::Boolean(args.iter().all(|v| v.truthy())))
        });

        registry.register("or", |args| {
            Ok(Value::Boolean(args.iter().any(|v| v.truthy())))
        });

        registry.register("not", |args| {
            exact("not", args, 1)?;
            Ok(Value::Boolean(!args[0].truthy()))
        });

        registry.register("includes", |args| {
            exact("includes", args, 2)?;
            let list = list("includes", &args[0])?;
            Ok(Value::Boolean(list.contains(&args[1])))
        });

        registry.register("join", |args| {
            exact("join", args, 2)?;
            let list = list("join", &args[0])?;
            let separator = args[1].to_text();

            Ok(Value::String(
                list.iter()
                    .map(|v| v.to_text())
                    .collect::<Vec<_>>()
                    .join(&separator),
            ))
        });

        registry.register("capitalize", |args| {
            let value = string("capitalize", args)?;
            Ok(Value::String(crate::capitalize(&value)))
        });

        registry.register("lowercase", |args| {
            let value = string("lowercase", args)?;
            Ok(Value::String(value.to_lowercase()))
        });

        registry.register("uppercase", |args| {
            let value = string("uppercase", args)?;
            Ok(Value::String(value.to_uppercase()))
        });

        registry.register("default", |args| {
            exact("default", args, 2)?;
            if args[0].truthy() {
                Ok(args[0].clone())
            } else {
                Ok(args[1].clone())
            }
        });

        registry.register("escape_html", |args| escape(args, EscapeContext::Html));
        registry.register("escape_script", |args| escape(args, EscapeContext::Script));
        registry.register("escape_shell", |args| escape(args, EscapeContext::Shell));
        registry.register("escape_json", |args| escape(args, EscapeContext::Json));
        registry.register("escape_url", |args| escape(args, EscapeContext::Url));

        registry.register("escape_for", |args| {
            exact("escape_for", args, 2)?;
            let context = match &args[0] {
                Value::String(name) => EscapeContext::from_name(name)?,
                value => {
                    return Err(Error::HelperContract(
                        "escape_for".into(),
                        format!("expected a context name, got {}", value),
                    ))
                }
            };

            Ok(Value::String(context.escape(&args[1].to_text())))
        });

        registry
    }

    /// Register a helper under the given name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Arc::new(helper));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Invoke a helper by name with resolved arguments.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        match self.helpers.get(name) {
            Some(helper) => helper(args),
            None => Err(Error::UnknownHelper(name.to_string())),
        }
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

fn exact(name: &str, args: &[Value], expected: usize) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::HelperContract(
            name.into(),
            format!("expected {} arguments, got {}", expected, args.len()),
        ))
    }
}

fn compare(
    name: &str,
    args: &[Value],
    check: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, Error> {
    exact(name, args, 2)?;

    match args[0].partial_cmp(&args[1]) {
        Some(ordering) => Ok(Value::Boolean(check(ordering))),
        None => Err(Error::HelperContract(
            name.into(),
            format!("cannot compare {:?} and {:?}", args[0], args[1]),
        )),
    }
}

fn list<'a>(name: &str, value: &'a Value) -> Result<&'a Vec<Value>, Error> {
    match value {
        Value::List(list) => Ok(list),
        value => Err(Error::HelperContract(
            name.into(),
            format!("expected a list, got {:?}", value),
        )),
    }
}

fn string(name: &str, args: &[Value]) -> Result<String, Error> {
    exact(name, args, 1)?;

    match &args[0] {
        Value::String(s) => Ok(s.clone()),
        value => Err(Error::HelperContract(
            name.into(),
            format!("expected a string, got {:?}", value),
        )),
    }
}

fn escape(args: &[Value], context: EscapeContext) -> Result<Value, Error> {
    if args.len() != 1 {
        return Err(Error::HelperContract(
            format!("escape_{}", context),
            format!("expected 1 argument, got {}", args.len()),
        ));
    }

    Ok(Value::String(context.escape(&args[0].to_text())))
}
