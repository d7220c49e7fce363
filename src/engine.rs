//! The rendering engine and compiled templates.
//!
//! An [`Engine`] is an explicit value holding the helper registry;
//! there is no implicit global engine. Construct one, optionally add
//! project-specific helpers, and pass it wherever rendering happens.
//! Multiple independently configured engines coexist without
//! interference.
use super::audit::{self, Audit};
use super::bindings::{Bindings, Scope};
use super::cache::Templates;
use super::error::Error;
use super::escape::EscapeContext;
use super::helpers::HelperRegistry;
use super::language::{Program, RenderState, Statement};
use super::lexer::Value;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::read_to_string;

/// A compiled template: the parsed program plus the escape context
/// inferred from its origin path, if it has one. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct Template {
    program: Program,
    path: Option<PathBuf>,
    context: Option<EscapeContext>,
}

impl Template {
    /// Read and compile a template from disk.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = match read_to_string(path).await {
            Ok(text) => text,
            Err(_) => return Err(Error::TemplateDoesNotExist(path.to_owned())),
        };

        Self::compile(&text, Some(path))
    }

    /// Compile a template from a string. No origin, so no context
    /// inference; the render call decides the context.
    pub fn from_str(source: &str) -> Result<Self, Error> {
        Self::compile(source, None)
    }

    /// Retrieve a compiled template from the global cache,
    /// reading and compiling it on the first request.
    pub fn cached(path: impl AsRef<Path>) -> Result<Arc<Self>, Error> {
        Templates::cache().get(path)
    }

    pub(crate) fn open_sync(path: &Path) -> Result<Self, Error> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Err(Error::TemplateDoesNotExist(path.to_owned())),
        };

        Self::compile(&text, Some(path))
    }

    fn compile(source: &str, path: Option<&Path>) -> Result<Self, Error> {
        let program = Program::from_str(source)?;

        Ok(Self {
            program,
            path: path.map(|p| p.to_owned()),
            context: path.and_then(EscapeContext::infer),
        })
    }

    /// The escape context inferred from the origin path, if any.
    pub fn context(&self) -> Option<EscapeContext> {
        self.context
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check which top-level names the template references and which
    /// of them the bindings don't supply.
    pub fn audit(&self, bindings: &Bindings) -> Audit {
        audit::audit(self, bindings)
    }

    pub(crate) fn program(&self) -> &Program {
        &self.program
    }

    pub(crate) fn statements(&self) -> &[Statement] {
        self.program.statements()
    }
}

/// Rendered output together with the variable references
/// that didn't resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub output: String,
    pub missing: Vec<String>,
}

/// The template engine: the helper registry plus the render entry
/// points. Cheap to clone, safe to share across threads.
#[derive(Clone)]
pub struct Engine {
    helpers: HelperRegistry,
}

impl Engine {
    /// Engine with the built-in helpers.
    pub fn new() -> Self {
        Self {
            helpers: HelperRegistry::defaults(),
        }
    }

    /// Engine with a caller-assembled registry.
    pub fn with_helpers(helpers: HelperRegistry) -> Self {
        Self { helpers }
    }

    /// Add a helper, builder-style.
    ///
    /// ```
    /// # use stencil::{Engine, Value};
    /// let engine = Engine::new().helper("shout", |args| {
    ///     Ok(Value::String(format!("{}!", args[0])))
    /// });
    ///
    /// let output = engine
    ///     .render("{{shout name}}", [("name", "hey")], None)
    ///     .unwrap();
    ///
    /// assert_eq!(output, "hey!");
    /// ```
    pub fn helper<F>(mut self, name: &str, helper: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.helpers.register(name, helper);
        self
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Compile and render a template string.
    ///
    /// Unmatched blocks and unknown helpers are fatal; unresolved plain
    /// variables render as the empty string and are logged.
    pub fn render(
        &self,
        source: &str,
        bindings: impl TryInto<Bindings, Error = Error>,
        context: Option<EscapeContext>,
    ) -> Result<String, Error> {
        let template = Template::from_str(source)?;
        self.render_template(&template, bindings, context)
    }

    /// Render a precompiled template. An explicit context wins over the
    /// one inferred from the template's origin; HTML is the fallback.
    pub fn render_template(
        &self,
        template: &Template,
        bindings: impl TryInto<Bindings, Error = Error>,
        context: Option<EscapeContext>,
    ) -> Result<String, Error> {
        let bindings = bindings.try_into()?;
        Ok(self.evaluate(template, &bindings, context)?.output)
    }

    /// Compile and render, returning the unresolved variable references
    /// alongside the output instead of only logging them. Missing plain
    /// variables never fail this call; syntax and helper errors still do.
    pub fn audit_then_render(
        &self,
        source: &str,
        bindings: impl TryInto<Bindings, Error = Error>,
        context: Option<EscapeContext>,
    ) -> Result<Rendered, Error> {
        let template = Template::from_str(source)?;
        let bindings = bindings.try_into()?;

        self.evaluate(&template, &bindings, context)
    }

    /// Load a template through the global cache and render it,
    /// inferring the escape context from the path unless one is given.
    pub async fn load_and_render(
        &self,
        path: impl AsRef<Path>,
        bindings: impl TryInto<Bindings, Error = Error>,
        context: Option<EscapeContext>,
    ) -> Result<String, Error> {
        let template = Template::cached(path)?;
        self.render_template(&template, bindings, context)
    }

    fn evaluate(
        &self,
        template: &Template,
        bindings: &Bindings,
        context: Option<EscapeContext>,
    ) -> Result<Rendered, Error> {
        let context = context.or(template.context()).unwrap_or_default();
        let mut state = RenderState::new(&self.helpers, context);
        let scope = Scope::root(bindings);

        let output = template.program().evaluate(&scope, &mut state)?;

        Ok(Rendered {
            output,
            missing: state.into_missing(),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
