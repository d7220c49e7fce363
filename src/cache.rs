//! Global template cache.
//!
//! Using the cache ensures that templates are only compiled once,
//! increasing rendering speed considerably. Caching is a pure
//! optimization: a cached template renders exactly the same output as
//! a freshly compiled one.
//!
//! [`Template::cached`] uses the template cache automatically.
use super::engine::Template;
use super::error::Error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};

static TEMPLATES: Lazy<Mutex<Templates>> = Lazy::new(|| Mutex::new(Templates::new()));

/// Compiled templates, keyed by origin path.
pub struct Templates {
    templates: HashMap<PathBuf, Arc<Template>>,
}

impl Templates {
    /// Create new empty template cache.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Retrieve a template from the cache. If the template isn't cached yet,
    /// it is read from disk and compiled.
    ///
    /// The read happens while holding the global template lock. This is slow
    /// for the first request, but prevents the thundering herd problem, and
    /// every request after that is served from memory.
    pub fn get(&mut self, path: impl AsRef<Path>) -> Result<Arc<Template>, Error> {
        let path = path.as_ref();

        if let Some(template) = self.templates.get(path) {
            return Ok(template.clone());
        }

        let template = Arc::new(Template::open_sync(path)?);
        self.templates.insert(path.to_owned(), template.clone());

        Ok(template)
    }

    /// Drop all cached templates. Subsequent loads re-read from disk.
    pub fn clear(&mut self) {
        self.templates.clear();
    }

    /// Obtain a lock to the global template cache.
    pub fn cache() -> MutexGuard<'static, Templates> {
        TEMPLATES.lock()
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}
