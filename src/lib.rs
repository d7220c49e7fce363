//! Stencil is a context-aware template rendering engine. Templates are
//! plain text with variable substitutions, conditionals, iteration and
//! helper calls; every substituted value is encoded for the destination
//! syntax (HTML, script, shell, JSON or URL), so generated files can't
//! be broken or injected into by the data fed to them.
//!
//! # Example
//!
//! ```
//! use stencil::Engine;
//!
//! let engine = Engine::new();
//!
//! let output = engine
//!     .render("<h1>{{ title }}</h1>", [("title", "Hello from Stencil!")], None)
//!     .unwrap();
//!
//! assert_eq!(output, "<h1>Hello from Stencil!</h1>");
//! ```
//!
//! Rendering is pure and synchronous: the engine performs no I/O and
//! touches no shared mutable state, so one engine can serve concurrent
//! renders without locking. Template *loading* is the only I/O-bound
//! step, and loaded templates are cached by path.
pub mod audit;
pub mod bindings;
pub mod cache;
pub mod engine;
pub mod error;
pub mod escape;
pub mod helpers;
pub mod language;
pub mod lexer;

pub use audit::Audit;
pub use bindings::{Bindings, Scope};
pub use cache::Templates;
pub use engine::{Engine, Rendered, Template};
pub use error::Error;
pub use escape::EscapeContext;
pub use helpers::HelperRegistry;
pub use lexer::{ToTemplateValue, Value};

/// Convert the first letter of the string to uppercase lettering.
pub fn capitalize(string: &str) -> String {
    let mut iter = string.chars();

    match iter.next() {
        None => String::new(),
        Some(letter) => letter.to_uppercase().chain(iter).collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }
}
