//! Expression term, a single entity in an expression.
use super::super::bindings::Scope;
use super::super::error::Error;
use super::super::lexer::{Token, Value};

/// Expression term: a constant literal or a dot-path variable reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Constant(Value),
    Variable(String),
}

impl Term {
    /// Convert a token into a term. If the token isn't a term, return `None`.
    pub fn from_token(token: Token) -> Option<Self> {
        Option::<Self>::from(token)
    }

    /// Create a constant term from a value. Constant terms evaluate to the value.
    pub fn constant(value: Value) -> Self {
        Term::Constant(value)
    }

    /// Create a variable term. The term requires a scope to be evaluated.
    pub fn variable(name: String) -> Self {
        Term::Variable(name)
    }

    /// Evaluate the term against the scope chain. A variable that isn't
    /// in scope resolves to the undefined marker (`None`), never an error;
    /// the caller decides how to treat it.
    pub fn evaluate(&self, scope: &Scope) -> Option<Value> {
        match self {
            Term::Constant(value) => Some(value.clone()),
            Term::Variable(path) => scope.resolve(path),
        }
    }

    /// The term name, i.e. what it's called in the template.
    /// Constant terms don't have names.
    pub fn name(&self) -> &str {
        match self {
            Term::Variable(name) => name,
            Term::Constant(_) => "",
        }
    }
}

impl From<Token> for Option<Term> {
    fn from(token: Token) -> Option<Term> {
        Some(match token {
            Token::Variable(name) => Term::Variable(name),
            Token::Value(value) => Term::Constant(value),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bindings::Bindings;
    use crate::lexer::Lexer;

    #[test]
    fn test_terms() -> Result<(), Error> {
        let bindings = Bindings::try_from([("variable", "test")])?;
        let scope = Scope::root(&bindings);

        let tokens = Lexer::new("{{ 1 }}").tokens()?;
        let integer = Term::from_token(tokens[1].token());
        assert_eq!(
            integer.expect("integer").evaluate(&scope),
            Some(Value::Integer(1))
        );

        let tokens = Lexer::new(r#"{{ "string" }}"#).tokens()?;
        let string = Term::from_token(tokens[1].token());
        assert_eq!(
            string.expect("string").evaluate(&scope),
            Some(Value::String("string".into()))
        );

        let tokens = Lexer::new("{{ variable }}").tokens()?;
        let variable = Term::from_token(tokens[1].token());
        assert_eq!(
            variable.expect("variable").evaluate(&scope),
            Some(Value::String("test".into()))
        );

        let tokens = Lexer::new("{{ missing }}").tokens()?;
        let missing = Term::from_token(tokens[1].token());
        assert_eq!(missing.expect("missing").evaluate(&scope), None);

        Ok(())
    }
}
