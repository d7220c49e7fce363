//! Substitution and condition expressions.
//!
//! An expression is what sits between `{{` and `}}`: a single path or
//! literal, a helper call with space-separated arguments, or either of
//! those behind a leading negation marker.
use super::{
    super::bindings::Scope,
    super::error::Error,
    super::lexer::{Token, TokenWithContext, Value},
    RenderState, Term,
};

use std::iter::{Iterator, Peekable};

/// An expression, like `user.name` or `equals type "api"`,
/// which when evaluated produces a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Base case: a literal or a variable path, e.g. `5` or `user.name`.
    Term {
        term: Term,
    },

    // A helper call with already-parsed argument terms, e.g.
    // `equals type "api"` or `join items ", "`.
    Helper {
        name: String,
        args: Vec<Expression>,
    },

    // Negation of a nested expression, e.g. `!logged_in`.
    Not {
        operand: Box<Expression>,
    },
}

impl Expression {
    /// Create new constant expression (term).
    pub fn constant(value: Value) -> Self {
        Self::Term {
            term: Term::constant(value),
        }
    }

    /// Create new variable expression (term).
    pub fn variable(variable: String) -> Self {
        Self::Term {
            term: Term::variable(variable),
        }
    }

    /// Evaluate the expression to a value given the scope chain.
    ///
    /// An unresolved variable is not an error: it evaluates to `Null`
    /// and is recorded on the render state. Helper failures are fatal.
    pub fn evaluate(&self, scope: &Scope, state: &mut RenderState) -> Result<Value, Error> {
        match self {
            Expression::Term { term } => match term.evaluate(scope) {
                Some(value) => Ok(value),
                None => {
                    state.missing(term.name());
                    Ok(Value::Null)
                }
            },

            Expression::Not { operand } => {
                let value = operand.evaluate(scope, state)?;
                Ok(Value::Boolean(!value.truthy()))
            }

            Expression::Helper { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(scope, state)?);
                }

                state.helpers().invoke(name, &values)
            }
        }
    }

    /// Parse the expression from the token stream, stopping at the
    /// closing block delimiter (which is left for the caller to consume).
    ///
    /// One term is a path or a literal; two or more terms are a helper
    /// call, with the first term naming the helper.
    pub fn parse(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Self, Error> {
        let next = iter.peek().ok_or(Error::Eof("expression"))?;

        if next.token() == Token::Not {
            let _ = iter.next().ok_or(Error::Eof("expression"))?;
            let operand = Self::parse(iter)?;

            return Ok(Expression::Not {
                operand: Box::new(operand),
            });
        }

        let first = iter.next().ok_or(Error::Eof("expression"))?;
        let first_term = match Term::from_token(first.token()) {
            Some(term) => term,
            None => return Err(Error::Syntax(first)),
        };

        let mut args = vec![];

        while let Some(peeked) = iter.peek() {
            match peeked.token() {
                Token::BlockEnd | Token::BlockEndRaw => break,

                Token::Variable(_) | Token::Value(_) => {
                    let next = iter.next().ok_or(Error::Eof("expression"))?;
                    match Term::from_token(next.token()) {
                        Some(term) => args.push(Expression::Term { term }),
                        None => return Err(Error::Syntax(next)),
                    }
                }

                _ => return Err(Error::Syntax(peeked.clone())),
            }
        }

        if args.is_empty() {
            Ok(Expression::Term { term: first_term })
        } else {
            // Space-separated terms make this a helper call; the first
            // term must be a name, not a literal.
            match first_term {
                Term::Variable(name) => Ok(Expression::Helper { name, args }),
                Term::Constant(_) => Err(Error::Syntax(first)),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bindings::Bindings;
    use crate::escape::EscapeContext;
    use crate::helpers::HelperRegistry;
    use crate::lexer::Tokenize;

    fn parse(source: &str) -> Result<Expression, Error> {
        let tokens = source.tokenize()?[1..].to_vec(); // Skip block start.
        Expression::parse(&mut tokens.into_iter().peekable())
    }

    fn evaluate(source: &str, bindings: &Bindings) -> Result<Value, Error> {
        let helpers = HelperRegistry::defaults();
        let mut state = RenderState::new(&helpers, EscapeContext::Html);
        let scope = Scope::root(bindings);

        parse(source)?.evaluate(&scope, &mut state)
    }

    #[test]
    fn test_single_term() -> Result<(), Error> {
        let bindings = Bindings::try_from([("name", "World")])?;

        assert_eq!(
            evaluate("{{ name }}", &bindings)?,
            Value::String("World".into())
        );
        assert_eq!(evaluate("{{ 5 }}", &bindings)?, Value::Integer(5));
        assert_eq!(
            evaluate(r#"{{ "literal" }}"#, &bindings)?,
            Value::String("literal".into())
        );

        Ok(())
    }

    #[test]
    fn test_helper_call() -> Result<(), Error> {
        let bindings = Bindings::try_from([("type", "api")])?;

        assert_eq!(
            evaluate(r#"{{ equals type "api" }}"#, &bindings)?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate(r#"{{ equals type "site" }}"#, &bindings)?,
            Value::Boolean(false)
        );

        Ok(())
    }

    #[test]
    fn test_negation() -> Result<(), Error> {
        let bindings = Bindings::try_from([("enabled", false)])?;

        assert_eq!(
            evaluate("{{ !enabled }}", &bindings)?,
            Value::Boolean(true)
        );
        assert_eq!(
            evaluate(r#"{{ !equals enabled true }}"#, &bindings)?,
            Value::Boolean(true)
        );

        Ok(())
    }

    #[test]
    fn test_unknown_helper() -> Result<(), Error> {
        let bindings = Bindings::new();
        let err = evaluate("{{ frobnicate a b }}", &bindings)
            .err()
            .expect("unknown helper");

        assert!(matches!(err, Error::UnknownHelper(name) if name == "frobnicate"));

        Ok(())
    }

    #[test]
    fn test_literal_is_not_a_helper_name() -> Result<(), Error> {
        let err = parse(r#"{{ "name" other }}"#).err().expect("syntax error");
        assert!(matches!(err, Error::Syntax(_)));

        Ok(())
    }

    #[test]
    fn test_undefined_variable_is_null() -> Result<(), Error> {
        let bindings = Bindings::new();
        assert_eq!(evaluate("{{ missing }}", &bindings)?, Value::Null);

        Ok(())
    }
}
