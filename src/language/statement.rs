//! Template statements: the nodes of the parsed template tree.
//!
//! Parsing is structural: a block's matching closer is found by
//! recursing into its body, not by scanning for a pattern, so nested
//! blocks of the same kind always pair up correctly.
use super::{
    super::error::Error,
    super::lexer::{Token, TokenWithContext, Value},
    Expression, RenderState,
};
use crate::bindings::Scope;

use std::iter::{Iterator, Peekable};

/// A single template statement, e.g. a conditional block
/// or a `{{ variable }}` substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    // Literal text between blocks, emitted as-is.
    Text(String),

    // `{{ expression }}` or `{{{ expression }}}`.
    // Escaped with the active context unless `raw` is set.
    Print {
        expression: Expression,
        raw: bool,
    },

    // `{{#if condition}} ... {{else}} ... {{/if}}`.
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Vec<Statement>,
    },

    // `{{#each source}} ... {{/each}}`.
    Each {
        source: Expression,
        body: Vec<Statement>,
    },
}

/// Result of parsing one construct: either a statement,
/// or a block closer the enclosing block must match up.
enum Parsed {
    Statement(Statement),
    Else(TokenWithContext),
    EndIf(TokenWithContext),
    EndEach(TokenWithContext),
}

impl Statement {
    /// Parse one top-level statement. A block closer with no matching
    /// opener is a syntax error here.
    pub fn parse(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Self, Error> {
        match Self::parse_one(iter)? {
            Parsed::Statement(statement) => Ok(statement),
            Parsed::Else(token) | Parsed::EndIf(token) | Parsed::EndEach(token) => {
                Err(Error::Syntax(token))
            }
        }
    }

    fn parse_one(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
    ) -> Result<Parsed, Error> {
        let next = iter.next().ok_or(Error::Eof("statement"))?;

        match next.token() {
            Token::Text(text) => Ok(Parsed::Statement(Statement::Text(text))),

            Token::BlockStart | Token::BlockStartRaw => {
                let raw = next.token() == Token::BlockStartRaw;
                let keyword = iter.peek().ok_or(Error::Eof("code block"))?.clone();

                match keyword.token() {
                    // Directives use the plain delimiter only.
                    Token::If | Token::Each | Token::Else | Token::EndIf | Token::EndEach
                        if raw =>
                    {
                        Err(Error::Syntax(keyword))
                    }

                    Token::If => {
                        let _ = iter.next().ok_or(Error::Eof("if statement"))?;
                        let condition = Expression::parse(iter)?;
                        Self::block_end(iter, false)?;

                        let mut then_body = vec![];
                        let mut else_body = vec![];
                        let mut in_else = false;

                        loop {
                            match Self::parse_one(iter)? {
                                Parsed::Statement(statement) => {
                                    if in_else {
                                        else_body.push(statement);
                                    } else {
                                        then_body.push(statement);
                                    }
                                }

                                Parsed::Else(token) => {
                                    if in_else {
                                        return Err(Error::Syntax(token));
                                    }
                                    in_else = true;
                                }

                                Parsed::EndIf(_) => break,
                                Parsed::EndEach(token) => return Err(Error::Syntax(token)),
                            }
                        }

                        Ok(Parsed::Statement(Statement::If {
                            condition,
                            then_body,
                            else_body,
                        }))
                    }

                    Token::Each => {
                        let _ = iter.next().ok_or(Error::Eof("each statement"))?;
                        let source = Expression::parse(iter)?;
                        Self::block_end(iter, false)?;

                        let mut body = vec![];

                        loop {
                            match Self::parse_one(iter)? {
                                Parsed::Statement(statement) => body.push(statement),
                                Parsed::EndEach(_) => break,
                                Parsed::Else(token) | Parsed::EndIf(token) => {
                                    return Err(Error::Syntax(token))
                                }
                            }
                        }

                        Ok(Parsed::Statement(Statement::Each { source, body }))
                    }

                    Token::Else => {
                        let _ = iter.next().ok_or(Error::Eof("else"))?;
                        Self::block_end(iter, false)?;
                        Ok(Parsed::Else(keyword))
                    }

                    Token::EndIf => {
                        let _ = iter.next().ok_or(Error::Eof("end if"))?;
                        Self::block_end(iter, false)?;
                        Ok(Parsed::EndIf(keyword))
                    }

                    Token::EndEach => {
                        let _ = iter.next().ok_or(Error::Eof("end each"))?;
                        Self::block_end(iter, false)?;
                        Ok(Parsed::EndEach(keyword))
                    }

                    _ => {
                        let expression = Expression::parse(iter)?;
                        Self::block_end(iter, raw)?;
                        Ok(Parsed::Statement(Statement::Print { expression, raw }))
                    }
                }
            }

            _ => Err(Error::Syntax(next)),
        }
    }

    /// Consume the closing delimiter, which must match the opener.
    fn block_end(
        iter: &mut Peekable<impl Iterator<Item = TokenWithContext>>,
        raw: bool,
    ) -> Result<(), Error> {
        let next = iter.next().ok_or(Error::Eof("code block"))?;
        let expected = if raw {
            Token::BlockEndRaw
        } else {
            Token::BlockEnd
        };

        if next.token() == expected {
            Ok(())
        } else {
            Err(Error::WrongToken(next, expected))
        }
    }

    /// Evaluate the statement to its output text.
    pub fn evaluate(&self, scope: &Scope, state: &mut RenderState) -> Result<String, Error> {
        match self {
            Statement::Text(text) => Ok(text.clone()),

            Statement::Print { expression, raw } => {
                let value = expression.evaluate(scope, state)?;
                let text = value.to_text();

                if *raw {
                    Ok(text)
                } else {
                    Ok(state.context().escape(&text))
                }
            }

            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                let branch = if condition.evaluate(scope, state)?.truthy() {
                    then_body
                } else {
                    else_body
                };

                let mut result = String::new();
                for statement in branch {
                    result.push_str(&statement.evaluate(scope, state)?);
                }

                Ok(result)
            }

            Statement::Each { source, body } => {
                // An empty or non-list source renders nothing. Not an error:
                // an optional list simply being absent shouldn't fail a render.
                let items = match source.evaluate(scope, state)? {
                    Value::List(items) => items,
                    _ => return Ok(String::new()),
                };

                let len = items.len();
                let mut result = String::new();

                for (index, item) in items.into_iter().enumerate() {
                    let child = scope.child(item, index, len);

                    for statement in body {
                        result.push_str(&statement.evaluate(&child, state)?);
                    }
                }

                Ok(result)
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

    fn render(source: &str, bindings: &Bindings) -> Result<String, Error> {
        let tokens = source.tokenize()?;
        let mut iter = tokens.into_iter().peekable();

        let helpers = HelperRegistry::defaults();
        let mut state = RenderState::new(&helpers, EscapeContext::Html);
        let scope = Scope::root(bindings);

        let mut result = String::new();
        while iter.peek().is_some() {
            result.push_str(&Statement::parse(&mut iter)?.evaluate(&scope, &mut state)?);
        }

        Ok(result)
    }

    #[test]
    fn test_if_else() -> Result<(), Error> {
        let bindings = Bindings::try_from([("type", "api")])?;

        let source = r#"{{#if equals type 'api'}}A{{else}}B{{/if}}"#;
        assert_eq!(render(source, &bindings)?, "A");

        let bindings = Bindings::try_from([("type", "site")])?;
        assert_eq!(render(source, &bindings)?, "B");

        Ok(())
    }

    #[test]
    fn test_nested_if_same_kind() -> Result<(), Error> {
        // The inner `{{/if}}` must close the inner block, not the outer one.
        let source = "{{#if a}}x{{#if b}}y{{/if}}z{{else}}w{{/if}}";

        let bindings = Bindings::try_from([("a", true), ("b", true)])?;
        assert_eq!(render(source, &bindings)?, "xyz");

        let bindings = Bindings::try_from([("a", true), ("b", false)])?;
        assert_eq!(render(source, &bindings)?, "xz");

        let bindings = Bindings::try_from([("a", false), ("b", true)])?;
        assert_eq!(render(source, &bindings)?, "w");

        Ok(())
    }

    #[test]
    fn test_if_inside_each() -> Result<(), Error> {
        let source = "{{#each items}}{{#if @first}}[{{/if}}{{this}}{{#if @last}}]{{/if}}{{/each}}";
        let bindings = Bindings::try_from([("items", vec!["a", "b", "c"])])?;

        assert_eq!(render(source, &bindings)?, "[abc]");

        Ok(())
    }

    #[test]
    fn test_each_index_and_flags() -> Result<(), Error> {
        let source = "{{#each items}}{{@index}}:{{this}} {{/each}}";

        let bindings = Bindings::try_from([("items", vec!["a", "b"])])?;
        assert_eq!(render(source, &bindings)?, "0:a 1:b ");

        let bindings = Bindings::try_from([("items", Vec::<&str>::new())])?;
        assert_eq!(render(source, &bindings)?, "");

        let bindings = Bindings::try_from([("items", vec!["only"])])?;
        assert_eq!(render(source, &bindings)?, "0:only ");

        Ok(())
    }

    #[test]
    fn test_each_non_list_is_empty() -> Result<(), Error> {
        let source = "{{#each items}}x{{/each}}";
        let bindings = Bindings::try_from([("items", "not a list")])?;

        assert_eq!(render(source, &bindings)?, "");

        Ok(())
    }

    #[test]
    fn test_unterminated_if() {
        let bindings = Bindings::new();
        let err = render("{{#if a}}unclosed", &bindings)
            .err()
            .expect("parse error");

        assert!(matches!(err, Error::Eof(_)));
    }

    #[test]
    fn test_mismatched_closer() {
        let bindings = Bindings::new();
        let err = render("{{#if a}}x{{/each}}", &bindings)
            .err()
            .expect("parse error");

        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn test_stray_closer() {
        let bindings = Bindings::new();
        let err = render("text{{/if}}", &bindings).err().expect("parse error");

        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn test_double_else() {
        let bindings = Bindings::new();
        let err = render("{{#if a}}x{{else}}y{{else}}z{{/if}}", &bindings)
            .err()
            .expect("parse error");

        assert!(matches!(err, Error::Syntax(_)));
    }
}
