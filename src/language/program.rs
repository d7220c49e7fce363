//! Executable template.
//!
//! A program is a list of statements.
use super::super::bindings::Scope;
use super::super::error::Error;
use super::super::lexer::{TokenWithContext, Tokenize};
use super::{RenderState, Statement};

/// Executable program.
#[derive(Debug, Clone)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// Evaluate the program against the scope chain.
    pub fn evaluate(&self, scope: &Scope, state: &mut RenderState) -> Result<String, Error> {
        let mut result = String::new();
        for statement in &self.statements {
            result.push_str(&statement.evaluate(scope, state)?);
        }

        Ok(result)
    }

    /// Parse the program from a list of tokens.
    pub fn parse(tokens: Vec<TokenWithContext>) -> Result<Self, Error> {
        let mut iter = tokens.into_iter().peekable();
        let mut statements = vec![];

        while iter.peek().is_some() {
            let statement = Statement::parse(&mut iter)?;
            statements.push(statement);
        }

        Ok(Program { statements })
    }

    /// Compile the program from source.
    pub fn from_str(source: &str) -> Result<Self, Error> {
        let tokens = source.tokenize()?;
        Program::parse(tokens)
    }

    pub(crate) fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bindings::Bindings;
    use crate::escape::EscapeContext;
    use crate::helpers::HelperRegistry;

    fn evaluate(source: &str, bindings: &Bindings) -> Result<String, Error> {
        let program = Program::from_str(source)?;
        let helpers = HelperRegistry::defaults();
        let mut state = RenderState::new(&helpers, EscapeContext::Html);

        program.evaluate(&Scope::root(bindings), &mut state)
    }

    #[test]
    fn test_basic_program() -> Result<(), Error> {
        let bindings = Bindings::try_from([("ready", false)])?;
        let output = evaluate(
            "<html><body>{{#if ready}}world is great{{else}}not so much{{/if}}</body></html>",
            &bindings,
        )?;

        assert_eq!("<html><body>not so much</body></html>", output);

        Ok(())
    }

    #[test]
    fn test_print_escapes() -> Result<(), Error> {
        let bindings = Bindings::try_from([("title", "<b>hi</b>")])?;

        let output = evaluate("<title>{{ title }}</title>", &bindings)?;
        assert_eq!(output, "<title>&lt;b&gt;hi&lt;&#x2F;b&gt;</title>");

        let output = evaluate("{{{ title }}}", &bindings)?;
        assert_eq!(output, "<b>hi</b>");

        Ok(())
    }

    #[test]
    fn test_determinism() -> Result<(), Error> {
        let bindings = Bindings::try_from([("items", vec!["x", "y", "z"])])?;
        let source = "{{#each items}}{{@index}}={{this}};{{/each}}";

        let first = evaluate(source, &bindings)?;
        let second = evaluate(source, &bindings)?;

        assert_eq!(first, second);
        assert_eq!(first, "0=x;1=y;2=z;");

        Ok(())
    }
}
