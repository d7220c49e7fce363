use super::lexer::{Token, TokenWithContext};
use thiserror::Error;

use std::path::{Path, PathBuf};

#[derive(Error, Debug)]
pub enum Error {
    #[error("syntax error")]
    Syntax(TokenWithContext),

    #[error("expected token \"{1}\", but have token \"{0}\" instead")]
    WrongToken(TokenWithContext, Token),

    #[error("reached end of template while parsing \"{0}\", did you forget a closing tag?")]
    Eof(&'static str),

    #[error("variable \"{0}\" is not defined or in scope")]
    UndefinedVariable(String),

    #[error("helper \"{0}\" is not registered")]
    UnknownHelper(String),

    #[error("helper \"{0}\": {1}")]
    HelperContract(String, String),

    #[error("escape context \"{0}\" is not supported")]
    UnsupportedContext(String),

    #[error("template \"{0}\" does not exist")]
    TemplateDoesNotExist(PathBuf),

    #[error("bindings error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Pretty(String),
}

impl Error {
    /// Point at the token which caused the error,
    /// showing the template line and a caret underneath.
    pub fn pretty(self, source: &str, path: Option<impl AsRef<Path> + Copy>) -> Self {
        let token = match self {
            Error::Syntax(ref token) => token,
            Error::WrongToken(ref token, _) => token,
            _ => {
                if let Some(path) = path {
                    let prefix = "---> ";
                    return Error::Pretty(format!(
                        "{}{}\n\n{}{}",
                        prefix,
                        path.as_ref().display(),
                        " ".repeat(prefix.len()),
                        self
                    ));
                } else {
                    return self;
                }
            }
        };

        let error_msg = match self {
            Error::Syntax(ref _token) => "syntax error",
            Error::WrongToken(ref _token, _) => "unexpected token",
            _ => "",
        };

        let context = source.lines().nth(std::cmp::max(1, token.line()) - 1);
        let leading_spaces = if let Some(context) = context {
            context.len() - context.trim().len()
        } else {
            0
        };

        let offset = std::cmp::max(
            0,
            token.column() as i64 - token.token().len() as i64 + 1 - leading_spaces as i64,
        ) as usize;
        let underline = format!("{}^ {}", " ".repeat(offset), error_msg);

        let line_number = format!("{} | ", token.line());
        let underline_offset = " ".repeat(token.line().to_string().len()) + " | ";

        let path = if let Some(path) = path {
            format!(
                "---> {}:{}:{}\n\n",
                path.as_ref().display(),
                token.line(),
                token.column()
            )
        } else {
            "".to_string()
        };

        if let Some(context) = context {
            Error::Pretty(format!(
                "{}{}\n{}{}\n{}{}",
                path,
                underline_offset,
                line_number,
                context.trim(),
                underline_offset,
                underline
            ))
        } else {
            self
        }
    }

    pub fn pretty_from_path(self, path: impl AsRef<Path> + Copy) -> Self {
        let src = match std::fs::read_to_string(path.as_ref()) {
            Ok(src) => src,
            Err(_) => return self,
        };

        self.pretty(&src, Some(path))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_underline() {
        let token = TokenWithContext::new(Token::If, 1, 9);
        let error = Error::Syntax(token);
        let pretty = error.pretty("{{#if apples}}\n    {{#if oranges}}\n", None::<&str>);

        assert_eq!(
            pretty.to_string(),
            "  | \n1 | {{#if apples}}\n  |        ^ syntax error"
        );
    }
}
