use super::Value;

/// A template language token, e.g. `{{#if` or `{{/each`.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // e.g. `<html><body></body></html>`
    Text(String),
    // e.g. `{{ logged_in }}` or `{{ user.name }}`
    Variable(String),
    // e.g. `{{ "hello world" }}` or `{{ 5 }}`
    Value(Value),
    // `{{#if`
    If,
    // `{{else}}`
    Else,
    // `{{/if}}`
    EndIf,
    // `{{#each`
    Each,
    // `{{/each}}`
    EndEach,
    // `!`
    Not,
    // `{{`
    BlockStart,
    // `{{{`
    BlockStartRaw,
    // `}}`
    BlockEnd,
    // `}}}`
    BlockEndRaw,
}

impl Token {
    /// Length of the token in the template source,
    /// used to underline it in error messages.
    pub fn len(&self) -> usize {
        match self {
            Token::If => 3,
            Token::Each => 5,
            Token::Else => 4,
            Token::EndIf => 3,
            Token::EndEach => 5,
            Token::Not => 1,
            Token::BlockStart | Token::BlockEnd => 2,
            Token::BlockStartRaw | Token::BlockEndRaw => 3,
            Token::Variable(name) => name.len(),
            Token::Text(text) => text.len(),
            Token::Value(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Text(text) => write!(f, "{}", text),
            Token::Variable(name) => write!(f, "{}", name),
            Token::Value(value) => write!(f, "{}", value),
            Token::If => write!(f, "#if"),
            Token::Else => write!(f, "else"),
            Token::EndIf => write!(f, "/if"),
            Token::Each => write!(f, "#each"),
            Token::EndEach => write!(f, "/each"),
            Token::Not => write!(f, "!"),
            Token::BlockStart => write!(f, "{{{{"),
            Token::BlockStartRaw => write!(f, "{{{{{{"),
            Token::BlockEnd => write!(f, "}}}}"),
            Token::BlockEndRaw => write!(f, "}}}}}}"),
        }
    }
}

/// A token together with its position in the template source.
#[derive(Debug, PartialEq, Clone)]
pub struct TokenWithContext {
    token: Token,
    line: usize,
    column: usize,
}

impl TokenWithContext {
    pub fn new(token: Token, line: usize, column: usize) -> Self {
        Self {
            token,
            line,
            column,
        }
    }

    pub fn token(&self) -> Token {
        self.token.clone()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }
}

impl std::fmt::Display for TokenWithContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({}:{})", self.token, self.line, self.column)
    }
}
