//! Per-destination-syntax output encoding.
//!
//! Exactly one context is active for a whole render call. HTML is the
//! fail-safe default: it is the most conservative choice against
//! injection when the destination syntax is unknown.
use super::error::Error;

use std::path::Path;

/// The destination syntax a rendered value is being substituted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeContext {
    #[default]
    Html,
    Script,
    Shell,
    Json,
    Url,
    Raw,
}

impl std::fmt::Display for EscapeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            EscapeContext::Html => "html",
            EscapeContext::Script => "script",
            EscapeContext::Shell => "shell",
            EscapeContext::Json => "json",
            EscapeContext::Url => "url",
            EscapeContext::Raw => "raw",
        };

        write!(f, "{}", name)
    }
}

impl EscapeContext {
    /// Look up a context by name, e.g. from a helper argument or a
    /// caller-supplied option. Unknown names are a hard error, never
    /// a silent fallback.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "html" | "markup" => Ok(EscapeContext::Html),
            "script" | "js" => Ok(EscapeContext::Script),
            "shell" | "sh" => Ok(EscapeContext::Shell),
            "json" => Ok(EscapeContext::Json),
            "url" => Ok(EscapeContext::Url),
            "raw" => Ok(EscapeContext::Raw),
            name => Err(Error::UnsupportedContext(name.to_string())),
        }
    }

    /// Infer the context from a template's origin path.
    pub fn infer(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        match extension {
            "html" | "htm" | "xml" | "svg" => Some(EscapeContext::Html),
            "js" | "mjs" | "cjs" | "ts" => Some(EscapeContext::Script),
            "sh" | "bash" | "zsh" => Some(EscapeContext::Shell),
            "json" => Some(EscapeContext::Json),
            _ => None,
        }
    }

    /// Encode the value for this context.
    pub fn escape(&self, value: &str) -> String {
        match self {
            EscapeContext::Html => escape_html(value),
            EscapeContext::Script => escape_script(value),
            EscapeContext::Shell => escape_shell(value),
            EscapeContext::Json => escape_json(value),
            EscapeContext::Url => escape_url(value),
            EscapeContext::Raw => value.to_string(),
        }
    }
}

/// Replace HTML-significant characters with entities.
fn escape_html(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            '/' => result.push_str("&#x2F;"),
            '`' => result.push_str("&#x60;"),
            '=' => result.push_str("&#x3D;"),
            c => result.push(c),
        }
    }

    result
}

/// Backslash-escape the value for a script string literal.
///
/// U+2028 and U+2029 terminate statements in script interpreters even
/// inside string literals, so they are encoded as well.
fn escape_script(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\'' => result.push_str("\\'"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            '\u{b}' => result.push_str("\\v"),
            '\0' => result.push_str("\\0"),
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            c => result.push(c),
        }
    }

    result
}

/// Quote the value as a single POSIX shell token.
///
/// The value is wrapped in single quotes; an embedded single quote
/// closes the quoted region, emits an escaped quote, and reopens it
/// (`'\''`). That is the only encoding safe for arbitrary content.
fn escape_shell(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);

    result.push('\'');
    for c in value.chars() {
        if c == '\'' {
            result.push_str("'\\''");
        } else {
            result.push(c);
        }
    }
    result.push('\'');

    result
}

/// JSON string encoding with the outer quote pair stripped,
/// since the substitution site supplies its own quotes.
fn escape_json(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Percent-encode the value as a URL component.
/// Unreserved characters (RFC 3986) pass through unchanged.
fn escape_url(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            byte => result.push_str(&format!("%{:02X}", byte)),
        }
    }

    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_html() {
        assert_eq!(
            EscapeContext::Html.escape("<a href=\"/x\" id='y'>&</a>"),
            "&lt;a href&#x3D;&quot;&#x2F;x&quot; id&#x3D;&#x27;y&#x27;&gt;&amp;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn test_script() {
        assert_eq!(
            EscapeContext::Script.escape("line\nwith \"quotes\" and \\slash"),
            "line\\nwith \\\"quotes\\\" and \\\\slash"
        );
        assert_eq!(
            EscapeContext::Script.escape("sep\u{2028}ara\u{2029}tor"),
            "sep\\u2028ara\\u2029tor"
        );
    }

    #[test]
    fn test_shell() {
        assert_eq!(EscapeContext::Shell.escape("; rm -rf /"), "'; rm -rf /'");
        assert_eq!(EscapeContext::Shell.escape("it's"), "'it'\\''s'");
        assert_eq!(EscapeContext::Shell.escape(""), "''");
        assert_eq!(
            EscapeContext::Shell.escape("$(whoami) `id` \"x\""),
            "'$(whoami) `id` \"x\"'"
        );
    }

    #[test]
    fn test_json() {
        assert_eq!(
            EscapeContext::Json.escape("tab\there \"quoted\""),
            "tab\\there \\\"quoted\\\""
        );
        // The outer quotes the encoder adds are stripped.
        assert!(!EscapeContext::Json.escape("plain").starts_with('"'));
    }

    #[test]
    fn test_url() {
        assert_eq!(
            EscapeContext::Url.escape("hello world/?=&"),
            "hello%20world%2F%3F%3D%26"
        );
        assert_eq!(EscapeContext::Url.escape("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(EscapeContext::Url.escape("\u{fc}"), "%C3%BC");
    }

    #[test]
    fn test_raw() {
        assert_eq!(EscapeContext::Raw.escape("<b>&</b>"), "<b>&</b>");
    }

    #[test]
    fn test_infer() {
        assert_eq!(
            EscapeContext::infer(Path::new("index.html")),
            Some(EscapeContext::Html)
        );
        assert_eq!(
            EscapeContext::infer(Path::new("deploy.sh")),
            Some(EscapeContext::Shell)
        );
        assert_eq!(
            EscapeContext::infer(Path::new("config.json")),
            Some(EscapeContext::Json)
        );
        assert_eq!(
            EscapeContext::infer(Path::new("app.js")),
            Some(EscapeContext::Script)
        );
        assert_eq!(EscapeContext::infer(Path::new("Makefile")), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            EscapeContext::from_name("markup").expect("markup"),
            EscapeContext::Html
        );

        let err = EscapeContext::from_name("yaml").err().expect("unsupported");
        assert!(matches!(err, Error::UnsupportedContext(name) if name == "yaml"));
    }
}
