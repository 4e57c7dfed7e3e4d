//! Lenient parsing of user-edited JSON: comments are tolerated, empty
//! input means "empty object", and failures come back as plain error
//! strings with line positions rather than panics.

use serde_json::Value;

/// Outcome of a lenient parse. Exactly one of `result` / non-empty
/// `errors` is meaningful; empty input deliberately parses to `Some({})`.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ParseOutcome {
    pub result: Option<Value>,
    pub errors: Vec<String>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn ok(value: Value) -> Self {
        Self {
            result: Some(value),
            errors: Vec::new(),
        }
    }

    fn err(message: String) -> Self {
        Self {
            result: None,
            errors: vec![message],
        }
    }
}

/// Parse JSON-with-comments text. Empty input is treated as an empty
/// object; whitespace-only input is a parse error.
pub fn parse(text: &str) -> ParseOutcome {
    if text.is_empty() {
        return ParseOutcome::ok(Value::Object(serde_json::Map::new()));
    }
    let stripped = strip_comments(text);
    match serde_json::from_str(&stripped) {
        Ok(value) => ParseOutcome::ok(value),
        Err(e) => ParseOutcome::err(format_parse_error(&e)),
    }
}

/// `None` behaves like empty input.
pub fn parse_opt(text: Option<&str>) -> ParseOutcome {
    parse(text.unwrap_or(""))
}

fn format_parse_error(e: &serde_json::Error) -> String {
    let message = e.to_string();
    if e.line() > 0 && !message.contains("at line") {
        format!("{message} at line {}", e.line())
    } else {
        message
    }
}

/// Overwrite `//` and `/* */` comments with spaces, preserving newlines,
/// so positions reported against the stripped text still point into the
/// original. Comment markers inside string literals are data, not
/// comments.
pub fn strip_comments(text: &str) -> String {
    enum State {
        Code,
        Str,
        StrEscape,
        Line,
        Block,
    }

    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '"' => {
                    state = State::Str;
                    out.push(c);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block;
                }
                _ => out.push(c),
            },
            State::Str => match c {
                '\\' => {
                    state = State::StrEscape;
                    out.push(c);
                }
                '"' => {
                    state = State::Code;
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::StrEscape => {
                state = State::Str;
                out.push(c);
            }
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
    }

    out
}

const REDACTION_LEAD_IN: &str = "Invalid specification";

/// Strip a specification echoed back inside an error message, keeping
/// the enclosing braces: `Invalid specification {"marks": [...]} (x)`
/// becomes `Invalid specification {} (x)`. Messages without the lead-in
/// phrase pass through untouched.
pub fn redact_spec_echo(message: &str) -> String {
    let Some(phrase_at) = message.find(REDACTION_LEAD_IN) else {
        return message.to_string();
    };
    let after_phrase = phrase_at + REDACTION_LEAD_IN.len();
    let Some(open_rel) = message[after_phrase..].find('{') else {
        return message.to_string();
    };
    let open = after_phrase + open_rel;
    let Some(close) = message.rfind('}') else {
        return message.to_string();
    };
    if close <= open {
        return message.to_string();
    }

    let mut out = String::with_capacity(message.len());
    out.push_str(&message[..=open]);
    out.push_str(&message[close..]);
    out
}
