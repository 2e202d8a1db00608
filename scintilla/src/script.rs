//! Line-oriented event scripts for the simulator.
//!
//! ```text
//! # comments and blank lines are ignored
//! focus Scintilla          focus an editor whose window has this class
//! compose 1 hello          show composition 1 with this text (and focus it);
//!                          everything after the single space following the id
//!                          is the text, surrounding spaces included
//! key leftArrow            press a key by name...
//! key 0x27                 ...or by virtual-key code (hex or decimal)
//! wait 200                 let 200 ms of virtual time pass
//! commit                   end the composition, focus returns to the editor
//! blur                     nothing focused
//! ```

use thiserror::Error;

use caretfix_core::KeyGesture;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Focus(String),
    Blur,
    /// Text may be empty: the composition object stays but shows nothing
    Compose { id: u64, text: String },
    Commit,
    Key(KeyGesture),
    Wait(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown directive `{word}`")]
    UnknownDirective { line: usize, word: String },

    #[error("line {line}: `{directive}` needs {expected}")]
    MissingArgument {
        line: usize,
        directive: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: `{value}` is not a valid number")]
    InvalidNumber { line: usize, value: String },
}

/// A directive together with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub directive: Directive,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(directive) = parse_line(raw, line)? {
            lines.push(ScriptLine { line, directive });
        }
    }
    Ok(lines)
}

/// Parse one line; `Ok(None)` for blanks and comments.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<Directive>, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    // Composition text is taken verbatim, so keep the untrimmed tail around
    let (word, raw_rest) = match raw.trim_start().split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (trimmed, ""),
    };
    let rest = raw_rest.trim();

    let directive = match word {
        "focus" => {
            if rest.is_empty() {
                return Err(ScriptError::MissingArgument {
                    line,
                    directive: "focus",
                    expected: "a window class",
                });
            }
            Directive::Focus(rest.to_string())
        }
        "blur" => Directive::Blur,
        "commit" => Directive::Commit,
        "compose" => {
            let (id, text) = match raw_rest.trim_start().split_once(char::is_whitespace) {
                Some((id, text)) => (id, text),
                None => (rest, ""),
            };
            if id.is_empty() {
                return Err(ScriptError::MissingArgument {
                    line,
                    directive: "compose",
                    expected: "a composition id",
                });
            }
            Directive::Compose {
                id: parse_number(id, line)?,
                text: text.to_string(),
            }
        }
        "key" => {
            if rest.is_empty() {
                return Err(ScriptError::MissingArgument {
                    line,
                    directive: "key",
                    expected: "a key name or code",
                });
            }
            Directive::Key(parse_key(rest, line)?)
        }
        "wait" => {
            if rest.is_empty() {
                return Err(ScriptError::MissingArgument {
                    line,
                    directive: "wait",
                    expected: "a duration in milliseconds",
                });
            }
            Directive::Wait(parse_number(rest, line)?)
        }
        other => {
            return Err(ScriptError::UnknownDirective {
                line,
                word: other.to_string(),
            });
        }
    };
    Ok(Some(directive))
}

fn parse_key(value: &str, line: usize) -> Result<KeyGesture, ScriptError> {
    if value.starts_with("0x") || value.chars().all(|c| c.is_ascii_digit()) {
        let code = parse_number(value, line)?;
        let code = u32::try_from(code).map_err(|_| ScriptError::InvalidNumber {
            line,
            value: value.to_string(),
        })?;
        Ok(KeyGesture::from_vk(code))
    } else {
        Ok(KeyGesture::named(value))
    }
}

fn parse_number(value: &str, line: usize) -> Result<u64, ScriptError> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}
