//! Parser for gcfg-style configuration text
//!
//! This is the syntax git uses for its own config files:
//! - `[section]` and `[section "subsection"]` headers
//! - `name = value` variables, or a bare `name` meaning boolean true
//! - `;` and `#` comments, on their own line or after a value
//! - double-quoted value parts with `\"`, `\\`, `\n`, `\t` and `\b` escapes
//! - a trailing backslash continues the value on the next line
//!
//! Section and variable names are case-insensitive and stored lowercased.
//! Subsection names are case-sensitive.

use super::ConfigError;

// ============================================================================
// SBIO: Pure data structures
// ============================================================================

/// A single variable assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// `None` for a bare `name` with no `=`
    pub value: Option<String>,
    pub line: usize,
}

/// A section block and the variables assigned inside it
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub subsection: Option<String>,
    pub variables: Vec<Variable>,
}

/// Parsed configuration text, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Iterate over every variable of the named section, in source order.
    pub fn variables<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a Variable> + 'a {
        let section = section.to_ascii_lowercase();
        self.sections
            .iter()
            .filter(move |s| s.name == section && s.subsection.is_none())
            .flat_map(|s| s.variables.iter())
    }
}

// ============================================================================
// SBIO: Pure functions (no I/O)
// ============================================================================

/// Parse gcfg text into a [`Document`].
pub fn parse(content: &str) -> Result<Document, ConfigError> {
    let mut doc = Document::default();
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let line = raw.trim_start_matches('\u{feff}').trim_start();

        if line.is_empty() || is_comment_start(line) {
            continue;
        }

        if line.starts_with('[') {
            doc.sections.push(parse_section_header(line, line_no)?);
            continue;
        }

        let Some(section) = doc.sections.last_mut() else {
            return Err(syntax(line_no, "variable defined outside of any section"));
        };

        let name_end = line
            .find(|c: char| !is_name_char(c))
            .unwrap_or(line.len());
        let name = &line[..name_end];
        validate_name(name, "variable", line_no)?;

        let rest = line[name_end..].trim_start();
        if rest.is_empty() || is_comment_start(rest) {
            section.variables.push(Variable {
                name: name.to_ascii_lowercase(),
                value: None,
                line: line_no,
            });
            continue;
        }

        let Some(rest) = rest.strip_prefix('=') else {
            return Err(syntax(line_no, "expected '=' after variable name"));
        };

        let mut value = ValueParser::default();
        let mut continued = value.feed(rest, line_no)?;
        while continued {
            let Some((next_idx, next)) = lines.next() else {
                return Err(syntax(line_no, "line continuation at end of input"));
            };
            continued = value.feed(next, next_idx + 1)?;
        }

        section.variables.push(Variable {
            name: name.to_ascii_lowercase(),
            value: Some(value.finish()),
            line: line_no,
        });
    }

    Ok(doc)
}

fn syntax(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::Syntax {
        line,
        message: message.into(),
    }
}

fn is_comment_start(s: &str) -> bool {
    s.starts_with(';') || s.starts_with('#')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn validate_name(name: &str, kind: &str, line: usize) -> Result<(), ConfigError> {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Ok(()),
        Some(_) => Err(syntax(line, format!("{kind} name must start with a letter"))),
        None => Err(syntax(line, format!("missing {kind} name"))),
    }
}

fn parse_section_header(line: &str, line_no: usize) -> Result<Section, ConfigError> {
    let body = line[1..].trim_start();
    let name_end = body
        .find(|c: char| !(is_name_char(c) || c == '.'))
        .unwrap_or(body.len());
    let name = &body[..name_end];
    validate_name(name, "section", line_no)?;

    let rest = body[name_end..].trim_start();
    let (subsection, rest) = match rest.strip_prefix('"') {
        Some(quoted) => {
            let (sub, after) = parse_subsection(quoted, line_no)?;
            (Some(sub), after.trim_start())
        }
        None => (None, rest),
    };

    let Some(after) = rest.strip_prefix(']') else {
        return Err(syntax(line_no, "expected ']' to close section header"));
    };
    let after = after.trim();
    if !after.is_empty() && !is_comment_start(after) {
        return Err(syntax(line_no, "unexpected text after section header"));
    }

    Ok(Section {
        name: name.to_ascii_lowercase(),
        subsection,
        variables: Vec::new(),
    })
}

/// Read a quoted subsection name; `s` starts just past the opening quote.
fn parse_subsection(s: &str, line_no: usize) -> Result<(String, &str), ConfigError> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            '"' => return Ok((out, &s[i + 1..])),
            c => out.push(c),
        }
    }
    Err(syntax(line_no, "unterminated subsection name"))
}

/// Accumulates a value across continuation lines.
///
/// Whitespace outside quotes is held back until more content follows, which
/// drops trailing whitespace while keeping interior runs intact.
#[derive(Default)]
struct ValueParser {
    out: String,
    pending_ws: String,
    in_quote: bool,
    started: bool,
}

impl ValueParser {
    /// Consume one physical line. Returns true if the value continues on the next line.
    fn feed(&mut self, text: &str, line: usize) -> Result<bool, ConfigError> {
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let Some(escaped) = chars.next() else {
                        return Ok(true);
                    };
                    let ch = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'b' => '\u{8}',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            return Err(syntax(line, format!("invalid escape sequence \\{other}")))
                        }
                    };
                    self.push(ch);
                }
                '"' => {
                    self.flush_whitespace();
                    self.in_quote = !self.in_quote;
                    self.started = true;
                }
                ';' | '#' if !self.in_quote => break,
                c if c.is_whitespace() && !self.in_quote => {
                    if self.started {
                        self.pending_ws.push(c);
                    }
                }
                c => self.push(c),
            }
        }

        if self.in_quote {
            return Err(syntax(line, "unterminated quoted value"));
        }
        Ok(false)
    }

    fn push(&mut self, c: char) {
        self.flush_whitespace();
        self.out.push(c);
        self.started = true;
    }

    fn flush_whitespace(&mut self) {
        self.out.push_str(&self.pending_ws);
        self.pending_ws.clear();
    }

    fn finish(self) -> String {
        self.out
    }
}
