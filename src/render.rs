//! Nested payload to indented text.
//!
//! Rendering walks a [`Value`] tree and produces [`Line`]s. Fields holding an
//! absent value or an empty string never produce a line. Nested mappings
//! appear as a bare label followed by their children, indented two more
//! spaces than the label.

use std::fmt;
use std::io;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::value::{Map, Scalar, Value};

/// Width of the rule printed under a section title.
pub const SECTION_RULE_WIDTH: usize = 16;

/// Indentation of the first level of section fields, and of every further level.
pub const INDENT_STEP: usize = 2;

const RULE_CHAR: char = '─';

/// One line of rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// An empty separator line.
    Blank,
    /// A section or report title, already upper-cased.
    Title(String),
    /// A horizontal rule of the given width.
    Rule(usize),
    /// `label: value` at some indentation.
    Field {
        indent: usize,
        label: String,
        value: String,
    },
    /// A bare label introducing a nested block.
    Label { indent: usize, label: String },
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Blank => Ok(()),
            Line::Title(title) => f.write_str(title),
            Line::Rule(width) => {
                for _ in 0..*width {
                    write!(f, "{RULE_CHAR}")?;
                }
                Ok(())
            }
            Line::Field {
                indent,
                label,
                value,
            } => write!(f, "{:width$}{label}: {value}", "", width = *indent),
            Line::Label { indent, label } => write!(f, "{:width$}{label}", "", width = *indent),
        }
    }
}

impl Line {
    /// Write the line followed by a newline, colouring titles and labels.
    ///
    /// Colour is only emitted when the writer supports it.
    pub fn write_colored<W: WriteColor + ?Sized>(&self, wtr: &mut W) -> io::Result<()> {
        match self {
            Line::Blank => {}
            Line::Title(title) => {
                wtr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
                write!(wtr, "{title}")?;
                wtr.reset()?;
            }
            Line::Rule(_) => {
                wtr.set_color(ColorSpec::new().set_dimmed(true))?;
                write!(wtr, "{self}")?;
                wtr.reset()?;
            }
            Line::Field {
                indent,
                label,
                value,
            } => {
                write!(wtr, "{:width$}", "", width = *indent)?;
                wtr.set_color(ColorSpec::new().set_bold(true))?;
                write!(wtr, "{label}:")?;
                wtr.reset()?;
                write!(wtr, " {value}")?;
            }
            Line::Label { indent, label } => {
                write!(wtr, "{:width$}", "", width = *indent)?;
                wtr.set_color(ColorSpec::new().set_bold(true))?;
                write!(wtr, "{label}")?;
                wtr.reset()?;
            }
        }
        writeln!(wtr)
    }
}

/// Emit `label: value` for a flat top-level field, unless the value is blank.
///
/// The value is shown in its plain string form; booleans are not translated
/// to Yes/No here.
pub fn render_primitive(out: &mut Vec<Line>, label: &str, value: &Value) {
    if value.is_blank() {
        return;
    }
    out.push(Line::Field {
        indent: 0,
        label: label.to_string(),
        value: element_text(value),
    });
}

/// Emit a titled block for `value` if it is a mapping; nothing otherwise.
pub fn render_section(out: &mut Vec<Line>, title: &str, value: &Value) {
    let Some(map) = value.as_mapping() else {
        return;
    };

    out.push(Line::Blank);
    out.push(Line::Title(title.to_uppercase()));
    out.push(Line::Rule(SECTION_RULE_WIDTH));

    render_object(out, map, INDENT_STEP);
}

/// Emit every non-blank entry of `map` at `indent`, descending into nested mappings.
pub fn render_object(out: &mut Vec<Line>, map: &Map, indent: usize) {
    for (key, value) in map {
        if value.is_blank() {
            continue;
        }

        let label = prettify_key(key);

        match value {
            Value::Sequence(items) => {
                if !items.is_empty() {
                    out.push(Line::Field {
                        indent,
                        label,
                        value: join_elements(items, ", "),
                    });
                }
            }
            Value::Mapping(nested) => {
                out.push(Line::Label { indent, label });
                render_object(out, nested, indent + INDENT_STEP);
            }
            Value::Scalar(scalar) => out.push(Line::Field {
                indent,
                label,
                value: format_value(scalar),
            }),
            Value::Absent => {}
        }
    }
}

/// Turn a payload key into a display label.
///
/// Underscores become spaces and the first letter of every word is
/// upper-cased: `country_metadata` becomes `Country Metadata`. Letters after
/// the first keep their case.
pub fn prettify_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut in_word = false;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !in_word {
            label.push(c.to_ascii_uppercase());
        } else {
            label.push(c);
        }
        in_word = is_word;
    }
    label
}

/// Format a scalar field value. Booleans read as `Yes`/`No`.
pub fn format_value(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Bool(true) => "Yes".to_string(),
        Scalar::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

fn join_elements(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(element_text)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Plain text of a sequence element.
///
/// Absent elements are empty, nested sequences are joined with `,` and
/// mappings fall back to compact JSON.
fn element_text(value: &Value) -> String {
    match value {
        Value::Absent => String::new(),
        Value::Scalar(scalar) => scalar.to_string(),
        Value::Sequence(items) => join_elements(items, ","),
        Value::Mapping(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Render a single section straight to strings.
pub fn section_lines(title: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    render_section(&mut out, title, value);
    out.iter().map(Line::to_string).collect()
}
