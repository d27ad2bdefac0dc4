//! Message templates with named placeholders
//!
//! A template such as `"{Greeting} {Kilo}"` is paired with positional
//! arguments: placeholders bind to arguments by position and render with the
//! argument's display form. `{{` and `}}` are literal braces. A placeholder may
//! carry an alignment (`{Name,-10}`) and a format (`{When:%H:%M}`); formats
//! apply to timestamp arguments only.

use super::error::{LoggerError, Result};
use super::field_value::FieldValue;
use super::state::{renderer, KeyValueList, LogState, Renderer, State, ORIGINAL_FORMAT_KEY};
use std::fmt::{self, Write as _};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Hole {
        name: String,
        alignment: Option<i32>,
        format: Option<String>,
    },
}

/// A parsed message template
///
/// Parsing never fails outright: a malformed template keeps its text and the
/// parse error, which surfaces when it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    text: String,
    parsed: std::result::Result<Vec<Segment>, String>,
}

impl MessageTemplate {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let parsed = parse_segments(&text);
        Self { text, parsed }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_ok()
    }

    /// Placeholder names in order of appearance; empty for malformed templates
    pub fn placeholder_names(&self) -> Vec<&str> {
        match &self.parsed {
            Ok(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Hole { name, .. } => Some(name.as_str()),
                    Segment::Literal(_) => None,
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Render with positional arguments
    ///
    /// Fails when the template is malformed or references more arguments than
    /// were supplied. Extra arguments are ignored.
    pub fn render(&self, args: &[FieldValue]) -> Result<String> {
        let segments = self
            .parsed
            .as_ref()
            .map_err(|message| LoggerError::template(&self.text, message.clone()))?;

        let mut out = String::with_capacity(self.text.len());
        let mut next_arg = 0usize;
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Hole {
                    alignment, format, ..
                } => {
                    let value = args.get(next_arg).ok_or_else(|| {
                        LoggerError::template(
                            &self.text,
                            format!(
                                "placeholder {} has no matching argument ({} supplied)",
                                next_arg,
                                args.len()
                            ),
                        )
                    })?;
                    next_arg += 1;
                    let rendered = self.render_value(value, format.as_deref())?;
                    pad_into(&mut out, &rendered, *alignment);
                }
            }
        }
        Ok(out)
    }

    fn render_value(&self, value: &FieldValue, format: Option<&str>) -> Result<String> {
        match (value, format) {
            (FieldValue::Timestamp(t), Some(fmt)) => {
                let mut s = String::new();
                write!(s, "{}", t.format(fmt)).map_err(|_| {
                    LoggerError::template(&self.text, format!("invalid timestamp format '{}'", fmt))
                })?;
                Ok(s)
            }
            _ => Ok(value.to_string()),
        }
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn pad_into(out: &mut String, value: &str, alignment: Option<i32>) {
    let width = alignment.map(|a| a.unsigned_abs() as usize).unwrap_or(0);
    let len = value.chars().count();
    if len >= width {
        out.push_str(value);
        return;
    }
    let fill = " ".repeat(width - len);
    match alignment {
        Some(a) if a < 0 => {
            out.push_str(value);
            out.push_str(&fill);
        }
        _ => {
            out.push_str(&fill);
            out.push_str(value);
        }
    }
}

// Single left-to-right pass; every character is consumed once.
fn parse_segments(text: &str) -> std::result::Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                let mut body = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(format!("unexpected '{{' inside placeholder at {}", pos)),
                        c => body.push(c),
                    }
                }
                if !closed {
                    return Err(format!("unclosed placeholder at {}", pos));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(parse_hole(&body, pos)?);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(format!("unmatched '}}' at {}", pos));
                }
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Widths at or above this are rejected as malformed
const MAX_ALIGNMENT: u32 = 1_000_000;

fn parse_hole(body: &str, pos: usize) -> std::result::Result<Segment, String> {
    let (head, format) = match body.split_once(':') {
        Some((head, format)) => (head, Some(format.to_string())),
        None => (body, None),
    };
    let (name, alignment) = match head.split_once(',') {
        Some((name, align)) => {
            let align = align
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid alignment '{}' at {}", align.trim(), pos))?;
            if align.unsigned_abs() >= MAX_ALIGNMENT {
                return Err(format!(
                    "alignment {} at {} exceeds {}",
                    align, pos, MAX_ALIGNMENT
                ));
            }
            (name, Some(align))
        }
        None => (head, None),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty placeholder at {}", pos));
    }
    Ok(Segment::Hole {
        name: name.to_string(),
        alignment,
        format,
    })
}

/// Template plus arguments: the state a `log!` call produces
///
/// Exposes the key/value capability: one pair per placeholder bound to its
/// argument, closed by `{OriginalFormat}` carrying the template text.
#[derive(Debug, Clone)]
pub struct TemplateValues {
    template: MessageTemplate,
    args: Vec<FieldValue>,
    pairs: Vec<(String, FieldValue)>,
}

impl TemplateValues {
    pub fn new(template: impl Into<String>, args: Vec<FieldValue>) -> Self {
        let template = MessageTemplate::parse(template);
        let mut pairs: Vec<(String, FieldValue)> = template
            .placeholder_names()
            .into_iter()
            .zip(args.iter())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        pairs.push((
            ORIGINAL_FORMAT_KEY.to_string(),
            FieldValue::String(template.text().to_string()),
        ));
        Self {
            template,
            args,
            pairs,
        }
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    pub fn render(&self) -> Result<String> {
        self.template.render(&self.args)
    }

    /// Renderer for states built by [`TemplateValues::new`]
    ///
    /// Any other state renders with its display form.
    pub fn renderer() -> Renderer {
        renderer(|state: &State, _| match state.downcast_ref::<TemplateValues>() {
            Some(values) => values.render(),
            None => Ok(state.to_string()),
        })
    }
}

impl fmt::Display for TemplateValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(message) => f.write_str(&message),
            Err(_) => f.write_str(self.template.text()),
        }
    }
}

impl KeyValueList for TemplateValues {
    fn pairs(&self) -> &[(String, FieldValue)] {
        &self.pairs
    }

    fn raw_values(&self) -> &[FieldValue] {
        &self.args
    }
}

impl LogState for TemplateValues {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Object(
            self.pairs
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_value()))
                .collect(),
        ))
    }

    fn as_key_value_list(&self) -> Option<&dyn KeyValueList> {
        Some(self)
    }
}

impl From<TemplateValues> for State {
    fn from(values: TemplateValues) -> Self {
        State::new(values)
    }
}
