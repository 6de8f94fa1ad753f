//! Access-pattern templates.
//!
//! A template is a string made of literal fragments and named placeholders, for example
//! `USER#{owner}#STORY#{story_id}`. Placeholders may carry a format spec after a colon
//! (`{count:05d}`). A spec may set fill and alignment, sign, zero padding, width, precision
//! and a `d`, `s` or `f` type. `{{` and `}}` produce literal braces.
use crate::{key::KeyError, table::TableAttribute, TableAttributes};
use std::{collections::HashMap, fmt::Display};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unbalanced '{brace}' at offset {offset} in template '{template}'")]
    UnbalancedBrace {
        template: String,
        offset: usize,
        brace: char,
    },
    #[error("Empty placeholder at offset {offset} in template '{template}'")]
    EmptyPlaceholder { template: String, offset: usize },
    #[error("Placeholder '{name}' appears more than once in template '{template}'")]
    DuplicatePlaceholder { template: String, name: String },
    #[error("Invalid format spec '{spec}' for placeholder '{name}'")]
    InvalidFormatSpec { name: String, spec: String },
}

/// A named key template.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    name: String,
    template: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Field { name: String, spec: FormatSpec },
}

impl Pattern {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        let segments = parse_template(&template)?;

        Ok(Self {
            name: name.into(),
            template,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in the order they appear in the template.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Substitute every placeholder with its value from `values`.
    ///
    /// Fails with [`KeyError::MissingField`] naming the first placeholder that has no value.
    /// A `Null` value counts as missing. Booleans render as `True` and `False`.
    pub fn render(&self, values: &TableAttributes) -> Result<String, KeyError> {
        render_segments(&self.segments, values)
    }

    /// Match `candidate` against this template and return the placeholder bindings.
    ///
    /// Every placeholder binds to a non-empty substring and literal fragments must match
    /// exactly. Returns `None` when the candidate cannot be produced by this template.
    pub fn parse_key(&self, candidate: &str) -> Option<HashMap<String, String>> {
        let mut bindings = Vec::new();

        if match_segments(&self.segments, candidate, &mut bindings) {
            Some(
                bindings
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            )
        } else {
            None
        }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let mut bindings = Vec::new();
        match_segments(&self.segments, candidate, &mut bindings)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

pub(crate) fn render_segments(
    segments: &[Segment],
    values: &TableAttributes,
) -> Result<String, KeyError> {
    let mut rendered = String::new();

    for segment in segments {
        match segment {
            Segment::Literal(text) => rendered.push_str(text),
            Segment::Field { name, spec } => {
                let value = lookup(values, name)
                    .ok_or_else(|| KeyError::MissingField(name.to_string()))?;
                rendered.push_str(&spec.apply(name, value)?);
            }
        }
    }

    Ok(rendered)
}

pub(crate) fn lookup<'v>(values: &'v TableAttributes, name: &str) -> Option<&'v TableAttribute> {
    values.get(name).filter(|value| !value.is_null())
}

fn parse_template(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut body = String::new();
                let mut closed = false;

                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => break,
                        c => body.push(c),
                    }
                }

                if !closed {
                    return Err(TemplateError::UnbalancedBrace {
                        template: template.to_string(),
                        offset,
                        brace: '{',
                    });
                }

                let (name, spec) = match body.split_once(':') {
                    Some((name, spec)) => (name, spec),
                    None => (body.as_str(), ""),
                };

                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder {
                        template: template.to_string(),
                        offset,
                    });
                }

                let duplicate = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Field { name: n, .. } if n == name));

                if duplicate {
                    return Err(TemplateError::DuplicatePlaceholder {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }

                let spec = FormatSpec::parse(spec).ok_or_else(|| TemplateError::InvalidFormatSpec {
                    name: name.to_string(),
                    spec: spec.to_string(),
                })?;

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }

                segments.push(Segment::Field {
                    name: name.to_string(),
                    spec,
                });
            }
            '}' => {
                return Err(TemplateError::UnbalancedBrace {
                    template: template.to_string(),
                    offset,
                    brace: '}',
                })
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

fn match_segments<'a>(
    segments: &'a [Segment],
    input: &'a str,
    bindings: &mut Vec<(&'a str, &'a str)>,
) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return input.is_empty();
    };

    match first {
        Segment::Literal(text) => input
            .strip_prefix(text.as_str())
            .is_some_and(|tail| match_segments(rest, tail, bindings)),
        Segment::Field { name, spec } => {
            // Shortest binding first, backtracking on failure.
            let ends = input
                .char_indices()
                .map(|(i, _)| i)
                .skip(1)
                .chain(std::iter::once(input.len()))
                .filter(|end| *end > 0);

            for end in ends {
                let value = &input[..end];

                if !spec.accepts(value) {
                    continue;
                }

                bindings.push((name.as_str(), value));

                if match_segments(rest, &input[end..], bindings) {
                    return true;
                }

                bindings.pop();
            }

            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

/// Parsed `[[fill]align][sign][0][width][.precision][type]` format spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FormatSpec {
    raw: String,
    fill: char,
    align: Option<Align>,
    sign: Sign,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl FormatSpec {
    fn parse(raw: &str) -> Option<Self> {
        let chars: Vec<char> = raw.chars().collect();
        let mut spec = Self {
            raw: raw.to_string(),
            fill: ' ',
            align: None,
            sign: Sign::Minus,
            zero: false,
            width: 0,
            precision: None,
            kind: None,
        };
        let mut i = 0;

        if chars.len() >= 2 && align_from(chars[1]).is_some() {
            spec.fill = chars[0];
            spec.align = align_from(chars[1]);
            i = 2;
        } else if let Some(align) = chars.first().and_then(|c| align_from(*c)) {
            spec.align = Some(align);
            i = 1;
        }

        match chars.get(i) {
            Some('+') => {
                spec.sign = Sign::Plus;
                i += 1;
            }
            Some(' ') => {
                spec.sign = Sign::Space;
                i += 1;
            }
            Some('-') => i += 1,
            _ => {}
        }

        if chars.get(i) == Some(&'0') {
            spec.zero = true;
            i += 1;
        }

        let (width, next) = take_number(&chars, i);
        spec.width = width.unwrap_or(0);
        i = next;

        if chars.get(i) == Some(&'.') {
            let (precision, next) = take_number(&chars, i + 1);
            spec.precision = Some(precision?);
            i = next;
        }

        if let Some(kind) = chars.get(i) {
            if !matches!(kind, 's' | 'd' | 'x' | 'X' | 'o' | 'b' | 'f') {
                return None;
            }
            spec.kind = Some(*kind);
            i += 1;
        }

        (i == chars.len()).then_some(spec)
    }

    fn is_integer(&self) -> bool {
        matches!(self.kind, Some('d' | 'x' | 'X' | 'o' | 'b'))
    }

    /// Whether `value` could have been produced by this spec. Used when parsing keys.
    fn accepts(&self, value: &str) -> bool {
        let trimmed = value.trim_matches(self.fill).trim();
        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

        match self.kind {
            Some('d') => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
            Some('x' | 'X') => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()),
            Some('o') => !digits.is_empty() && digits.chars().all(|c| ('0'..='7').contains(&c)),
            Some('b') => !digits.is_empty() && digits.chars().all(|c| c == '0' || c == '1'),
            Some('f') => trimmed.parse::<f64>().is_ok(),
            _ => true,
        }
    }

    fn apply(&self, name: &str, value: &TableAttribute) -> Result<String, KeyError> {
        let format_error = || KeyError::Format {
            name: name.to_string(),
            spec: self.raw.clone(),
        };

        let (negative, body, numeric) = match (value, self.kind) {
            (TableAttribute::String(s), None | Some('s')) => (false, self.truncate(s), false),
            (TableAttribute::Bool(b), None | Some('s')) => {
                (false, if *b { "True" } else { "False" }.to_string(), false)
            }
            (TableAttribute::Number(n), None) => {
                let (negative, digits) = split_sign(n);
                (negative, digits.to_string(), true)
            }
            (TableAttribute::Number(n), Some('f')) => {
                let number: f64 = n.trim().parse().map_err(|_| format_error())?;
                let precision = self.precision.unwrap_or(6);
                (
                    number.is_sign_negative() && number != 0.0,
                    format!("{:.*}", precision, number.abs()),
                    true,
                )
            }
            (TableAttribute::Number(n), Some(kind)) if self.is_integer() => {
                let number: i128 = n.trim().parse().map_err(|_| format_error())?;
                let magnitude = number.unsigned_abs();
                let body = match kind {
                    'x' => format!("{magnitude:x}"),
                    'X' => format!("{magnitude:X}"),
                    'o' => format!("{magnitude:o}"),
                    'b' => format!("{magnitude:b}"),
                    _ => magnitude.to_string(),
                };
                (number < 0, body, true)
            }
            (TableAttribute::String(_) | TableAttribute::Bool(_) | TableAttribute::Number(_), _) => {
                return Err(format_error())
            }
            _ => return Err(KeyError::InvalidValue(name.to_string())),
        };

        let sign = match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) if numeric => "+",
            (false, Sign::Space) if numeric => " ",
            _ => "",
        };

        let (fill, align) = match self.align {
            Some(align) => (self.fill, align),
            None if self.zero && numeric => ('0', Align::AfterSign),
            None if self.zero => ('0', Align::Left),
            None if numeric => (self.fill, Align::Right),
            None => (self.fill, Align::Left),
        };

        let len = sign.chars().count() + body.chars().count();
        let pad = self.width.saturating_sub(len);
        let padding = |count: usize| std::iter::repeat(fill).take(count).collect::<String>();

        Ok(match align {
            Align::Left => format!("{sign}{body}{}", padding(pad)),
            Align::Right => format!("{}{sign}{body}", padding(pad)),
            Align::Center => format!("{}{sign}{body}{}", padding(pad / 2), padding(pad - pad / 2)),
            Align::AfterSign => format!("{sign}{}{body}", padding(pad)),
        })
    }

    fn truncate(&self, s: &str) -> String {
        match self.precision {
            Some(precision) => s.chars().take(precision).collect(),
            None => s.to_string(),
        }
    }
}

fn align_from(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

fn take_number(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let end = chars[start.min(chars.len())..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count()
        + start.min(chars.len());

    let number = chars[start.min(chars.len())..end]
        .iter()
        .collect::<String>()
        .parse()
        .ok();

    (number, end)
}

fn split_sign(number: &str) -> (bool, &str) {
    let number = number.trim();
    match number.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    }
}
