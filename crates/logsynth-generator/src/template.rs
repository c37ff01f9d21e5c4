//! Record templates.
//!
//! A template is compiled once and rendered against the current record state
//! any number of times. Supported syntax:
//!
//! - `{name}` - substitute a field
//! - `{name|lower}`, `{name|upper}` - substitute a field with a case filter
//! - `{?name}...{/name}` - render the body only when `name` is non-empty
//! - `{{` and `}}` - literal braces
//!
//! Rendering never mutates the record and never draws randomness.

use std::borrow::Cow;

/// Named values a template can substitute.
pub trait Fields {
    /// Look up a field by name. `None` means the record has no such field.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Template parse and render failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("empty placeholder at byte {0}")]
    Empty(usize),

    #[error("unmatched '}}' at byte {0}")]
    StrayBrace(usize),

    #[error("invalid field name '{name}' at byte {offset}")]
    InvalidName { name: String, offset: usize },

    #[error("unknown filter '{filter}' at byte {offset}")]
    UnknownFilter { filter: String, offset: usize },

    #[error("section '{0}' is never closed")]
    UnclosedSection(String),

    #[error("closing section '{name}' at byte {offset} has no matching opening")]
    UnexpectedClose { name: String, offset: usize },

    #[error("field '{0}' is not provided by the record")]
    MissingField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Identity,
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { name: String, filter: Filter },
    Section { name: String, body: Vec<Segment> },
}

/// A compiled record template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compile a template source.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let bytes = source.as_bytes();
        let mut open_sections: Vec<(String, Vec<Segment>)> = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while pos < bytes.len() {
            match bytes[pos] {
                b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                    literal.push('{');
                    pos += 2;
                }
                b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                    literal.push('}');
                    pos += 2;
                }
                b'}' => return Err(TemplateError::StrayBrace(pos)),
                b'{' => {
                    let close = source[pos + 1..]
                        .find('}')
                        .map(|i| pos + 1 + i)
                        .ok_or(TemplateError::Unclosed(pos))?;
                    let inner = source[pos + 1..close].trim();
                    if inner.is_empty() {
                        return Err(TemplateError::Empty(pos));
                    }
                    flush_literal(&mut literal, &mut current);

                    if let Some(name) = inner.strip_prefix('?') {
                        let name = checked_name(name, pos)?;
                        open_sections.push((name, std::mem::take(&mut current)));
                    } else if let Some(name) = inner.strip_prefix('/') {
                        let name = checked_name(name, pos)?;
                        match open_sections.pop() {
                            Some((open, parent)) if open == name => {
                                let body = std::mem::replace(&mut current, parent);
                                current.push(Segment::Section { name, body });
                            }
                            _ => {
                                return Err(TemplateError::UnexpectedClose { name, offset: pos })
                            }
                        }
                    } else {
                        let (name, filter) = match inner.split_once('|') {
                            Some((name, filter)) => (name, parse_filter(filter.trim(), pos)?),
                            None => (inner, Filter::Identity),
                        };
                        current.push(Segment::Field {
                            name: checked_name(name, pos)?,
                            filter,
                        });
                    }
                    pos = close + 1;
                }
                _ => {
                    let next = source[pos..]
                        .find(|c: char| c == '{' || c == '}')
                        .map_or(source.len(), |i| pos + i);
                    literal.push_str(&source[pos..next]);
                    pos = next;
                }
            }
        }

        flush_literal(&mut literal, &mut current);
        if let Some((name, _)) = open_sections.pop() {
            return Err(TemplateError::UnclosedSection(name));
        }

        Ok(Self { segments: current })
    }

    /// Render the template against `fields`.
    pub fn render(&self, fields: &dyn Fields) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.render_into(fields, &mut out)?;
        Ok(out)
    }

    /// Render the template against `fields`, appending to `out`.
    pub fn render_into(&self, fields: &dyn Fields, out: &mut String) -> Result<(), TemplateError> {
        render_segments(&self.segments, fields, out)
    }

    /// Check that every field the template references is provided by `fields`.
    pub fn verify(&self, fields: &dyn Fields) -> Result<(), TemplateError> {
        let mut names = Vec::new();
        collect_names(&self.segments, &mut names);
        match names.into_iter().find(|name| fields.field(name).is_none()) {
            Some(missing) => Err(TemplateError::MissingField(missing.to_string())),
            None => Ok(()),
        }
    }
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn checked_name(name: &str, offset: usize) -> Result<String, TemplateError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TemplateError::Empty(offset));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TemplateError::InvalidName {
            name: name.to_string(),
            offset,
        });
    }
    Ok(name.to_string())
}

fn parse_filter(filter: &str, offset: usize) -> Result<Filter, TemplateError> {
    match filter {
        "lower" => Ok(Filter::Lower),
        "upper" => Ok(Filter::Upper),
        other => Err(TemplateError::UnknownFilter {
            filter: other.to_string(),
            offset,
        }),
    }
}

fn lookup<'a>(fields: &'a dyn Fields, name: &str) -> Result<Cow<'a, str>, TemplateError> {
    fields
        .field(name)
        .ok_or_else(|| TemplateError::MissingField(name.to_string()))
}

fn render_segments(
    segments: &[Segment],
    fields: &dyn Fields,
    out: &mut String,
) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Field { name, filter } => {
                let value = lookup(fields, name)?;
                match filter {
                    Filter::Identity => out.push_str(&value),
                    Filter::Lower => out.push_str(&value.to_lowercase()),
                    Filter::Upper => out.push_str(&value.to_uppercase()),
                }
            }
            Segment::Section { name, body } => {
                if !lookup(fields, name)?.is_empty() {
                    render_segments(body, fields, out)?;
                }
            }
        }
    }
    Ok(())
}

fn collect_names<'a>(segments: &'a [Segment], names: &mut Vec<&'a str>) {
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Field { name, .. } => names.push(name),
            Segment::Section { name, body } => {
                names.push(name);
                collect_names(body, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Map(HashMap<&'static str, &'static str>);

    impl Fields for Map {
        fn field(&self, name: &str) -> Option<Cow<'_, str>> {
            self.0.get(name).map(|v| Cow::Borrowed(*v))
        }
    }

    fn fields(pairs: &[(&'static str, &'static str)]) -> Map {
        Map(pairs.iter().copied().collect())
    }

    #[test]
    fn test_render_fields_and_literals() {
        let template = Template::parse("{src}:{port} -> {dst}").unwrap();
        let out = template
            .render(&fields(&[("src", "10.0.0.1"), ("port", "22"), ("dst", "10.0.0.2")]))
            .unwrap();
        assert_eq!(out, "10.0.0.1:22 -> 10.0.0.2");
    }

    #[test]
    fn test_filters() {
        let template = Template::parse("{proto|lower}/{proto|upper}").unwrap();
        let out = template.render(&fields(&[("proto", "Tcp")])).unwrap();
        assert_eq!(out, "tcp/TCP");
    }

    #[test]
    fn test_conditional_section() {
        let template = Template::parse("a {?geo}geo={geo} {/geo}b").unwrap();
        assert_eq!(
            template.render(&fields(&[("geo", "US")])).unwrap(),
            "a geo=US b"
        );
        assert_eq!(template.render(&fields(&[("geo", "")])).unwrap(), "a b");
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::parse("{{\"k\": {v}}}").unwrap();
        assert_eq!(template.render(&fields(&[("v", "1")])).unwrap(), "{\"k\": 1}");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Template::parse("abc {x"), Err(TemplateError::Unclosed(4)));
        assert_eq!(Template::parse("{}"), Err(TemplateError::Empty(0)));
        assert_eq!(Template::parse("x } y"), Err(TemplateError::StrayBrace(2)));
        assert!(matches!(
            Template::parse("{x|title}"),
            Err(TemplateError::UnknownFilter { .. })
        ));
        assert!(matches!(
            Template::parse("{a b}"),
            Err(TemplateError::InvalidName { .. })
        ));
        assert_eq!(
            Template::parse("{?a}x"),
            Err(TemplateError::UnclosedSection("a".to_string()))
        );
        assert!(matches!(
            Template::parse("{?a}x{/b}"),
            Err(TemplateError::UnexpectedClose { .. })
        ));
    }

    #[test]
    fn test_missing_field_is_render_error() {
        let template = Template::parse("{present} {absent}").unwrap();
        let record = fields(&[("present", "yes")]);
        assert_eq!(
            template.render(&record),
            Err(TemplateError::MissingField("absent".to_string()))
        );
        assert_eq!(
            template.verify(&record),
            Err(TemplateError::MissingField("absent".to_string()))
        );
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let template = Template::parse("{a}-{a}").unwrap();
        let record = fields(&[("a", "z")]);
        assert_eq!(template.render(&record), template.render(&record));
    }
}
