//! Path templates.
//!
//! # Syntax
//! - `literal` segments match exactly (after percent-decoding)
//! - `{name}` captures one non-empty segment
//! - `{name:path}` captures the rest of the path, slashes included; it
//!   must be the last segment
//!
//! A trailing `/` is significant: `/bumbums/` and `/bumbums` are different
//! templates.

use std::borrow::Cow;

use crate::routing::RouteTableError;

const CATCH_ALL_SUFFIX: &str = ":path";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// Values captured from the request path, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCaptures {
    values: Vec<(String, String)>,
}

impl PathCaptures {
    pub fn push(&mut self, name: &str, value: String) {
        self.values.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parsed route path.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let parts: Vec<&str> = rest.split('/').collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => match inner.strip_suffix(CATCH_ALL_SUFFIX) {
                    Some(name) if i + 1 != parts.len() => {
                        return Err(invalid(&format!("catch-all `{name}` must be the last segment")));
                    }
                    Some(name) => Segment::CatchAll(validate_name(name).map_err(|r| invalid(r))?),
                    None => Segment::Param(validate_name(inner).map_err(|r| invalid(r))?),
                },
                None if part.contains(['{', '}']) => return Err(invalid("unbalanced braces")),
                None => Segment::Literal((*part).to_string()),
            };
            segments.push(segment);
        }

        let mut names: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(n) | Segment::CatchAll(n) => Some(n.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("duplicate parameter name"));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(n) | Segment::CatchAll(n) => Some(n.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a raw (still percent-encoded) request path.
    pub fn matches(&self, path: &str) -> Option<PathCaptures> {
        let rest = path.strip_prefix('/')?;
        let raw: Vec<&str> = rest.split('/').collect();
        let mut captures = PathCaptures::default();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    let actual = decode(raw.get(i)?);
                    if actual != expected.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let actual = raw.get(i).filter(|s| !s.is_empty())?;
                    captures.push(name, decode(actual).into_owned());
                }
                Segment::CatchAll(name) => {
                    if i >= raw.len() {
                        return None;
                    }
                    let remainder = raw[i..].join("/");
                    captures.push(name, decode(&remainder).into_owned());
                    return Some(captures);
                }
            }
        }

        (raw.len() == self.segments.len()).then_some(captures)
    }
}

fn validate_name(name: &str) -> Result<String, &'static str> {
    if name.is_empty() {
        return Err("empty parameter name");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("parameter names may only contain letters, digits and '_'");
    }
    Ok(name.to_string())
}

/// Percent-decode one segment. Bytes that are not valid UTF-8 become
/// U+FFFD, so the segment still matches and the binder reports the value.
fn decode(segment: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(segment.as_bytes()) {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
