//! Path templates with `{param}` segments.
//!
//! Matching is structural: the request path and the template must have the
//! same number of `/`-separated segments, literal segments must be equal and
//! each parameter captures exactly one non-empty segment. `/users/{id}`
//! matches `/users/42` but neither `/users` nor `/users/42/edit`.

use crate::error::ValidationError;
use std::collections::HashMap;

/// Path parameter values extracted from a request path.
pub type PathParams = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `prefix{name}suffix`, where prefix and suffix are usually empty
    Param {
        name: String,
        prefix: String,
        suffix: String,
    },
}

/// Compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidPathTemplate {
            path: template.to_string(),
            reason,
        };

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'".to_string()))?;

        let mut segments: Vec<Segment> = Vec::new();
        for part in rest.split('/') {
            let segment = parse_segment(part).map_err(invalid)?;
            if let Segment::Param { name, .. } = &segment {
                let duplicate = segments
                    .iter()
                    .any(|seen| matches!(seen, Segment::Param { name: other, .. } if other == name));
                if duplicate {
                    return Err(invalid(format!("parameter '{name}' appears more than once")));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in positional order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Number of fully literal segments; more literals means a more specific route.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Literal(_)))
            .count()
    }

    /// Match a request path (without query string), returning the captured parameters.
    ///
    /// Segments are percent-decoded before comparison.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let decoded = urlencoding::decode(part)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| part.to_string());

            match segment {
                Segment::Literal(literal) => {
                    if *literal != decoded {
                        return None;
                    }
                }
                Segment::Param {
                    name,
                    prefix,
                    suffix,
                } => {
                    let value = decoded
                        .strip_prefix(prefix.as_str())
                        .and_then(|v| v.strip_suffix(suffix.as_str()))
                        .filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), value.to_string());
                }
            }
        }

        Some(params)
    }
}

fn parse_segment(part: &str) -> Result<Segment, String> {
    let (Some(start), Some(end)) = (part.find('{'), part.find('}')) else {
        if part.contains(['{', '}']) {
            return Err(format!("unbalanced braces in segment '{part}'"));
        }
        return Ok(Segment::Literal(part.to_string()));
    };

    if end < start {
        return Err(format!("unbalanced braces in segment '{part}'"));
    }
    let name = &part[start + 1..end];
    let suffix = &part[end + 1..];
    if suffix.contains(['{', '}']) || part[..start].contains('}') {
        return Err(format!("only one parameter is allowed per segment '{part}'"));
    }
    if name.is_empty() {
        return Err("parameter name cannot be empty".to_string());
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid parameter name '{name}'"));
    }

    Ok(Segment::Param {
        name: name.to_string(),
        prefix: part[..start].to_string(),
        suffix: suffix.to_string(),
    })
}
