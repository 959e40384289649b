// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! A small JSONPath evaluator for wait conditions.
//!
//! Supports the subset used against Kubernetes objects: field access, array
//! indices, wildcards and equality filters such as
//! `$.status.conditions[?(@.type=="Ready")].status`.

use crate::error::{ProviderError, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Field(String),
    Index(i64),
    Wildcard,
    Filter(Filter),
}

#[derive(Clone, Debug, PartialEq)]
struct Filter {
    path: Vec<Segment>,
    comparison: Option<(Comparison, Value)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Comparison {
    Eq,
    Ne,
}

/// A parsed JSONPath expression
#[derive(Clone, Debug, PartialEq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// All values the path selects in `doc`
    pub fn query<'a>(&self, doc: &'a Value) -> Vec<&'a Value> {
        select(&self.segments, doc)
    }

    /// The selected values rendered as text, or `None` when nothing matched
    pub fn resolve(&self, doc: &Value) -> Option<String> {
        let matches = self.query(doc);
        if matches.is_empty() {
            return None;
        }
        Some(
            matches
                .into_iter()
                .map(render)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for JsonPath {
    type Err = ProviderError;

    fn from_str(source: &str) -> Result<Self> {
        let invalid = |reason: String| ProviderError::InvalidJsonPath {
            path: source.to_string(),
            reason,
        };

        let mut expr = source.trim();
        if let Some(inner) = expr.strip_prefix('{').and_then(|e| e.strip_suffix('}')) {
            expr = inner.trim();
        }
        let expr = expr.strip_prefix('$').unwrap_or(expr);
        if expr.is_empty() {
            return Err(invalid("path selects nothing".to_string()));
        }

        let segments = Parser::new(expr).segments(true).map_err(invalid)?;
        Ok(JsonPath {
            source: source.to_string(),
            segments,
        })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn select<'a>(segments: &[Segment], doc: &'a Value) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in segments {
        current = current
            .into_iter()
            .flat_map(|value| step(segment, value))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

fn step<'a>(segment: &Segment, value: &'a Value) -> Vec<&'a Value> {
    match segment {
        Segment::Field(name) => value.get(name.as_str()).into_iter().collect(),
        Segment::Index(index) => {
            let Some(items) = value.as_array() else {
                return Vec::new();
            };
            let resolved = if *index < 0 {
                items.len().checked_sub(index.unsigned_abs() as usize)
            } else {
                Some(*index as usize)
            };
            resolved.and_then(|i| items.get(i)).into_iter().collect()
        }
        Segment::Wildcard => match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => Vec::new(),
        },
        Segment::Filter(filter) => match value {
            Value::Array(items) => items.iter().filter(|item| filter.accepts(item)).collect(),
            _ => Vec::new(),
        },
    }
}

impl Filter {
    fn accepts(&self, item: &Value) -> bool {
        let selected = select(&self.path, item);
        match &self.comparison {
            None => !selected.is_empty(),
            Some((Comparison::Eq, literal)) => selected.iter().any(|v| *v == literal),
            Some((Comparison::Ne, literal)) => {
                !selected.is_empty() && selected.iter().all(|v| *v != literal)
            }
        }
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            source,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expect(&mut self, expected: char) -> std::result::Result<(), String> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(format!("expected '{}' at offset {}, found '{}'", expected, self.pos, c)),
            None => Err(format!("expected '{}' but the path ended", expected)),
        }
    }

    /// `leading_bare` allows `status.phase` without a leading dot
    fn segments(&mut self, leading_bare: bool) -> std::result::Result<Vec<Segment>, String> {
        let mut segments = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    match self.peek() {
                        Some('.') => return Err("recursive descent is not supported".to_string()),
                        Some('*') => {
                            self.pos += 1;
                            segments.push(Segment::Wildcard);
                        }
                        _ => segments.push(Segment::Field(self.identifier()?)),
                    }
                }
                '[' => {
                    self.pos += 1;
                    segments.push(self.bracket()?);
                }
                c if leading_bare && segments.is_empty() && self.pos == 0 && is_ident(c) => {
                    segments.push(Segment::Field(self.identifier()?));
                }
                other => {
                    return Err(format!("unexpected '{}' at offset {}", other, self.pos));
                }
            }
        }
        Ok(segments)
    }

    fn identifier(&mut self) -> std::result::Result<String, String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(format!("expected a field name at offset {}", start));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn quoted(&mut self) -> std::result::Result<String, String> {
        let Some(quote) = self.peek() else {
            return Err("expected a quoted string".to_string());
        };
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let text = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(text);
            }
            self.pos += 1;
        }
        Err(format!("unterminated string in '{}'", self.source))
    }

    fn bracket(&mut self) -> std::result::Result<Segment, String> {
        let segment = match self.peek() {
            Some('\'') | Some('"') => Segment::Field(self.quoted()?),
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some('?') => {
                self.pos += 1;
                self.expect('(')?;
                let body = self.filter_body()?;
                Segment::Filter(parse_filter(body.trim())?)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let start = self.pos;
                self.pos += 1;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse()
                    .map_err(|_| format!("invalid array index '{}'", digits))?;
                Segment::Index(index)
            }
            Some(c) => return Err(format!("unexpected '{}' after '['", c)),
            None => return Err("unterminated '['".to_string()),
        };
        self.expect(']')?;
        Ok(segment)
    }

    /// Text up to the `)` closing a filter, honoring quotes and nesting
    fn filter_body(&mut self) -> std::result::Result<String, String> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.peek() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'') | (None, '"') => quote = Some(c),
                (None, '(') => depth += 1,
                (None, ')') if depth == 0 => {
                    let body = self.chars[start..self.pos].iter().collect();
                    self.pos += 1;
                    return Ok(body);
                }
                (None, ')') => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
        Err("unterminated filter expression".to_string())
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '/'
}

fn parse_filter(body: &str) -> std::result::Result<Filter, String> {
    let Some(rest) = body.strip_prefix('@') else {
        return Err(format!("filter '{}' must start with '@'", body));
    };

    let (path_text, comparison) = match split_comparison(rest) {
        Some((left, op, right)) => (left, Some((op, parse_literal(right.trim())?))),
        None => (rest, None),
    };

    let path = Parser::new(path_text.trim()).segments(false)?;
    if path.is_empty() {
        return Err(format!("filter '{}' selects nothing", body));
    }
    Ok(Filter { path, comparison })
}

/// Find `==` or `!=` outside of quotes
fn split_comparison(text: &str) -> Option<(&str, Comparison, &str)> {
    let mut quote: Option<char> = None;
    let bytes: Vec<(usize, char)> = text.char_indices().collect();
    for (i, &(offset, c)) in bytes.iter().enumerate() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if (c == '=' || c == '!') && bytes.get(i + 1).is_some_and(|&(_, n)| n == '=') => {
                let op = if c == '=' { Comparison::Eq } else { Comparison::Ne };
                return Some((&text[..offset], op, &text[offset + 2..]));
            }
            None => {}
        }
    }
    None
}

fn parse_literal(text: &str) -> std::result::Result<Value, String> {
    for quote in ['\'', '"'] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return Ok(Value::String(inner.to_string()));
        }
    }
    serde_json::from_str(text).map_err(|_| format!("invalid literal '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_chaos() -> Value {
        json!({
            "apiVersion": "chaos-mesh.org/v1alpha1",
            "kind": "PodChaos",
            "metadata": {
                "name": "kill-nginx",
                "labels": {"app.kubernetes.io/name": "nginx"}
            },
            "status": {
                "phase": "Running",
                "replicas": 3,
                "paused": false,
                "conditions": [
                    {"type": "Selected", "status": "True"},
                    {"type": "AllInjected", "status": "False"},
                    {"type": "Paused", "status": "False"}
                ],
                "experiment": {"desiredPhase": "Run"}
            }
        })
    }

    fn resolve(path: &str) -> Option<String> {
        path.parse::<JsonPath>().unwrap().resolve(&pod_chaos())
    }

    #[test]
    fn test_dollar_prefixed_field() {
        assert_eq!(resolve("$.status.phase").as_deref(), Some("Running"));
    }

    #[test]
    fn test_kubectl_template_form() {
        assert_eq!(resolve("{.status.phase}").as_deref(), Some("Running"));
    }

    #[test]
    fn test_bare_and_dot_forms() {
        assert_eq!(resolve(".status.phase").as_deref(), Some("Running"));
        assert_eq!(resolve("status.phase").as_deref(), Some("Running"));
    }

    #[test]
    fn test_missing_path_is_none() {
        assert_eq!(resolve("$.status.missing"), None);
        assert_eq!(resolve("$.spec.duration"), None);
    }

    #[test]
    fn test_non_string_values_are_rendered() {
        assert_eq!(resolve("$.status.replicas").as_deref(), Some("3"));
        assert_eq!(resolve("$.status.paused").as_deref(), Some("false"));
        assert_eq!(
            resolve("$.status.experiment").as_deref(),
            Some(r#"{"desiredPhase":"Run"}"#)
        );
    }

    #[test]
    fn test_bracket_field_with_dots() {
        assert_eq!(
            resolve("$.metadata.labels['app.kubernetes.io/name']").as_deref(),
            Some("nginx")
        );
    }

    #[test]
    fn test_indices() {
        assert_eq!(resolve("$.status.conditions[0].type").as_deref(), Some("Selected"));
        assert_eq!(resolve("$.status.conditions[-1].type").as_deref(), Some("Paused"));
        assert_eq!(resolve("$.status.conditions[7].type"), None);
    }

    #[test]
    fn test_wildcard_joins_values() {
        assert_eq!(
            resolve("$.status.conditions[*].type").as_deref(),
            Some("Selected AllInjected Paused")
        );
    }

    #[test]
    fn test_filter_equality() {
        assert_eq!(
            resolve(r#"$.status.conditions[?(@.type=="AllInjected")].status"#).as_deref(),
            Some("False")
        );
        assert_eq!(
            resolve("$.status.conditions[?(@.type == 'Selected')].status").as_deref(),
            Some("True")
        );
    }

    #[test]
    fn test_filter_inequality_and_existence() {
        assert_eq!(
            resolve("$.status.conditions[?(@.status != 'False')].type").as_deref(),
            Some("Selected")
        );
        assert_eq!(
            resolve("$.status.conditions[?(@.type)].type").as_deref(),
            Some("Selected AllInjected Paused")
        );
    }

    #[test]
    fn test_filter_without_match_is_none() {
        assert_eq!(resolve("$.status.conditions[?(@.type=='Ready')].status"), None);
    }

    #[test]
    fn test_null_renders_empty() {
        let path: JsonPath = "$.status.phase".parse().unwrap();
        assert_eq!(path.resolve(&json!({"status": {"phase": null}})).as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_paths() {
        assert!("".parse::<JsonPath>().is_err());
        assert!("$".parse::<JsonPath>().is_err());
        assert!("$.status[".parse::<JsonPath>().is_err());
        assert!("$..phase".parse::<JsonPath>().is_err());
        assert!("$.status.conditions[?(type=='Ready')]".parse::<JsonPath>().is_err());
        assert!("$.metadata.labels['unterminated]".parse::<JsonPath>().is_err());
    }

    #[test]
    fn test_display_keeps_source() {
        let path: JsonPath = "{.status.phase}".parse().unwrap();
        assert_eq!(path.to_string(), "{.status.phase}");
    }
}
