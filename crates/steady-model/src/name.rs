//! Canonical service names
//!
//! Provides [`ServiceName`], the hierarchical identity of a service or unit.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Hierarchical service identity
///
/// A sequence of string segments. The canonical form joins segments with `.`;
/// segments that would be ambiguous (empty, or containing `.`, `"`, `\` or
/// whitespace) are double-quoted with `"` and `\` escaped.
///
/// # Examples
/// - `["server", "web", "connector"]` → `server.web.connector`
/// - `["deployment", "app.war"]` → `deployment."app.war"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(Vec<String>);

impl ServiceName {
    /// Name from owned segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Name from borrowed segments
    #[must_use]
    pub fn of<S: AsRef<str>>(segments: &[S]) -> Self {
        Self(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }

    /// Parse a canonical name
    ///
    /// # Errors
    /// Returns [`NameError`] if `canonical` is not a well-formed canonical name
    #[inline]
    pub fn parse(canonical: &str) -> Result<Self, NameError> {
        canonical.parse()
    }

    /// Segments in order, unquoted
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `other` lies at or below this name, compared segment by segment
    ///
    /// `server.web` covers `server.web.connector` but not `server.webservices`.
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Render the canonical form
    #[must_use]
    pub fn canonical_name(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            if needs_quoting(segment) {
                out.push('"');
                for c in segment.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            } else {
                out.push_str(segment);
            }
        }
        out
    }
}

fn needs_quoting(segment: &str) -> bool {
    segment.is_empty()
        || segment
            .chars()
            .any(|c| c == '.' || c == '"' || c == '\\' || c.is_whitespace())
}

impl Ord for ServiceName {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        self.canonical_name().cmp(&other.canonical_name())
    }
}

impl PartialOrd for ServiceName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ServiceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

impl FromStr for ServiceName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        let mut segments = Vec::new();
        let mut chars = s.chars().peekable();

        loop {
            let segment = if chars.peek() == Some(&'"') {
                chars.next();
                let mut segment = String::new();
                loop {
                    match chars.next() {
                        None => return Err(NameError::UnterminatedQuote(s.to_string())),
                        Some('\\') => match chars.next() {
                            None => return Err(NameError::UnterminatedQuote(s.to_string())),
                            Some(c) => segment.push(c),
                        },
                        Some('"') => break,
                        Some(c) => segment.push(c),
                    }
                }
                segment
            } else {
                let mut segment = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '.' {
                        break;
                    }
                    if c == '"' || c == '\\' {
                        return Err(NameError::InvalidSegment(s.to_string()));
                    }
                    segment.push(c);
                    chars.next();
                }
                if segment.is_empty() {
                    return Err(NameError::EmptySegment);
                }
                segment
            };
            segments.push(segment);

            match chars.next() {
                None => break,
                Some('.') => {}
                Some(_) => return Err(NameError::InvalidSegment(s.to_string())),
            }
        }

        Ok(Self(segments))
    }
}

impl TryFrom<String> for ServiceName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.canonical_name()
    }
}

/// Errors related to service names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// No segments at all
    #[error("service name is empty")]
    Empty,

    /// Unquoted empty segment, e.g. `a..b`
    #[error("service name contains empty segment")]
    EmptySegment,

    /// Quote or escape character outside a quoted segment
    #[error("invalid segment in service name: {0}")]
    InvalidSegment(String),

    /// Quoted segment without closing quote
    #[error("unterminated quote in service name: {0}")]
    UnterminatedQuote(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_keeps_segments_verbatim() {
        let name = ServiceName::of(&["server", "app.war"]);
        assert_eq!(name.segments(), &["server", "app.war"]);
        assert_eq!(ServiceName::new(vec!["server".into(), "app.war".into()]), name);
    }

    #[test]
    fn name_is_prefix_of() {
        let a = ServiceName::parse("a.b").unwrap();
        let b = ServiceName::parse("a.b.c").unwrap();
        assert!(a.is_prefix_of(&b));
        assert!(!b.is_prefix_of(&a));
        assert!(a.is_prefix_of(&a));
    }

    #[test]
    fn name_prefix_is_segment_wise() {
        let web = ServiceName::parse("server.web").unwrap();
        let ws = ServiceName::parse("server.webservices").unwrap();
        assert!(!web.is_prefix_of(&ws));
    }

    #[test]
    fn canonical_quotes_dotted_segment() {
        let name = ServiceName::of(&["deployment", "app.war"]);
        assert_eq!(name.canonical_name(), "deployment.\"app.war\"");
    }

    #[test]
    fn canonical_escapes_quotes() {
        let name = ServiceName::of(&["a", "say \"hi\""]);
        assert_eq!(name.canonical_name(), "a.\"say \\\"hi\\\"\"");
    }

    #[test]
    fn parse_quoted_segment() {
        let name: ServiceName = "deployment.\"app.war\".INSTALL".parse().unwrap();
        assert_eq!(name.segments(), &["deployment", "app.war", "INSTALL"]);
    }

    #[test]
    fn parse_escaped_quote() {
        let name: ServiceName = "a.\"x\\\"y\"".parse().unwrap();
        assert_eq!(name.segments(), &["a", "x\"y"]);
    }

    #[test]
    fn parse_empty_is_error() {
        assert_eq!(ServiceName::parse(""), Err(NameError::Empty));
    }

    #[test]
    fn parse_empty_segment_is_error() {
        assert_eq!(ServiceName::parse("a..b"), Err(NameError::EmptySegment));
        assert_eq!(ServiceName::parse("a."), Err(NameError::EmptySegment));
    }

    #[test]
    fn parse_unterminated_quote_is_error() {
        assert!(matches!(
            ServiceName::parse("a.\"b"),
            Err(NameError::UnterminatedQuote(_))
        ));
    }

    #[test]
    fn parse_garbage_after_quote_is_error() {
        assert!(matches!(
            ServiceName::parse("a.\"b\"c"),
            Err(NameError::InvalidSegment(_))
        ));
    }

    #[test]
    fn ordering_is_canonical() {
        let mut names = vec![
            ServiceName::parse("svc.b").unwrap(),
            ServiceName::parse("svc.a.z").unwrap(),
            ServiceName::parse("svc.a").unwrap(),
        ];
        names.sort();
        let rendered: Vec<_> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["svc.a", "svc.a.z", "svc.b"]);
    }

    #[test]
    fn serde_uses_canonical_string() {
        let name = ServiceName::of(&["deployment", "app.war"]);
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"deployment.\\\"app.war\\\"\"");
        let back: ServiceName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
