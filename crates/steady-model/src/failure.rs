//! Start failures recorded by the graph runtime

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Error raised by a service's start action, with its cause chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartFailure {
    /// Top-level error message
    pub message: String,
    /// Causes, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StartFailure {
    /// Failure without causes
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Add a cause at the end of the chain
    #[inline]
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Capture an error and every `source()` below it
    #[must_use]
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut failure = Self::new(error.to_string());
        let mut cause = error.source();
        while let Some(c) = cause {
            failure.causes.push(c.to_string());
            cause = c.source();
        }
        failure
    }

    /// Render message plus one "Caused by" line per cause
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.message.clone();
        for cause in &self.causes {
            out.push_str("\n    Caused by: ");
            out.push_str(cause);
        }
        out
    }
}

impl fmt::Display for StartFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("address already in use")]
    struct Bind;

    #[derive(Debug, thiserror::Error)]
    #[error("socket binding failed")]
    struct Socket(#[source] Bind);

    #[derive(Debug, thiserror::Error)]
    #[error("failed to start connector")]
    struct Connector(#[source] Socket);

    #[test]
    fn describe_without_causes() {
        assert_eq!(StartFailure::new("boom").describe(), "boom");
    }

    #[test]
    fn describe_renders_full_chain() {
        let failure = StartFailure::new("outer").caused_by("middle").caused_by("root");
        assert_eq!(
            failure.describe(),
            "outer\n    Caused by: middle\n    Caused by: root"
        );
    }

    #[test]
    fn from_error_walks_sources() {
        let err = Connector(Socket(Bind));
        let failure = StartFailure::from_error(&err);
        assert_eq!(failure.message, "failed to start connector");
        assert_eq!(
            failure.causes,
            vec!["socket binding failed", "address already in use"]
        );
    }
}
