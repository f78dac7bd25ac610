//! Diagnostic values and accumulators

use crate::kind::{DiagnosticKind, Severity};
use indexmap::IndexMap;
use mapforge_schema::Location;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One build-time diagnostic
///
/// Parameters keep insertion order so a presentation layer can interpolate
/// them positionally as well as by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind
    pub kind: DiagnosticKind,
    /// Severity, defaults to the kind's severity
    pub severity: Severity,
    /// Location in the user's declarations
    #[serde(default)]
    pub location: Option<Location>,
    /// Structured message parameters
    #[serde(default)]
    pub params: IndexMap<String, String>,
}

impl Diagnostic {
    /// Diagnostic with the kind's default severity
    #[must_use]
    pub fn new(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            location: None,
            params: IndexMap::new(),
        }
    }

    /// Attach a location if one is known
    #[inline]
    #[must_use]
    pub fn at(mut self, location: Option<&Location>) -> Self {
        if let Some(location) = location {
            self.location = Some(location.clone());
        }
        self
    }

    /// Add a message parameter
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Override the severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Look up a parameter
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether this diagnostic blocks the plan
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.code(), self.severity, self.kind)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

/// Ordered list of diagnostics for one mapping pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one diagnostic
    #[inline]
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append another list, keeping order
    #[inline]
    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Number of diagnostics
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any diagnostic is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Error diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    /// Warning diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.kind == kind)
    }

    /// Iterate in report order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Consume into the underlying vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(v: Vec<Diagnostic>) -> Self {
        Self(v)
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A resolver result: always a value, plus whatever was reported
///
/// On failure the value is the resolver's default or empty result, so the
/// caller keeps going and every problem of a pair surfaces in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Resolved<T> {
    /// Resolved value (default on failure)
    pub value: T,
    /// Diagnostics produced while resolving
    pub diagnostics: Diagnostics,
}

impl<T> Resolved<T> {
    /// Value without diagnostics
    #[inline]
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Value with diagnostics
    #[inline]
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    /// Fallback value carrying one diagnostic
    #[inline]
    pub fn failed(value: T, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostics: Diagnostics::from(vec![diagnostic]),
        }
    }

    /// Whether any error was reported
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Transform the value, keeping diagnostics
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Move diagnostics into `sink` and return the value
    #[inline]
    pub fn report_into(self, sink: &mut Diagnostics) -> T {
        sink.append(self.diagnostics);
        self.value
    }

    /// Split into value and diagnostics
    #[inline]
    pub fn into_parts(self) -> (T, Diagnostics) {
        (self.value, self.diagnostics)
    }
}

impl<T: Default> Default for Resolved<T> {
    fn default() -> Self {
        Self::ok(T::default())
    }
}
