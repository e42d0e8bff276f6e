//! Composed report package

use std::collections::HashMap;
use std::fmt;

/// Value supplied for a report parameter at fill time
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue<A> {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Compiled sub-report
    Report(A),
}

impl<A> ParameterValue<A> {
    pub fn as_report(&self) -> Option<&A> {
        match self {
            ParameterValue::Report(report) => Some(report),
            _ => None,
        }
    }
}

impl<A> fmt::Display for ParameterValue<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) => f.write_str(s),
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Boolean(b) => write!(f, "{}", b),
            ParameterValue::Report(_) => f.write_str("[report]"),
        }
    }
}

impl<A> From<&str> for ParameterValue<A> {
    fn from(s: &str) -> Self {
        ParameterValue::Text(s.to_string())
    }
}

impl<A> From<String> for ParameterValue<A> {
    fn from(s: String) -> Self {
        ParameterValue::Text(s)
    }
}

impl<A> From<f64> for ParameterValue<A> {
    fn from(n: f64) -> Self {
        ParameterValue::Number(n)
    }
}

impl<A> From<bool> for ParameterValue<A> {
    fn from(b: bool) -> Self {
        ParameterValue::Boolean(b)
    }
}

/// Result of a composition: master artifact, sub-artifacts and their bindings
///
/// Immutable once built; safe to cache and share between fills.
#[derive(Debug, Clone)]
pub struct ComposedReport<A> {
    report: A,
    subreports: Vec<A>,
    binding_order: Vec<String>,
    bindings: HashMap<String, A>,
}

impl<A: Clone> ComposedReport<A> {
    /// Build a package from bindings in the order their sub-reports were compiled
    pub(crate) fn new(report: A, bindings: Vec<(String, A)>) -> Self {
        let subreports = bindings.iter().map(|(_, a)| a.clone()).collect();
        let binding_order = bindings.iter().map(|(name, _)| name.clone()).collect();
        Self {
            report,
            subreports,
            binding_order,
            bindings: bindings.into_iter().collect(),
        }
    }

    /// Parameters to fill the master report with
    ///
    /// Caller-supplied `extra` values are merged with the sub-report
    /// bindings. Bindings win on a name collision since the compiled master
    /// depends on them.
    pub fn parameters(
        &self,
        extra: HashMap<String, ParameterValue<A>>,
    ) -> HashMap<String, ParameterValue<A>> {
        let mut merged = extra;
        for (name, report) in self.bindings() {
            let shadowed = merged.insert(name.to_string(), ParameterValue::Report(report.clone()));
            if shadowed.is_some() {
                tracing::warn!(
                    parameter = name,
                    "caller parameter shadowed by sub-report binding"
                );
            }
        }
        merged
    }
}

impl<A> ComposedReport<A> {
    /// The compiled master report
    pub fn report(&self) -> &A {
        &self.report
    }

    /// Compiled sub-reports in composition order
    pub fn subreports(&self) -> &[A] {
        &self.subreports
    }

    /// Sub-report bindings (parameter name, artifact) in composition order
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &A)> {
        self.binding_order
            .iter()
            .filter_map(|name| self.bindings.get(name).map(|a| (name.as_str(), a)))
    }

    /// Artifact bound to a parameter name
    pub fn binding(&self, name: &str) -> Option<&A> {
        self.bindings.get(name)
    }

    pub fn binding_names(&self) -> &[String] {
        &self.binding_order
    }
}
