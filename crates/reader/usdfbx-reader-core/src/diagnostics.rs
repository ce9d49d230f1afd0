//! Structured, non-fatal diagnostics collected during a pass.
//!
//! Every entry is mirrored to the `log` facade as it is pushed; no logger is installed here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub node: Option<NodeId>,
    pub property: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(node) = self.node {
            write!(f, "[node {node}] ")?;
        }
        if let Some(prop) = &self.property {
            write!(f, "[{prop}] ")?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Info => log::debug!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn warn(
        &mut self,
        node: Option<NodeId>,
        property: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            node,
            property: property.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn info(&mut self, node: Option<NodeId>, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Info,
            node,
            property: None,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
