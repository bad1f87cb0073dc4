//! Structural well-formedness checks for sidebar tables.

use crate::model::{Category, SidebarItems};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(r#)?[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// How serious a violation is. Only errors make a report fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single problem found in a sidebar table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{category}[{index}]: item name is empty")]
    EmptyName { category: Category, index: usize },
    #[error("{category}[{index}]: '{name}' duplicates entry #{first}")]
    DuplicateName {
        category: Category,
        index: usize,
        first: usize,
        name: String,
    },
    #[error("{category}[{index}]: '{name}' is not a valid identifier")]
    InvalidIdentifier {
        category: Category,
        index: usize,
        name: String,
    },
    #[error("{category}: category has no entries")]
    EmptyCategory { category: Category },
}

impl Violation {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyCategory { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub const fn category(&self) -> Category {
        match self {
            Self::EmptyName { category, .. }
            | Self::DuplicateName { category, .. }
            | Self::InvalidIdentifier { category, .. }
            | Self::EmptyCategory { category } => *category,
        }
    }
}

/// Every violation found in one table, in category then entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub violations: Vec<Violation>,
}

impl Report {
    /// True when nothing of error severity was found.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Warning)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return f.write_str("ok");
        }
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{:?}: {}", violation.severity(), violation)?;
        }
        Ok(())
    }
}

/// Returns true if `name` is a Rust identifier or raw identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Check a table for empty names, duplicate names within a category,
/// and names that cannot be Rust items. Never stops at the first problem.
pub fn validate(items: &SidebarItems) -> Report {
    let mut violations = Vec::new();

    for (category, entries) in items.sections() {
        if entries.is_empty() {
            violations.push(Violation::EmptyCategory { category });
            continue;
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let name = entry.name.as_str();
            if name.trim().is_empty() {
                violations.push(Violation::EmptyName { category, index });
                continue;
            }

            if let Some(&first) = seen.get(name) {
                violations.push(Violation::DuplicateName {
                    category,
                    index,
                    first,
                    name: name.to_string(),
                });
            } else {
                seen.insert(name, index);
            }

            if category.requires_identifier() && !is_identifier(name) {
                violations.push(Violation::InvalidIdentifier {
                    category,
                    index,
                    name: name.to_string(),
                });
            }
        }
    }

    Report { violations }
}
