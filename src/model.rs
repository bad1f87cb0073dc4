//! Sidebar index data model: categories, entries, and per-module item tables.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of documented item, as keyed in a rustdoc sidebar file.
///
/// Variant order is the order rustdoc lays sections out in the sidebar, and
/// is what `Ord` (and therefore iteration over [`SidebarItems`]) follows.
///
/// DO NOT add doc comments to individual variants - schemars would emit
/// `oneOf` instead of a plain enum and MCP clients lose the dropdown.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mod,
    Macro,
    Struct,
    Enum,
    Union,
    Primitive,
    Trait,
    Fn,
    Type,
    Constant,
    Static,
    Keyword,
    Attr,
    Derive,
    TraitAlias,
    ExternCrate,
}

impl Category {
    /// All categories in sidebar display order.
    pub const ALL: [Self; 16] = [
        Self::Mod,
        Self::Macro,
        Self::Struct,
        Self::Enum,
        Self::Union,
        Self::Primitive,
        Self::Trait,
        Self::Fn,
        Self::Type,
        Self::Constant,
        Self::Static,
        Self::Keyword,
        Self::Attr,
        Self::Derive,
        Self::TraitAlias,
        Self::ExternCrate,
    ];

    /// The key rustdoc writes for this category.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Mod => "mod",
            Self::Macro => "macro",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Primitive => "primitive",
            Self::Trait => "trait",
            Self::Fn => "fn",
            Self::Type => "type",
            Self::Constant => "constant",
            Self::Static => "static",
            Self::Keyword => "keyword",
            Self::Attr => "attr",
            Self::Derive => "derive",
            Self::TraitAlias => "traitalias",
            Self::ExternCrate => "externcrate",
        }
    }

    /// Section heading used when rendering for humans.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mod => "Modules",
            Self::Macro => "Macros",
            Self::Struct => "Structs",
            Self::Enum => "Enums",
            Self::Union => "Unions",
            Self::Primitive => "Primitive Types",
            Self::Trait => "Traits",
            Self::Fn => "Functions",
            Self::Type => "Type Aliases",
            Self::Constant => "Constants",
            Self::Static => "Statics",
            Self::Keyword => "Keywords",
            Self::Attr => "Attribute Macros",
            Self::Derive => "Derive Macros",
            Self::TraitAlias => "Trait Aliases",
            Self::ExternCrate => "Extern Crates",
        }
    }

    /// Whether entry names in this category must be Rust identifiers.
    ///
    /// Primitive and keyword pages are named after language tokens
    /// (`fn`, `never`, `unit`) rather than declared items.
    pub const fn requires_identifier(self) -> bool {
        !matches!(self, Self::Primitive | Self::Keyword)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a sidebar key is not a known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sidebar category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One row of a sidebar: an item name and its one-line summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SidebarEntry {
    pub name: String,
    /// Empty for undocumented items.
    pub description: String,
}

impl SidebarEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// First sentence of the description, for compact listings.
    pub fn summary(&self) -> &str {
        let trimmed = self.description.trim();
        match trimmed.find(". ") {
            Some(end) => &trimmed[..=end],
            None => trimmed,
        }
    }
}

/// The contents of a single `sidebar-items.js` file.
///
/// Categories iterate in display order; entries keep the order they were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarItems {
    sections: BTreeMap<Category, Vec<SidebarEntry>>,
}

impl SidebarItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a category, creating the category if needed.
    pub fn insert(&mut self, category: Category, entry: SidebarEntry) {
        self.sections.entry(category).or_default().push(entry);
    }

    /// Ensure a category is present, even if it holds no entries.
    pub fn ensure_category(&mut self, category: Category) -> &mut Vec<SidebarEntry> {
        self.sections.entry(category).or_default()
    }

    pub fn get(&self, category: Category) -> Option<&[SidebarEntry]> {
        self.sections.get(&category).map(Vec::as_slice)
    }

    /// Present categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.sections.keys().copied()
    }

    /// `(category, entries)` pairs in display order.
    pub fn sections(&self) -> impl Iterator<Item = (Category, &[SidebarEntry])> {
        self.sections.iter().map(|(c, e)| (*c, e.as_slice()))
    }

    /// Every entry paired with its category.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &SidebarEntry)> {
        self.sections
            .iter()
            .flat_map(|(c, entries)| entries.iter().map(move |e| (*c, e)))
    }

    /// All entries named `name`, across categories.
    pub fn find(&self, name: &str) -> Vec<(Category, &SidebarEntry)> {
        self.entries().filter(|(_, e)| e.name == name).collect()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(Category, SidebarEntry)> for SidebarItems {
    fn from_iter<I: IntoIterator<Item = (Category, SidebarEntry)>>(iter: I) -> Self {
        let mut items = Self::new();
        for (category, entry) in iter {
            items.insert(category, entry);
        }
        items
    }
}
