//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`MetadataItem`] - One selectable metadata object (identifier + label)
//! - [`Cardinality`] - Whether a selector binds one identifier or many
//! - [`SelectionValue`] - The host-bound value, single or collection
//!
//! # Wire form
//!
//! Selection values always travel to and from the host as a single string.
//! Collection values are joined with [`COLLECTION_SEPARATOR`]; empty segments
//! are dropped on the way in and never produced on the way out.
//!
//! # Examples
//!
//! ```
//! use metaselect::core::types::{Cardinality, SelectionValue};
//!
//! let value = SelectionValue::parse(Cardinality::Collection, "name;;accountnumber");
//! assert_eq!(value.identifiers(), vec!["name", "accountnumber"]);
//! assert_eq!(value.encode(), "name;accountnumber");
//! ```

use serde::{Deserialize, Serialize};

/// Separator used for collection-valued selections.
pub const COLLECTION_SEPARATOR: char = ';';

/// A selectable metadata object as presented to the user.
///
/// The identifier is the stable machine key (logical name or GUID); the label
/// is the localized display text. Items are produced fresh on every resolve
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataItem {
    /// Stable machine key
    pub identifier: String,
    /// Human-readable label
    pub label: String,
}

impl MetadataItem {
    /// Create a new item.
    pub fn new(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: label.into(),
        }
    }

    /// Display form used in option lists and selection text: `Label (identifier)`.
    ///
    /// # Example
    ///
    /// ```
    /// use metaselect::core::types::MetadataItem;
    ///
    /// let item = MetadataItem::new("accountnumber", "Account Number");
    /// assert_eq!(item.display_text(), "Account Number (accountnumber)");
    /// ```
    pub fn display_text(&self) -> String {
        format!("{} ({})", self.label, self.identifier)
    }
}

/// Whether a selector binds at most one identifier or an ordered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one identifier
    Single,
    /// Zero or more identifiers, `;`-joined on the wire
    Collection,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Collection => write!(f, "collection"),
        }
    }
}

/// The value a selector binds to its host field.
///
/// The host owns this value; a control keeps a working copy consistent with
/// what it last reported through its change callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionValue {
    /// A single identifier; empty means nothing selected.
    Single(String),
    /// An ordered list of identifiers, as supplied.
    Collection(Vec<String>),
}

impl Default for SelectionValue {
    fn default() -> Self {
        SelectionValue::Single(String::new())
    }
}

impl SelectionValue {
    /// The empty value for a cardinality.
    pub fn empty(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => SelectionValue::Single(String::new()),
            Cardinality::Collection => SelectionValue::Collection(Vec::new()),
        }
    }

    /// Parse the host's raw string form.
    ///
    /// Single values are kept verbatim. Collection values are split on `;`
    /// with blank segments removed; order and duplicates are preserved.
    pub fn parse(cardinality: Cardinality, raw: &str) -> Self {
        match cardinality {
            Cardinality::Single => SelectionValue::Single(raw.to_string()),
            Cardinality::Collection => SelectionValue::Collection(split_collection(raw)),
        }
    }

    /// Encode to the host's string form.
    pub fn encode(&self) -> String {
        match self {
            SelectionValue::Single(identifier) => identifier.clone(),
            SelectionValue::Collection(identifiers) => join_collection(identifiers),
        }
    }

    /// The selected identifiers in order. An empty single value yields none.
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            SelectionValue::Single(identifier) if identifier.is_empty() => Vec::new(),
            SelectionValue::Single(identifier) => vec![identifier.as_str()],
            SelectionValue::Collection(identifiers) => {
                identifiers.iter().map(String::as_str).collect()
            }
        }
    }

    /// Check whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            SelectionValue::Single(identifier) => identifier.is_empty(),
            SelectionValue::Collection(identifiers) => identifiers.is_empty(),
        }
    }

    /// The cardinality this value belongs to.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            SelectionValue::Single(_) => Cardinality::Single,
            SelectionValue::Collection(_) => Cardinality::Collection,
        }
    }
}

/// Split a `;`-joined collection string, dropping blank segments.
///
/// Segments are otherwise kept as written, so a value round-trips exactly
/// when the host wrote it without blanks.
pub fn split_collection(raw: &str) -> Vec<String> {
    raw.split(COLLECTION_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Join identifiers into the `;`-separated wire form.
pub fn join_collection(identifiers: &[String]) -> String {
    identifiers.join(&COLLECTION_SEPARATOR.to_string())
}
