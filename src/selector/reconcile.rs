//! selector::reconcile
//!
//! Maps a selection onto a resolved item list for display.
//!
//! Identifiers with no matching item are dropped from the display only. The
//! bound value is never touched here; an unmatched identifier stays in the
//! host's value until the user changes the selection.

use std::collections::HashMap;

use crate::core::types::{MetadataItem, SelectionValue};

/// The matched part of a selection, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Matched items
    pub entries: Vec<MetadataItem>,
}

impl DisplayState {
    /// Text shown in the closed control: `"Label (identifier)"` per matched
    /// entry, joined by `", "`.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(MetadataItem::display_text)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Matched identifiers, in selection order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.identifier.as_str()).collect()
    }

    /// Check whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconcile a selection against the current item list.
///
/// Output order follows the selection, not the item list.
///
/// # Example
///
/// ```
/// use metaselect::core::types::{MetadataItem, SelectionValue};
/// use metaselect::selector::reconcile;
///
/// let items = vec![MetadataItem::new("a", "Alpha"), MetadataItem::new("b", "Beta")];
/// let value = SelectionValue::Collection(vec!["b".into(), "gone".into(), "a".into()]);
///
/// assert_eq!(reconcile(&items, &value).text(), "Beta (b), Alpha (a)");
/// ```
pub fn reconcile(items: &[MetadataItem], value: &SelectionValue) -> DisplayState {
    let by_identifier: HashMap<&str, &MetadataItem> = items
        .iter()
        .rev()
        .map(|item| (item.identifier.as_str(), item))
        .collect();

    let entries = value
        .identifiers()
        .into_iter()
        .filter_map(|identifier| by_identifier.get(identifier).map(|item| (*item).clone()))
        .collect();

    DisplayState { entries }
}
