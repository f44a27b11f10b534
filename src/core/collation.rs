//! core::collation
//!
//! Ordering of metadata labels.
//!
//! Resolved lists are sorted the way a user expects a localized dropdown to
//! be sorted, not by code point. Comparison proceeds in levels:
//!
//! 1. Base letters, ignoring accents and case (`"apple" < "Banana"`)
//! 2. Accents (`"resume" < "résumé"`)
//! 3. Case, lowercase first (`"a" < "A"`)
//! 4. Code point order, so that distinct labels never compare equal
//!
//! This matches the root collation used by browser `localeCompare` for the
//! Latin-script labels the metadata service returns.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compare two labels for display ordering.
///
/// # Example
///
/// ```
/// use metaselect::core::collation::compare_labels;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_labels("account", "Contact"), Ordering::Less);
/// assert_eq!(compare_labels("a", "A"), Ordering::Less);
/// assert_eq!(compare_labels("A", "á"), Ordering::Less);
/// ```
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let ka = CollationKey::new(a);
    let kb = CollationKey::new(b);

    ka.primary
        .cmp(&kb.primary)
        .then_with(|| ka.secondary.cmp(&kb.secondary))
        .then_with(|| ka.tertiary.cmp(&kb.tertiary))
        .then_with(|| a.cmp(b))
}

/// Per-level sort keys for one label.
struct CollationKey {
    /// Lowercased base characters with combining marks removed
    primary: Vec<char>,
    /// Combining marks attached to each base character
    secondary: Vec<Vec<char>>,
    /// Case of each base character (0 = not uppercase, 1 = uppercase)
    tertiary: Vec<u8>,
}

impl CollationKey {
    fn new(label: &str) -> Self {
        let mut primary = Vec::with_capacity(label.len());
        let mut secondary: Vec<Vec<char>> = Vec::with_capacity(label.len());
        let mut tertiary = Vec::with_capacity(label.len());

        for c in label.nfd() {
            if is_combining_mark(c) {
                // A leading mark has no base; give it an empty one.
                if secondary.is_empty() {
                    secondary.push(Vec::new());
                    tertiary.push(0);
                }
                if let Some(marks) = secondary.last_mut() {
                    marks.push(c);
                }
                continue;
            }
            primary.extend(c.to_lowercase());
            secondary.push(Vec::new());
            tertiary.push(u8::from(c.is_uppercase()));
        }

        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

/// Sort items in place by a label accessor, stably.
pub fn sort_by_label<T>(items: &mut [T], label: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| compare_labels(label(a), label(b)));
}
