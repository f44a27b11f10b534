//! selector::control
//!
//! The selector state machine.
//!
//! # States
//!
//! ```text
//! Unconfigured --scope configured--> Loading --resolve applied--> Ready
//!      ^                               ^                            |
//!      |                               +-------scope changed--------+
//!      +------------------scope unconfigured------------------------+
//! ```
//!
//! # Latest Wins
//!
//! Each scope change bumps a generation counter and issues a
//! [`ResolveTicket`]. The caller runs the resolve however it likes and hands
//! the result back with the ticket; results whose ticket is no longer the
//! current generation are discarded. Nothing is cancelled.
//!
//! # Display
//!
//! While `Loading`, the display from the previous `Ready` stays up until the
//! new resolve lands. Host value changes during that window are adopted into
//! the selection immediately but reconciled only once items arrive.

use thiserror::Error;
use tracing::debug;

use super::kind::SelectorKind;
use super::reconcile::{reconcile, DisplayState};
use super::resolver::{Resolution, ResolveStatus};
use super::scope::Scope;
use crate::core::types::{Cardinality, MetadataItem, SelectionValue};

/// Lifecycle phase of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPhase {
    /// Scope is missing a required field; no items
    Unconfigured,
    /// A resolve is in flight
    Loading,
    /// Items are applied and the user can select
    Ready,
}

impl std::fmt::Display for ControlPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPhase::Unconfigured => write!(f, "unconfigured"),
            ControlPhase::Loading => write!(f, "loading"),
            ControlPhase::Ready => write!(f, "ready"),
        }
    }
}

/// Errors from a user selection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("control is disabled")]
    Disabled,

    #[error("control is still loading")]
    Loading,

    #[error("control has been torn down")]
    TornDown,

    #[error("'{0}' is not one of the available options")]
    UnknownOption(String),

    #[error("expected a {expected} selection, got a {actual} one")]
    CardinalityMismatch {
        expected: Cardinality,
        actual: Cardinality,
    },
}

/// Permission to apply one resolve result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTicket {
    generation: u64,
    scope: Scope,
}

impl ResolveTicket {
    /// The scope to resolve.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a user selection reports to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// The new bound value
    pub value: SelectionValue,
    /// Label of the selected item; `None` for an empty or collection selection
    pub label: Option<String>,
}

/// Callback invoked after every accepted selection.
pub type ChangeHandler = Box<dyn FnMut(&SelectionChange) + Send>;

/// One entry of the rendered option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    /// Identifier, empty for the "no selection" entry
    pub value: String,
    /// Visible text
    pub text: String,
}

impl OptionEntry {
    /// The explicit "no selection" choice.
    pub fn none() -> Self {
        Self {
            value: String::new(),
            text: String::new(),
        }
    }

    /// Check whether this is the "no selection" choice.
    pub fn is_none(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&MetadataItem> for OptionEntry {
    fn from(item: &MetadataItem) -> Self {
        Self {
            value: item.identifier.clone(),
            text: item.display_text(),
        }
    }
}

/// Snapshot of everything a host needs to draw the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    /// Variant being drawn
    pub kind: SelectorKind,
    /// Lifecycle phase at snapshot time
    pub phase: ControlPhase,
    /// Outcome of the last applied resolve, if any
    pub status: Option<ResolveStatus>,
    /// Busy label while loading, normal placeholder otherwise
    pub placeholder: &'static str,
    /// "Label (identifier)" for each matched selection, comma separated
    pub display_text: String,
    /// "No selection" first, then one entry per item
    pub options: Vec<OptionEntry>,
    /// Identifiers currently selected, matched or not
    pub selected: Vec<String>,
    /// Host disabled flag, also set while loading
    pub disabled: bool,
}

/// A metadata selector, independent of any host.
pub struct SelectorControl {
    kind: SelectorKind,
    phase: ControlPhase,
    scope: Option<Scope>,
    generation: u64,
    items: Vec<MetadataItem>,
    status: Option<ResolveStatus>,
    selection: SelectionValue,
    /// Last value seen from the host, to detect host-side changes
    host_value: Option<SelectionValue>,
    display: DisplayState,
    disabled: bool,
    on_change: Option<ChangeHandler>,
}

impl std::fmt::Debug for SelectorControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorControl")
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("scope", &self.scope)
            .field("generation", &self.generation)
            .field("items", &self.items.len())
            .field("selection", &self.selection)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl SelectorControl {
    /// Create a control holding an initial selection.
    ///
    /// The initial value is passed through untouched until items arrive.
    pub fn new(kind: SelectorKind, initial: SelectionValue) -> Self {
        Self {
            kind,
            phase: ControlPhase::Unconfigured,
            scope: None,
            generation: 0,
            items: Vec::new(),
            status: None,
            selection: initial,
            host_value: None,
            display: DisplayState::default(),
            disabled: false,
            on_change: None,
        }
    }

    /// Install the change callback, replacing any previous one.
    pub fn set_change_handler(&mut self, handler: ChangeHandler) {
        self.on_change = Some(handler);
    }

    /// Remove the change callback.
    pub fn clear_change_handler(&mut self) {
        self.on_change = None;
    }

    /// Apply the host's latest configuration.
    ///
    /// Returns a ticket when the scope changed to a configured one and a
    /// resolve must run. Calling this repeatedly with unchanged input is a
    /// no-op.
    pub fn configure(
        &mut self,
        scope: Scope,
        host_value: SelectionValue,
        disabled: bool,
    ) -> Option<ResolveTicket> {
        self.disabled = disabled;

        let host_changed = self.host_value.as_ref() != Some(&host_value);
        if host_changed {
            self.selection = host_value.clone();
            self.host_value = Some(host_value);
        }

        let ticket = if self.scope.as_ref() != Some(&scope) {
            self.rescope(scope)
        } else {
            None
        };

        if host_changed && self.phase != ControlPhase::Loading {
            self.refresh_display();
        }

        ticket
    }

    fn rescope(&mut self, scope: Scope) -> Option<ResolveTicket> {
        self.generation += 1;
        self.scope = Some(scope.clone());

        if scope.is_configured() {
            self.phase = ControlPhase::Loading;
            Some(ResolveTicket {
                generation: self.generation,
                scope,
            })
        } else {
            debug!(kind = %self.kind, %scope, "scope unconfigured");
            self.phase = ControlPhase::Unconfigured;
            self.items.clear();
            self.status = Some(ResolveStatus::Unconfigured);
            self.refresh_display();
            None
        }
    }

    /// Apply a resolve result.
    ///
    /// Returns `false` and leaves the control untouched if the ticket has
    /// been superseded.
    pub fn complete(&mut self, ticket: ResolveTicket, resolution: Resolution) -> bool {
        if ticket.generation != self.generation {
            debug!(
                kind = %self.kind,
                scope = %ticket.scope,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale resolve"
            );
            return false;
        }

        self.items = resolution.items;
        self.status = Some(resolution.status);
        self.phase = ControlPhase::Ready;
        self.refresh_display();
        true
    }

    /// Apply a user selection and notify the host.
    ///
    /// Blank identifiers in a collection are dropped; every remaining one
    /// must be an available option or already part of the selection. An
    /// empty selection is always accepted.
    ///
    /// # Errors
    ///
    /// - `Disabled` if the host disabled the control
    /// - `Loading` while a resolve is in flight
    /// - `CardinalityMismatch` if the value's shape does not fit the variant
    /// - `UnknownOption` if a newly added identifier is not in the current
    ///   item list
    pub fn select(&mut self, value: SelectionValue) -> Result<SelectionChange, SelectError> {
        if self.disabled {
            return Err(SelectError::Disabled);
        }
        if self.phase == ControlPhase::Loading {
            return Err(SelectError::Loading);
        }

        let expected = self.kind.cardinality();
        if value.cardinality() != expected {
            return Err(SelectError::CardinalityMismatch {
                expected,
                actual: value.cardinality(),
            });
        }

        let value = match value {
            SelectionValue::Collection(identifiers) => SelectionValue::Collection(
                identifiers
                    .into_iter()
                    .filter(|identifier| !identifier.trim().is_empty())
                    .collect(),
            ),
            single => single,
        };

        // Identifiers already held may be stale; they pass through untouched.
        let held = self.selection.identifiers();
        for identifier in value.identifiers() {
            if self.item(identifier).is_none() && !held.contains(&identifier) {
                return Err(SelectError::UnknownOption(identifier.to_string()));
            }
        }

        let label = match &value {
            SelectionValue::Single(identifier) => self.item(identifier).map(|item| item.label.clone()),
            SelectionValue::Collection(_) => None,
        };

        self.selection = value.clone();
        self.refresh_display();

        let change = SelectionChange { value, label };
        if let Some(handler) = self.on_change.as_mut() {
            handler(&change);
        }
        Ok(change)
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> ControlView {
        let placeholder = if self.phase == ControlPhase::Loading {
            self.kind.loading_label()
        } else {
            self.kind.placeholder()
        };

        let options = std::iter::once(OptionEntry::none())
            .chain(self.items.iter().map(OptionEntry::from))
            .collect();

        ControlView {
            kind: self.kind,
            phase: self.phase,
            status: self.status,
            placeholder,
            display_text: self.display.text(),
            options,
            selected: self.selection.identifiers().into_iter().map(str::to_string).collect(),
            disabled: self.disabled || self.phase == ControlPhase::Loading,
        }
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    pub fn items(&self) -> &[MetadataItem] {
        &self.items
    }

    pub fn selection(&self) -> &SelectionValue {
        &self.selection
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Outcome of the last applied resolve.
    pub fn status(&self) -> Option<ResolveStatus> {
        self.status
    }

    fn item(&self, identifier: &str) -> Option<&MetadataItem> {
        self.items.iter().find(|item| item.identifier == identifier)
    }

    fn refresh_display(&mut self) {
        self.display = reconcile(&self.items, &self.selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn items() -> Vec<MetadataItem> {
        vec![
            MetadataItem::new("name", "Account Name"),
            MetadataItem::new("accountnumber", "Account Number"),
        ]
    }

    fn single(id: &str) -> SelectionValue {
        SelectionValue::Single(id.to_string())
    }

    fn ready_control(host_value: &str) -> SelectorControl {
        let mut control = SelectorControl::new(SelectorKind::Attribute, single(host_value));
        let ticket = control
            .configure(Scope::entity("account"), single(host_value), false)
            .unwrap();
        assert!(control.complete(ticket, Resolution::loaded(items())));
        control
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn starts_unconfigured() {
            let control = SelectorControl::new(SelectorKind::Attribute, single(""));
            assert_eq!(control.phase(), ControlPhase::Unconfigured);
            assert!(control.items().is_empty());
        }

        #[test]
        fn configured_scope_issues_ticket() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            let ticket = control.configure(Scope::entity("account"), single(""), false);
            assert_eq!(ticket.unwrap().scope(), &Scope::entity("account"));
            assert_eq!(control.phase(), ControlPhase::Loading);
        }

        #[test]
        fn unconfigured_scope_issues_nothing() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single("name"));
            assert!(control.configure(Scope::entity(""), single("name"), false).is_none());
            assert_eq!(control.phase(), ControlPhase::Unconfigured);
            assert_eq!(control.status(), Some(ResolveStatus::Unconfigured));
            assert_eq!(control.selection(), &single("name"));
        }

        #[test]
        fn unchanged_configuration_is_noop() {
            let mut control = ready_control("name");
            assert!(control
                .configure(Scope::entity("account"), single("name"), false)
                .is_none());
            assert_eq!(control.phase(), ControlPhase::Ready);
        }

        #[test]
        fn completion_enters_ready() {
            let control = ready_control("accountnumber");
            assert_eq!(control.phase(), ControlPhase::Ready);
            assert_eq!(control.display().text(), "Account Number (accountnumber)");
        }

        #[test]
        fn scope_change_reenters_loading() {
            let mut control = ready_control("name");
            let ticket = control.configure(Scope::entity("contact"), single("name"), false);
            assert!(ticket.is_some());
            assert_eq!(control.phase(), ControlPhase::Loading);
        }

        #[test]
        fn failed_resolve_still_ready() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            let ticket = control
                .configure(Scope::entity("account"), single(""), false)
                .unwrap();
            control.complete(ticket, Resolution::failed());
            assert_eq!(control.phase(), ControlPhase::Ready);
            assert_eq!(control.status(), Some(ResolveStatus::Failed));
            assert_eq!(
                control.select(single("name")),
                Err(SelectError::UnknownOption("name".into()))
            );
            assert!(control.select(single("")).is_ok());
        }
    }

    mod latest_wins {
        use super::*;

        #[test]
        fn stale_result_discarded() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            let first = control
                .configure(Scope::entity("account"), single(""), false)
                .unwrap();
            let second = control
                .configure(Scope::entity("contact"), single(""), false)
                .unwrap();

            assert!(control.complete(second, Resolution::loaded(vec![MetadataItem::new("fullname", "Full Name")])));
            assert!(!control.complete(first, Resolution::loaded(items())));

            assert_eq!(control.items(), &[MetadataItem::new("fullname", "Full Name")]);
        }

        #[test]
        fn stale_result_discarded_while_loading() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            let first = control
                .configure(Scope::entity("account"), single(""), false)
                .unwrap();
            let _second = control
                .configure(Scope::entity("contact"), single(""), false)
                .unwrap();

            assert!(!control.complete(first, Resolution::loaded(items())));
            assert_eq!(control.phase(), ControlPhase::Loading);
            assert!(control.items().is_empty());
        }

        #[test]
        fn unconfigured_scope_supersedes_pending() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            let ticket = control
                .configure(Scope::entity("account"), single(""), false)
                .unwrap();
            control.configure(Scope::entity(""), single(""), false);

            assert!(!control.complete(ticket, Resolution::loaded(items())));
            assert_eq!(control.phase(), ControlPhase::Unconfigured);
        }
    }

    mod display {
        use super::*;

        #[test]
        fn stale_display_kept_while_loading() {
            let mut control = ready_control("name");
            control.configure(Scope::entity("contact"), single("name"), false);
            assert_eq!(control.view().display_text, "Account Name (name)");
        }

        #[test]
        fn host_value_change_while_loading_applied_on_completion() {
            let mut control = ready_control("name");
            let ticket = control
                .configure(Scope::entity("account2"), single("accountnumber"), false)
                .unwrap();
            assert_eq!(control.view().display_text, "Account Name (name)");

            control.complete(ticket, Resolution::loaded(items()));
            assert_eq!(control.view().display_text, "Account Number (accountnumber)");
        }

        #[test]
        fn host_value_change_when_ready() {
            let mut control = ready_control("name");
            control.configure(Scope::entity("account"), single("accountnumber"), false);
            assert_eq!(control.view().display_text, "Account Number (accountnumber)");
        }

        #[test]
        fn unmatched_value_retained() {
            let control = ready_control("deleted_attribute");
            assert_eq!(control.view().display_text, "");
            assert_eq!(control.selection(), &single("deleted_attribute"));
            assert_eq!(control.view().selected, vec!["deleted_attribute"]);
        }
    }

    mod selecting {
        use super::*;

        #[test]
        fn select_updates_display_and_notifies() {
            let changes = Arc::new(Mutex::new(Vec::new()));
            let mut control = ready_control("");
            {
                let changes = changes.clone();
                control.set_change_handler(Box::new(move |change| {
                    changes.lock().unwrap().push(change.clone());
                }));
            }

            let change = control.select(single("name")).unwrap();
            assert_eq!(change.label.as_deref(), Some("Account Name"));
            assert_eq!(control.view().display_text, "Account Name (name)");
            assert_eq!(changes.lock().unwrap().as_slice(), &[change]);
        }

        #[test]
        fn clearing_selection() {
            let mut control = ready_control("name");
            let change = control.select(single("")).unwrap();
            assert_eq!(change.label, None);
            assert_eq!(control.view().display_text, "");
        }

        #[test]
        fn rejected_while_loading() {
            let mut control = SelectorControl::new(SelectorKind::Attribute, single(""));
            control.configure(Scope::entity("account"), single(""), false);
            assert_eq!(control.select(single("name")), Err(SelectError::Loading));
        }

        #[test]
        fn rejected_when_disabled() {
            let mut control = ready_control("");
            control.configure(Scope::entity("account"), single(""), true);
            assert_eq!(control.select(single("name")), Err(SelectError::Disabled));
        }

        #[test]
        fn rejected_unknown_option() {
            let mut control = ready_control("");
            assert_eq!(
                control.select(single("nope")),
                Err(SelectError::UnknownOption("nope".into()))
            );
            assert_eq!(control.selection(), &single(""));
        }

        #[test]
        fn rejected_wrong_cardinality() {
            let mut control = ready_control("");
            assert_eq!(
                control.select(SelectionValue::Collection(vec!["name".into()])),
                Err(SelectError::CardinalityMismatch {
                    expected: Cardinality::Single,
                    actual: Cardinality::Collection,
                })
            );
        }

        #[test]
        fn collection_blank_identifiers_dropped() {
            let mut control = SelectorControl::new(
                SelectorKind::AttributeCollection,
                SelectionValue::Collection(vec![]),
            );
            let ticket = control
                .configure(Scope::entity("account"), SelectionValue::Collection(vec![]), false)
                .unwrap();
            control.complete(ticket, Resolution::loaded(items()));

            let change = control
                .select(SelectionValue::Collection(vec![
                    "accountnumber".into(),
                    " ".into(),
                    "name".into(),
                ]))
                .unwrap();
            assert_eq!(change.value.encode(), "accountnumber;name");
            assert_eq!(change.label, None);
            assert_eq!(
                control.view().display_text,
                "Account Number (accountnumber), Account Name (name)"
            );
        }
        #[test]
        fn held_stale_identifier_passes_through() {
            let held = SelectionValue::Collection(vec!["name".into(), "gone".into()]);
            let mut control = SelectorControl::new(SelectorKind::AttributeCollection, held.clone());
            let ticket = control.configure(Scope::entity("account"), held, false).unwrap();
            control.complete(ticket, Resolution::loaded(items()));

            let change = control
                .select(SelectionValue::parse(Cardinality::Collection, "name;gone;accountnumber"))
                .unwrap();
            assert_eq!(change.value.encode(), "name;gone;accountnumber");
            assert_eq!(
                control.select(SelectionValue::parse(Cardinality::Collection, "gone;other")),
                Err(SelectError::UnknownOption("other".into()))
            );
        }
    }

    mod view {
        use super::*;

        #[test]
        fn options_start_with_empty_choice() {
            let view = ready_control("").view();
            assert!(view.options[0].is_none());
            assert_eq!(view.options.len(), 3);
            assert_eq!(view.options[1].text, "Account Name (name)");
        }

        #[test]
        fn empty_list_still_has_empty_choice() {
            let view = SelectorControl::new(SelectorKind::Form, single("")).view();
            assert_eq!(view.options, vec![OptionEntry::none()]);
        }

        #[test]
        fn loading_shows_busy_label_and_disables() {
            let mut control = SelectorControl::new(SelectorKind::Entity, single(""));
            control.configure(
                Scope::catalog(Default::default(), Default::default()),
                single(""),
                false,
            );
            let view = control.view();
            assert_eq!(view.placeholder, "Loading entities...");
            assert!(view.disabled);
        }

        #[test]
        fn ready_shows_placeholder() {
            let view = ready_control("").view();
            assert_eq!(view.placeholder, "Select attribute");
            assert!(!view.disabled);
        }

        #[test]
        fn host_disabled_reflected() {
            let mut control = ready_control("");
            control.configure(Scope::entity("account"), single(""), true);
            assert!(control.view().disabled);
        }
    }
}
