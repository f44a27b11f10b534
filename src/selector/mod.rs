//! selector
//!
//! Metadata-backed selector controls.
//!
//! # Architecture
//!
//! One generic control serves every variant:
//!
//! - [`kind`]: the variant table (query, record shape, cardinality, host params)
//! - [`scope`]: the parameters narrowing a resolve
//! - [`resolver`]: fetch and normalize, never failing outward
//! - [`reconcile`]: selection to display text
//! - [`control`]: the state machine tying them together
//!
//! The control itself performs no I/O. It hands out [`ResolveTicket`]s and
//! accepts [`Resolution`]s back, so it can be driven synchronously in tests
//! and asynchronously by [`crate::host::HostAdapter`].

pub mod control;
pub mod kind;
pub mod reconcile;
pub mod resolver;
pub mod scope;

pub use control::{
    ChangeHandler, ControlPhase, ControlView, OptionEntry, ResolveTicket, SelectError, SelectionChange,
    SelectorControl,
};
pub use kind::{SelectorKind, UnknownKind};
pub use reconcile::{reconcile, DisplayState};
pub use resolver::{MetadataResolver, Resolution, ResolveStatus};
pub use scope::{ActivityFilter, Scope};
