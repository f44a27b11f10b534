//! host
//!
//! The boundary between a hosting runtime and a selector control.
//!
//! A host constructs one [`HostAdapter`] per control, pushes a
//! [`HostContext`] on every render, and pulls [`Outputs`] when notified.

mod adapter;
mod context;

pub use adapter::{HostAdapter, Notify};
pub use context::{HostContext, Outputs};
