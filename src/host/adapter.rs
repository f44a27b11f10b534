//! host::adapter
//!
//! The per-instance boundary a hosting runtime drives.
//!
//! # Lifecycle
//!
//! ```text
//! new -> initialize -> (render | select | poll)* -> teardown
//! ```
//!
//! The adapter owns no selection logic. It derives scope and value from each
//! pushed [`HostContext`], relays them to the [`SelectorControl`], and keeps
//! the resolves the control asks for in a queue the runtime drives with
//! [`HostAdapter::next_update`], [`HostAdapter::settle`], or
//! [`HostAdapter::poll_updates`]. Results are applied on the runtime's turn,
//! never from a background task.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tracing::info;

use super::context::{HostContext, Outputs};
use crate::selector::{
    ControlView, MetadataResolver, Resolution, ResolveTicket, SelectError, SelectionChange, SelectorControl,
    SelectorKind,
};
use crate::core::types::SelectionValue;
use crate::service::MetadataService;

/// Host callback signalling that outputs changed; the host re-reads them.
pub type Notify = Box<dyn Fn() + Send + Sync>;

type PendingResolve = BoxFuture<'static, (ResolveTicket, Resolution)>;

/// Drives one selector control on behalf of a host.
pub struct HostAdapter {
    kind: SelectorKind,
    resolver: MetadataResolver,
    control: SelectorControl,
    outputs: Arc<Mutex<Outputs>>,
    pending: FuturesUnordered<PendingResolve>,
    torn_down: bool,
}

impl std::fmt::Debug for HostAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostAdapter")
            .field("kind", &self.kind)
            .field("control", &self.control)
            .field("pending", &self.pending.len())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl HostAdapter {
    /// Create an adapter for a variant over a metadata service.
    pub fn new(kind: SelectorKind, service: Arc<dyn MetadataService>) -> Self {
        Self {
            kind,
            resolver: MetadataResolver::new(service),
            control: SelectorControl::new(kind, SelectionValue::empty(kind.cardinality())),
            outputs: Arc::new(Mutex::new(Outputs::new())),
            pending: FuturesUnordered::new(),
            torn_down: false,
        }
    }

    /// Capture the initial value and the host's notify callback.
    ///
    /// Outputs start out as the host's own value, normalized for collections,
    /// so a host that reads before any interaction gets its value back.
    pub fn initialize(&mut self, ctx: &HostContext, notify: Notify) {
        let binding = self.kind.binding();
        let initial = ctx.selection_for(self.kind);

        {
            let mut outputs = self.lock_outputs();
            outputs.clear();
            outputs.insert(binding.value.to_string(), initial.encode());
            if let Some(label_output) = binding.label_output {
                outputs.insert(label_output.to_string(), ctx.raw(label_output).to_string());
            }
        }

        self.control = SelectorControl::new(self.kind, initial);

        let outputs = Arc::clone(&self.outputs);
        self.control.set_change_handler(Box::new(move |change: &SelectionChange| {
            {
                let mut outputs = outputs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                outputs.insert(binding.value.to_string(), change.value.encode());
                if let Some(label_output) = binding.label_output {
                    outputs.insert(label_output.to_string(), change.label.clone().unwrap_or_default());
                }
            }
            notify();
        }));
    }

    /// Re-derive scope and value from the latest configuration and return
    /// what to draw.
    ///
    /// Safe to call as often as the host likes; a resolve is queued only when
    /// the scope actually changed.
    pub fn render(&mut self, ctx: &HostContext) -> ControlView {
        if !self.torn_down {
            let scope = ctx.scope_for(self.kind);
            let value = ctx.selection_for(self.kind);
            if let Some(ticket) = self.control.configure(scope, value, ctx.disabled) {
                self.enqueue(ticket);
            }
        }
        self.control.view()
    }

    fn enqueue(&mut self, ticket: ResolveTicket) {
        let resolver = self.resolver.clone();
        let kind = self.kind;
        self.pending.push(
            async move {
                let resolution = resolver.resolve(kind, ticket.scope()).await;
                (ticket, resolution)
            }
            .boxed(),
        );
    }

    /// Apply a user selection.
    ///
    /// On success the bound output is updated and the host is notified before
    /// this returns.
    pub fn select(&mut self, value: SelectionValue) -> Result<SelectionChange, SelectError> {
        if self.torn_down {
            return Err(SelectError::TornDown);
        }
        self.control.select(value)
    }

    /// Apply a user selection given in the host's string form.
    pub fn select_raw(&mut self, raw: &str) -> Result<SelectionChange, SelectError> {
        self.select(SelectionValue::parse(self.kind.cardinality(), raw))
    }

    /// The bound outputs as the host should persist them.
    pub fn current_outputs(&self) -> Outputs {
        self.lock_outputs().clone()
    }

    /// Wait for the next queued resolve and apply it.
    ///
    /// Returns `None` when nothing is pending, otherwise whether the result
    /// was current (`false` means it was superseded and discarded).
    pub async fn next_update(&mut self) -> Option<bool> {
        let (ticket, resolution) = self.pending.next().await?;
        Some(self.control.complete(ticket, resolution))
    }

    /// Run every queued resolve to completion. Returns how many were applied.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while let Some(current) = self.next_update().await {
            if current {
                applied += 1;
            }
        }
        applied
    }

    /// Apply whatever resolves have already finished, without waiting.
    pub fn poll_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Some(Some((ticket, resolution))) = self.pending.next().now_or_never() {
            if self.control.complete(ticket, resolution) {
                applied += 1;
            }
        }
        applied
    }

    /// Check whether any resolve is still queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Release pending work. No callback fires afterwards.
    pub fn teardown(&mut self) {
        if !self.pending.is_empty() {
            info!(kind = %self.kind, pending = self.pending.len(), "dropping pending resolves");
        }
        self.pending = FuturesUnordered::new();
        self.control.clear_change_handler();
        self.torn_down = true;
    }

    /// Check whether the adapter has been torn down.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current snapshot without re-reading configuration.
    pub fn view(&self) -> ControlView {
        self.control.view()
    }

    /// The wrapped control.
    pub fn control(&self) -> &SelectorControl {
        &self.control
    }

    fn lock_outputs(&self) -> MutexGuard<'_, Outputs> {
        self.outputs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
