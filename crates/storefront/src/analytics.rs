//! Analytics event tracking.
//!
//! Handlers report coarse behavioral events through a [`Tracker`]; the sink
//! behind it decides where they go. The default [`LogSink`] writes them to
//! the tracing pipeline under the `liteshop::analytics` target, which keeps
//! the storefront free of third-party pixels while preserving the event
//! stream.

use std::sync::Arc;

use liteshop_core::ProductId;

/// A tracked storefront event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A full grid page was served.
    PageView,
    /// A cart mutation was applied; `quantity` is the resulting line
    /// quantity (0 when the line was removed).
    CartUpdate { id: ProductId, quantity: u32 },
}

/// Destination for tracked events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &Event);
}

/// Sink that emits events as structured log lines.
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: &Event) {
        match event {
            Event::PageView => {
                tracing::info!(target: "liteshop::analytics", event = "page_view");
            }
            Event::CartUpdate { id, quantity } => {
                tracing::info!(
                    target: "liteshop::analytics",
                    event = "cart_update",
                    product = %id,
                    quantity,
                );
            }
        }
    }
}

/// Cheaply cloneable handle for reporting events.
#[derive(Clone)]
pub struct Tracker {
    sink: Arc<dyn EventSink>,
}

impl Tracker {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn page_view(&self) {
        self.sink.record(&Event::PageView);
    }

    pub fn cart_update(&self, id: &ProductId, quantity: u32) {
        self.sink.record(&Event::CartUpdate {
            id: id.clone(),
            quantity,
        });
    }
}
