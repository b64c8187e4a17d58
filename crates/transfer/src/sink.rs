use courier_protocol::TransferEvent;

/// Where transfer events go.
///
/// The engine never knows who listens; the embedding application plugs in
/// whatever it broadcasts with (a push socket, a log, a test collector).
/// Emission happens on the worker's own task, so implementations must not
/// block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TransferEvent);
}

/// Plain closures work as sinks. Feeding a channel is a closure over its
/// sender; a send that fails because nobody listens is the closure's
/// business, never the worker's.
impl<F> EventSink for F
where
    F: Fn(TransferEvent) + Send + Sync,
{
    fn emit(&self, event: TransferEvent) {
        self(event)
    }
}
