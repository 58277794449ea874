use crate::domain::Lead;

/// Receives every newly created lead, once, right after it is built.
///
/// Implementations must return without waiting on I/O; whatever they do with
/// the lead happens on their own time and never reports back to the caller.
pub trait LeadSink: Send + Sync {
    fn dispatch(&self, lead: &Lead);
}

/// Sink that drops every lead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LeadSink for NoopSink {
    fn dispatch(&self, _lead: &Lead) {}
}
