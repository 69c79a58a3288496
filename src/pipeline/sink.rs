//! Downstream receivers for re-split units.

use super::Unit;
use tokio::sync::mpsc::UnboundedSender;

/// Receives units one at a time, then a single end-of-sequence signal.
///
/// `end` is only called after a successful flush; a failed flush emits
/// nothing and never ends the sequence.
pub trait UnitSink {
    fn emit(&mut self, unit: Unit);

    fn end(&mut self) {}
}

impl UnitSink for Vec<Unit> {
    #[inline]
    fn emit(&mut self, unit: Unit) {
        self.push(unit);
    }
}

/// Forwards units into a channel; `end` closes it.
///
/// The receiver observes end-of-sequence as `recv()` returning `None`
/// right after the last unit, without waiting for the caller to drop
/// the sink.
pub struct ChannelSink {
    tx: Option<UnboundedSender<Unit>>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Unit>) -> Self {
        Self { tx: Some(tx) }
    }
}

impl UnitSink for ChannelSink {
    fn emit(&mut self, unit: Unit) {
        if let Some(tx) = &self.tx
            && tx.send(unit).is_err()
        {
            crate::debug!("batch"; "receiver dropped, discarding unit");
        }
    }

    fn end(&mut self) {
        self.tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_channel_sink_closes_on_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(tx);

        sink.emit(Unit::new("a.less", "a"));
        sink.end();

        assert_eq!(rx.recv().await.map(|u| u.name), Some("a.less".to_string()));
        assert!(rx.recv().await.is_none());
        // sink is still alive here; the channel is already closed
        drop(sink);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<Unit> = Vec::new();
        sink.emit(Unit::new("a.less", "a"));
        sink.end();
        assert_eq!(sink.len(), 1);
    }
}
