//! Entity-change notification.

/// Informed after each successful commit of which entity ids changed, for
/// downstream sig-impact and reconnection bookkeeping.
pub trait EntityChangeObserver<K> {
    fn entities_changed(&mut self, ids: &[K]);
}
