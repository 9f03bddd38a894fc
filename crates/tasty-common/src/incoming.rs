use std::collections::VecDeque;

/// Error returned when a round expects a message the peer did not send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected a message from the peer but none was received")]
pub struct MissingMessage;

/// Messages received from the peer and not yet consumed.
///
/// The buffer persists across rounds, so messages addressed to a padded round are seen by the
/// next round which runs.
#[derive(Debug)]
pub struct Incoming<M> {
    queue: VecDeque<M>,
}

impl<M> Default for Incoming<M> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<M> Incoming<M> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, msg: M) {
        self.queue.push_back(msg);
    }

    /// Takes the oldest message.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<M> {
        self.queue.pop_front()
    }

    /// Takes the oldest message, failing if there is none.
    pub fn expect_next(&mut self) -> Result<M, MissingMessage> {
        self.queue.pop_front().ok_or(MissingMessage)
    }

    /// Takes all buffered messages.
    pub fn drain(&mut self) -> impl Iterator<Item = M> + '_ {
        self.queue.drain(..)
    }

    /// Returns the number of buffered messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no message is buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Moves every message accepted by `f` into `target`, keeping the others in order.
    ///
    /// Used to feed a nested protocol from the messages of its parent.
    pub fn forward<N>(&mut self, target: &mut Incoming<N>, mut f: impl FnMut(M) -> Result<N, M>) {
        let mut rest = VecDeque::with_capacity(self.queue.len());
        for msg in self.queue.drain(..) {
            match f(msg) {
                Ok(msg) => target.push(msg),
                Err(msg) => rest.push_back(msg),
            }
        }
        self.queue = rest;
    }
}

impl<M> Extend<M> for Incoming<M> {
    fn extend<T: IntoIterator<Item = M>>(&mut self, iter: T) {
        self.queue.extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_order() {
        let mut incoming = Incoming::new();
        incoming.extend([1, 2, 3]);

        assert_eq!(incoming.next(), Some(1));
        assert_eq!(incoming.expect_next(), Ok(2));
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming.drain().collect::<Vec<_>>(), vec![3]);
        assert_eq!(incoming.expect_next(), Err(MissingMessage));
    }

    #[test]
    fn test_incoming_forward() {
        let mut incoming = Incoming::new();
        incoming.extend([1u8, 10, 2, 20, 3]);
        let mut small = Incoming::new();
        small.push(0u16);

        incoming.forward(&mut small, |msg| if msg < 10 { Ok(msg as u16) } else { Err(msg) });

        assert_eq!(small.drain().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(incoming.drain().collect::<Vec<_>>(), vec![10, 20]);
    }
}
