//! Generation tokens for discarding stale asynchronous results.
//!
//! Every fetch or commit issued for an image captures a [`RequestTicket`].
//! Navigating to a different image bumps the generation, so a response that
//! arrives afterwards carries a ticket that no longer matches and is dropped
//! instead of being applied to the wrong working set.

use crate::id::ImageId;
use serde::{Deserialize, Serialize};

/// Monotonic counter, bumped whenever the active image changes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

/// Identifies which image (and which visit of it) a request belongs to.
///
/// Serializable so a browser host can hold it across an `await`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTicket {
    pub image_id: Option<ImageId>,
    pub generation: Generation,
}

/// Issues tickets and validates them against the current generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Generation,
    image_id: Option<ImageId>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    /// The active image moved (or the queue was reloaded).
    pub fn advance(&mut self, image_id: Option<ImageId>) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.image_id = image_id;
        self.current
    }

    /// A ticket for a request issued now.
    pub fn ticket(&self) -> RequestTicket {
        RequestTicket {
            image_id: self.image_id,
            generation: self.current,
        }
    }

    /// Whether a result tagged with `ticket` may still be applied.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.current && ticket.image_id == self.image_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_goes_stale_after_navigation() {
        let mut g = GenerationCounter::new();
        g.advance(Some(ImageId(1)));
        let t = g.ticket();
        assert!(g.is_current(&t));

        g.advance(Some(ImageId(2)));
        assert!(!g.is_current(&t));
        assert!(g.is_current(&g.ticket()));
    }

    #[test]
    fn revisiting_the_same_image_still_invalidates() {
        let mut g = GenerationCounter::new();
        g.advance(Some(ImageId(1)));
        let t = g.ticket();
        g.advance(Some(ImageId(2)));
        g.advance(Some(ImageId(1)));
        assert!(!g.is_current(&t));
    }
}
