//! Two-step confirmation for irreversible actions.
//!
//! The action is parked in `Awaiting` until the user confirms or dismisses
//! it. Nothing happens on `request` alone.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Confirmation<A> {
    #[default]
    Idle,
    Awaiting(A),
}

impl<A> Confirmation<A> {
    /// Park `action`, replacing any earlier unanswered request.
    pub fn request(&mut self, action: A) {
        *self = Confirmation::Awaiting(action);
    }

    pub fn pending(&self) -> Option<&A> {
        match self {
            Confirmation::Awaiting(a) => Some(a),
            Confirmation::Idle => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, Confirmation::Awaiting(_))
    }

    /// User said yes: hand the action back for execution.
    pub fn confirm(&mut self) -> Option<A> {
        match std::mem::replace(self, Confirmation::Idle) {
            Confirmation::Awaiting(a) => Some(a),
            Confirmation::Idle => None,
        }
    }

    /// User said no. Returns whether a request was dropped.
    pub fn dismiss(&mut self) -> bool {
        let was = self.is_awaiting();
        *self = Confirmation::Idle;
        was
    }
}
