//! Edit-mode gate
//!
//! A two-bit state machine with three reachable states: Locked,
//! Unlocked/ViewOnly, and Unlocked/Editing. Only Unlocked/Editing permits
//! reverting an already-completed class.
//!
//! The secret compare is a plain string equality with no lockout or backoff.
//! This is a UX soft-lock against accidental un-checking on a shared device,
//! not a security boundary: anyone with access to the data files can edit
//! them directly.

use crate::error::TrackerError;

/// The three reachable gate states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Initial state: completed→pending transitions rejected
    Locked,
    /// Secret accepted, editing still off; mutation policy as in `Locked`
    ViewOnly,
    /// Completed→pending transitions permitted
    Editing,
}

/// Gate guarding the "undo" direction of progress mutations
#[derive(Debug, Clone)]
pub struct EditGate {
    secret: String,
    unlocked: bool,
    editing: bool,
}

impl EditGate {
    /// Create a locked gate with the given shared secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into(), unlocked: false, editing: false }
    }

    /// Compare the secret and unlock on a match
    ///
    /// A wrong secret reports `WrongSecret` and leaves the gate locked.
    /// Unlocking lands in ViewOnly; editing stays off until toggled.
    pub fn attempt_unlock(&mut self, secret: &str) -> Result<(), TrackerError> {
        if secret == self.secret {
            self.unlocked = true;
            Ok(())
        } else {
            Err(TrackerError::WrongSecret)
        }
    }

    /// Toggle edit mode; only legal once unlocked
    ///
    /// Returns the new editing state.
    pub fn toggle_edit(&mut self) -> Result<bool, TrackerError> {
        if !self.unlocked {
            return Err(TrackerError::NotUnlocked);
        }
        self.editing = !self.editing;
        Ok(self.editing)
    }

    /// Drop back to Locked, forcing edit mode off
    pub fn lock(&mut self) {
        self.unlocked = false;
        self.editing = false;
    }

    /// Whether the secret has been accepted
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether completed→pending transitions are currently permitted
    pub fn can_revert(&self) -> bool {
        self.editing
    }

    /// Current state, for display
    pub fn state(&self) -> GateState {
        match (self.unlocked, self.editing) {
            (false, _) => GateState::Locked,
            (true, false) => GateState::ViewOnly,
            (true, true) => GateState::Editing,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starts_locked() {
        let gate = EditGate::new("sesame");
        assert_eq!(gate.state(), GateState::Locked);
        assert!(!gate.can_revert());
    }

    #[test]
    fn wrong_secret_stays_locked() {
        let mut gate = EditGate::new("sesame");
        assert_eq!(gate.attempt_unlock("open"), Err(TrackerError::WrongSecret));
        assert_eq!(gate.state(), GateState::Locked);
    }

    #[test]
    fn unlock_lands_in_view_only() {
        let mut gate = EditGate::new("sesame");
        gate.attempt_unlock("sesame").unwrap();
        assert_eq!(gate.state(), GateState::ViewOnly);
        assert!(!gate.can_revert());
    }

    #[test]
    fn toggle_edit_requires_unlock() {
        let mut gate = EditGate::new("sesame");
        assert_eq!(gate.toggle_edit(), Err(TrackerError::NotUnlocked));

        gate.attempt_unlock("sesame").unwrap();
        assert_eq!(gate.toggle_edit(), Ok(true));
        assert_eq!(gate.state(), GateState::Editing);
        assert!(gate.can_revert());

        assert_eq!(gate.toggle_edit(), Ok(false));
        assert_eq!(gate.state(), GateState::ViewOnly);
    }

    #[test]
    fn lock_forces_edit_mode_off() {
        let mut gate = EditGate::new("sesame");
        gate.attempt_unlock("sesame").unwrap();
        gate.toggle_edit().unwrap();

        gate.lock();
        assert_eq!(gate.state(), GateState::Locked);
        assert!(!gate.can_revert());
    }
}
