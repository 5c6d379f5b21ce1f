use glam::Quat;

/// Index of the controller whose pointing direction drives locomotion.
pub const PRIMARY_CONTROLLER: usize = 0;

/// Controllers an emulated session tracks, one per hand.
pub const MAX_CONTROLLERS: usize = 2;

/// Controller select (trigger) edges delivered by an XR session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrEvent {
    SelectStart { controller: usize },
    SelectEnd { controller: usize },
}

/// The parts of an XR runtime that locomotion reads each frame.
pub trait XrSession {
    /// Whether an immersive session is currently presenting frames.
    fn is_presenting(&self) -> bool;

    /// Current orientation of controller `index`, if it is tracked.
    fn controller_orientation(&self, index: usize) -> Option<Quat>;
}

/// No XR runtime. Never presents, so locomotion stays in desktop mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoXr;

impl XrSession for NoXr {
    fn is_presenting(&self) -> bool {
        false
    }

    fn controller_orientation(&self, _index: usize) -> Option<Quat> {
        None
    }
}

/// Desktop stand-in for a headset: presentation is toggled by hand and
/// controller poses are written by the host each frame.
#[derive(Debug, Clone, Default)]
pub struct EmulatedXr {
    presenting: bool,
    controllers: [Option<Quat>; MAX_CONTROLLERS],
}

impl EmulatedXr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_presenting(&mut self, presenting: bool) {
        if self.presenting != presenting {
            tracing::info!(presenting, "emulated xr session");
        }
        self.presenting = presenting;
    }

    /// Flip presentation and return the new state.
    pub fn toggle_presenting(&mut self) -> bool {
        self.set_presenting(!self.presenting);
        self.presenting
    }

    /// Track controller `index`. Indices past [`MAX_CONTROLLERS`] are ignored.
    pub fn set_controller_orientation(&mut self, index: usize, orientation: Quat) {
        match self.controllers.get_mut(index) {
            Some(slot) => *slot = Some(orientation),
            None => tracing::debug!(index, "ignoring pose for unknown controller"),
        }
    }

    /// Stop tracking controller `index`.
    pub fn lose_controller(&mut self, index: usize) {
        if let Some(slot) = self.controllers.get_mut(index) {
            *slot = None;
        }
    }
}

impl XrSession for EmulatedXr {
    fn is_presenting(&self) -> bool {
        self.presenting
    }

    fn controller_orientation(&self, index: usize) -> Option<Quat> {
        self.controllers.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_xr_never_presents() {
        assert!(!NoXr.is_presenting());
        assert_eq!(NoXr.controller_orientation(PRIMARY_CONTROLLER), None);
    }

    #[test]
    fn emulated_toggle() {
        let mut xr = EmulatedXr::new();
        assert!(!xr.is_presenting());
        assert!(xr.toggle_presenting());
        assert!(xr.is_presenting());
        assert!(!xr.toggle_presenting());
    }

    #[test]
    fn emulated_controller_tracking() {
        let mut xr = EmulatedXr::new();
        assert_eq!(xr.controller_orientation(1), None);

        let q = Quat::from_rotation_y(0.5);
        xr.set_controller_orientation(1, q);
        assert_eq!(xr.controller_orientation(0), None);
        assert_eq!(xr.controller_orientation(1), Some(q));

        xr.lose_controller(1);
        assert_eq!(xr.controller_orientation(1), None);
        xr.lose_controller(7);
    }

    #[test]
    fn out_of_range_controller_is_ignored() {
        let mut xr = EmulatedXr::new();
        let q = Quat::from_rotation_x(0.3);
        xr.set_controller_orientation(MAX_CONTROLLERS, q);
        xr.set_controller_orientation(usize::MAX, q);
        assert_eq!(xr.controller_orientation(MAX_CONTROLLERS), None);
        assert_eq!(xr.controller_orientation(usize::MAX), None);
        assert_eq!(xr.controller_orientation(PRIMARY_CONTROLLER), None);
    }
}
