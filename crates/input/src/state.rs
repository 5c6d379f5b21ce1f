use crate::action::Action;
use glam::Vec2;

/// Held-key state. Changes only on key-down/key-up edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub running: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release edge for `action`.
    pub fn apply(&mut self, action: Action, pressed: bool) {
        let flag = match action {
            Action::MoveForward => &mut self.forward,
            Action::MoveBackward => &mut self.backward,
            Action::MoveLeft => &mut self.left,
            Action::MoveRight => &mut self.right,
            Action::Run => &mut self.running,
        };
        *flag = pressed;
    }

    /// Feed a physical key edge. Returns `false` for keys with no binding.
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        match Action::from_key_code(code) {
            Some(action) => {
                self.apply(action, pressed);
                true
            }
            None => false,
        }
    }

    /// Either forward or backward is held.
    pub fn longitudinal_held(&self) -> bool {
        self.forward || self.backward
    }

    /// Either left or right is held.
    pub fn lateral_held(&self) -> bool {
        self.left || self.right
    }

    pub fn move_vector(&self) -> MoveVector {
        MoveVector::from_state(self)
    }
}

/// Direction requested by the held keys: `x` is lateral (right positive),
/// `y` is longitudinal (forward positive). Unit length or zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveVector(pub Vec2);

impl MoveVector {
    pub const ZERO: MoveVector = MoveVector(Vec2::ZERO);

    pub fn from_state(state: &InputState) -> Self {
        let lateral = axis(state.right, state.left);
        let longitudinal = axis(state.forward, state.backward);
        let raw = Vec2::new(lateral, longitudinal);
        // Opposing or absent keys leave a zero vector, which must not be normalized.
        if raw == Vec2::ZERO {
            Self::ZERO
        } else {
            Self(raw.normalize())
        }
    }

    pub fn lateral(&self) -> f32 {
        self.0.x
    }

    pub fn longitudinal(&self) -> f32 {
        self.0.y
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> impl Iterator<Item = InputState> {
        (0u8..32).map(|bits| InputState {
            forward: bits & 1 != 0,
            backward: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
            running: bits & 16 != 0,
        })
    }

    #[test]
    fn press_and_release_edges() {
        let mut s = InputState::new();
        assert!(s.handle_key("KeyW", true));
        assert!(s.handle_key("ShiftRight", true));
        assert!(s.forward && s.running);

        assert!(s.handle_key("KeyW", false));
        assert!(!s.forward);
        assert!(s.running);

        assert!(!s.handle_key("KeyQ", true));
        assert_eq!(
            s,
            InputState {
                running: true,
                ..InputState::default()
            }
        );
    }

    #[test]
    fn no_keys_is_zero() {
        assert_eq!(InputState::new().move_vector(), MoveVector::ZERO);
    }

    #[test]
    fn opposing_keys_cancel() {
        let s = InputState {
            forward: true,
            backward: true,
            left: true,
            right: true,
            running: false,
        };
        assert_eq!(s.move_vector(), MoveVector::ZERO);
    }

    #[test]
    fn nonzero_vectors_have_unit_length() {
        for state in all_states() {
            let v = state.move_vector();
            assert!(!v.0.is_nan());
            if v != MoveVector::ZERO {
                assert!((v.0.length() - 1.0).abs() < 1e-6, "{state:?}");
            }
        }
    }

    #[test]
    fn diagonal_is_not_faster() {
        let diagonal = InputState {
            forward: true,
            right: true,
            ..InputState::default()
        }
        .move_vector();
        let axial = InputState {
            forward: true,
            ..InputState::default()
        }
        .move_vector();
        assert!((diagonal.0.length() - axial.0.length()).abs() < 1e-6);
        assert!(diagonal.lateral() > 0.0 && diagonal.longitudinal() > 0.0);
    }

    #[test]
    fn axis_signs() {
        let s = InputState {
            backward: true,
            left: true,
            ..InputState::default()
        };
        let v = s.move_vector();
        assert!(v.lateral() < 0.0);
        assert!(v.longitudinal() < 0.0);
        assert!(s.longitudinal_held() && s.lateral_held());
    }
}
