/// A movement action produced by a held key.
///
/// Physical key identifiers (`KeyW`, `ShiftLeft`, ...) are layout
/// independent, so WASD stays in place on AZERTY keyboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    /// Run modifier; multiplies walk speed while held.
    Run,
}

impl Action {
    /// Map a physical key identifier to its action. Unbound keys yield `None`.
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Self::MoveForward),
            "KeyS" => Some(Self::MoveBackward),
            "KeyA" => Some(Self::MoveLeft),
            "KeyD" => Some(Self::MoveRight),
            "ShiftLeft" | "ShiftRight" => Some(Self::Run),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_bindings() {
        assert_eq!(Action::from_key_code("KeyW"), Some(Action::MoveForward));
        assert_eq!(Action::from_key_code("KeyS"), Some(Action::MoveBackward));
        assert_eq!(Action::from_key_code("KeyA"), Some(Action::MoveLeft));
        assert_eq!(Action::from_key_code("KeyD"), Some(Action::MoveRight));
    }

    #[test]
    fn both_shift_keys_run() {
        assert_eq!(Action::from_key_code("ShiftLeft"), Some(Action::Run));
        assert_eq!(Action::from_key_code("ShiftRight"), Some(Action::Run));
    }

    #[test]
    fn unbound_keys_ignored() {
        for code in ["KeyQ", "Space", "ArrowUp", "w", "", "keyw"] {
            assert_eq!(Action::from_key_code(code), None, "{code}");
        }
    }
}
