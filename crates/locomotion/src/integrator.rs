use crate::config::LocomotionConfig;
use crate::desktop::DesktopLocomotion;
use crate::rig::RigMotion;
use crate::vr::VrLocomotion;
use glam::Quat;
use walkabout_input::{InputState, PRIMARY_CONTROLLER, XrEvent, XrSession};

/// Which locomotion mode ran on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Desktop,
    Vr,
}

/// Per-frame input, tagged by mode. Exactly one variant drives a frame.
#[derive(Debug, Clone, Copy)]
pub enum FrameInput<'a> {
    Desktop(&'a InputState),
    Vr { controller: Option<Quat> },
}

impl<'a> FrameInput<'a> {
    /// Select the mode from the session's presentation status.
    pub fn select(input: &'a InputState, xr: &(impl XrSession + ?Sized)) -> Self {
        if xr.is_presenting() {
            FrameInput::Vr {
                controller: xr.controller_orientation(PRIMARY_CONTROLLER),
            }
        } else {
            FrameInput::Desktop(input)
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            FrameInput::Desktop(_) => Mode::Desktop,
            FrameInput::Vr { .. } => Mode::Vr,
        }
    }
}

/// Owns both mode states and dispatches one of them per frame.
///
/// Desktop velocity is left untouched while in XR and picks up from its
/// last value once desktop mode returns.
#[derive(Debug, Clone, Default)]
pub struct Locomotion {
    config: LocomotionConfig,
    desktop: DesktopLocomotion,
    vr: VrLocomotion,
    mode: Option<Mode>,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn desktop(&self) -> &DesktopLocomotion {
        &self.desktop
    }

    pub fn vr(&self) -> &VrLocomotion {
        &self.vr
    }

    /// Mode of the most recent frame, `None` before the first update.
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn handle_xr_event(&mut self, event: XrEvent) {
        self.vr.handle_event(event);
    }

    /// Integrate one frame of `delta` seconds.
    pub fn update(&mut self, delta: f32, frame: FrameInput<'_>) -> RigMotion {
        let mode = frame.mode();
        if self.mode != Some(mode) {
            tracing::info!(?mode, "locomotion mode");
            self.mode = Some(mode);
        }

        match frame {
            FrameInput::Desktop(input) => {
                // No session is presenting, so no select can be in progress,
                // including one that began and ended between two frames.
                self.vr.set_trigger(false);
                self.desktop.step(&self.config, input, delta)
            }
            FrameInput::Vr { controller } => self.vr.step(&self.config, controller, delta),
        }
    }

    /// Select the mode from `xr` and integrate one frame.
    pub fn update_with_session(
        &mut self,
        delta: f32,
        input: &InputState,
        xr: &(impl XrSession + ?Sized),
    ) -> RigMotion {
        self.update(delta, FrameInput::select(input, xr))
    }
}
