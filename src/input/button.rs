//! Edge-tracked button state

/// Button press state with per-frame edge detection
///
/// Consumers care not just about the current value but about the exact
/// frame in which it changed; the two edge variants carry that frame
/// marker and [`advance`](ButtonState::advance) retires them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    /// Pressed this frame (edge)
    JustPressed,
    /// Held down (multiple frames)
    Pressed,
    /// Released this frame (edge)
    JustReleased,
}

impl ButtonState {
    /// Apply a down/up observation from a platform event
    ///
    /// Produces an edge only when the observation differs from the
    /// current down-ness; repeated observations of the same value are
    /// absorbed without disturbing an edge already set this frame.
    pub fn update(&mut self, down: bool) {
        if down != self.is_down() {
            *self = if down {
                Self::JustPressed
            } else {
                Self::JustReleased
            };
        }
    }

    /// Advance state for next frame (transitions edges to steady states)
    ///
    /// Must be called exactly once per frame, after all updates for that
    /// frame and before the next frame's updates; any other ordering
    /// merges or drops edges.
    pub fn advance(self) -> Self {
        match self {
            Self::JustPressed => Self::Pressed,
            Self::JustReleased => Self::Released,
            state => state,
        }
    }

    /// Returns true if button is currently down (just pressed or held)
    pub fn is_down(self) -> bool {
        matches!(self, Self::JustPressed | Self::Pressed)
    }

    /// Returns true if button was just pressed this frame
    pub fn is_just_pressed(self) -> bool {
        matches!(self, Self::JustPressed)
    }

    /// Returns true if button was just released this frame
    pub fn is_just_released(self) -> bool {
        matches!(self, Self::JustReleased)
    }
}
