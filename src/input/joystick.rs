//! Joystick records and hot-plug lifecycle
//!
//! Joysticks are keyed by the platform's stable instance id. A record is
//! created the first time an id is seen and kept for the process
//! lifetime; disconnecting only detaches the native handle, so state
//! survives a remove-then-add cycle of the same device.

use glam::Vec2;
use tracing::error;

use super::button::ButtonState;

/// Maximum magnitude (+/-) generated by platform joystick axis events
pub const JOYSTICK_AXIS_RANGE: f32 = 32767.0;

/// Platform-stable joystick instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoystickId(pub u32);

/// Opaque handle to an open platform joystick device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHandle(pub u64);

/// Enumerates the physically connected joysticks
///
/// The platform layer implements this; the registry reconciles its
/// records against [`connected`](JoystickBackend::connected) whenever a
/// device-added or device-removed event arrives.
pub trait JoystickBackend {
    fn connected(&mut self) -> Vec<(JoystickId, NativeHandle)>;
}

/// Per-device input state, retained for the process lifetime
#[derive(Debug, Clone, Default)]
pub struct Joystick {
    handle: Option<NativeHandle>,
    buttons: Vec<ButtonState>,
    axes: Vec<f32>,
    hats: Vec<Vec2>,
}

impl Joystick {
    /// Normalize and store a raw axis value, in [-1, 1] by construction
    pub fn set_axis(&mut self, axis: usize, raw: i16) {
        if self.axes.len() <= axis {
            self.axes.resize(axis + 1, 0.0);
        }
        self.axes[axis] = raw as f32 / JOYSTICK_AXIS_RANGE;
    }

    /// Store a hat direction from its raw platform mask
    pub fn set_hat(&mut self, hat: usize, raw: u8) {
        if self.hats.len() <= hat {
            self.hats.resize(hat + 1, Vec2::ZERO);
        }
        self.hats[hat] = hat_to_vector(raw);
    }

    /// Button state by index, growing the array on first reference
    pub fn button_mut(&mut self, index: usize) -> &mut ButtonState {
        if self.buttons.len() <= index {
            self.buttons.resize(index + 1, ButtonState::Released);
        }
        &mut self.buttons[index]
    }

    pub fn button(&self, index: usize) -> ButtonState {
        self.buttons.get(index).copied().unwrap_or_default()
    }

    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    pub fn hat(&self, index: usize) -> Vec2 {
        self.hats.get(index).copied().unwrap_or(Vec2::ZERO)
    }

    pub fn buttons(&self) -> &[ButtonState] {
        &self.buttons
    }

    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    pub fn hats(&self) -> &[Vec2] {
        &self.hats
    }

    /// Handle of the open device, `None` while disconnected
    pub fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn set_handle(&mut self, handle: NativeHandle) {
        self.handle = Some(handle);
    }

    pub(crate) fn clear_handle(&mut self) {
        self.handle = None;
    }

    /// Advance every button for the next frame
    pub(crate) fn advance(&mut self) {
        for button in &mut self.buttons {
            *button = button.advance();
        }
    }

    /// Release all buttons; axes and hats keep their last reported values
    pub(crate) fn reset(&mut self) {
        for button in &mut self.buttons {
            *button = ButtonState::Released;
        }
    }
}

/// Platform hat direction masks (up/right/down/left bits)
pub const HAT_CENTERED: u8 = 0;
pub const HAT_UP: u8 = 1;
pub const HAT_RIGHT: u8 = 2;
pub const HAT_DOWN: u8 = 4;
pub const HAT_LEFT: u8 = 8;
pub const HAT_RIGHT_UP: u8 = HAT_RIGHT | HAT_UP;
pub const HAT_RIGHT_DOWN: u8 = HAT_RIGHT | HAT_DOWN;
pub const HAT_LEFT_UP: u8 = HAT_LEFT | HAT_UP;
pub const HAT_LEFT_DOWN: u8 = HAT_LEFT | HAT_DOWN;

/// Convert a platform hat mask into a 2d direction vector
///
/// Up is -y, matching window coordinates. A mask outside the 9 valid
/// directions logs an error and reads as centered; a bad hat value must
/// not fail the dispatch.
pub fn hat_to_vector(raw: u8) -> Vec2 {
    match raw {
        HAT_CENTERED => Vec2::ZERO,
        HAT_UP => Vec2::new(0.0, -1.0),
        HAT_RIGHT_UP => Vec2::new(1.0, -1.0),
        HAT_RIGHT => Vec2::new(1.0, 0.0),
        HAT_RIGHT_DOWN => Vec2::new(1.0, 1.0),
        HAT_DOWN => Vec2::new(0.0, 1.0),
        HAT_LEFT_DOWN => Vec2::new(-1.0, 1.0),
        HAT_LEFT => Vec2::new(-1.0, 0.0),
        HAT_LEFT_UP => Vec2::new(-1.0, -1.0),
        _ => {
            error!(mask = raw, "unrecognized joystick hat value");
            Vec2::ZERO
        }
    }
}
