//! Platform event model
//!
//! The tagged union the frame driver consumes, plus the small payload
//! types shared across event kinds. Joystick events reference ids from
//! [`super::joystick`]; the Android gamepad path has its own record type
//! and queue in [`super::gamepad`] because it arrives on another thread.

use glam::{IVec2, UVec2, Vec2};
use winit::keyboard::KeyCode;

use super::joystick::JoystickId;

/// Keyboard modifiers at the time of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

impl MouseButton {
    /// Pointer slot this button's state lands in
    ///
    /// The left button shares slot 0 with the cursor position, so code
    /// written against pointer 0 works for both mouse and first touch.
    pub fn pointer_index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Other(n) => 3 + n as usize,
        }
    }
}

/// One event popped from the platform queue
///
/// Dispatch is a total match over this tag set; kinds the driver does
/// not understand arrive as [`PlatformEvent::Unknown`] and are logged
/// and skipped rather than failing the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Host asked the application to quit
    Quit,
    /// Key state change
    Key {
        key: KeyCode,
        pressed: bool,
        repeat: bool,
        modifiers: Modifiers,
    },
    /// New touch contact
    TouchDown { id: u64, position: Vec2 },
    /// Touch contact ended
    TouchUp { id: u64, position: Vec2 },
    /// Touch contact moved
    TouchMotion { id: u64, position: Vec2 },
    /// Mouse button state change
    ///
    /// `position` is `None` when the platform could not resolve a focus
    /// window for the event; the cursor position is left untouched then.
    MouseButton {
        button: MouseButton,
        pressed: bool,
        position: Option<IVec2>,
    },
    /// Mouse cursor motion (absolute position plus relative delta)
    MouseMotion { position: IVec2, delta: IVec2 },
    /// Mouse wheel motion
    MouseWheel { delta: IVec2 },
    /// Window was resized
    WindowResized { size: UVec2 },
    /// Joystick axis moved; `value` is the raw platform range
    JoystickAxis {
        device: JoystickId,
        axis: usize,
        value: i16,
    },
    /// Joystick button state change
    JoystickButton {
        device: JoystickId,
        button: usize,
        pressed: bool,
    },
    /// Joystick hat moved; `value` is the raw platform direction mask
    JoystickHat {
        device: JoystickId,
        hat: usize,
        value: u8,
    },
    /// A joystick was connected
    JoystickAdded { device: JoystickId },
    /// A joystick was disconnected
    JoystickRemoved { device: JoystickId },
    /// In-progress text composition (IME preedit)
    TextEdit {
        text: String,
        start: i32,
        length: i32,
    },
    /// Committed text input
    TextInput { text: String },
    /// Event id from a platform bridge that has no mapping here
    Unknown { code: u32 },
}

/// Text input record accumulated while recording is enabled
///
/// The sequence grows until the consumer clears it; nothing is dropped
/// automatically.
#[derive(Debug, Clone, PartialEq)]
pub enum TextInputEvent {
    /// Raw key stroke observed while recording
    Key {
        pressed: bool,
        repeat: bool,
        key: KeyCode,
        modifiers: Modifiers,
    },
    /// Composition text with the edited region
    Edit {
        text: String,
        start: i32,
        length: i32,
    },
    /// Committed text
    Text { text: String },
}

/// Application lifecycle notifications
///
/// Delivered by the platform layer outside the normal event queue, since
/// hosts report these through a separate callback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    WillEnterBackground,
    DidEnterBackground,
    WillEnterForeground,
    DidEnterForeground,
    LowMemory,
    Terminating,
}
