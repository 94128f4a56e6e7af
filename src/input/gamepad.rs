//! Android gamepad path
//!
//! Gamepad events arrive from the platform's input thread, not from the
//! window event queue, so they cross threads through a bounded FIFO and
//! are applied once per frame by the driver. Key events map platform key
//! codes onto logical controls; directional state derives from motion
//! coordinates thresholded against a deadzone, not from hat events.

use std::collections::VecDeque;
use std::sync::Mutex;

use enum_map::{Enum, EnumMap};
use tracing::warn;

use super::button::ButtonState;

/// Identifier the platform assigns to an input device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamepadId(pub i32);

/// Logical gamepad controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum GamepadControl {
    Up,
    Down,
    Left,
    Right,
    ButtonA,
    ButtonB,
    ButtonC,
    ButtonX,
    ButtonY,
    ButtonZ,
    ButtonL1,
    ButtonR1,
    ButtonL2,
    ButtonR2,
    ThumbL,
    ThumbR,
    Back,
    Start,
    Select,
    Mode,
}

/// Per-controller button state for the secondary input path
#[derive(Debug)]
pub struct Gamepad {
    controller_id: GamepadId,
    buttons: EnumMap<GamepadControl, ButtonState>,
}

impl Gamepad {
    pub(crate) fn new(controller_id: GamepadId) -> Self {
        Self {
            controller_id,
            buttons: EnumMap::default(),
        }
    }

    pub fn controller_id(&self) -> GamepadId {
        self.controller_id
    }

    pub fn button(&self, control: GamepadControl) -> ButtonState {
        self.buttons[control]
    }

    pub(crate) fn button_mut(&mut self, control: GamepadControl) -> &mut ButtonState {
        &mut self.buttons[control]
    }

    /// Derive the four directional buttons from stick coordinates
    ///
    /// Each direction is overwritten with the thresholded observation;
    /// centered coordinates release all four.
    pub(crate) fn apply_motion(&mut self, x: f32, y: f32, deadzone: f32) {
        self.buttons[GamepadControl::Left].update(x < -deadzone);
        self.buttons[GamepadControl::Right].update(x > deadzone);
        self.buttons[GamepadControl::Up].update(y < -deadzone);
        self.buttons[GamepadControl::Down].update(y > deadzone);
    }

    /// Advance every button for the next frame
    pub(crate) fn advance(&mut self) {
        for button in self.buttons.values_mut() {
            *button = button.advance();
        }
    }

    /// Release all buttons
    pub(crate) fn reset(&mut self) {
        for button in self.buttons.values_mut() {
            *button = ButtonState::Released;
        }
    }
}

/// How a queued gamepad event should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadEventKind {
    KeyDown,
    KeyUp,
    Motion,
}

/// Immutable record delivered from the platform input thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadEvent {
    pub device: GamepadId,
    pub kind: GamepadEventKind,
    /// Platform key code for key events, unused for motion
    pub key_code: i32,
    pub x: f32,
    pub y: f32,
}

/// Events held per frame before the producer starts dropping input
pub const GAMEPAD_QUEUE_CAPACITY: usize = 100;

/// Default stick deflection treated as a directional press
pub const GAMEPAD_HAT_THRESHOLD: f32 = 0.5;

/// Bounded FIFO between the platform input thread and the frame driver
///
/// The producer must never stall, so overflow drops the incoming event
/// instead of blocking. The consumer swaps the whole queue out under the
/// lock once per frame; the lock is never held across event processing.
#[derive(Debug, Default)]
pub struct GamepadQueue {
    events: Mutex<VecDeque<GamepadEvent>>,
}

impl GamepadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; callable from any thread
    pub fn push(&self, event: GamepadEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        if events.len() < GAMEPAD_QUEUE_CAPACITY {
            events.push_back(event);
        }
    }

    /// Take everything queued since the last drain, oldest first
    pub fn drain(&self) -> VecDeque<GamepadEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

// Android KeyEvent codes for the controls we map.
const KEYCODE_BACK: i32 = 4;
const KEYCODE_DPAD_UP: i32 = 19;
const KEYCODE_DPAD_DOWN: i32 = 20;
const KEYCODE_DPAD_LEFT: i32 = 21;
const KEYCODE_DPAD_RIGHT: i32 = 22;
const KEYCODE_DPAD_CENTER: i32 = 23;
const KEYCODE_MENU: i32 = 82;
const KEYCODE_BUTTON_A: i32 = 96;
const KEYCODE_BUTTON_B: i32 = 97;
const KEYCODE_BUTTON_C: i32 = 98;
const KEYCODE_BUTTON_X: i32 = 99;
const KEYCODE_BUTTON_Y: i32 = 100;
const KEYCODE_BUTTON_Z: i32 = 101;
const KEYCODE_BUTTON_L1: i32 = 102;
const KEYCODE_BUTTON_R1: i32 = 103;
const KEYCODE_BUTTON_L2: i32 = 104;
const KEYCODE_BUTTON_R2: i32 = 105;
const KEYCODE_BUTTON_THUMBL: i32 = 106;
const KEYCODE_BUTTON_THUMBR: i32 = 107;
const KEYCODE_BUTTON_START: i32 = 108;
const KEYCODE_BUTTON_SELECT: i32 = 109;
const KEYCODE_BUTTON_MODE: i32 = 110;

/// Map a platform key code to a logical control
///
/// DpadCenter maps onto ButtonA: they serve the same functional purpose
/// and callers dealing with a gamepad do not want the distinction. Menu
/// maps onto Select for the same reason.
pub fn control_from_key_code(key_code: i32) -> Option<GamepadControl> {
    match key_code {
        KEYCODE_DPAD_UP => Some(GamepadControl::Up),
        KEYCODE_DPAD_DOWN => Some(GamepadControl::Down),
        KEYCODE_DPAD_LEFT => Some(GamepadControl::Left),
        KEYCODE_DPAD_RIGHT => Some(GamepadControl::Right),
        KEYCODE_DPAD_CENTER | KEYCODE_BUTTON_A => Some(GamepadControl::ButtonA),
        KEYCODE_BUTTON_B => Some(GamepadControl::ButtonB),
        KEYCODE_BUTTON_C => Some(GamepadControl::ButtonC),
        KEYCODE_BUTTON_X => Some(GamepadControl::ButtonX),
        KEYCODE_BUTTON_Y => Some(GamepadControl::ButtonY),
        KEYCODE_BUTTON_Z => Some(GamepadControl::ButtonZ),
        KEYCODE_BUTTON_L1 => Some(GamepadControl::ButtonL1),
        KEYCODE_BUTTON_R1 => Some(GamepadControl::ButtonR1),
        KEYCODE_BUTTON_L2 => Some(GamepadControl::ButtonL2),
        KEYCODE_BUTTON_R2 => Some(GamepadControl::ButtonR2),
        KEYCODE_BUTTON_THUMBL => Some(GamepadControl::ThumbL),
        KEYCODE_BUTTON_THUMBR => Some(GamepadControl::ThumbR),
        KEYCODE_BACK => Some(GamepadControl::Back),
        KEYCODE_BUTTON_START => Some(GamepadControl::Start),
        KEYCODE_MENU | KEYCODE_BUTTON_SELECT => Some(GamepadControl::Select),
        KEYCODE_BUTTON_MODE => Some(GamepadControl::Mode),
        _ => {
            warn!(key_code, "unmapped gamepad key code");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motion(x: f32, y: f32) -> GamepadEvent {
        GamepadEvent {
            device: GamepadId(1),
            kind: GamepadEventKind::Motion,
            key_code: 0,
            x,
            y,
        }
    }

    #[test]
    fn test_queue_drops_events_beyond_capacity() {
        let queue = GamepadQueue::new();
        for _ in 0..(GAMEPAD_QUEUE_CAPACITY + 50) {
            queue.push(motion(0.0, 0.0));
        }

        let drained = queue.drain();
        assert_eq!(drained.len(), GAMEPAD_QUEUE_CAPACITY);
        // Empty right after the drain, no matter how many were queued
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_queue_preserves_fifo_order() {
        let queue = GamepadQueue::new();
        queue.push(motion(1.0, 0.0));
        queue.push(motion(2.0, 0.0));
        queue.push(motion(3.0, 0.0));

        let drained: Vec<f32> = queue.drain().iter().map(|e| e.x).collect();
        assert_eq!(drained, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_key_code_mapping() {
        assert_eq!(
            control_from_key_code(KEYCODE_BUTTON_A),
            Some(GamepadControl::ButtonA)
        );
        // DpadCenter and Menu fold onto ButtonA and Select
        assert_eq!(
            control_from_key_code(KEYCODE_DPAD_CENTER),
            Some(GamepadControl::ButtonA)
        );
        assert_eq!(
            control_from_key_code(KEYCODE_MENU),
            Some(GamepadControl::Select)
        );
        assert_eq!(control_from_key_code(12345), None);
    }

    #[test]
    fn test_motion_thresholds_against_deadzone() {
        let mut gamepad = Gamepad::new(GamepadId(1));

        gamepad.apply_motion(0.9, -0.9, GAMEPAD_HAT_THRESHOLD);
        assert!(gamepad.button(GamepadControl::Right).is_just_pressed());
        assert!(gamepad.button(GamepadControl::Up).is_just_pressed());
        assert!(!gamepad.button(GamepadControl::Left).is_down());
        assert!(!gamepad.button(GamepadControl::Down).is_down());

        // Inside the deadzone everything releases
        gamepad.advance();
        gamepad.apply_motion(0.2, -0.2, GAMEPAD_HAT_THRESHOLD);
        assert!(gamepad.button(GamepadControl::Right).is_just_released());
        assert!(gamepad.button(GamepadControl::Up).is_just_released());
    }
}
