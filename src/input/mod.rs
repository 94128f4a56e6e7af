//! Frame-polled input normalization
//!
//! Heterogeneous platform events (keyboard, mouse, touch, joysticks,
//! Android gamepads, head tracking) are queued as [`PlatformEvent`]s and
//! drained once per frame by [`InputSystem::advance_frame`], which turns
//! them into edge-tracked state that the application polls between frames.
//!
//! # Architecture
//!
//! ```text
//! winit / platform bridges → EventCollector → PlatformEvent queue
//!                                                   ↓
//!                                    InputSystem::advance_frame (1x/frame)
//!                                                   ↓
//!                          buttons · pointers · joysticks · gamepads · hmd
//! ```
//!
//! # Usage
//!
//! ```ignore
//! // In App::new()
//! let mut input = InputSystem::new(&config);
//!
//! // In window_event()
//! collector.handle_window_event(&event);
//!
//! // Each frame, before the simulation update
//! collector.flush_into(&mut input);
//! input.advance_frame(&mut window_size);
//! if input.button(KeyCode::Space).is_just_pressed() {
//!     // ...
//! }
//! ```

mod button;
mod collector;
mod events;
mod gamepad;
pub mod hmd;
mod joystick;
mod pointer;
mod system;

// Re-export public API
pub use button::ButtonState;
pub use collector::EventCollector;
pub use events::{LifecycleEvent, Modifiers, MouseButton, PlatformEvent, TextInputEvent};
pub use gamepad::{
    GAMEPAD_HAT_THRESHOLD, GAMEPAD_QUEUE_CAPACITY, Gamepad, GamepadControl, GamepadEvent,
    GamepadEventKind, GamepadId, GamepadQueue, control_from_key_code,
};
pub use hmd::{DisplayOrientation, HeadPose, HeadPoseSource, HeadTracker};
pub use joystick::{
    HAT_CENTERED, HAT_DOWN, HAT_LEFT, HAT_LEFT_DOWN, HAT_LEFT_UP, HAT_RIGHT, HAT_RIGHT_DOWN,
    HAT_RIGHT_UP, HAT_UP, JOYSTICK_AXIS_RANGE, Joystick, JoystickBackend, JoystickId,
    NativeHandle, hat_to_vector,
};
pub use pointer::Pointer;
pub use system::InputSystem;
