//! Input Pool
//!
//! Normalizes heterogeneous platform input (keyboard, mouse, multi-touch,
//! joysticks, Android gamepads, head-mounted-display tracking) into a
//! single per-frame, poll-based state.

/// Input system configuration (profiles, tunables)
pub mod config;

/// Event-to-state translation and the frame driver
pub mod input;
