//! Raw event collection from winit
//!
//! Translates winit window and device events into [`PlatformEvent`]s for
//! the frame driver. The collector only translates; all input state
//! lives in [`InputSystem`](super::InputSystem).

use glam::{IVec2, UVec2, Vec2};
use winit::event::{DeviceEvent, Ime, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::events::{Modifiers, MouseButton, PlatformEvent};
use super::system::InputSystem;

/// Approximate pixels per line for line-based wheel deltas
const PIXELS_PER_LINE: f32 = 20.0;

/// Collects platform events from winit until the next frame flush
pub struct EventCollector {
    events: Vec<PlatformEvent>,
    modifiers: Modifiers,
    cursor: IVec2,
}

impl EventCollector {
    /// Creates a new event collector
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            modifiers: Modifiers::default(),
            cursor: IVec2::ZERO,
        }
    }

    /// Handle a winit window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.events.push(PlatformEvent::Quit);
            }

            WindowEvent::Resized(size) => {
                self.events.push(PlatformEvent::WindowResized {
                    size: UVec2::new(size.width, size.height),
                });
            }

            WindowEvent::ModifiersChanged(modifiers_state) => {
                let state = modifiers_state.state();
                self.modifiers = Modifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    alt: state.alt_key(),
                    meta: state.super_key(),
                };
            }

            WindowEvent::KeyboardInput { event, .. } => {
                // Keys without a physical mapping carry nothing to track
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.events.push(PlatformEvent::Key {
                        key,
                        pressed: event.state.is_pressed(),
                        repeat: event.repeat,
                        modifiers: self.modifiers,
                    });
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = IVec2::new(position.x as i32, position.y as i32);
                let delta = position - self.cursor;
                self.cursor = position;
                self.events
                    .push(PlatformEvent::MouseMotion { position, delta });
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.events.push(PlatformEvent::MouseButton {
                    button: translate_mouse_button(*button),
                    pressed: state.is_pressed(),
                    position: Some(self.cursor),
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // Convert MouseScrollDelta to consistent pixel units
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => IVec2::new(
                        (x * PIXELS_PER_LINE) as i32,
                        (y * PIXELS_PER_LINE) as i32,
                    ),
                    MouseScrollDelta::PixelDelta(pos) => IVec2::new(pos.x as i32, pos.y as i32),
                };
                self.events.push(PlatformEvent::MouseWheel { delta });
            }

            WindowEvent::Touch(Touch {
                id,
                phase,
                location,
                ..
            }) => {
                let position = Vec2::new(location.x as f32, location.y as f32);
                let event = match phase {
                    TouchPhase::Started => PlatformEvent::TouchDown { id: *id, position },
                    TouchPhase::Moved => PlatformEvent::TouchMotion { id: *id, position },
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        PlatformEvent::TouchUp { id: *id, position }
                    }
                };
                self.events.push(event);
            }

            WindowEvent::Ime(ime) => match ime {
                Ime::Preedit(text, range) => {
                    let (start, length) = match range {
                        Some((begin, end)) => (*begin as i32, (end - begin) as i32),
                        None => (0, 0),
                    };
                    self.events.push(PlatformEvent::TextEdit {
                        text: text.clone(),
                        start,
                        length,
                    });
                }
                Ime::Commit(text) => {
                    self.events.push(PlatformEvent::TextInput { text: text.clone() });
                }
                Ime::Enabled | Ime::Disabled => {}
            },

            _ => {}
        }
    }

    /// Handle a winit device event
    ///
    /// Only call this while relative mouse mode is active: raw motion
    /// would otherwise double-count with the cursor deltas produced by
    /// `handle_window_event`.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.events.push(PlatformEvent::MouseMotion {
                position: self.cursor,
                delta: IVec2::new(*dx as i32, *dy as i32),
            });
        }
    }

    /// Move everything collected since the last flush into the system's
    /// event queue
    pub fn flush_into(&mut self, input: &mut InputSystem) {
        for event in self.events.drain(..) {
            input.push_event(event);
        }
    }

    /// Take the collected events without queueing them anywhere
    pub fn take_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Back => MouseButton::Other(0),
        winit::event::MouseButton::Forward => MouseButton::Other(1),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n.min(u8::MAX as u16) as u8),
    }
}
