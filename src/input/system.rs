//! The input frame driver
//!
//! Owns every input sub-state and the platform event queue. Once per
//! frame the owning loop calls [`InputSystem::advance_frame`]; between
//! frames the rest of the application only ever calls query methods.
//! Nothing in here blocks or suspends, and no event is allowed to abort
//! the frame: bad input degrades and is logged.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use glam::{IVec2, UVec2};
use tracing::warn;
use winit::keyboard::KeyCode;

use super::button::ButtonState;
use super::events::{LifecycleEvent, PlatformEvent, TextInputEvent};
use super::gamepad::{Gamepad, GamepadEventKind, GamepadId, GamepadQueue, control_from_key_code};
use super::hmd::{HeadPoseSource, HeadTracker};
use super::joystick::{Joystick, JoystickBackend, JoystickId};
use super::pointer::{Pointer, PointerTable};
use crate::config::InputConfig;

/// Callback invoked on lifecycle transitions, in registration order
pub type LifecycleCallback = Box<dyn FnMut(&LifecycleEvent)>;

/// Unified per-frame input state over all platform sources
pub struct InputSystem {
    queue: VecDeque<PlatformEvent>,
    /// Lazily created per key code, never removed; key codes are sparse
    /// and recycled, so records are kept for the process lifetime
    buttons: HashMap<KeyCode, ButtonState>,
    pointers: PointerTable,
    mousewheel_delta: IVec2,
    joysticks: HashMap<JoystickId, Joystick>,
    joystick_backend: Option<Box<dyn JoystickBackend>>,
    gamepads: HashMap<GamepadId, Gamepad>,
    gamepad_queue: Arc<GamepadQueue>,
    gamepad_deadzone: f32,
    head_tracker: Option<HeadTracker>,
    orientation_correction: bool,
    lifecycle_callbacks: Vec<LifecycleCallback>,
    text_input_events: Vec<TextInputEvent>,
    record_text_input: bool,
    relative_mouse_mode: bool,
    saved_relative_mouse_mode: bool,
    /// Whether touch events drive the pointer table; on pointer-device
    /// targets they are trackpad noise and the mouse path wins
    touch_screen: bool,
    touch_device: bool,
    exit_requested: bool,
    minimized: bool,
    minimized_frame: u64,
    frames: u64,
    start_time: Instant,
    last_frame: Instant,
    delta_time: f32,
}

impl InputSystem {
    /// Creates a new input system with the provided configuration
    pub fn new(config: &InputConfig) -> Self {
        let touch_screen = config
            .pointer
            .touch_screen
            .unwrap_or(cfg!(any(target_os = "android", target_os = "ios")));
        let now = Instant::now();

        Self {
            queue: VecDeque::new(),
            buttons: HashMap::new(),
            pointers: PointerTable::new(config.pointer.max_pointers),
            mousewheel_delta: IVec2::ZERO,
            joysticks: HashMap::new(),
            joystick_backend: None,
            gamepads: HashMap::new(),
            gamepad_queue: Arc::new(GamepadQueue::new()),
            gamepad_deadzone: config.gamepad.deadzone,
            head_tracker: None,
            orientation_correction: config.head_tracking.orientation_correction,
            lifecycle_callbacks: Vec::new(),
            text_input_events: Vec::new(),
            record_text_input: false,
            relative_mouse_mode: false,
            saved_relative_mouse_mode: false,
            touch_screen,
            touch_device: false,
            exit_requested: false,
            minimized: false,
            minimized_frame: 0,
            frames: 0,
            start_time: now,
            last_frame: now,
            delta_time: 0.0,
        }
    }

    /// Queue a platform event for the next frame advance
    ///
    /// The collector calls this for window-system events; platform
    /// bridges may push joystick or foreign events from the same thread.
    pub fn push_event(&mut self, event: PlatformEvent) {
        self.queue.push_back(event);
    }

    /// Once-per-frame entry point
    ///
    /// Commits the previous frame's edges, drains the cross-thread
    /// gamepad queue, zeroes per-frame deltas, then drains and
    /// dispatches the platform queue and advances the head tracker.
    /// `window_size` is overwritten when a resize event is seen.
    pub fn advance_frame(&mut self, window_size: &mut UVec2) {
        let now = Instant::now();
        self.delta_time = if self.frames == 0 {
            0.0
        } else {
            (now - self.last_frame).as_secs_f32()
        };
        self.last_frame = now;
        self.frames += 1;

        // Reset the per-frame state on all our sub-elements
        for button in self.buttons.values_mut() {
            *button = button.advance();
        }
        self.pointers.advance();
        for joystick in self.joysticks.values_mut() {
            joystick.advance();
        }
        for gamepad in self.gamepads.values_mut() {
            gamepad.advance();
        }
        self.handle_gamepad_events();

        self.pointers.zero_deltas();
        self.mousewheel_delta = IVec2::ZERO;

        self.update_events(window_size);

        if let Some(tracker) = &mut self.head_tracker {
            tracker.advance_frame();
        }
    }

    /// Drain the platform queue, dispatching each event by kind
    fn update_events(&mut self, window_size: &mut UVec2) {
        while let Some(event) = self.queue.pop_front() {
            match event {
                PlatformEvent::Quit => {
                    self.exit_requested = true;
                }

                PlatformEvent::Key {
                    key,
                    pressed,
                    repeat,
                    modifiers,
                } => {
                    self.buttons.entry(key).or_default().update(pressed);
                    if self.record_text_input {
                        self.text_input_events.push(TextInputEvent::Key {
                            pressed,
                            repeat,
                            key,
                            modifiers,
                        });
                    }
                }

                PlatformEvent::TouchDown { id, position } => {
                    if !self.touch_screen {
                        continue;
                    }
                    self.touch_device = true;
                    let i = self.pointers.find_or_claim(id);
                    self.pointers.place(i, position.as_ivec2());
                    if let Some(pointer) = self.pointers.get_mut(i) {
                        pointer.button.update(true);
                    }
                }

                PlatformEvent::TouchUp { id, position } => {
                    if !self.touch_screen {
                        continue;
                    }
                    self.touch_device = true;
                    let i = self.pointers.find_or_first(id);
                    self.pointers.apply_motion(i, position.as_ivec2());
                    self.pointers.release(i);
                    if let Some(pointer) = self.pointers.get_mut(i) {
                        pointer.button.update(false);
                    }
                }

                PlatformEvent::TouchMotion { id, position } => {
                    if !self.touch_screen {
                        continue;
                    }
                    self.touch_device = true;
                    let i = self.pointers.find_or_first(id);
                    self.pointers.apply_motion(i, position.as_ivec2());
                }

                PlatformEvent::MouseButton {
                    button,
                    pressed,
                    position,
                } => {
                    self.touch_device = false;
                    if let Some(pointer) = self.pointers.get_mut(button.pointer_index()) {
                        pointer.button.update(pressed);
                    }
                    if let Some(position) = position
                        && let Some(first) = self.pointers.get_mut(0)
                    {
                        first.position = position;
                    }
                    if let Some(first) = self.pointers.get_mut(0) {
                        first.used = true;
                    }
                    if pressed && let Some(tracker) = &mut self.head_tracker {
                        tracker.latch_trigger();
                    }
                }

                PlatformEvent::MouseMotion { position, delta } => {
                    // Synthetic duplicates of touch motion on touch screens
                    if self.touch_screen {
                        continue;
                    }
                    self.touch_device = false;
                    if let Some(first) = self.pointers.get_mut(0) {
                        first.delta += delta;
                        first.position = position;
                    }
                }

                PlatformEvent::MouseWheel { delta } => {
                    self.touch_device = false;
                    self.mousewheel_delta += delta;
                }

                PlatformEvent::WindowResized { size } => {
                    *window_size = size;
                }

                PlatformEvent::JoystickAxis {
                    device,
                    axis,
                    value,
                } => {
                    self.joysticks
                        .entry(device)
                        .or_default()
                        .set_axis(axis, value);
                }

                PlatformEvent::JoystickButton {
                    device,
                    button,
                    pressed,
                } => {
                    self.joysticks
                        .entry(device)
                        .or_default()
                        .button_mut(button)
                        .update(pressed);
                }

                PlatformEvent::JoystickHat { device, hat, value } => {
                    self.joysticks
                        .entry(device)
                        .or_default()
                        .set_hat(hat, value);
                }

                PlatformEvent::JoystickAdded { device } => {
                    self.update_connected_joysticks(device, true);
                }

                PlatformEvent::JoystickRemoved { device } => {
                    self.update_connected_joysticks(device, false);
                }

                PlatformEvent::TextEdit {
                    text,
                    start,
                    length,
                } => {
                    if self.record_text_input {
                        self.text_input_events.push(TextInputEvent::Edit {
                            text,
                            start,
                            length,
                        });
                    }
                }

                PlatformEvent::TextInput { text } => {
                    if self.record_text_input {
                        self.text_input_events.push(TextInputEvent::Text { text });
                    }
                }

                PlatformEvent::Unknown { code } => {
                    warn!(code, "ignoring unrecognized platform event");
                }
            }
        }
    }

    /// Recompute joystick records against the platform's connected list
    ///
    /// Records are never removed: a device that disappears keeps its
    /// last-known state and only loses its native handle, so a reconnect
    /// with the same id reuses the record instead of duplicating it.
    fn update_connected_joysticks(&mut self, device: JoystickId, connected: bool) {
        match &mut self.joystick_backend {
            Some(backend) => {
                let list = backend.connected();
                for joystick in self.joysticks.values_mut() {
                    joystick.clear_handle();
                }
                for (id, handle) in list {
                    self.joysticks.entry(id).or_default().set_handle(handle);
                }
            }
            None => {
                // No enumeration available; track the id from the event
                if connected {
                    self.joysticks.entry(device).or_default();
                } else if let Some(joystick) = self.joysticks.get_mut(&device) {
                    joystick.clear_handle();
                }
            }
        }
    }

    /// Drain and apply the cross-thread gamepad queue
    fn handle_gamepad_events(&mut self) {
        let deadzone = self.gamepad_deadzone;
        for event in self.gamepad_queue.drain() {
            let gamepad = self
                .gamepads
                .entry(event.device)
                .or_insert_with(|| Gamepad::new(event.device));
            match event.kind {
                GamepadEventKind::KeyDown | GamepadEventKind::KeyUp => {
                    let pressed = event.kind == GamepadEventKind::KeyDown;
                    if let Some(control) = control_from_key_code(event.key_code) {
                        gamepad.button_mut(control).update(pressed);
                    }
                }
                GamepadEventKind::Motion => {
                    gamepad.apply_motion(event.x, event.y, deadzone);
                }
            }
        }
    }

    /// Host lifecycle filter, invoked by the platform layer outside the
    /// normal event queue
    ///
    /// Registered callbacks then receive the event in registration
    /// order, except for Terminating, which is swallowed.
    pub fn handle_lifecycle_event(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::WillEnterBackground => {
                self.minimized = true;
                self.minimized_frame = self.frames;
                if self.touch_screen {
                    // Mobile window references go stale in the background;
                    // park the cursor in relative mode until foregrounded
                    self.saved_relative_mouse_mode = self.relative_mouse_mode;
                    self.relative_mouse_mode = true;
                }
            }
            LifecycleEvent::DidEnterForeground => {
                self.minimized = false;
                self.minimized_frame = self.frames;
                if self.touch_screen {
                    self.reset_input_state();
                    self.relative_mouse_mode = self.saved_relative_mouse_mode;
                }
            }
            LifecycleEvent::DidEnterBackground
            | LifecycleEvent::WillEnterForeground
            | LifecycleEvent::LowMemory
            | LifecycleEvent::Terminating => {}
        }

        if event != LifecycleEvent::Terminating {
            for callback in &mut self.lifecycle_callbacks {
                callback(&event);
            }
        }
    }

    /// Register a lifecycle callback; callbacks run in registration order
    pub fn add_lifecycle_callback(&mut self, callback: impl FnMut(&LifecycleEvent) + 'static) {
        self.lifecycle_callbacks.push(Box::new(callback));
    }

    /// Release every button and pointer and clear accumulated deltas
    ///
    /// Axes and hats keep their last reported values; fresh events will
    /// overwrite them.
    pub fn reset_input_state(&mut self) {
        for button in self.buttons.values_mut() {
            *button = ButtonState::Released;
        }
        self.pointers.reset();
        for joystick in self.joysticks.values_mut() {
            joystick.reset();
        }
        for gamepad in self.gamepads.values_mut() {
            gamepad.reset();
        }
        self.mousewheel_delta = IVec2::ZERO;
    }

    /// Install the joystick enumeration backend
    pub fn set_joystick_backend(&mut self, backend: Box<dyn JoystickBackend>) {
        self.joystick_backend = Some(backend);
    }

    /// Create and attach a head tracker over the given bridge
    ///
    /// Orientation correction is enabled here when the configuration
    /// asks for it.
    pub fn attach_head_tracker(&mut self, source: Box<dyn HeadPoseSource>) {
        let mut tracker = HeadTracker::new(source);
        if self.orientation_correction {
            tracker.enable_orientation_correction();
        }
        self.head_tracker = Some(tracker);
    }

    pub fn head_tracker(&self) -> Option<&HeadTracker> {
        self.head_tracker.as_ref()
    }

    pub fn head_tracker_mut(&mut self) -> Option<&mut HeadTracker> {
        self.head_tracker.as_mut()
    }

    /// Button state by key code; unseen keys read as released
    pub fn button(&self, key: KeyCode) -> ButtonState {
        self.buttons.get(&key).copied().unwrap_or_default()
    }

    /// Pointer slot by ordinal
    pub fn pointer(&self, ordinal: usize) -> Option<&Pointer> {
        self.pointers.get(ordinal)
    }

    /// Press state of a pointer slot; out-of-range reads as released
    pub fn pointer_button(&self, ordinal: usize) -> ButtonState {
        self.pointers
            .get(ordinal)
            .map(|pointer| pointer.button)
            .unwrap_or_default()
    }

    /// All pointer slots, ordinal order
    pub fn pointers(&self) -> &[Pointer] {
        self.pointers.slots()
    }

    /// Joystick record by device id
    pub fn joystick(&self, device: JoystickId) -> Option<&Joystick> {
        self.joysticks.get(&device)
    }

    /// Every joystick ever seen, connected or not
    pub fn joysticks(&self) -> impl Iterator<Item = (JoystickId, &Joystick)> {
        self.joysticks.iter().map(|(id, joystick)| (*id, joystick))
    }

    /// Gamepad record by controller id
    pub fn gamepad(&self, controller: GamepadId) -> Option<&Gamepad> {
        self.gamepads.get(&controller)
    }

    /// Shared handle for the cross-thread gamepad event producer
    pub fn gamepad_queue(&self) -> Arc<GamepadQueue> {
        Arc::clone(&self.gamepad_queue)
    }

    /// Wheel motion accumulated this frame, zeroed at each advance
    pub fn mouse_wheel_delta(&self) -> IVec2 {
        self.mousewheel_delta
    }

    /// Whether a quit event has ever been seen (sticky)
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn relative_mouse_mode(&self) -> bool {
        self.relative_mouse_mode
    }

    pub fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.relative_mouse_mode = enabled;
    }

    pub fn record_text_input(&self) -> bool {
        self.record_text_input
    }

    /// Toggle recording of key and text events into the text sequence
    pub fn set_record_text_input(&mut self, record: bool) {
        self.record_text_input = record;
    }

    /// Text events accumulated since the consumer last cleared them
    pub fn text_input_events(&self) -> &[TextInputEvent] {
        &self.text_input_events
    }

    pub fn clear_text_input_events(&mut self) {
        self.text_input_events.clear();
    }

    /// Whether the last pointer input came from a touch screen
    pub fn touch_device(&self) -> bool {
        self.touch_device
    }

    pub fn minimized(&self) -> bool {
        self.minimized
    }

    /// Frame number of the last minimize or restore transition
    pub fn minimized_frame(&self) -> u64 {
        self.minimized_frame
    }

    /// Frames advanced so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds between the last two frame advances
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds since the system was created
    pub fn real_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::config::{GamepadConfig, HeadTrackingConfig, PointerConfig};
    use crate::input::events::{Modifiers, MouseButton};
    use crate::input::gamepad::{GAMEPAD_QUEUE_CAPACITY, GamepadControl, GamepadEvent};
    use crate::input::joystick::NativeHandle;

    fn test_config(touch_screen: bool) -> InputConfig {
        InputConfig {
            profile: "test".to_string(),
            pointer: PointerConfig {
                max_pointers: 10,
                touch_screen: Some(touch_screen),
            },
            gamepad: GamepadConfig { deadzone: 0.5 },
            head_tracking: HeadTrackingConfig {
                orientation_correction: false,
            },
        }
    }

    fn advance(input: &mut InputSystem) -> UVec2 {
        let mut size = UVec2::new(800, 600);
        input.advance_frame(&mut size);
        size
    }

    #[test]
    fn test_key_edges_last_one_frame() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::Key {
            key: KeyCode::Space,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::default(),
        });
        advance(&mut input);
        assert!(input.button(KeyCode::Space).is_just_pressed());

        advance(&mut input);
        assert!(input.button(KeyCode::Space).is_down());
        assert!(!input.button(KeyCode::Space).is_just_pressed());

        input.push_event(PlatformEvent::Key {
            key: KeyCode::Space,
            pressed: false,
            repeat: false,
            modifiers: Modifiers::default(),
        });
        advance(&mut input);
        assert!(input.button(KeyCode::Space).is_just_released());

        advance(&mut input);
        assert_eq!(input.button(KeyCode::Space), ButtonState::Released);
    }

    #[test]
    fn test_touch_ordinal_reuse() {
        let mut input = InputSystem::new(&test_config(true));

        input.push_event(PlatformEvent::TouchDown {
            id: 42,
            position: Vec2::new(100.0, 100.0),
        });
        advance(&mut input);
        assert!(input.pointer_button(0).is_just_pressed());
        assert_eq!(input.pointer(0).unwrap().platform_id, Some(42));

        input.push_event(PlatformEvent::TouchUp {
            id: 42,
            position: Vec2::new(100.0, 100.0),
        });
        advance(&mut input);
        assert!(input.pointer_button(0).is_just_released());
        assert!(!input.pointer(0).unwrap().used);

        // The freed ordinal 0 is reused by the next new contact
        input.push_event(PlatformEvent::TouchDown {
            id: 99,
            position: Vec2::new(50.0, 50.0),
        });
        advance(&mut input);
        assert!(input.pointer_button(0).is_just_pressed());
        assert_eq!(input.pointer(0).unwrap().platform_id, Some(99));
    }

    #[test]
    fn test_second_contact_takes_next_ordinal() {
        let mut input = InputSystem::new(&test_config(true));

        input.push_event(PlatformEvent::TouchDown {
            id: 1,
            position: Vec2::new(10.0, 10.0),
        });
        input.push_event(PlatformEvent::TouchDown {
            id: 2,
            position: Vec2::new(20.0, 20.0),
        });
        advance(&mut input);

        assert_eq!(input.pointer(0).unwrap().platform_id, Some(1));
        assert_eq!(input.pointer(1).unwrap().platform_id, Some(2));
        assert!(input.pointer_button(1).is_just_pressed());
    }

    #[test]
    fn test_stray_touch_up_falls_back_to_pointer_zero() {
        let mut input = InputSystem::new(&test_config(true));

        input.push_event(PlatformEvent::TouchUp {
            id: 7777,
            position: Vec2::new(0.0, 0.0),
        });
        advance(&mut input);
        // Lossy degradation: the unknown contact lands on ordinal 0
        assert!(!input.pointer(0).unwrap().used);
    }

    #[test]
    fn test_touch_ignored_without_touch_screen() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::TouchDown {
            id: 1,
            position: Vec2::new(10.0, 10.0),
        });
        advance(&mut input);
        assert!(!input.pointer(0).unwrap().used);
        assert!(!input.pointer_button(0).is_down());
        assert!(!input.touch_device());
    }

    #[test]
    fn test_mouse_motion_ignored_on_touch_screen() {
        let mut input = InputSystem::new(&test_config(true));

        input.push_event(PlatformEvent::MouseMotion {
            position: IVec2::new(40, 40),
            delta: IVec2::new(40, 40),
        });
        advance(&mut input);
        assert_eq!(input.pointer(0).unwrap().delta, IVec2::ZERO);
    }

    #[test]
    fn test_mouse_buttons_map_to_pointer_slots() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
            position: Some(IVec2::new(5, 6)),
        });
        advance(&mut input);

        assert!(input.pointer_button(2).is_just_pressed());
        assert!(!input.pointer_button(0).is_down());
        // Position always lands on pointer 0
        assert_eq!(input.pointer(0).unwrap().position, IVec2::new(5, 6));
        assert!(input.pointer(0).unwrap().used);
    }

    #[test]
    fn test_mouse_delta_and_wheel_reset_each_frame() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::MouseMotion {
            position: IVec2::new(10, 0),
            delta: IVec2::new(10, 0),
        });
        input.push_event(PlatformEvent::MouseMotion {
            position: IVec2::new(15, 5),
            delta: IVec2::new(5, 5),
        });
        input.push_event(PlatformEvent::MouseWheel {
            delta: IVec2::new(0, 2),
        });
        input.push_event(PlatformEvent::MouseWheel {
            delta: IVec2::new(1, 1),
        });
        advance(&mut input);

        assert_eq!(input.pointer(0).unwrap().delta, IVec2::new(15, 5));
        assert_eq!(input.pointer(0).unwrap().position, IVec2::new(15, 5));
        assert_eq!(input.mouse_wheel_delta(), IVec2::new(1, 3));

        advance(&mut input);
        assert_eq!(input.pointer(0).unwrap().delta, IVec2::ZERO);
        assert_eq!(input.mouse_wheel_delta(), IVec2::ZERO);
    }

    #[test]
    fn test_quit_is_sticky() {
        let mut input = InputSystem::new(&test_config(false));
        assert!(!input.exit_requested());

        input.push_event(PlatformEvent::Quit);
        advance(&mut input);
        assert!(input.exit_requested());

        advance(&mut input);
        assert!(input.exit_requested());
    }

    #[test]
    fn test_resize_overwrites_window_size() {
        let mut input = InputSystem::new(&test_config(false));
        input.push_event(PlatformEvent::WindowResized {
            size: UVec2::new(1920, 1080),
        });
        let size = advance(&mut input);
        assert_eq!(size, UVec2::new(1920, 1080));
    }

    #[test]
    fn test_joystick_axis_normalization() {
        let mut input = InputSystem::new(&test_config(false));
        let device = JoystickId(3);

        input.push_event(PlatformEvent::JoystickAxis {
            device,
            axis: 0,
            value: 32767,
        });
        input.push_event(PlatformEvent::JoystickAxis {
            device,
            axis: 1,
            value: -32767,
        });
        input.push_event(PlatformEvent::JoystickAxis {
            device,
            axis: 2,
            value: 0,
        });
        advance(&mut input);

        let joystick = input.joystick(device).unwrap();
        assert!((joystick.axis(0) - 1.0).abs() < 1e-6);
        assert!((joystick.axis(1) + 1.0).abs() < 1e-6);
        assert_eq!(joystick.axis(2), 0.0);
    }

    #[test]
    fn test_joystick_hat_dispatch() {
        let mut input = InputSystem::new(&test_config(false));
        let device = JoystickId(3);

        input.push_event(PlatformEvent::JoystickHat {
            device,
            hat: 0,
            value: 3, // right | up
        });
        advance(&mut input);
        assert_eq!(input.joystick(device).unwrap().hat(0), Vec2::new(1.0, -1.0));
    }

    struct FakeBackend {
        list: Rc<RefCell<Vec<(JoystickId, NativeHandle)>>>,
    }

    impl JoystickBackend for FakeBackend {
        fn connected(&mut self) -> Vec<(JoystickId, NativeHandle)> {
            self.list.borrow().clone()
        }
    }

    #[test]
    fn test_joystick_record_survives_reconnect() {
        let mut input = InputSystem::new(&test_config(false));
        let device = JoystickId(7);
        let list = Rc::new(RefCell::new(vec![(device, NativeHandle(1))]));
        input.set_joystick_backend(Box::new(FakeBackend {
            list: Rc::clone(&list),
        }));

        input.push_event(PlatformEvent::JoystickAdded { device });
        input.push_event(PlatformEvent::JoystickButton {
            device,
            button: 0,
            pressed: true,
        });
        input.push_event(PlatformEvent::JoystickAxis {
            device,
            axis: 0,
            value: 16384,
        });
        advance(&mut input);
        assert!(input.joystick(device).unwrap().is_connected());
        assert!(input.joystick(device).unwrap().button(0).is_down());

        // Disconnect: handle drops, state stays
        list.borrow_mut().clear();
        input.push_event(PlatformEvent::JoystickRemoved { device });
        advance(&mut input);
        let joystick = input.joystick(device).unwrap();
        assert!(!joystick.is_connected());
        assert!(joystick.button(0).is_down());
        assert!(joystick.axis(0) > 0.4);

        // Reconnect with the same id reuses the record
        list.borrow_mut().push((device, NativeHandle(2)));
        input.push_event(PlatformEvent::JoystickAdded { device });
        advance(&mut input);
        let joystick = input.joystick(device).unwrap();
        assert_eq!(joystick.handle(), Some(NativeHandle(2)));
        assert!(joystick.button(0).is_down());
        assert_eq!(input.joysticks().count(), 1);
    }

    #[test]
    fn test_gamepad_events_cross_the_queue() {
        let mut input = InputSystem::new(&test_config(false));
        let queue = input.gamepad_queue();
        let controller = GamepadId(11);

        queue.push(GamepadEvent {
            device: controller,
            kind: GamepadEventKind::KeyDown,
            key_code: 96, // button A
            x: 0.0,
            y: 0.0,
        });
        queue.push(GamepadEvent {
            device: controller,
            kind: GamepadEventKind::Motion,
            key_code: 0,
            x: 0.9,
            y: -0.9,
        });
        advance(&mut input);

        let gamepad = input.gamepad(controller).unwrap();
        assert!(gamepad.button(GamepadControl::ButtonA).is_just_pressed());
        assert!(gamepad.button(GamepadControl::Right).is_just_pressed());
        assert!(gamepad.button(GamepadControl::Up).is_just_pressed());

        // Unmapped key codes are ignored without failing the frame
        queue.push(GamepadEvent {
            device: controller,
            kind: GamepadEventKind::KeyDown,
            key_code: 9999,
            x: 0.0,
            y: 0.0,
        });
        advance(&mut input);
        assert!(input.gamepad(controller).unwrap().button(GamepadControl::ButtonA).is_down());
    }

    #[test]
    fn test_gamepad_queue_overflow_is_bounded() {
        let mut input = InputSystem::new(&test_config(false));
        let queue = input.gamepad_queue();

        for i in 0..(GAMEPAD_QUEUE_CAPACITY + 25) {
            queue.push(GamepadEvent {
                device: GamepadId(1),
                kind: GamepadEventKind::Motion,
                key_code: 0,
                x: i as f32,
                y: 0.0,
            });
        }
        advance(&mut input);
        // Processing drained everything the queue accepted
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_lifecycle_callbacks_run_in_order_and_skip_terminating() {
        let mut input = InputSystem::new(&test_config(false));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        input.add_lifecycle_callback(move |event| first.borrow_mut().push((1, *event)));
        let second = Rc::clone(&seen);
        input.add_lifecycle_callback(move |event| second.borrow_mut().push((2, *event)));

        input.handle_lifecycle_event(LifecycleEvent::LowMemory);
        input.handle_lifecycle_event(LifecycleEvent::Terminating);

        assert_eq!(
            *seen.borrow(),
            vec![(1, LifecycleEvent::LowMemory), (2, LifecycleEvent::LowMemory)]
        );
    }

    #[test]
    fn test_background_transitions_track_minimized_frame() {
        let mut input = InputSystem::new(&test_config(false));
        advance(&mut input);
        advance(&mut input);

        input.handle_lifecycle_event(LifecycleEvent::WillEnterBackground);
        assert!(input.minimized());
        assert_eq!(input.minimized_frame(), 2);

        advance(&mut input);
        input.handle_lifecycle_event(LifecycleEvent::DidEnterForeground);
        assert!(!input.minimized());
        assert_eq!(input.minimized_frame(), 3);
    }

    #[test]
    fn test_foreground_restores_relative_mouse_mode_on_touch_screens() {
        let mut input = InputSystem::new(&test_config(true));
        input.set_relative_mouse_mode(false);

        input.handle_lifecycle_event(LifecycleEvent::WillEnterBackground);
        assert!(input.relative_mouse_mode());

        input.handle_lifecycle_event(LifecycleEvent::DidEnterForeground);
        assert!(!input.relative_mouse_mode());
    }

    #[test]
    fn test_text_recording_is_gated_and_consumer_cleared() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::TextInput {
            text: "dropped".to_string(),
        });
        advance(&mut input);
        assert!(input.text_input_events().is_empty());

        input.set_record_text_input(true);
        input.push_event(PlatformEvent::Key {
            key: KeyCode::KeyA,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::default(),
        });
        input.push_event(PlatformEvent::TextEdit {
            text: "a".to_string(),
            start: 0,
            length: 1,
        });
        input.push_event(PlatformEvent::TextInput {
            text: "a".to_string(),
        });
        advance(&mut input);
        assert_eq!(input.text_input_events().len(), 3);

        // Nothing clears itself; the consumer does
        advance(&mut input);
        assert_eq!(input.text_input_events().len(), 3);
        input.clear_text_input_events();
        assert!(input.text_input_events().is_empty());
    }

    #[test]
    fn test_unknown_events_are_skipped() {
        let mut input = InputSystem::new(&test_config(false));
        input.push_event(PlatformEvent::Unknown { code: 0x7000 });
        input.push_event(PlatformEvent::Key {
            key: KeyCode::KeyZ,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::default(),
        });
        advance(&mut input);
        // The event after the unknown one still dispatched
        assert!(input.button(KeyCode::KeyZ).is_just_pressed());
    }

    #[test]
    fn test_reset_input_state_releases_everything() {
        let mut input = InputSystem::new(&test_config(false));

        input.push_event(PlatformEvent::Key {
            key: KeyCode::KeyW,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::default(),
        });
        input.push_event(PlatformEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
            position: Some(IVec2::new(1, 1)),
        });
        advance(&mut input);
        assert!(input.button(KeyCode::KeyW).is_down());

        input.reset_input_state();
        assert_eq!(input.button(KeyCode::KeyW), ButtonState::Released);
        assert_eq!(input.pointer_button(0), ButtonState::Released);
        assert!(!input.pointer(0).unwrap().used);
    }

    #[test]
    fn test_gamepad_producer_on_another_thread() {
        let mut input = InputSystem::new(&test_config(false));
        let queue = input.gamepad_queue();

        let handle = std::thread::spawn(move || {
            queue.push(GamepadEvent {
                device: GamepadId(5),
                kind: GamepadEventKind::KeyDown,
                key_code: 96,
                x: 0.0,
                y: 0.0,
            });
        });
        handle.join().unwrap();

        advance(&mut input);
        assert!(
            input
                .gamepad(GamepadId(5))
                .unwrap()
                .button(GamepadControl::ButtonA)
                .is_down()
        );
    }
}
