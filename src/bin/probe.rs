//! Input probe
//!
//! Opens a window, feeds every platform event through the input system,
//! and logs the edges it observes each frame. Useful for eyeballing
//! pointer reconciliation and edge timing on a real event stream.

use glam::{IVec2, UVec2};
use tracing::{info, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use input_pool::config::InputConfig;
use input_pool::input::{EventCollector, InputSystem};

struct Probe {
    window: Option<Window>,
    window_size: UVec2,
    collector: EventCollector,
    input: InputSystem,
}

impl Probe {
    fn new(config: InputConfig) -> Self {
        info!(profile = %config.profile, "Starting input probe");
        Self {
            window: None,
            window_size: UVec2::new(800, 600),
            collector: EventCollector::new(),
            input: InputSystem::new(&config),
        }
    }

    fn log_frame(&self) {
        for (ordinal, pointer) in self.input.pointers().iter().enumerate() {
            if pointer.button.is_just_pressed() {
                info!(
                    ordinal,
                    x = pointer.position.x,
                    y = pointer.position.y,
                    "pointer down"
                );
            }
            if pointer.button.is_just_released() {
                info!(ordinal, "pointer up");
            }
        }

        let wheel = self.input.mouse_wheel_delta();
        if wheel != IVec2::ZERO {
            info!(x = wheel.x, y = wheel.y, "wheel");
        }

        for (id, joystick) in self.input.joysticks() {
            for (index, button) in joystick.buttons().iter().enumerate() {
                if button.is_just_pressed() {
                    info!(device = id.0, index, "joystick button down");
                }
            }
        }
    }
}

impl ApplicationHandler for Probe {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attributes = Window::default_attributes()
                .with_title("Input Probe")
                .with_inner_size(winit::dpi::LogicalSize::new(800.0, 600.0));

            match event_loop.create_window(attributes) {
                Ok(window) => {
                    let size = window.inner_size();
                    self.window_size = UVec2::new(size.width, size.height);
                    self.window = Some(window);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to create window");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.collector.handle_window_event(&event);

        if let WindowEvent::RedrawRequested = event
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.input.relative_mouse_mode() {
            self.collector.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.collector.flush_into(&mut self.input);

        let mut size = self.window_size;
        self.input.advance_frame(&mut size);
        if size != self.window_size {
            info!(width = size.x, height = size.y, "window resized");
            self.window_size = size;
        }

        self.log_frame();

        if self.input.exit_requested() {
            info!("Exit requested, shutting down");
            event_loop.exit();
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = InputConfig::load_from_env().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using default configuration");
        InputConfig::default()
    });

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut probe = Probe::new(config);
    event_loop.run_app(&mut probe)?;

    Ok(())
}
