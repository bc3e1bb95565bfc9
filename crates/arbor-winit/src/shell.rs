//! Window shell driving a [`Runtime`] from a winit event loop.
//!
//! The shell owns one window. It feeds translated input to the runtime, sleeps
//! until [`Runtime::next_deadline`] between messages, wakes on raises of the
//! runtime's [`InvalidateSignal`](arbor::InvalidateSignal) from other threads,
//! and hands each painted [`DisplayList`] to a [`Presenter`]. Rasterizing the
//! display list is up to the presenter.

use crate::input::{convert_size, InputTranslator};
use arbor::{DisplayList, Point, RawEvent, Rect, Runtime};
use arbor_macros::WithBuilders;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::error::{EventLoopError, OsError};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] OsError),
    #[error("failed to start the invalidate relay: {0}")]
    Relay(#[from] std::io::Error),
}

/// Window settings
#[derive(Debug, Clone, PartialEq, WithBuilders)]
pub struct ShellConfig {
    #[with_builders(into)]
    pub title: String,
    /// Initial client width in logical pixels
    pub width: u32,
    /// Initial client height in logical pixels
    pub height: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "arbor".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// User events sent to the event loop from other threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    /// The invalidate signal was raised
    Invalidate,
}

/// Receives every painted frame
pub trait Presenter {
    /// `damage` is the window area that changed since the previous frame
    fn present(&mut self, window: &Window, frame: &DisplayList, damage: Rect);
}

/// Presenter that only logs what it would draw
#[derive(Debug, Default)]
pub struct LogPresenter {
    frames: usize,
}

impl LogPresenter {
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, _window: &Window, frame: &DisplayList, damage: Rect) {
        self.frames += 1;
        log::info!(
            "frame {}: {} commands, damage {:?}",
            self.frames,
            frame.len(),
            damage
        );
    }
}

struct Shell<P> {
    runtime: Runtime,
    config: ShellConfig,
    presenter: P,
    window: Option<Arc<Window>>,
    input: InputTranslator,
    proxy: EventLoopProxy<ShellEvent>,
    relay: Option<JoinHandle<()>>,
    error: Option<ShellError>,
}

impl<P: Presenter> Shell<P> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ShellError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.runtime.invalidate_signal().close();
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ShellError> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let now = Instant::now();
        self.runtime
            .handle(RawEvent::ScaleFactor(window.scale_factor() as f32), now);
        self.runtime
            .handle(RawEvent::Resize(convert_size(window.inner_size())), now);
        self.runtime.open(now);

        let proxy = self.proxy.clone();
        let relay = self.runtime.invalidate_signal().spawn_relay(move || {
            // Fails only once the event loop is gone
            let _ = proxy.send_event(ShellEvent::Invalidate);
        })?;
        self.relay = Some(relay);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let mut frame = DisplayList::new();
        self.runtime.paint(&mut frame);
        let client = self.runtime.tree().client_size();
        let damage = self
            .runtime
            .take_damage()
            .unwrap_or_else(|| Rect::from_origin_size(Point::zero(), client));
        self.presenter.present(&window, &frame, damage);
    }

    fn request_redraw_if_damaged(&self) {
        if let Some(window) = &self.window {
            if self.runtime.tree().damage().is_some() || self.runtime.tree().needs_layout() {
                window.request_redraw();
            }
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if !self.runtime.request_close() {
            return;
        }
        self.window = None;
        event_loop.exit();
    }
}

impl<P: Presenter> ApplicationHandler<ShellEvent> for Shell<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(error) = self.create_window(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ShellEvent) {
        match event {
            ShellEvent::Invalidate => {
                self.runtime.tree_mut().invalidate_all();
                self.request_redraw_if_damaged();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::RedrawRequested => self.redraw(),
            event => {
                let now = Instant::now();
                for raw in self.input.translate(&event) {
                    self.runtime.handle(raw, now);
                }
                if self.runtime.is_closed() {
                    // Closed from inside a handler
                    self.window = None;
                    event_loop.exit();
                    return;
                }
                self.request_redraw_if_damaged();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.runtime.next_deadline().is_some_and(|d| d <= now) {
            self.runtime.advance(now);
            self.request_redraw_if_damaged();
        }
        let flow = match self.runtime.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.runtime.invalidate_signal().close();
        if let Some(relay) = self.relay.take() {
            if relay.join().is_err() {
                log::warn!("invalidate relay panicked");
            }
        }
        log::debug!("shell exiting");
    }
}

/// Open a window for `runtime` and run until it closes
///
/// ```ignore
/// let runtime = Runtime::new(tree, EngineConfig::default());
/// arbor_winit::run(runtime, ShellConfig::default().with_title("demo"), LogPresenter::default())?;
/// ```
pub fn run<P: Presenter>(
    runtime: Runtime,
    config: ShellConfig,
    presenter: P,
) -> Result<(), ShellError> {
    let event_loop = EventLoop::<ShellEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut shell = Shell {
        runtime,
        config,
        presenter,
        window: None,
        input: InputTranslator::new(),
        proxy: event_loop.create_proxy(),
        relay: None,
        error: None,
    };
    event_loop.run_app(&mut shell)?;

    match shell.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
