//! Window + event loop runner.
//!
//! This module owns:
//! - the winit application lifecycle and event loop
//! - creating the window
//! - delegating to an injected async state builder
//!
//! The runner is generic over a state type `S: AppState`; the builder is async, receives
//! the created window, and is driven with `pollster::block_on`.

use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Context as _;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

/// Window and event loop settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Event loop control flow. `Wait` is enough because the state requests its own
    /// redraws while animating.
    pub control_flow: ControlFlow,
    /// Initial inner size in logical points.
    pub inner_size_pt: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "ghostly".to_string(),
            control_flow: ControlFlow::Wait,
            inner_size_pt: [420.0, 640.0],
        }
    }
}

/// What the runner needs from an application state.
pub trait AppState: 'static {
    /// The window's physical size changed (also sent after a scale-factor change).
    fn resize(&mut self, new_size: PhysicalSize<u32>);

    /// Render one frame.
    fn render(&mut self) -> anyhow::Result<()>;

    /// Ask the window for another frame.
    fn request_redraw(&self);

    /// Called once before the state is dropped on close.
    fn shutdown(&mut self) {}
}

/// Run the event loop with an injected async state builder.
///
/// The builder is called once, on the first `resumed`, with the freshly created window.
/// Window creation and builder errors end the loop and are returned from here.
pub fn run_with_builder<S, B, Fut>(config: AppConfig, builder: B) -> anyhow::Result<()>
where
    S: AppState,
    B: FnOnce(Arc<Window>) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<S>> + 'static,
{
    let event_loop = EventLoop::new().context("winit: failed to create EventLoop")?;
    event_loop.set_control_flow(config.control_flow);

    let mut app = App::<S>::new_with_builder(config, builder);
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")?;

    match app.init_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Type-erased async builder. Boxed and pinned so `pollster::block_on` can drive it.
type BoxedStateBuilder<S> = Box<
    dyn FnOnce(Arc<Window>) -> Pin<Box<dyn Future<Output = anyhow::Result<S>> + 'static>> + 'static,
>;

struct App<S: AppState> {
    config: AppConfig,
    builder: Option<BoxedStateBuilder<S>>,
    state: Option<S>,
    init_error: Option<anyhow::Error>,
    exiting: bool,
}

impl<S: AppState> App<S> {
    fn new_with_builder<B, Fut>(config: AppConfig, builder: B) -> Self
    where
        B: FnOnce(Arc<Window>) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<S>> + 'static,
    {
        Self {
            config,
            builder: Some(Box::new(|window| Box::pin(builder(window)))),
            state: None,
            init_error: None,
            exiting: false,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let [w, h] = self.config.inner_size_pt;
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.as_str())
            .with_inner_size(LogicalSize::new(w as f64, h as f64));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("winit: failed to create window")?,
        );
        info!(
            "window created: {:?} physical px, scale factor {}",
            window.inner_size(),
            window.scale_factor()
        );

        let builder = self
            .builder
            .take()
            .context("app state builder can only be consumed once")?;
        let state = pollster::block_on(builder(window)).context("failed to initialize app state")?;
        state.request_redraw();
        self.state = Some(state);
        Ok(())
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
        event_loop.exit();
    }
}

impl<S: AppState> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.builder.is_none() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            error!("initialization failed: {err:#}");
            self.init_error = Some(err);
            self.exiting = true;
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exiting {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; exiting");
                self.close(event_loop);
            }
            WindowEvent::Resized(size) => {
                state.resize(size);
                state.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                // winit follows up with `Resized` carrying the new physical size.
                state.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.render() {
                    warn!("render error: {err:#}");
                }
            }
            _ => {}
        }
    }
}
