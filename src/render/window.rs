use std::sync::Arc;

use anyhow::{Result, anyhow};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::RenderConfig;

/// Configuration for window creation.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "armature-render".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

impl WindowConfig {
    pub fn from_render_config(title: &str, config: &RenderConfig) -> Self {
        Self {
            title: title.to_string(),
            width: config.width,
            height: config.height,
            ..Default::default()
        }
    }
}

/// Per-frame callbacks driven by `run_app`.
pub trait GameLoop {
    /// Called once when the window exists; set up the GPU here.
    fn init(&mut self, window: Arc<Window>) -> Result<()>;
    /// Advance state by `dt` seconds.
    fn update(&mut self, dt: f32);
    fn render(&mut self) -> Result<()>;
    /// Return true to allow closing.
    fn should_close(&self) -> bool {
        true
    }
    fn on_resize(&mut self, width: u32, height: u32);
}

/// Run the application with a winit event loop.
pub fn run_app<G: GameLoop + 'static>(config: WindowConfig, game: G) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;

    struct App<G: GameLoop> {
        game: G,
        config: WindowConfig,
        window: Option<Arc<Window>>,
        last_frame: Option<std::time::Instant>,
    }

    impl<G: GameLoop> ApplicationHandler for App<G> {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            let attrs = Window::default_attributes()
                .with_title(&self.config.title)
                .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
                .with_resizable(self.config.resizable);

            match event_loop.create_window(attrs) {
                Ok(window) => {
                    let window = Arc::new(window);
                    if let Err(e) = self.game.init(window.clone()) {
                        tracing::error!("failed to initialize: {e:#}");
                        event_loop.exit();
                        return;
                    }
                    window.request_redraw();
                    self.window = Some(window);
                }
                Err(e) => {
                    tracing::error!("failed to create window: {e}");
                    event_loop.exit();
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
                WindowEvent::CloseRequested => {
                    if self.game.should_close() {
                        event_loop.exit();
                    }
                }
                WindowEvent::Resized(size) => {
                    self.game.on_resize(size.width, size.height);
                }
                WindowEvent::RedrawRequested => {
                    let now = std::time::Instant::now();
                    let dt = self
                        .last_frame
                        .map(|t| now.duration_since(t).as_secs_f32())
                        .unwrap_or(0.0);
                    self.last_frame = Some(now);

                    self.game.update(dt);
                    if let Err(e) = self.game.render() {
                        tracing::error!("render error: {e:#}");
                    }
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        }
    }

    let mut app = App {
        game,
        config,
        window: None,
        last_frame: None,
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop error: {e}"))?;

    Ok(())
}
