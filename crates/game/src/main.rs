//! Dungeon walkthrough: a first-person dungeon whose doors lead to algorithm pages.

mod classify;
mod config;
mod level;
mod loading;
mod navigation;
mod overlay;
mod player;
mod registry;
mod selector;
mod session;
mod storage;

use anyhow::Result;
use classify::Destination;
use config::GameConfig;
use engine_core::Time;
use input::InputState;
use level::LevelKind;
use session::{FrameContext, LevelSession, SessionOutcome};
use std::sync::Arc;
use storage::DurableStore;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

/// Window, input and the active level session.
struct GameState {
    window: Arc<Window>,
    config: GameConfig,
    time: Time,
    input: InputState,
    store: DurableStore,
    session: LevelSession,
    viewport: (u32, u32),
    title: String,
    running: bool,
}

impl GameState {
    fn new(window: Arc<Window>, config: GameConfig) -> Self {
        let store = DurableStore::open(&config.storage_path);
        let session = LevelSession::start(config.start_level, &config, &store);
        let size = window.inner_size();
        Self {
            window,
            time: Time::new(),
            input: InputState::new(),
            store,
            session,
            viewport: (size.width, size.height),
            title: String::new(),
            running: true,
            config,
        }
    }

    /// Handle a window event. Returns true if the app should exit.
    fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.viewport = (size.width, size.height);
                self.session.set_viewport(size.width, size.height);
                false
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
                self.set_look_lock(false);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.process_mouse_button(button, state);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.process_cursor_position((position.x, position.y));
                false
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.window.request_redraw();
                !self.running
            }
            _ => false,
        }
    }

    /// Handle device events (e.g. raw mouse motion).
    fn handle_device_event(&mut self, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.is_cursor_locked() {
                self.input.process_mouse_motion(delta);
            }
        }
    }

    fn update(&mut self) {
        self.time.update();

        if self.input.is_lock_pressed() {
            self.set_look_lock(true);
        } else if self.input.is_close_pressed() {
            self.set_look_lock(false);
        }

        let outcome = self.session.frame(
            FrameContext {
                dt: self.time.delta_seconds(),
                input: &self.input,
                viewport: self.viewport,
            },
            &mut self.store,
        );

        match outcome {
            SessionOutcome::Continue => {}
            SessionOutcome::Reload => self.enter(self.session.kind()),
            SessionOutcome::Enter(level) => {
                self.set_look_lock(false);
                self.enter(level);
            }
            SessionOutcome::Navigate(destination) => self.navigate(destination),
        }

        self.update_title();

        // Clear input for next frame
        self.input.begin_frame();
    }

    fn enter(&mut self, level: LevelKind) {
        self.session = LevelSession::start(level, &self.config, &self.store);
        self.session.set_viewport(self.viewport.0, self.viewport.1);
        self.time.reset_frame();
    }

    fn navigate(&mut self, destination: Destination) {
        if let Some(level) = destination.level() {
            self.set_look_lock(false);
            self.enter(level);
            return;
        }

        let page = self.config.pages_dir.join(destination.page());
        let page = std::fs::canonicalize(&page).unwrap_or(page);
        log::info!("Opening {:?}", page);
        if self.config.open_external_pages {
            let url = format!("file://{}", page.display());
            if let Err(e) = webbrowser::open(&url) {
                log::error!("Could not open {}: {}", url, e);
            }
        }
        self.running = false;
    }

    fn set_look_lock(&mut self, locked: bool) {
        if locked {
            let _ = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
        }
        self.window.set_cursor_visible(!locked);
        self.input.set_cursor_locked(locked);
    }

    fn update_title(&mut self) {
        let title = self.session.status_line();
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = GameConfig::load();
            if !GameConfig::path().exists() {
                config.save();
            }
            let window_attrs = Window::default_attributes()
                .with_title("Dungeon")
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            window.request_redraw();
            self.state = Some(GameState::new(window, config));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            state.handle_device_event(event);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Dungeon walkthrough");
    println!("  Enter       - Look around (Escape releases)");
    println!("  WASD/Shift  - Move / sprint");
    println!("  Left Click  - Use the highlighted door or bucket");
    println!("  1-6, <- ->  - Bucket sort walkthrough steps (Escape closes)");
    println!("  Backspace   - Leave the bucket sort room");
    println!("  F5          - Forget saved position and reload");

    log::info!("Starting dungeon walkthrough");

    let event_loop = EventLoop::new()?;
    // Poll so the fixed-step simulation keeps running without input events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
