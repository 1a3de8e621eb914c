use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{debug, error, info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

use rocky_road::app::{
    level_summary, load_config, load_levels, log_event, run_headless, FrameClock,
};
use rocky_road::{
    Game, GameConfig, GameEvent, InputState, KeyCode, LevelSet, NamedKey, Renderer,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let levels = load_levels(options.levels.as_deref())?;
    let config = load_config(options.config.as_deref())?;

    if options.summary {
        print!("{}", level_summary(&levels));
        return Ok(());
    }

    if options.headless {
        return headless(config, levels, options.frames);
    }

    match run_interactive(config.clone(), levels.clone()) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                headless(config, levels, options.frames)
            } else {
                Err(err)
            }
        }
    }
}

fn headless(config: GameConfig, levels: LevelSet, frames: usize) -> Result<()> {
    let mut game = Game::new(config, levels);
    let report = run_headless(&mut game, frames);
    println!("{report}");
    Ok(())
}

fn run_interactive(config: GameConfig, levels: LevelSet) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    let mut app = App::new(config, levels);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    info!("final state: {} (stage {})", app.game.state(), app.game.stage() + 1);
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Windowed front end: owns the GPU side and feeds the game.
struct App {
    renderer: Option<Renderer>,
    game: Game,
    input: InputState,
    clock: FrameClock,
    cursor_captured: bool,
    title: String,
    last_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: GameConfig, levels: LevelSet) -> Self {
        let clock = FrameClock::new(config.max_frame_time);
        Self {
            renderer: None,
            game: Game::new(config, levels),
            input: InputState::new(),
            clock,
            cursor_captured: false,
            title: String::new(),
            last_error: None,
        }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = self.game.config();
        let attributes = Window::default_attributes()
            .with_title("Rocky Road")
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        let renderer = block_on(Renderer::new(window))
            .map_err(|err| WindowInitError::from_error("renderer", format!("{err:#}")))?;
        self.renderer = Some(renderer);
        self.clock = FrameClock::new(self.game.config().max_frame_time);
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                if key == self.game.config().controls.fullscreen && !event.repeat {
                    self.toggle_fullscreen();
                }
                self.input.set_key_down(key);
            }
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Back => 3,
            WinitMouseButton::Forward => 4,
            WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
        };
        let button = rocky_road::MouseButton::new(index);
        match state {
            ElementState::Pressed => self.input.set_mouse_button_down(button),
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }

    fn toggle_fullscreen(&self) {
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let window = renderer.window();
        if window.fullscreen().is_some() {
            window.set_fullscreen(None);
        } else {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
    }

    fn sync_cursor(&mut self) {
        let wanted = self.game.wants_mouse_captured();
        if wanted == self.cursor_captured {
            return;
        }
        let Some(renderer) = self.renderer.as_ref() else {
            return;
        };
        let window = renderer.window();
        if wanted {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                warn!("could not capture the cursor: {err}");
            }
        } else if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!("could not release the cursor: {err}");
        }
        window.set_cursor_visible(!wanted);
        self.cursor_captured = wanted;
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(size) = self.renderer.as_ref().map(Renderer::size) else {
            return Ok(());
        };
        let viewport = (size.width.max(1), size.height.max(1));
        let dt = self.clock.tick();
        let frame = self.input.take_frame(dt, viewport);

        for event in self.game.update(&frame) {
            log_event(&event);
            if let GameEvent::StateChanged { from, to } = event {
                debug!("state {from} -> {to}");
            }
        }
        self.sync_cursor();

        let scene = self.game.scene(viewport);
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        if scene.title != self.title {
            renderer.window().set_title(&scene.title);
            self.title = scene.title.clone();
        }

        if let Err(err) = renderer.render(&scene) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    renderer.reconfigure();
                }
                wgpu::SurfaceError::OutOfMemory => {
                    error!("surface reported out of memory");
                    return Err(anyhow!("GPU is out of memory"));
                }
                other => {
                    warn!("Surface error {other:?}; retrying next frame");
                }
            }
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.create_renderer(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(id) = self.renderer.as_ref().map(Renderer::window_id) else {
            return;
        };
        if window_id != id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button)
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.input.set_mouse_position(pos);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.cursor_captured {
                self.input
                    .add_mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32));
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter | Key::NumpadEnter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Backspace => KeyCode::Named(NamedKey::Backspace),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        Key::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        Key::AltRight => KeyCode::Named(NamedKey::RightAlt),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        _ => return None,
    })
}

const USAGE: &str =
    "Usage: rocky-road [--levels <file>] [--config <file>] [--headless] [--frames <n>] [--summary]";

struct CliOptions {
    levels: Option<PathBuf>,
    config: Option<PathBuf>,
    headless: bool,
    frames: usize,
    summary: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            levels: None,
            config: None,
            headless: false,
            frames: 600,
            summary: false,
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--levels" => options.levels = Some(PathBuf::from(value(&mut args, "--levels")?)),
                "--config" => options.config = Some(PathBuf::from(value(&mut args, "--config")?)),
                "--frames" => {
                    let raw = value(&mut args, "--frames")?;
                    options.frames = raw
                        .parse()
                        .with_context(|| format!("--frames expects a frame count, got {raw:?}"))?;
                }
                "--headless" => options.headless = true,
                "--summary" => options.summary = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}
