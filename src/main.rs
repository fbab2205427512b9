use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use softrender::{
    parse_hex_color, unpack_rgb, Renderer, RendererConfig, ResourceLedger, TrackingPresenter,
    TrackingWindow, WgpuPresenter, CUBE_VERTICES,
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
    let config = options.config;
    config.validate().context("invalid renderer configuration")?;
    print_summary(&config);

    if options.summary_only {
        return run_headless(&config);
    }
    match run_interactive(config.clone()) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<DisplayUnavailable>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or WAYLAND_DISPLAY to open a window)."
            );
            run_headless(&config)
        }
        Err(err) => Err(err),
    }
}

fn print_summary(config: &RendererConfig) {
    let (r, g, b) = unpack_rgb(config.background);
    println!(
        "Frame buffer {}x{} ({} pixels)",
        config.width,
        config.height,
        config.width as u64 * config.height as u64
    );
    println!(
        "Background #{r:02x}{g:02x}{b:02x} ({:#010x})",
        config.background
    );
    println!("Sample cube:");
    for vertex in CUBE_VERTICES {
        let p = vertex.point;
        println!(
            " - ({:.2}, {:.2}, {:.2}) color #{:06x}",
            p.x,
            p.y,
            p.z,
            vertex.packed_color()
        );
    }
}

/// Runs one init/update/shutdown cycle against the in-memory presenter.
fn run_headless(config: &RendererConfig) -> Result<()> {
    let ledger = ResourceLedger::new();
    let mut renderer = Renderer::with_config(config, TrackingPresenter::new(ledger.clone()));
    let window = TrackingWindow::new(0);

    renderer
        .init(config.width, config.height, &window)
        .context("failed to initialize renderer")?;
    renderer.update(&window).context("failed to present frame")?;
    renderer.shutdown();

    println!(
        "Presented {} frame(s); {} handle(s) acquired, {} released, {} outstanding",
        ledger.frames_presented(),
        ledger.acquired_count(),
        ledger.released_count(),
        ledger.outstanding().len()
    );
    Ok(())
}

fn run_interactive(config: RendererConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(DisplayUnavailable::from_panic)?
        .map_err(|err| DisplayUnavailable::EventLoop(err.to_string()))?;

    let mut app = App {
        renderer: Renderer::with_config(&config, WgpuPresenter::new(config.vsync)),
        config,
        window: None,
        last_error: None,
    };
    let run_result = event_loop.run_app(&mut app);
    app.renderer.shutdown();

    if let Some(err) = app.last_error.take() {
        return Err(err);
    }
    run_result.context("event loop terminated with error")
}

struct App {
    config: RendererConfig,
    renderer: Renderer<WgpuPresenter>,
    window: Option<Arc<Window>>,
    last_error: Option<anyhow::Error>,
}

impl App {
    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("softrender")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| DisplayUnavailable::Window(err.to_string()))?,
        );
        self.renderer
            .init(self.config.width, self.config.height, &window)
            .context("failed to initialize renderer")?;
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.open_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                self.renderer.shutdown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => match self.renderer.update(&window) {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => window.request_redraw(),
                Err(err) => self.fail(event_loop, anyhow!(err).context("frame update failed")),
            },
            _ => {}
        }
    }
}

struct CliOptions {
    config: RendererConfig,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = RendererConfig::default();
        let mut summary_only = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => config.width = parse_dimension("--width", args.next())?,
                "--height" => config.height = parse_dimension("--height", args.next())?,
                "--background" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--background expects a value"))?;
                    config.background = parse_hex_color(&value)
                        .ok_or_else(|| anyhow!("invalid background color: {value}"))?;
                }
                "--no-vsync" => config.vsync = false,
                "--summary-only" => summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: softrender [--width N] [--height N] [--background RRGGBB] [--no-vsync] [--summary-only]"
                    ));
                }
            }
        }
        Ok(Self {
            config,
            summary_only,
        })
    }
}

fn parse_dimension(flag: &str, value: Option<String>) -> Result<u32> {
    let value = value.ok_or_else(|| anyhow!("{flag} expects a value"))?;
    value
        .parse()
        .with_context(|| format!("{flag} must be a positive integer, got {value}"))
}

/// No display could be opened; the binary falls back to a headless run.
#[derive(Debug, thiserror::Error)]
enum DisplayUnavailable {
    #[error("failed to create event loop: {0}")]
    EventLoop(String),

    #[error("event loop creation panicked: {0}")]
    EventLoopPanic(String),

    #[error("failed to open window: {0}")]
    Window(String),
}

impl DisplayUnavailable {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let reason = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
            .unwrap_or_else(|| "no panic message".into());
        Self::EventLoopPanic(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_flags() {
        let options = parse(&["--width", "4", "--height", "2", "--background", "#010203", "--summary-only"]).unwrap();
        assert_eq!(options.config.width, 4);
        assert_eq!(options.config.height, 2);
        assert_eq!(options.config.background, 0x0001_0203);
        assert!(options.summary_only);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--width"]).is_err());
        assert!(parse(&["--width", "-3"]).is_err());
        assert!(parse(&["--background", "blue"]).is_err());
        assert!(parse(&["--fullscreen"]).is_err());
    }

    #[test]
    fn panic_payloads_become_fallback_reasons() {
        let owned = DisplayUnavailable::from_panic(Box::new(String::from("no DISPLAY")));
        assert_eq!(
            owned.to_string(),
            "event loop creation panicked: no DISPLAY"
        );
        let borrowed = DisplayUnavailable::from_panic(Box::new("wayland missing"));
        assert!(matches!(borrowed, DisplayUnavailable::EventLoopPanic(ref r) if r == "wayland missing"));
        let opaque = DisplayUnavailable::from_panic(Box::new(7u8));
        assert!(opaque.to_string().ends_with("no panic message"));
    }
}
