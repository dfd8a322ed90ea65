mod renderer;

use aurafield::canvas::PixelCanvas;
use aurafield::constants::*;
use aurafield::{AuraConfig, Color, FrameDriver, presets};
use clap::Parser;
use log::{error, info, warn};
use renderer::Renderer;
use std::path::PathBuf;
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

// Used when a frame timestamp is unavailable or absurd (first frame, resume).
const FALLBACK_DT: f32 = 1.0 / 60.0;
const MAX_DT: f32 = 0.25;
const HEADLESS_LOG_EVERY: u32 = 60;

/// Particle aura viewer
#[derive(Parser, Debug)]
#[command(name = "aurafield", version, about, long_about = None)]
struct Args {
    /// Aura JSON file to load
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in aura: fire, wind, shock, cosmic or smoke
    #[arg(short, long)]
    preset: Option<String>,

    #[arg(long, default_value_t = WINDOW_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = WINDOW_HEIGHT)]
    height: u32,

    /// Seed for a reproducible particle stream
    #[arg(long)]
    seed: Option<u64>,

    /// Render this many frames without a window, then exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,

    /// Backdrop swatch name ("dark navy") or CSS color
    #[arg(short, long, default_value = "black")]
    background: String,
}

impl Args {
    fn initial_config(&self) -> aurafield::Result<AuraConfig> {
        match (&self.config, &self.preset) {
            (Some(path), _) => {
                info!("loading aura from {}", path.display());
                AuraConfig::from_path(path)
            }
            (None, Some(name)) => presets::builtin(name),
            (None, None) => presets::builtin("fire"),
        }
    }

    fn backdrop(&self) -> Color {
        presets::backdrop(&self.background)
            .or_else(|| self.background.parse().ok())
            .unwrap_or_else(|| {
                warn!(
                    "unknown background {:?}, expected one of: {}",
                    self.background,
                    presets::backdrop_names().collect::<Vec<_>>().join(", ")
                );
                Color::BLACK
            })
    }

    fn driver(&self, width: u32, height: u32) -> FrameDriver {
        match self.seed {
            Some(seed) => FrameDriver::with_seed(width as f32, height as f32, seed),
            None => FrameDriver::new(width as f32, height as f32),
        }
    }
}

fn run_headless(args: &Args, config: AuraConfig, frames: u32) -> aurafield::Result<()> {
    let mut canvas = PixelCanvas::new(args.width, args.height)?;
    let (width, height) = (canvas.width(), canvas.height());
    let mut driver = args.driver(width, height);
    driver.swap_config(config);
    driver.start();

    let started = Instant::now();
    for i in 1..=frames {
        driver.frame(&mut canvas, FALLBACK_DT);
        if i % HEADLESS_LOG_EVERY == 0 {
            let stats = driver.stats();
            info!(
                "frame {} - {:?} - {} particles",
                stats.frame, stats.state, stats.particles
            );
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let covered = canvas
        .to_rgba8()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count();
    let stats = driver.stats();
    info!(
        "headless run done: {} frames in {:.2}s ({:.1} fps), {} particles, {:.1}% of pixels covered",
        stats.frame,
        elapsed,
        stats.frame as f64 / elapsed.max(1e-9),
        stats.particles,
        100.0 * covered as f64 / (width as f64 * height as f64)
    );
    Ok(())
}

fn resize_canvas(canvas: &mut PixelCanvas, size: PhysicalSize<u32>) {
    if let Err(e) = canvas.resize(size.width, size.height) {
        error!("keeping {}x{} canvas: {e}", canvas.width(), canvas.height());
    }
}

fn preset_for_key(code: KeyCode) -> Option<&'static str> {
    let index = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        _ => return None,
    };
    presets::names().get(index).copied()
}

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = args.initial_config()?;

    if let Some(frames) = args.headless {
        run_headless(&args, config, frames)?;
        return Ok(());
    }

    let backdrop = args.backdrop();
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Aurafield")
            .with_inner_size(PhysicalSize::new(args.width, args.height))
            .build(&event_loop)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut canvas = PixelCanvas::new(renderer.size.width, renderer.size.height)?;
    let mut driver = args.driver(renderer.size.width, renderer.size.height);
    driver.swap_config(config);
    driver.start();

    let mut last_frame_time = Instant::now();
    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                    resize_canvas(&mut canvas, renderer.size);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    renderer.resize(window.inner_size());
                    resize_canvas(&mut canvas, renderer.size);
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        let PhysicalKey::Code(code) = key_event.physical_key else {
                            return;
                        };
                        let tunables = driver.tunables();
                        match code {
                            KeyCode::ArrowUp => {
                                driver.set_speed_multiplier(tunables.speed() + SPEED_ADJUST_STEP)
                            }
                            KeyCode::ArrowDown => {
                                driver.set_speed_multiplier(tunables.speed() - SPEED_ADJUST_STEP)
                            }
                            KeyCode::ArrowRight => driver
                                .set_density_multiplier(tunables.density() + DENSITY_ADJUST_STEP),
                            KeyCode::ArrowLeft => driver
                                .set_density_multiplier(tunables.density() - DENSITY_ADJUST_STEP),
                            KeyCode::BracketRight => {
                                driver.set_size_multiplier(tunables.size() + SIZE_ADJUST_STEP)
                            }
                            KeyCode::BracketLeft => {
                                driver.set_size_multiplier(tunables.size() - SIZE_ADJUST_STEP)
                            }
                            KeyCode::Space => {
                                if driver.is_running() {
                                    driver.stop();
                                } else {
                                    driver.start();
                                    last_frame_time = Instant::now();
                                }
                            }
                            KeyCode::Digit0 => driver.clear_config(),
                            KeyCode::KeyR => driver.reseed(),
                            KeyCode::Escape => elwt.exit(),
                            other => {
                                if let Some(name) = preset_for_key(other) {
                                    match presets::builtin(name) {
                                        Ok(config) => driver.swap_config(config),
                                        Err(e) => warn!("preset {name}: {e}"),
                                    }
                                }
                            }
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                    }

                    let mut dt = now.duration_since(last_frame_time).as_secs_f32();
                    if !(dt > 0.0 && dt <= MAX_DT) {
                        dt = FALLBACK_DT;
                    }
                    last_frame_time = now;
                    // A stopped driver leaves the last frame on the canvas.
                    driver.frame(&mut canvas, dt);

                    match renderer.render(&canvas, backdrop) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => error!("WGPU Error: {:?}", e),
                    }

                    let stats = driver.stats();
                    let tunables = driver.tunables();
                    let name = driver
                        .config()
                        .and_then(|c| c.name.as_deref())
                        .unwrap_or("-");
                    let stopped_text = if driver.is_running() { "" } else { " [STOPPED]" };
                    window.set_title(&format!(
                        "Aurafield - {} ({:?}) - P: {} - Speed: {:.2}x Density: {:.2}x Size: {:.1}x - FPS: {:.1}{}",
                        name,
                        stats.state,
                        stats.particles,
                        tunables.speed(),
                        tunables.density(),
                        tunables.size(),
                        current_fps,
                        stopped_text
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
