use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::fps::FpsMeter;
use grid_raycaster::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};
use grid_raycaster::world::{DEMO_WALLS_H, DEMO_WALLS_V, GRID_SIZE, MAP_SIZE};
use grid_raycaster::{
    CameraPose, GridMap, PixelBuffer, RayCaster, RenderConfig, Rgba, TextureSampler,
};

const TURN_STEP: i32 = 4; // degrees per frame
const MOVE_STEP: f64 = 5.0; // world units per frame

#[derive(Parser, Debug)]
#[command(version, about = "Grid ray caster demo")]
struct Args {
    /// Internal viewport width in pixels
    #[arg(long, default_value_t = 640)]
    width: usize,

    /// Internal viewport height in pixels
    #[arg(long, default_value_t = 400)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = grid_raycaster::config::DEFAULT_FOV)]
    fov: f64,

    /// Wall texture image; a checkerboard is used when omitted
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Initial window size as a multiple of the viewport
    #[arg(long, default_value_t = 2)]
    scale: u32,
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    caster: RayCaster,
    camera: CameraPose,
    config: RenderConfig,
    scale: u32,

    frame: PixelBuffer,
    scale_lut: ScaleLut,

    fps: FpsMeter,
    last_fps_log: Instant,

    keys_down: HashSet<KeyCode>,
}

impl App {
    fn new(args: Args) -> Result<Self> {
        let config = RenderConfig {
            viewport_width: args.width,
            viewport_height: args.height,
            fov_degrees: args.fov,
            ..RenderConfig::default()
        };

        let texture = match &args.texture {
            Some(path) => TextureSampler::load(path)
                .with_context(|| format!("loading texture {}", path.display()))?,
            None => {
                info!("no texture given, using checkerboard");
                TextureSampler::checkerboard(64, Rgba::rgb(170, 90, 60), Rgba::rgb(140, 70, 50))
            }
        };

        let map = GridMap::from_flags(MAP_SIZE, GRID_SIZE, &DEMO_WALLS_H, &DEMO_WALLS_V)
            .context("building demo map")?;
        let caster = RayCaster::new(&config, map, texture)
            .context("building ray caster")?;

        Ok(Self {
            window: None,
            surface: None,
            caster,
            camera: CameraPose::new(32.0, 32.0, 0),
            config,
            scale: args.scale.max(1),
            frame: PixelBuffer::new(config.viewport_width, config.viewport_height),
            scale_lut: ScaleLut::empty(),
            fps: FpsMeter::default(),
            last_fps_log: Instant::now(),
            keys_down: HashSet::new(),
        })
    }

    fn tick(&mut self) {
        let extent = self.caster.map().extent();
        if self.keys_down.contains(&KeyCode::KeyA) {
            self.camera.turn(TURN_STEP);
        } else if self.keys_down.contains(&KeyCode::KeyD) {
            self.camera.turn(-TURN_STEP);
        } else if self.keys_down.contains(&KeyCode::KeyW) {
            self.camera.advance(MOVE_STEP, extent);
        } else if self.keys_down.contains(&KeyCode::KeyS) {
            self.camera.advance(-MOVE_STEP, extent);
        }
    }

    fn redraw(&mut self, id: WindowId) -> Result<()> {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        surface
            .resize(dw, dh)
            .map_err(|e| anyhow::anyhow!("resizing surface: {e}"))?;

        self.frame.clear(self.config.background);
        if let Err(e) = self.caster.update(&self.camera, &mut self.frame) {
            warn!("frame skipped: {e}");
        }

        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("mapping surface buffer: {e}"))?;
        blit_nearest_stretch(&mut buf, dw.get() as usize, &self.frame, &self.scale_lut);
        buf.present()
            .map_err(|e| anyhow::anyhow!("presenting frame: {e}"))?;

        let now = Instant::now();
        if let Some(fps) = self.fps.tick(now) {
            if now.duration_since(self.last_fps_log).as_secs_f32() >= 1.0 {
                info!("FPS: {:.1}", fps);
                self.last_fps_log = now;
            }
        }
        Ok(())
    }

    fn rebuild_lut(&mut self, dst_w: usize, dst_h: usize) {
        self.scale_lut = build_scale_lut(
            dst_w,
            dst_h,
            self.config.viewport_width,
            self.config.viewport_height,
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Grid Ray Caster")
            .with_inner_size(LogicalSize::new(
                (self.config.viewport_width as u32 * self.scale) as f64,
                (self.config.viewport_height as u32 * self.scale) as f64,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(e) => {
                error!("could not create window: {e}");
                event_loop.exit();
                return;
            }
        };
        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(s) => s,
            Err(e) => {
                error!("could not create softbuffer surface: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_lut(size.width as usize, size.height as usize);
        info!("window {}x{}", size.width, size.height);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();
                if let Err(e) = self.redraw(id) {
                    error!("{e:#}");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                info!("resized to {}x{}", new_size.width, new_size.height);
                self.rebuild_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut app = App::new(args)?;

    let event_loop = EventLoop::new().map_err(|e| anyhow::anyhow!("creating event loop: {e}"))?;
    // The frame loop redraws continuously; no need to wait for OS events.
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("running event loop: {e}"))?;
    Ok(())
}
