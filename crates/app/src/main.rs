//! Waveframe - Main Entry Point
//!
//! Headless wave demo: a damped wave surface over a static land patch, animated
//! water material and an orbiting camera, pushed through a ring of frame
//! resources that a simulated GPU queue consumes.
//!
//! Usage:
//! - `waveframe [config.json]` runs the demo
//! - `waveframe --save-defaults <config.json>` writes the default configuration

mod gpu;

use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use waveframe_core::Timer;
use waveframe_renderer::{FramePipeline, PipelineConfig};
use waveframe_resources::{
    DrawArgs, Light, Material, MaterialLibrary, PassConstants, PassState, RenderItem,
};
use waveframe_rhi::sync::{GpuFence, HostFence};
use waveframe_waves::{DisturberConfig, RandomDisturber, WaveConfig, WaveField};

use crate::gpu::SimulatedGpu;

const CLIENT_WIDTH: u32 = 1280;
const CLIENT_HEIGHT: u32 = 720;

/// Everything the demo reads from its JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    pipeline: PipelineConfig,
    waves: WaveConfig,
    disturber: DisturberConfig,
    /// Frames to run before shutting down.
    frames: u64,
    /// Time the simulated GPU spends on each frame.
    gpu_latency_ms: u64,
    /// Frames between statistics lines.
    log_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            waves: WaveConfig::default(),
            disturber: DisturberConfig::default(),
            frames: 600,
            gpu_latency_ms: 4,
            log_interval: 60,
        }
    }
}

/// Camera on a sphere around the origin.
struct OrbitCamera {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl OrbitCamera {
    fn eye(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.phi.sin() * self.theta.cos(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.sin(),
        )
    }
}

struct App {
    timer: Timer,
    camera: OrbitCamera,
    pipeline: FramePipeline<Arc<HostFence>>,
    fence: Arc<HostFence>,
    waves: WaveField,
    disturber: RandomDisturber,
    materials: MaterialLibrary,
    items: Vec<RenderItem>,
    pass: PassState,
    frames: u64,
    log_interval: u64,
    disturbances: u64,
}

impl App {
    fn new(mut config: AppConfig) -> Result<Self> {
        let waves = WaveField::new(config.waves).context("invalid wave configuration")?;
        let disturber =
            RandomDisturber::new(config.disturber).context("invalid disturber configuration")?;

        if config.pipeline.wave_vertex_count < waves.vertex_count() {
            config.pipeline.wave_vertex_count = waves.vertex_count();
        }
        let n = config.pipeline.frames_in_flight;
        let fence = Arc::new(HostFence::new());
        let pipeline = FramePipeline::new(config.pipeline, Arc::clone(&fence))
            .context("failed to create frame pipeline")?;

        let mut materials = MaterialLibrary::new();
        let grass = materials.insert(
            Material::new("grass", 0, n)
                .with_diffuse_albedo(Vec4::new(0.2, 0.6, 0.2, 1.0))
                .with_fresnel_r0(Vec3::splat(0.01))
                .with_roughness(0.125),
        )?;
        let water = materials.insert(
            Material::new("water", 1, n)
                .with_diffuse_albedo(Vec4::new(0.0, 0.2, 0.6, 0.5))
                .with_fresnel_r0(Vec3::splat(0.1))
                .with_roughness(0.0)
                .with_diffuse_srv_index(1),
        )?;

        let index_count = waves.triangle_count() as u32 * 3;
        let items = vec![
            RenderItem::new(0, grass as u32, n)
                .with_world(Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)))
                .with_tex_transform(Mat4::from_scale(Vec3::new(5.0, 5.0, 1.0))),
            RenderItem::new(1, water as u32, n)
                .with_tex_transform(Mat4::from_scale(Vec3::new(5.0, 5.0, 1.0)))
                .with_draw(DrawArgs {
                    index_count,
                    start_index: 0,
                    base_vertex: 0,
                }),
        ];

        let pass = PassState::new(0, PassConstants::default(), n);

        Ok(Self {
            timer: Timer::new(),
            camera: OrbitCamera {
                radius: 50.0,
                theta: 1.5 * PI,
                phi: 0.2 * PI,
            },
            pipeline,
            fence,
            waves,
            disturber,
            materials,
            items,
            pass,
            frames: config.frames,
            log_interval: config.log_interval.max(1),
            disturbances: 0,
        })
    }

    /// Scrolls the water texture.
    fn animate_materials(&mut self, dt: f32) -> Result<()> {
        self.materials
            .get_mut("water")?
            .scroll_texture(0.1 * dt, 0.02 * dt);
        Ok(())
    }

    fn main_pass(&self, dt: f32) -> PassConstants {
        let eye = self.camera.eye();
        let view = Mat4::look_at_lh(eye, Vec3::ZERO, Vec3::Y);
        let aspect = CLIENT_WIDTH as f32 / CLIENT_HEIGHT as f32;
        let proj = Mat4::perspective_lh(0.25 * PI, aspect, 1.0, 1000.0);

        PassConstants::new(view, proj, eye)
            .with_render_target(CLIENT_WIDTH, CLIENT_HEIGHT)
            .with_depth_range(1.0, 1000.0)
            .with_time(self.timer.total_secs(), dt)
            .with_ambient(Vec4::new(0.25, 0.25, 0.35, 1.0))
            .with_lights(&[
                Light::directional(Vec3::new(0.57735, -0.57735, 0.57735), Vec3::new(0.9, 0.9, 0.8)),
                Light::directional(Vec3::new(-0.57735, -0.57735, 0.57735), Vec3::splat(0.3)),
                Light::directional(Vec3::new(0.0, -0.707, -0.707), Vec3::splat(0.15)),
            ])
    }

    fn frame(&mut self, gpu: &SimulatedGpu) -> Result<u64> {
        let dt = self.timer.delta_secs();
        self.camera.theta += 0.1 * dt;

        // Blocks while the GPU still owns the slot.
        self.pipeline.advance_frame()?;

        if self.disturber.tick(&mut self.waves, dt)?.is_some() {
            self.disturbances += 1;
        }
        self.waves.update(dt);

        self.animate_materials(dt)?;
        self.pipeline.update_object_constants(&mut self.items)?;
        self.pipeline.update_material_constants(&mut self.materials)?;
        let pass = self.main_pass(dt);
        self.pass.update(pass);
        self.pipeline.write_pass_constants(&mut self.pass)?;
        self.pipeline.update_wave_vertices(&self.waves)?;

        for _ in &self.items {
            self.pipeline.record("draw")?;
        }
        let value = self.pipeline.submit_next()?;
        gpu.signal(value)?;
        Ok(value)
    }

    fn run(&mut self, gpu_latency: Duration) -> Result<()> {
        let gpu = SimulatedGpu::spawn(Arc::clone(&self.fence), gpu_latency)?;
        self.timer.reset();

        for frame in 1..=self.frames {
            let value = self
                .frame(&gpu)
                .with_context(|| format!("frame {frame} failed"))?;
            if frame % self.log_interval == 0 {
                info!(
                    "Frame {}: slot {:?}, fence {} (GPU at {}), {} wave steps, {} disturbances",
                    frame,
                    self.pipeline.current_frame_index(),
                    value,
                    self.fence.completed_value()?,
                    self.waves.steps_taken(),
                    self.disturbances
                );
            }
        }

        self.pipeline.wait_idle()?;
        gpu.shutdown()?;
        info!(
            "Finished {} frames in {:.2}s",
            self.frames,
            self.timer.total_secs()
        );
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(Option<PathBuf>),
    SaveDefaults(PathBuf),
}

fn parse_args(args: &[String]) -> waveframe_core::Result<Command> {
    match args {
        [] => Ok(Command::Run(None)),
        [flag, path] if flag == "--save-defaults" => Ok(Command::SaveDefaults(path.into())),
        [flag] if flag.starts_with("--") => Err(waveframe_core::Error::Config(format!(
            "unknown or incomplete option '{flag}'"
        ))),
        [path] => Ok(Command::Run(Some(path.into()))),
        _ => Err(waveframe_core::Error::Config(
            "usage: waveframe [config.json] | --save-defaults <config.json>".into(),
        )),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => waveframe_core::config::load_json(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            warn!("No config file given, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    waveframe_core::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = match parse_args(&args)? {
        Command::SaveDefaults(path) => {
            waveframe_core::config::save_json(&AppConfig::default(), &path)?;
            info!("Wrote default configuration to {}", path.display());
            return Ok(());
        }
        Command::Run(path) => path,
    };

    info!("Starting waveframe");
    let config = load_config(path)?;
    let latency = Duration::from_millis(config.gpu_latency_ms);
    let mut app = App::new(config)?;
    app.run(latency)?;

    Ok(())
}
