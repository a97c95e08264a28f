//! Render coordinator and worker threads.

use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use glint_core::{AntiAliasingMethod, Camera, RenderConfig, Scene};
use glint_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::queue::{row_blocks, BlockQueue, RowBlock, WORK_BLOCK_SIZE};
use crate::stats::Stats;
use crate::trace::trace;

/// A rendered row block, sent from a worker back to the coordinator.
struct BlockResult {
    block: RowBlock,
    /// Row-major pixels covering `block.rows() * width` entries
    pixels: Vec<Vec3>,
}

/// Owns a scene and render settings and produces pixel buffers.
///
/// Each call to [`render`](Renderer::render) creates a fresh worker
/// pool: the row blocks go onto a shared queue, `num_threads` OS
/// threads pull blocks until the queue drains, and finished blocks
/// flow back over a channel to the coordinator, which is the only
/// writer of the pixel buffer. Workers are joined before the call
/// returns.
pub struct Renderer {
    scene: Scene,
    config: RenderConfig,
    show_progress: bool,
}

impl Renderer {
    pub fn new(scene: Scene, config: RenderConfig) -> Self {
        config.validate();
        Self {
            scene,
            config,
            show_progress: false,
        }
    }

    /// Enable the stderr progress bar. Off by default so library use
    /// and tests stay quiet.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Render the scene to a row-major pixel buffer of
    /// `width * height` colors, returning the buffer and one `Stats`
    /// per worker thread.
    pub fn render(&self) -> (Vec<Vec3>, Vec<Stats>) {
        self.log_intro();

        let width = self.config.width;
        let height = self.config.height;
        // Shared by every primary-ray computation in every thread.
        let aspect_ratio = width as f32 / height as f32;
        let fov_ratio = (self.scene.camera.field_of_view / 2.0).tan();

        let queue = BlockQueue::new(row_blocks(height, WORK_BLOCK_SIZE));
        let (sender, receiver) = mpsc::channel::<BlockResult>();

        let mut buffer = vec![Vec3::ZERO; (width * height) as usize];
        let mut all_stats = Vec::new();
        let num_threads = self.config.num_threads.max(1);

        let start_time = Instant::now();
        thread::scope(|scope| {
            let mut handles = Vec::new();
            for id in 0..num_threads {
                let sender = sender.clone();
                let queue = &queue;
                let worker = Worker {
                    scene: &self.scene,
                    config: &self.config,
                    aspect_ratio,
                    fov_ratio,
                };
                handles.push(scope.spawn(move || worker.run(id, queue, sender)));
            }
            // Workers hold the remaining senders; dropping ours lets the
            // receive loop end when the last worker finishes.
            drop(sender);

            let mut completed_rows = 0;
            for result in receiver {
                let offset = (result.block.start * width) as usize;
                buffer[offset..offset + result.pixels.len()].copy_from_slice(&result.pixels);

                completed_rows += result.block.rows();
                if self.show_progress {
                    print_progress(completed_rows, height);
                }
            }

            for handle in handles {
                all_stats.push(handle.join().expect("render worker panicked"));
            }
        });
        if self.show_progress {
            eprintln!();
        }

        log::info!(
            "render finished in {:.3}s",
            start_time.elapsed().as_secs_f32()
        );
        for stats in &all_stats {
            stats.log_summary();
        }

        (buffer, all_stats)
    }

    fn log_intro(&self) {
        let config = &self.config;
        let camera = &self.scene.camera;
        log::info!("=== Render Info ===");
        log::info!("{:<20}{} x {}", "Image Dimension", config.width, config.height);
        log::info!("{:<20}{}", "Threads", config.num_threads.max(1));
        log::info!("{:<20}{}", "Max Depth", config.max_depth);
        let sampling = if config.anti_aliasing == 0 {
            "Off"
        } else {
            match config.anti_aliasing_method {
                AntiAliasingMethod::Regular => "Regular",
                AntiAliasingMethod::Random => "Random",
            }
        };
        log::info!("{:<20}{} ({})", "Anti-Aliasing", config.anti_aliasing, sampling);
        log::info!(
            "{:<20}{}",
            "Soft Shadows?",
            if config.soft_shadows { "Yes" } else { "No" }
        );
        log::info!("{:<20}{}", "Iterations", config.noise_reduction.max(1));
        log::info!("{:<20}{:.1}", "Field of View", camera.field_of_view.to_degrees());
        log::info!("{:<20}{}", "Eye", camera.position);
        log::info!("{:<20}{}", "Focal Point", camera.look_at);
        if camera.aperture_radius == 0.0 {
            log::info!("{:<20}Pinhole", "Aperture Radius");
        } else {
            log::info!("{:<20}{}", "Aperture Radius", camera.aperture_radius);
        }
        log::info!("{:<20}{}", "Objects", self.scene.objects.len());
        log::info!("{:<20}{}", "Lights", self.scene.lights.len());
    }
}

/// One worker thread's view of the render: everything it needs to pull
/// blocks and shade pixels, all shared immutably except its own RNG
/// and stats.
#[derive(Clone, Copy)]
struct Worker<'a> {
    scene: &'a Scene,
    config: &'a RenderConfig,
    aspect_ratio: f32,
    fov_ratio: f32,
}

impl Worker<'_> {
    /// Keep pulling row blocks until the queue drains, rendering each
    /// block into a local buffer and shipping it to the coordinator.
    fn run(self, id: u32, queue: &BlockQueue, sender: mpsc::Sender<BlockResult>) -> Stats {
        let mut rng = StdRng::from_entropy();
        let mut stats = Stats::new(id);
        let width = self.config.width;

        let start_time = Instant::now();
        while let Some(block) = queue.pop() {
            let mut pixels = Vec::with_capacity((block.rows() * width) as usize);
            for y in block.start..=block.end {
                for x in 0..width {
                    stats.pixels += 1;
                    pixels.push(self.pixel_average(x, y, &mut rng, &mut stats));
                }
            }
            if sender.send(BlockResult { block, pixels }).is_err() {
                // Coordinator went away; nothing left to do.
                break;
            }
        }
        stats.seconds = start_time.elapsed().as_secs_f32();
        stats
    }

    /// Render a single pixel `noise_reduction` times and average.
    /// Every repetition redraws its random offsets and jitter, which is
    /// what makes the average converge for soft shadows and random
    /// anti-aliasing.
    fn pixel_average(&self, x: u32, y: u32, rng: &mut StdRng, stats: &mut Stats) -> Vec3 {
        let iterations = self.config.noise_reduction.max(1);
        let mut color = Vec3::ZERO;
        for _ in 0..iterations {
            color += self.render_pixel(x, y, rng, stats);
        }
        color / iterations as f32
    }

    /// One sampling pass over a pixel: a single centered ray with
    /// anti-aliasing off, otherwise the average over the sub-pixel
    /// sample grid.
    fn render_pixel(&self, x: u32, y: u32, rng: &mut StdRng, stats: &mut Stats) -> Vec3 {
        if self.config.anti_aliasing == 0 {
            let ray = self.primary_ray(x, y, 0.5, 0.5, rng);
            stats.primary_rays += 1;
            return trace(self.scene, self.config, ray.origin, ray.direction, 0, rng, stats);
        }

        let s = self.config.sample_grid_size();
        let mut color = Vec3::ZERO;
        for y_sample in 0..s {
            for x_sample in 0..s {
                let (x_offset, y_offset) = self.sample_offset(s, x_sample, y_sample, rng);
                let ray = self.primary_ray(x, y, x_offset, y_offset, rng);
                color +=
                    trace(self.scene, self.config, ray.origin, ray.direction, 0, rng, stats);
                stats.primary_rays += 1;
            }
        }

        color / (s * s) as f32
    }

    /// Sub-pixel offset for one anti-aliasing sample, in [-0.5, 0.5)
    /// around the pixel center.
    fn sample_offset(&self, s: u32, x_sample: u32, y_sample: u32, rng: &mut StdRng) -> (f32, f32) {
        match self.config.anti_aliasing_method {
            AntiAliasingMethod::Regular => (
                x_sample as f32 / s as f32 - 0.5,
                y_sample as f32 / s as f32 - 0.5,
            ),
            AntiAliasingMethod::Random => (rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5),
        }
    }

    /// Map raster coordinates plus a sub-pixel offset to a camera-space
    /// pixel coordinate and ask the camera for the primary ray.
    ///
    /// Raster space is normalized to [0, 1] with (0, 0) at the top
    /// left, then recentered so (0, 0) is the image center with Y up,
    /// scaled by tan(fov/2) and the aspect ratio.
    fn primary_ray(&self, x: u32, y: u32, x_offset: f32, y_offset: f32, rng: &mut dyn RngCore) -> Ray {
        let device_x = (x as f32 + x_offset) / self.config.width as f32;
        let device_y = (y as f32 + y_offset) / self.config.height as f32;
        let pixel_x = (2.0 * device_x - 1.0) * self.fov_ratio * self.aspect_ratio;
        let pixel_y = (1.0 - 2.0 * device_y) * self.fov_ratio;
        self.camera().primary_ray(pixel_x, pixel_y, rng)
    }

    fn camera(&self) -> &Camera {
        &self.scene.camera
    }
}

/// Carriage-return progress bar, overwriting itself in place.
fn print_progress(completed_rows: u32, height: u32) {
    let progress = completed_rows as f32 / height as f32 * 100.0;
    let filled = (progress / 2.0) as usize;
    eprint!("\r{:5.1}% [{}{}]", progress, "=".repeat(filled), " ".repeat(50 - filled));
    let _ = std::io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Material, PointLight, SceneObject};
    use std::sync::Arc;

    /// A sphere over a checkerboard floor with one light: enough
    /// geometry to exercise shadows, reflection, and the background.
    fn test_scene() -> Scene {
        let mut scene = Scene::default();
        let shiny = Arc::new(Material::solid(
            Vec3::new(0.8, 0.2, 0.2),
            0.1,
            0.6,
            0.3,
            0.0,
            1.0,
        ));
        let matte = Arc::new(Material::solid(
            Vec3::new(0.4, 0.4, 0.4),
            0.1,
            0.9,
            0.0,
            0.0,
            1.0,
        ));
        scene
            .objects
            .push(SceneObject::sphere(shiny, Vec3::new(0.0, 0.0, -2.0), 0.5));
        scene.objects.push(SceneObject::plane(
            matte,
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ));
        scene
            .lights
            .push(PointLight::new(Vec3::new(2.0, 4.0, 0.0), 1.0, 0.0));
        scene
    }

    fn test_config(threads: u32) -> RenderConfig {
        RenderConfig {
            width: 24,
            height: 18,
            max_depth: 3,
            anti_aliasing: 0,
            soft_shadows: false,
            noise_reduction: 1,
            num_threads: threads,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_buffer_covers_every_pixel() {
        let renderer = Renderer::new(test_scene(), test_config(2));
        let (buffer, stats) = renderer.render();
        assert_eq!(buffer.len(), 24 * 18);

        let total_pixels: u64 = stats.iter().map(|s| s.pixels).sum();
        assert_eq!(total_pixels, 24 * 18);
    }

    #[test]
    fn test_deterministic_without_random_sampling() {
        // AA off, soft shadows off, pinhole camera: no random draws
        // influence any pixel, so repeated renders are bit-identical.
        let renderer = Renderer::new(test_scene(), test_config(2));
        let (first, _) = renderer.render();
        let (second, _) = renderer.render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_thread_count_does_not_change_the_image() {
        let single = Renderer::new(test_scene(), test_config(1));
        let multi = Renderer::new(test_scene(), test_config(4));
        assert_eq!(single.render().0, multi.render().0);
    }

    #[test]
    fn test_all_channels_clamped_to_unit_range() {
        // An over-lit scene: bright light and high coefficients would
        // push channels past 1 without the truncation in trace.
        let mut scene = test_scene();
        scene.lights.push(PointLight::new(Vec3::new(-2.0, 4.0, 0.0), 5.0, 0.0));
        let renderer = Renderer::new(scene, test_config(2));
        let (buffer, _) = renderer.render();
        for pixel in &buffer {
            for channel in [pixel.x, pixel.y, pixel.z] {
                assert!(channel.is_finite());
                assert!(channel <= 1.0, "channel exceeded clamp: {channel}");
                assert!(channel >= 0.0, "negative channel: {channel}");
            }
        }
    }

    #[test]
    fn test_primary_ray_counts_match_sampling_settings() {
        let mut config = test_config(1);
        config.anti_aliasing = 4;
        config.noise_reduction = 2;
        let renderer = Renderer::new(test_scene(), config);
        let (_, stats) = renderer.render();
        let primaries: u64 = stats.iter().map(|s| s.primary_rays).sum();
        // 4 AA samples x 2 iterations per pixel
        assert_eq!(primaries, 24 * 18 * 4 * 2);
    }
}
