//! Glint Render - multi-threaded recursive ray tracing.
//!
//! The engine partitions the image into row blocks on a shared work
//! queue, spawns worker threads that pull blocks and shade pixels with
//! the recursive trace algorithm (ambient + diffuse + specular +
//! transmission, with shadows, reflection, and refraction), and
//! assembles the finished pixel buffer plus per-thread statistics.

mod output;
mod queue;
mod renderer;
mod stats;
mod trace;

pub use output::{encode_ppm, write_image, ImageWriteError};
pub use queue::{row_blocks, BlockQueue, RowBlock, WORK_BLOCK_SIZE};
pub use renderer::Renderer;
pub use stats::Stats;
pub use trace::{reflection_dir, refraction_dir, trace};

/// Re-export math types used across the public API
pub use glint_math::{Ray, Vec3};
