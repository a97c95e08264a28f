//! Render configuration.

/// How sub-pixel anti-aliasing offsets are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiAliasingMethod {
    /// Fixed uniform s x s grid of offsets
    Regular,
    /// Independent uniform random offsets per sample
    Random,
}

/// Settings that shape a render, populated by hand or by the scene-file
/// loader.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Recursion bound for reflection/refraction rays
    pub max_depth: u32,
    /// Anti-aliasing sample count; 0 disables anti-aliasing, otherwise
    /// expected to be a perfect square
    pub anti_aliasing: u32,
    pub anti_aliasing_method: AntiAliasingMethod,
    pub soft_shadows: bool,
    /// Independent repetitions of each pixel's sampling, averaged to
    /// cut variance from random anti-aliasing and soft shadows
    pub noise_reduction: u32,
    pub num_threads: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 500,
            max_depth: 3,
            anti_aliasing: 0,
            anti_aliasing_method: AntiAliasingMethod::Regular,
            soft_shadows: false,
            noise_reduction: 1,
            num_threads: 1,
        }
    }
}

impl RenderConfig {
    /// The per-axis sub-pixel sample count actually used: the largest
    /// `s` with `s * s <= anti_aliasing`.
    pub fn sample_grid_size(&self) -> u32 {
        (self.anti_aliasing as f32).sqrt().floor() as u32
    }

    /// Warn about settings that render differently than written.
    /// Non-fatal; rendering proceeds with the effective values.
    pub fn validate(&self) {
        let s = self.sample_grid_size();
        if s * s != self.anti_aliasing {
            log::warn!(
                "anti-aliasing sample count {} is not a perfect square; using {} samples",
                self.anti_aliasing,
                s * s
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_grid_size_for_squares() {
        let mut config = RenderConfig::default();
        for (samples, expected) in [(0, 0), (1, 1), (4, 2), (9, 3), (16, 4)] {
            config.anti_aliasing = samples;
            assert_eq!(config.sample_grid_size(), expected);
        }
    }

    #[test]
    fn test_sample_grid_size_floors_non_squares() {
        let mut config = RenderConfig::default();
        config.anti_aliasing = 8;
        assert_eq!(config.sample_grid_size(), 2);
        config.anti_aliasing = 15;
        assert_eq!(config.sample_grid_size(), 3);
    }
}
