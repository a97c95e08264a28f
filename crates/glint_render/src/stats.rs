//! Per-thread render statistics.
//!
//! Each worker owns its `Stats` for the duration of a render; the
//! coordinator reads them only after joining the thread, so no counter
//! needs synchronization.

/// Counters accumulated by one render worker.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Worker id, for the summary only
    pub id: u32,
    /// Pixels this worker shaded
    pub pixels: u64,
    /// Wall time the worker spent in its render loop
    pub seconds: f32,
    pub primary_rays: u64,
    pub shadow_rays: u64,
    pub specular_rays: u64,
    pub transmission_rays: u64,
    /// Primary/secondary rays that hit any object
    pub intersections: u64,
}

impl Stats {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Emit this worker's summary through the logger.
    pub fn log_summary(&self) {
        log::info!("=== Render Thread {:02} ===", self.id);
        log::info!("{:<20}{:.3}", "Time (seconds)", self.seconds);
        log::info!("{:<20}{}", "Pixels", self.pixels);
        log::info!("{:<20}{}", "Primary Rays", self.primary_rays);
        log::info!("{:<20}{}", "Shadow Rays", self.shadow_rays);
        log::info!("{:<20}{}", "Specular Rays", self.specular_rays);
        log::info!("{:<20}{}", "Transmission Rays", self.transmission_rays);
        log::info!("{:<20}{}", "Intersections", self.intersections);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_start_zeroed() {
        let stats = Stats::new(3);
        assert_eq!(stats.id, 3);
        assert_eq!(stats.pixels, 0);
        assert_eq!(stats.primary_rays, 0);
        assert_eq!(stats.intersections, 0);
    }
}
