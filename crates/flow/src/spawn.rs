//! One-time particle placement by rejection sampling.
//!
//! Each particle slot draws uniform random points inside the bounds until
//! one is at least `spawn_radius` away from every particle already placed,
//! or the attempt budget runs out and the slot is skipped. The check is a
//! linear scan over placed particles, so a full spawn is O(n²).

use noise_flow_core::bounds::Bounds;
use noise_flow_core::error::EngineError;
use noise_flow_core::particle::Particle;
use noise_flow_core::prng::Xorshift64;
use serde::Serialize;

/// Placement attempts per slot before it is skipped.
pub const DEFAULT_SPAWN_ATTEMPTS: usize = 100;

/// Outcome of the spawn phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpawnReport {
    /// Slots requested by the configuration.
    pub requested: usize,
    /// Particles actually placed.
    pub placed: usize,
    /// Slots abandoned after exhausting their attempts.
    pub skipped: usize,
}

impl SpawnReport {
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

/// Notified exactly once when spawning finishes, with the final particle
/// collection (possibly empty).
///
/// Observers may assign per-particle attributes such as band indices; they
/// run before the first tick.
pub trait SpawnObserver {
    fn particles_generated(&mut self, particles: &mut [Particle]);
}

/// Placement parameters.
#[derive(Debug, Clone, Copy)]
pub struct SpawnSettings {
    pub count: usize,
    pub radius: f32,
    pub attempts: usize,
    pub scale: f32,
}

/// Places up to `settings.count` particles inside `bounds`.
///
/// Particles keep spawn order. A candidate is rejected when its squared
/// distance to any placed particle is below `radius²`. Fails with
/// `EngineError::InvalidParameter` when storage for `count` particles cannot
/// be reserved.
pub fn place_particles(
    bounds: &Bounds,
    settings: SpawnSettings,
    rng: &mut Xorshift64,
) -> Result<(Vec<Particle>, SpawnReport), EngineError> {
    let radius_sq = settings.radius * settings.radius;
    let mut particles: Vec<Particle> = Vec::new();
    particles.try_reserve_exact(settings.count).map_err(|e| {
        EngineError::invalid_param(
            "particle_count",
            format!("cannot reserve {} particles: {e}", settings.count),
        )
    })?;
    let mut skipped = 0;

    for _ in 0..settings.count {
        let placed = (0..settings.attempts)
            .map(|_| rng.next_point_in(bounds.min, bounds.max))
            .find(|candidate| is_clear(&particles, *candidate, radius_sq));
        match placed {
            Some(position) => particles.push(Particle::new(position, settings.scale)),
            None => skipped += 1,
        }
    }

    let report = SpawnReport {
        requested: settings.count,
        placed: particles.len(),
        skipped,
    };
    Ok((particles, report))
}

fn is_clear(particles: &[Particle], candidate: glam::Vec3, radius_sq: f32) -> bool {
    particles
        .iter()
        .all(|p| (p.position - candidate).length_squared() >= radius_sq)
}
