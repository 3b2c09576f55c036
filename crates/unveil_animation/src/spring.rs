//! Spring smoothing
//!
//! RK4-integrated spring used to make scrubbed progress trail the scroll
//! position instead of snapping to it. The spring operates on normalized
//! progress, so settling tolerances are fractions of the window, not pixels.

/// Configuration for a spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

/// Natural-frequency multiple at which a critically damped spring is within 2%
/// of its target
const SETTLE_OMEGA_T: f32 = 5.8;

impl SpringConfig {
    /// Critically damped spring that closes 98% of a gap in `seconds`
    ///
    /// This is what a numeric scrub value (`scrub = 0.5`) means: the animation
    /// takes roughly that long to catch up with the scrollbar.
    pub fn settling_in(seconds: f32) -> Self {
        let omega = SETTLE_OMEGA_T / seconds.max(0.016);
        Self {
            stiffness: omega * omega,
            damping: 2.0 * omega,
            mass: 1.0,
        }
    }

    /// Damping at which the spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::settling_in(0.5)
    }
}

/// Position and velocity of the simulated mass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Phase {
    x: f32,
    v: f32,
}

impl Phase {
    fn nudge(self, d: Phase, dt: f32) -> Phase {
        Phase {
            x: self.x + d.x * dt,
            v: self.v + d.v * dt,
        }
    }
}

/// Progress value chasing a target
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    phase: Phase,
    target: f32,
    epsilon: f32,
}

impl Spring {
    /// Default settling tolerance for normalized progress
    pub const PROGRESS_EPSILON: f32 = 0.0005;

    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            phase: Phase { x: initial, v: 0.0 },
            target: initial,
            epsilon: Self::PROGRESS_EPSILON,
        }
    }

    /// Override the settling tolerance (builder pattern)
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    pub fn value(&self) -> f32 {
        self.phase.x
    }

    pub fn velocity(&self) -> f32 {
        self.phase.v
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to `value` with no velocity
    pub fn snap(&mut self, value: f32) {
        self.target = value;
        self.phase = Phase { x: value, v: 0.0 };
    }

    /// Near the target and slow enough to stop
    pub fn is_settled(&self) -> bool {
        // Velocity is per second: allow ten frames' worth of drift
        (self.phase.x - self.target).abs() < self.epsilon && self.phase.v.abs() < self.epsilon * 10.0
    }

    /// Advance by `dt` seconds
    ///
    /// Long frames are split so each RK4 step covers at most one radian of
    /// the spring's natural frequency. Once settled the value lands exactly
    /// on the target.
    pub fn step(&mut self, dt: f32) {
        let omega = (self.config.stiffness / self.config.mass).sqrt();
        let substeps = (dt * omega).ceil().clamp(1.0, 64.0) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            if self.is_settled() {
                break;
            }
            self.integrate(h);
        }
        if self.is_settled() {
            self.snap(self.target);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let p = self.phase;
        let k1 = self.derivative(p);
        let k2 = self.derivative(p.nudge(k1, dt * 0.5));
        let k3 = self.derivative(p.nudge(k2, dt * 0.5));
        let k4 = self.derivative(p.nudge(k3, dt));
        self.phase = Phase {
            x: p.x + (k1.x + 2.0 * (k2.x + k3.x) + k4.x) * dt / 6.0,
            v: p.v + (k1.v + 2.0 * (k2.v + k3.v) + k4.v) * dt / 6.0,
        };
    }

    fn derivative(&self, p: Phase) -> Phase {
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        Phase {
            x: p.v,
            v: (-stiffness * (p.x - self.target) - damping * p.v) / mass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_settling_in_is_critically_damped() {
        let config = SpringConfig::settling_in(0.5);
        assert!((config.damping - config.critical_damping()).abs() < 1e-3);
    }

    #[test]
    fn test_catches_up_in_configured_time() {
        let mut spring = Spring::new(SpringConfig::settling_in(0.5), 0.0);
        spring.set_target(1.0);

        // 0.25s in: moving, but well short of the target
        for _ in 0..15 {
            spring.step(FRAME);
        }
        assert!(spring.value() > 0.2 && spring.value() < 0.98);

        for _ in 0..45 {
            spring.step(FRAME);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn test_never_overshoots_progress() {
        let mut spring = Spring::new(SpringConfig::settling_in(0.3), 0.0);
        spring.set_target(1.0);
        for _ in 0..120 {
            spring.step(FRAME);
            assert!(spring.value() <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_retarget_mid_flight() {
        let mut spring = Spring::new(SpringConfig::settling_in(0.5), 0.0);
        spring.set_target(1.0);
        for _ in 0..10 {
            spring.step(FRAME);
        }
        let ahead = spring.value();
        spring.set_target(0.0);
        for _ in 0..90 {
            spring.step(FRAME);
        }
        assert!(ahead > 0.0);
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn test_snap_clears_velocity() {
        let mut spring = Spring::new(SpringConfig::settling_in(0.2), 0.0);
        spring.set_target(1.0);
        spring.step(FRAME);
        assert!(spring.velocity() > 0.0);

        spring.snap(0.25);
        assert_eq!(spring.value(), 0.25);
        assert_eq!(spring.velocity(), 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_stable_with_long_frames() {
        let mut spring = Spring::new(SpringConfig::settling_in(0.1), 0.0);
        spring.set_target(1.0);
        for _ in 0..100 {
            spring.step(0.1);
            assert!(spring.value().is_finite());
            assert!(spring.value() < 2.0 && spring.value() > -1.0);
        }
    }
}
