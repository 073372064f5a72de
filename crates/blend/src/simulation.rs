//! The `blend` engine: a motion model and a field renderer driven one tick at
//! a time.

use chromafield_core::error::EngineError;
use chromafield_core::frame::Frame;
use chromafield_core::params::{param_f64, param_usize, require_f64, require_usize};
use chromafield_core::prng::Xorshift64;
use chromafield_core::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::distance::DistanceField;
use crate::point::{MotionModel, Point};
use crate::render::{FieldRenderer, RenderStats};

/// Default frame width in pixels.
pub const DEFAULT_WIDTH: usize = 1280;
/// Default frame height in pixels.
pub const DEFAULT_HEIGHT: usize = 720;
/// Default number of moving points.
const DEFAULT_NUM_POINTS: usize = 4;
/// Default upper bound on each initial velocity component, in pixels per tick.
const DEFAULT_EVOLUTION_RATE: f64 = 5.0;
/// Default band multiplier.
const DEFAULT_MULTIPLIER: f64 = 5.0;

/// Everything that shapes a run besides the PRNG seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    pub num_points: usize,
    /// Upper bound on each initial velocity component.
    pub evolution_rate: f64,
    /// Scale applied to the normalized blend before `mod 1`.
    pub multiplier: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            num_points: DEFAULT_NUM_POINTS,
            evolution_rate: DEFAULT_EVOLUTION_RATE,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl SimulationConfig {
    /// Reads `num_points`, `evolution_rate`, and `multiplier` from a JSON
    /// object, falling back to defaults for missing or mistyped keys.
    pub fn from_json(width: usize, height: usize, params: &Value) -> Self {
        Self {
            width,
            height,
            num_points: param_usize(params, "num_points", DEFAULT_NUM_POINTS),
            evolution_rate: param_f64(params, "evolution_rate", DEFAULT_EVOLUTION_RATE),
            multiplier: param_f64(params, "multiplier", DEFAULT_MULTIPLIER),
        }
    }

    /// Fails if a known key is present with the wrong JSON type.
    ///
    /// [`from_json`](Self::from_json) silently ignores such keys; callers
    /// taking user input run this first so a typo is reported.
    pub fn check_overrides(params: &Value) -> Result<(), EngineError> {
        if params.get("num_points").is_some() {
            require_usize(params, "num_points")?;
        }
        for key in ["evolution_rate", "multiplier"] {
            if params.get(key).is_some() {
                require_f64(params, key)?;
            }
        }
        Ok(())
    }

    /// Rejects degenerate configurations.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        if self.num_points == 0 {
            return Err(EngineError::InvalidConfig(
                "num_points must be at least 1".into(),
            ));
        }
        if !self.evolution_rate.is_finite() || self.evolution_rate < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "evolution_rate must be finite and non-negative, got {}",
                self.evolution_rate
            )));
        }
        if !self.multiplier.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "multiplier must be finite, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// A run of the blend engine.
///
/// Each [`step`](Engine::step) moves every point, then re-renders the whole
/// frame from scratch. The frame is black until the first step.
pub struct Simulation {
    config: SimulationConfig,
    motion: MotionModel,
    renderer: FieldRenderer,
    frame: Frame,
    ticks: u64,
    last_stats: RenderStats,
}

impl Simulation {
    /// Spawns `config.num_points` random points using `rng`.
    pub fn new(config: SimulationConfig, rng: &mut Xorshift64) -> Result<Self, EngineError> {
        config.validate()?;
        let motion = MotionModel::random(
            config.width,
            config.height,
            config.num_points,
            config.evolution_rate,
            rng,
        );
        Self::assemble(config, motion)
    }

    /// Starts from an explicit point set. `config.num_points` is replaced by
    /// the number of points supplied.
    pub fn with_points(config: SimulationConfig, points: Vec<Point>) -> Result<Self, EngineError> {
        let config = SimulationConfig {
            num_points: points.len(),
            ..config
        };
        config.validate()?;
        let motion = MotionModel::from_points(config.width, config.height, points);
        Self::assemble(config, motion)
    }

    /// Builds a simulation from a JSON params object and a PRNG seed.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        params: &Value,
    ) -> Result<Self, EngineError> {
        let mut rng = Xorshift64::new(seed);
        Self::new(SimulationConfig::from_json(width, height, params), &mut rng)
    }

    fn assemble(config: SimulationConfig, motion: MotionModel) -> Result<Self, EngineError> {
        let renderer = FieldRenderer::new(config.width, config.height)?;
        let frame = Frame::new(config.width, config.height)?;
        debug!(
            width = config.width,
            height = config.height,
            points = config.num_points,
            "created blend simulation"
        );
        Ok(Self {
            config,
            motion,
            renderer,
            frame,
            ticks: 0,
            last_stats: RenderStats::default(),
        })
    }

    /// The configuration the run was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current point positions, velocities, and colors.
    pub fn points(&self) -> &[Point] {
        self.motion.points()
    }

    /// The shared distance table.
    pub fn distance_field(&self) -> &DistanceField {
        self.renderer.distance_field()
    }

    /// Statistics from the most recent render.
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }
}

impl Engine for Simulation {
    fn step(&mut self) -> Result<(), EngineError> {
        let bounced = self.motion.advance();
        self.last_stats =
            self.renderer
                .render_into(self.motion.points(), self.config.multiplier, &mut self.frame)?;
        self.ticks += 1;
        trace!(tick = self.ticks, bounced, "advanced blend simulation");
        if self.last_stats.black_pixels > 0 {
            debug!(
                tick = self.ticks,
                pixels = self.last_stats.black_pixels,
                "zero total weight, rendered black"
            );
        }
        Ok(())
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }

    fn params(&self) -> Value {
        json!({
            "num_points": self.config.num_points,
            "evolution_rate": self.config.evolution_rate,
            "multiplier": self.config.multiplier,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "num_points": {
                "type": "integer",
                "default": DEFAULT_NUM_POINTS,
                "min": 1,
                "description": "Number of moving color points"
            },
            "evolution_rate": {
                "type": "number",
                "default": DEFAULT_EVOLUTION_RATE,
                "min": 0.0,
                "description": "Maximum initial speed per axis, in pixels per frame"
            },
            "multiplier": {
                "type": "number",
                "default": DEFAULT_MULTIPLIER,
                "description": "Scale applied to the blended color before wrapping into [0, 1); any finite value"
            }
        })
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        SimulationConfig {
            width: 32,
            height: 24,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn default_config_matches_reference_run() {
        let c = SimulationConfig::default();
        assert_eq!((c.width, c.height), (1280, 720));
        assert_eq!(c.num_points, 4);
        assert_eq!(c.evolution_rate, 5.0);
        assert_eq!(c.multiplier, 5.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_configs() {
        let zero_w = SimulationConfig { width: 0, ..small() };
        assert!(matches!(zero_w.validate(), Err(EngineError::InvalidDimensions)));
        let zero_h = SimulationConfig { height: 0, ..small() };
        assert!(matches!(zero_h.validate(), Err(EngineError::InvalidDimensions)));
        let no_points = SimulationConfig { num_points: 0, ..small() };
        assert!(matches!(no_points.validate(), Err(EngineError::InvalidConfig(_))));
        let bad_rate = SimulationConfig { evolution_rate: f64::NAN, ..small() };
        assert!(matches!(bad_rate.validate(), Err(EngineError::InvalidConfig(_))));
        let neg_rate = SimulationConfig { evolution_rate: -1.0, ..small() };
        assert!(neg_rate.validate().is_err());
        let bad_mult = SimulationConfig { multiplier: f64::INFINITY, ..small() };
        assert!(matches!(bad_mult.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut rng = Xorshift64::new(1);
        let cfg = SimulationConfig { num_points: 0, ..small() };
        assert!(Simulation::new(cfg, &mut rng).is_err());
    }

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        let sim = Simulation::from_json(32, 24, 42, &json!({})).unwrap();
        assert_eq!(sim.config().num_points, DEFAULT_NUM_POINTS);
        assert_eq!(sim.points().len(), DEFAULT_NUM_POINTS);
        assert_eq!(sim.config().multiplier, DEFAULT_MULTIPLIER);
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let params = json!({"num_points": 7, "evolution_rate": 1.5, "multiplier": 2});
        let sim = Simulation::from_json(32, 24, 42, &params).unwrap();
        assert_eq!(sim.points().len(), 7);
        let p = sim.params();
        assert_eq!(p["num_points"], 7);
        assert!((p["evolution_rate"].as_f64().unwrap() - 1.5).abs() < f64::EPSILON);
        assert!((p["multiplier"].as_f64().unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn check_overrides_reports_mistyped_keys() {
        assert!(SimulationConfig::check_overrides(&json!({"num_points": 3})).is_ok());
        assert!(SimulationConfig::check_overrides(&json!({"unrelated": "x"})).is_ok());
        assert!(matches!(
            SimulationConfig::check_overrides(&json!({"num_points": "four"})),
            Err(EngineError::ParamTypeMismatch { .. })
        ));
        assert!(matches!(
            SimulationConfig::check_overrides(&json!({"multiplier": [1]})),
            Err(EngineError::ParamTypeMismatch { .. })
        ));
    }

    #[test]
    fn frame_is_black_before_first_step() {
        let sim = Simulation::from_json(16, 16, 3, &json!({})).unwrap();
        assert_eq!(sim.ticks(), 0);
        assert!(sim.frame().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn step_moves_points_then_renders() {
        let points = vec![
            Point::new((1.0, 1.0), (1.0, 2.0), [0.2, 0.5, 0.8]),
            Point::new((10.0, 20.0), (-1.0, 0.5), [0.9, 0.1, 0.4]),
        ];
        let mut sim = Simulation::with_points(small(), points).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.ticks(), 1);
        assert_eq!((sim.points()[0].row(), sim.points()[0].col()), (2.0, 3.0));
        let expected =
            crate::render::render(sim.points(), sim.distance_field(), sim.config().multiplier)
                .unwrap();
        assert_eq!(sim.frame(), &expected);
    }

    #[test]
    fn with_points_overrides_point_count() {
        let sim = Simulation::with_points(small(), vec![Point::new((0.0, 0.0), (0.0, 0.0), [0.5; 3])])
            .unwrap();
        assert_eq!(sim.config().num_points, 1);
        assert!(Simulation::with_points(small(), Vec::new()).is_err());
    }

    #[test]
    fn single_point_scenario_reports_black_fallback() {
        let cfg = SimulationConfig {
            width: 4,
            height: 4,
            multiplier: 1.0,
            ..SimulationConfig::default()
        };
        let mut sim =
            Simulation::with_points(cfg, vec![Point::new((2.0, 2.0), (0.0, 0.0), [1.0, 0.0, 0.0])])
                .unwrap();
        sim.step().unwrap();
        assert_eq!(sim.last_stats().black_pixels, 1);
        assert!(sim.frame().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn same_seed_identical_after_50_steps() {
        let mut a = Simulation::from_json(40, 30, 99, &json!({})).unwrap();
        let mut b = Simulation::from_json(40, 30, 99, &json!({})).unwrap();
        for _ in 0..50 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert!(a
            .frame()
            .data()
            .iter()
            .zip(b.frame().data())
            .all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn different_seed_different_frames() {
        let mut a = Simulation::from_json(40, 30, 1, &json!({})).unwrap();
        let mut b = Simulation::from_json(40, 30, 2, &json!({})).unwrap();
        a.step().unwrap();
        b.step().unwrap();
        assert_ne!(a.frame(), b.frame());
    }

    #[test]
    fn param_schema_covers_every_param() {
        let sim = Simulation::from_json(8, 8, 1, &json!({})).unwrap();
        let schema = sim.param_schema();
        for key in ["num_points", "evolution_rate", "multiplier"] {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("type").is_some());
            assert!(schema[key].get("default").is_some());
            assert!(schema[key].get("description").is_some());
            assert!(sim.params().get(key).is_some(), "params missing {key}");
        }
    }

    #[test]
    fn param_schema_bounds_match_validation() {
        let sim = Simulation::from_json(8, 8, 1, &json!({})).unwrap();
        let schema = sim.param_schema();
        let accepts = |params: Value| SimulationConfig::from_json(8, 8, &params).validate().is_ok();

        assert_eq!(schema["num_points"]["min"], json!(1));
        assert!(accepts(json!({"num_points": 1})));
        assert!(!accepts(json!({"num_points": 0})));

        assert_eq!(schema["evolution_rate"]["min"], json!(0.0));
        assert!(accepts(json!({"evolution_rate": 0.0})));
        assert!(!accepts(json!({"evolution_rate": -0.5})));

        // no advertised bound means validation has none either
        for key in ["num_points", "evolution_rate", "multiplier"] {
            assert!(schema[key].get("max").is_none(), "{key} advertises a max");
        }
        assert!(schema["multiplier"].get("min").is_none());
        assert!(accepts(json!({"num_points": 200, "evolution_rate": 1e4})));
        assert!(accepts(json!({"multiplier": -7.5})));
        assert!(accepts(json!({"multiplier": 1e6})));
    }

    #[test]
    fn engine_is_object_safe() {
        let sim = Simulation::from_json(8, 6, 1, &json!({})).unwrap();
        let boxed: Box<dyn Engine> = Box::new(sim);
        assert_eq!(boxed.frame().width(), 8);
        assert_eq!(boxed.frame().height(), 6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn points_stay_in_bounds_and_frames_in_unit_interval(
                w in 1_usize..=24,
                h in 1_usize..=24,
                seed: u64,
                num_points in 1_usize..=6,
                rate in 0.0_f64..20.0,
            ) {
                let cfg = SimulationConfig {
                    width: w,
                    height: h,
                    num_points,
                    evolution_rate: rate,
                    multiplier: DEFAULT_MULTIPLIER,
                };
                let mut sim = Simulation::new(cfg, &mut Xorshift64::new(seed)).unwrap();
                for _ in 0..20 {
                    sim.step().unwrap();
                    for p in sim.points() {
                        prop_assert!((0.0..=h as f64).contains(&p.row()));
                        prop_assert!((0.0..=w as f64).contains(&p.col()));
                    }
                    for &v in sim.frame().data() {
                        prop_assert!((0.0..1.0).contains(&v));
                    }
                }
            }
        }
    }
}
