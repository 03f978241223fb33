//! Task parameter records.
//!
//! An [`OptimizationParams`] is one task's full swarm configuration; a
//! [`BatchOptimizationParams`] extends it with the batch-only fields (hard
//! step ceiling and the per-IMF optimization schedule). Records are plain
//! data: callbacks and sinks live on the batch runner, not in here.

use serde::{Deserialize, Serialize};

/// Strategy used to produce the initial approximation for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Initializer {
    /// Start from the zero function.
    Zero,
    /// Interpolate between the zero crossings of the samples.
    InterpolateZeros,
    /// Start from the dominant Fourier component.
    FourierComponent,
}

impl Initializer {
    /// Parse one of the closed set of script tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "zero" => Some(Self::Zero),
            "interpolate_zeros" => Some(Self::InterpolateZeros),
            "fourier_component" => Some(Self::FourierComponent),
            _ => None,
        }
    }

    /// The script token for this strategy.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::InterpolateZeros => "interpolate_zeros",
            Self::FourierComponent => "fourier_component",
        }
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Self::InterpolateZeros
    }
}

/// Full configuration for a single optimization task.
///
/// Script names are camelCase (`swarmSize`, `angleDevDegs`, ...); the
/// mapping to these fields lives in the script crate's field registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationParams {
    /// Number of particles in the swarm.
    pub swarm_size: usize,
    /// Initial angle deviation in degrees.
    pub angle_dev_degs: f64,
    /// Initial amplitude deviation.
    pub amplitude_dev: f64,
    /// Crossover probability for differential evolution.
    pub cross_over_prob: f64,
    /// Differential weight.
    pub diff_weight: f64,
    /// Number of free parameters per particle.
    pub n_params: usize,
    pub init_sigma_units: f64,
    pub init_tau_units: f64,
    pub node_dev_units: f64,
    pub sigma_dev_units: f64,
    pub tau_dev_units: f64,
    /// Accumulated preprocessing script, one newline-terminated step per line.
    pub preprocessing: String,
    /// Accumulated interprocessing script, one newline-terminated step per line.
    pub interprocessing: String,
    /// How the initial approximation is produced.
    pub initializer: Initializer,
    /// Raw sample sequence. Not settable by name; loaded via `load_samples`.
    pub samples: Vec<f64>,
    /// Derived: the width of the x interval equals the sample count.
    pub x_interval_width: usize,
}

impl OptimizationParams {
    /// Install a sample sequence and keep the derived interval width in sync.
    pub fn set_samples(&mut self, samples: Vec<f64>) {
        self.x_interval_width = samples.len();
        self.samples = samples;
    }
}

/// One entry of the per-IMF optimization schedule: run `steps` iterations
/// refining the IMF with the given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSteps {
    pub imf_index: usize,
    pub steps: u64,
}

/// Batch variant of [`OptimizationParams`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOptimizationParams {
    pub params: OptimizationParams,
    /// Hard ceiling on the engine's iteration count, if any.
    pub step_limit: Option<u64>,
    /// Ordered (IMF index, step count) schedule for multi-phase runs.
    pub imf_optimizations: Vec<PhaseSteps>,
}
