use std::f64::consts::PI;

use na::{vector, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::{Float, Time};

/// The five force-over-time waveforms a cube can be driven with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForcePattern {
    /// Selector 0: a constant force for the whole pattern duration.
    Constant,
    /// Selector 1: 2 s ramp up to 10 N, 1 s plateau, 2 s ramp down.
    SlowRamp,
    /// Selector 2: 0.1 s ramp up to 10 N, plateau until 4.9 s, 0.1 s ramp down.
    FastRamp,
    /// Selector 3: a 0.5 s ramp-plateau-ramp up to 20 N, played three times.
    TripleRamp,
    /// Selector 4: 20 |sin(πt)|.
    RectifiedSine,
}

impl ForcePattern {
    pub const ALL: [ForcePattern; 5] = [
        ForcePattern::Constant,
        ForcePattern::SlowRamp,
        ForcePattern::FastRamp,
        ForcePattern::TripleRamp,
        ForcePattern::RectifiedSine,
    ];

    /// Map a numeric selector onto a pattern. Anything outside 0..=4 is unknown.
    pub fn from_selector(selector: i64) -> Option<Self> {
        match selector {
            0 => Some(ForcePattern::Constant),
            1 => Some(ForcePattern::SlowRamp),
            2 => Some(ForcePattern::FastRamp),
            3 => Some(ForcePattern::TripleRamp),
            4 => Some(ForcePattern::RectifiedSine),
            _ => None,
        }
    }

    pub fn selector(&self) -> i64 {
        match self {
            ForcePattern::Constant => 0,
            ForcePattern::SlowRamp => 1,
            ForcePattern::FastRamp => 2,
            ForcePattern::TripleRamp => 3,
            ForcePattern::RectifiedSine => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ForcePattern::Constant => "constant",
            ForcePattern::SlowRamp => "slow ramp",
            ForcePattern::FastRamp => "fast ramp",
            ForcePattern::TripleRamp => "triple ramp",
            ForcePattern::RectifiedSine => "rectified sine",
        }
    }
}

/// Progress into a pattern, either as continuous time or as a step count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Elapsed {
    /// Seconds of simulation time since the pattern started.
    Time(Time),
    /// Physics steps taken since the pattern started.
    Ticks(u64),
}

/// Per-run pattern configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternParams {
    /// Magnitude of the constant-force pattern.
    pub constant_force: Float,
    /// How long a time-based pattern applies force, in seconds.
    pub duration: Time,
    /// How many steps a tick-based pattern applies force for.
    pub total_iterations: u64,
}

impl Default for PatternParams {
    fn default() -> Self {
        PatternParams {
            constant_force: 20.0,
            duration: 5.0,
            total_iterations: 5000,
        }
    }
}

/// How one elapsed domain maps onto the shared waveform definitions.
struct Scale {
    /// Domain units per second of pattern time.
    unit: f64,
    /// Added to the rising edge of the pattern 3 sub-pattern.
    sub_pattern_offset: f64,
    /// Whether the falling edge of pattern 2 includes its end point.
    fast_ramp_closed: bool,
}

const SECONDS: Scale = Scale {
    unit: 1.0,
    sub_pattern_offset: 0.2,
    fast_ramp_closed: true,
};

const TICKS: Scale = Scale {
    unit: 1000.0,
    sub_pattern_offset: 0.0,
    fast_ramp_closed: false,
};

impl Elapsed {
    /// Time-based patterns run while t <= duration, tick-based ones while
    /// i < total_iterations.
    fn is_active(&self, params: &PatternParams) -> bool {
        match self {
            Elapsed::Time(t) => *t <= params.duration,
            Elapsed::Ticks(i) => *i < params.total_iterations,
        }
    }

    fn value(&self) -> f64 {
        match self {
            Elapsed::Time(t) => *t,
            Elapsed::Ticks(i) => *i as f64,
        }
    }

    fn scale(&self) -> &'static Scale {
        match self {
            Elapsed::Time(_) => &SECONDS,
            Elapsed::Ticks(_) => &TICKS,
        }
    }
}

/// Compute the force a pattern prescribes at the given point of a run.
/// The zero vector is returned once the pattern has expired.
pub fn evaluate(pattern: ForcePattern, elapsed: Elapsed, params: &PatternParams) -> Vector3<Float> {
    if !elapsed.is_active(params) {
        return Vector3::zeros();
    }

    let x = elapsed.value();
    let scale = elapsed.scale();
    let y_force = match pattern {
        ForcePattern::Constant => return vector![0.0, params.constant_force, 0.0],
        ForcePattern::SlowRamp => slow_ramp(x, scale),
        ForcePattern::FastRamp => fast_ramp(x, scale),
        ForcePattern::TripleRamp => triple_ramp(x, scale),
        ForcePattern::RectifiedSine => rectified_sine(x, scale),
    };

    vector![0.0, y_force as Float, 0.0]
}

/// Same as [`evaluate`], but takes a raw selector. Unknown selectors yield no force.
pub fn evaluate_selector(selector: i64, elapsed: Elapsed, params: &PatternParams) -> Vector3<Float> {
    match ForcePattern::from_selector(selector) {
        Some(pattern) => evaluate(pattern, elapsed, params),
        None => Vector3::zeros(),
    }
}

// Slopes are applied as `slope * x / unit` so that the time domain (unit 1)
// evaluates exactly the formulas written in seconds.

fn slow_ramp(x: f64, s: &Scale) -> f64 {
    let u = s.unit;
    if x <= 2.0 * u {
        5.0 * x / u
    } else if x <= 3.0 * u {
        10.0
    } else if x <= 5.0 * u {
        10.0 - 5.0 * (x - 3.0 * u) / u
    } else {
        0.0
    }
}

/// Piece of a piecewise-linear ramp that an elapsed value falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment {
    Rising,
    Plateau,
    Falling,
    Off,
}

fn fast_ramp_segment(x: f64, s: &Scale) -> Segment {
    let u = s.unit;
    let on_falling_edge = if s.fast_ramp_closed {
        x <= 5.0 * u
    } else {
        x < 5.0 * u
    };

    if x < 0.1 * u {
        Segment::Rising
    } else if x < 4.9 * u {
        Segment::Plateau
    } else if on_falling_edge {
        Segment::Falling
    } else {
        Segment::Off
    }
}

fn fast_ramp(x: f64, s: &Scale) -> f64 {
    let u = s.unit;
    match fast_ramp_segment(x, s) {
        Segment::Rising => 100.0 * x / u,
        Segment::Plateau => 10.0,
        Segment::Falling => 10.0 - 100.0 * (x - 4.9 * u) / u,
        Segment::Off => 0.0,
    }
}

/// Second and third repetitions are shifted back onto the first one.
fn triple_ramp_shift(x: f64, s: &Scale) -> f64 {
    let u = s.unit;
    if x >= 0.5 * u && x < 1.0 * u {
        x - 0.5 * u
    } else if x >= 1.0 * u && x < 1.5 * u {
        x - 1.0 * u
    } else {
        x
    }
}

fn triple_ramp_segment(shifted: f64, s: &Scale) -> Segment {
    let u = s.unit;
    if shifted < 0.1 * u {
        Segment::Rising
    } else if shifted < 0.4 * u {
        Segment::Plateau
    } else if shifted < 0.5 * u {
        Segment::Falling
    } else {
        Segment::Off
    }
}

fn triple_ramp(x: f64, s: &Scale) -> f64 {
    let u = s.unit;
    let shifted = triple_ramp_shift(x, s);
    match triple_ramp_segment(shifted, s) {
        Segment::Rising => 200.0 * shifted / u + s.sub_pattern_offset,
        Segment::Plateau => 20.0,
        Segment::Falling => 20.0 - 200.0 * (shifted - 0.4 * u) / u,
        Segment::Off => 0.0,
    }
}

fn rectified_sine(x: f64, s: &Scale) -> f64 {
    20.0 * (PI * x / s.unit).sin().abs()
}
