use na::Vector3;
use serde::Serialize;

use crate::types::Float;

/// Running statistics of a scalar signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SignalStats {
    count: usize,
    max_abs: Float,
    sum: f64,
}

impl SignalStats {
    pub fn new() -> Self {
        SignalStats::default()
    }

    pub fn insert(&mut self, value: Float) {
        self.count += 1;
        // NaN sticks once seen, so a diverged run cannot report a small error
        if value.is_nan() || value.abs() > self.max_abs {
            self.max_abs = value.abs();
        }
        self.sum += value as f64;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Largest absolute value seen so far, 0 for an empty signal and NaN once
    /// any NaN was inserted.
    pub fn max_abs(&self) -> Float {
        self.max_abs
    }

    pub fn mean(&self) -> Float {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum / self.count as f64) as Float
    }
}

/// Per-component and magnitude statistics of a vector signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector3Stats {
    pub x: SignalStats,
    pub y: SignalStats,
    pub z: SignalStats,
    pub mag: SignalStats,
}

impl Vector3Stats {
    pub fn new() -> Self {
        Vector3Stats::default()
    }

    pub fn insert(&mut self, v: &Vector3<Float>) {
        self.x.insert(v.x);
        self.y.insert(v.y);
        self.z.insert(v.z);
        self.mag.insert(v.norm());
    }
}
