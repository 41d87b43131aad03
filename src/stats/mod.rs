//! Running univariate statistics.
//!
//! Each statistic is updated one value at a time in constant memory and can be
//! queried at any point. They back the online scalers and group-by aggregates.

use serde::{Deserialize, Serialize};

/// A statistic over a stream of numbers.
pub trait Univariate {
    /// Incorporates one value.
    fn update(&mut self, x: f64);

    /// Current value of the statistic.
    fn get(&self) -> f64;
}

/// Number of observed values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Count {
    n: u64,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Count {
    fn update(&mut self, _x: f64) {
        self.n += 1;
    }

    fn get(&self) -> f64 {
        self.n as f64
    }
}

/// Running sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sum {
    total: f64,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Sum {
    fn update(&mut self, x: f64) {
        self.total += x;
    }

    fn get(&self) -> f64 {
        self.total
    }
}

/// Running arithmetic mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mean {
    n: f64,
    mean: f64,
}

impl Mean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values seen so far.
    pub fn n(&self) -> f64 {
        self.n
    }
}

impl Univariate for Mean {
    fn update(&mut self, x: f64) {
        self.n += 1.0;
        self.mean += (x - self.mean) / self.n;
    }

    fn get(&self) -> f64 {
        self.mean
    }
}

/// Running variance (Welford's algorithm).
///
/// `ddof` is the delta degrees of freedom: `0` gives the population variance,
/// `1` the sample variance. The variance is `0` until more than `ddof`
/// values have been seen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Var {
    ddof: u32,
    mean: Mean,
    m2: f64,
}

impl Default for Var {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Var {
    pub fn new(ddof: u32) -> Self {
        Self {
            ddof,
            mean: Mean::new(),
            m2: 0.0,
        }
    }

    /// Running mean of the same stream.
    pub fn mean(&self) -> f64 {
        self.mean.get()
    }

    pub fn n(&self) -> f64 {
        self.mean.n()
    }
}

impl Univariate for Var {
    fn update(&mut self, x: f64) {
        let old_mean = self.mean.get();
        self.mean.update(x);
        self.m2 += (x - old_mean) * (x - self.mean.get());
    }

    fn get(&self) -> f64 {
        let denom = self.mean.n() - self.ddof as f64;
        if denom > 0.0 {
            self.m2 / denom
        } else {
            0.0
        }
    }
}

/// Running minimum. `+inf` before the first value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Min {
    min: f64,
}

impl Default for Min {
    fn default() -> Self {
        Self { min: f64::INFINITY }
    }
}

impl Min {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Min {
    fn update(&mut self, x: f64) {
        if x < self.min {
            self.min = x;
        }
    }

    fn get(&self) -> f64 {
        self.min
    }
}

/// Running maximum. `-inf` before the first value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Max {
    max: f64,
}

impl Default for Max {
    fn default() -> Self {
        Self {
            max: f64::NEG_INFINITY,
        }
    }
}

impl Max {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Max {
    fn update(&mut self, x: f64) {
        if x > self.max {
            self.max = x;
        }
    }

    fn get(&self) -> f64 {
        self.max
    }
}

/// Running maximum of absolute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsMax {
    abs_max: f64,
}

impl AbsMax {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for AbsMax {
    fn update(&mut self, x: f64) {
        let a = x.abs();
        if a > self.abs_max {
            self.abs_max = a;
        }
    }

    fn get(&self) -> f64 {
        self.abs_max
    }
}
