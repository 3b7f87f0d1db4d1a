//! Parameter ranges and defaults offered to the presentation layer.
//!
//! The filters themselves only reject values outside their mathematical
//! domain. These settings describe the narrower ranges a UI exposes as
//! slider controls, and can be loaded from JSON so a deployment can widen
//! or narrow them without rebuilding.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::filters::FilterOp;

/// Closed range of a numeric control with its initial value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64, step: f64) -> Self {
        Self {
            min,
            max,
            default,
            step,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, name: &'static str, value: f64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(FilterError::invalid(name, value, "outside the configured range"))
        }
    }
}

/// Control ranges for every tunable filter parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Gaussian standard deviation.
    pub sigma: ParamRange,
    /// Butterworth cutoff radius.
    pub d0: ParamRange,
    /// Butterworth order.
    pub order: ParamRange,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            sigma: ParamRange::new(0.1, 5.0, 1.0, 0.1),
            d0: ParamRange::new(10.0, 100.0, 40.0, 1.0),
            order: ParamRange::new(1.0, 10.0, 2.0, 1.0),
        }
    }
}

impl FilterSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| FilterError::Config(format!("parse: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Each range must be non-empty and hold its default.
    pub fn validate(&self) -> Result<()> {
        for (name, range) in [("sigma", &self.sigma), ("d0", &self.d0), ("n", &self.order)] {
            if !(range.min <= range.max) {
                return Err(FilterError::Config(format!(
                    "{name}: min {} exceeds max {}",
                    range.min, range.max
                )));
            }
            if !range.contains(range.default) {
                return Err(FilterError::Config(format!(
                    "{name}: default {} outside [{}, {}]",
                    range.default, range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// Default selection for each menu entry.
    pub fn default_ops(&self) -> [FilterOp; 4] {
        [
            FilterOp::LowpassGaussian {
                sigma: self.sigma.default,
            },
            FilterOp::LowpassButterworth {
                d0: self.d0.default,
                n: self.order.default.round() as u32,
            },
            FilterOp::HighpassLaplacian,
            FilterOp::HistogramMatch,
        ]
    }

    /// Check a selection against the configured ranges.
    pub fn check(&self, op: &FilterOp) -> Result<()> {
        match *op {
            FilterOp::LowpassGaussian { sigma } => self.sigma.check("sigma", sigma),
            FilterOp::LowpassButterworth { d0, n } => {
                self.d0.check("d0", d0)?;
                self.order.check("n", f64::from(n))
            }
            FilterOp::HighpassLaplacian | FilterOp::HistogramMatch => Ok(()),
        }
    }
}

/// Load settings from a JSON file. Missing fields keep their defaults.
pub fn load_settings(path: &Path) -> Result<FilterSettings> {
    let data = fs::read_to_string(path)
        .map_err(|e| FilterError::Config(format!("read {}: {e}", path.display())))?;
    FilterSettings::from_json(&data).inspect_err(|e| {
        warn!("rejecting settings file {}: {}", path.display(), e);
    })
}
