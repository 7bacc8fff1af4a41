//! Generalized criteria: how a difference on one criterion becomes a
//! preference degree in `[0, 1]`.

use std::fmt;

pub const DEFAULT_PREFERENCE_THRESHOLD: f64 = 0.2;
pub const DEFAULT_INDIFFERENCE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_GAUSSIAN_THRESHOLD: f64 = 0.15;

/// Thresholds one criterion is judged with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceThresholds {
    /// `q`: differences up to this are negligible.
    pub indifference: f64,
    /// `p`: differences from this on are a full preference.
    pub preference: f64,
    /// `s`: inflection point of the gaussian curve.
    pub gaussian: f64,
}

impl Default for PreferenceThresholds {
    fn default() -> Self {
        Self {
            indifference: DEFAULT_INDIFFERENCE_THRESHOLD,
            preference: DEFAULT_PREFERENCE_THRESHOLD,
            gaussian: DEFAULT_GAUSSIAN_THRESHOLD,
        }
    }
}

/// Shape of the preference curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceFunction {
    /// Any positive difference is a full preference.
    Usual,
    /// Step from 0 to 1 once the difference exceeds `q`.
    UShape,
    /// 0 up to `q`, linear ramp to 1 at `p`.
    VShape,
    /// 0 up to `q`, one half up to `p`, 1 beyond.
    Level,
    /// `d / p`, capped at 1.
    Linear,
    /// `1 - exp(-d^2 / 2s^2)`.
    Gaussian,
}

impl PreferenceFunction {
    pub const KEYS: [&'static str; 6] = ["usual", "u-shape", "v-shape", "level", "linear", "gaussian"];

    /// Parses a key. `v-shape-indifference` is accepted for `v-shape`.
    pub fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "usual" => Some(PreferenceFunction::Usual),
            "u-shape" => Some(PreferenceFunction::UShape),
            "v-shape" | "v-shape-indifference" => Some(PreferenceFunction::VShape),
            "level" => Some(PreferenceFunction::Level),
            "linear" => Some(PreferenceFunction::Linear),
            "gaussian" => Some(PreferenceFunction::Gaussian),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceFunction::Usual => "usual",
            PreferenceFunction::UShape => "u-shape",
            PreferenceFunction::VShape => "v-shape",
            PreferenceFunction::Level => "level",
            PreferenceFunction::Linear => "linear",
            PreferenceFunction::Gaussian => "gaussian",
        }
    }

    /// Preference degree for a difference `d` in favour of the first alternative.
    pub fn degree(&self, d: f64, t: &PreferenceThresholds) -> f64 {
        if d <= 0.0 {
            return 0.0;
        }

        let (q, p, s) = (t.indifference, t.preference, t.gaussian);
        match self {
            PreferenceFunction::Usual => 1.0,
            PreferenceFunction::UShape => {
                if d <= q {
                    0.0
                } else {
                    1.0
                }
            }
            PreferenceFunction::VShape => {
                if d <= q {
                    0.0
                } else if d <= p {
                    (d - q) / (p - q)
                } else {
                    1.0
                }
            }
            PreferenceFunction::Level => {
                if d <= q {
                    0.0
                } else if d <= p {
                    0.5
                } else {
                    1.0
                }
            }
            PreferenceFunction::Linear => {
                if p > 0.0 {
                    (d / p).min(1.0)
                } else {
                    1.0
                }
            }
            PreferenceFunction::Gaussian => {
                if s > 0.0 {
                    1.0 - (-(d * d) / (2.0 * s * s)).exp()
                } else {
                    1.0
                }
            }
        }
    }
}

impl fmt::Display for PreferenceFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
