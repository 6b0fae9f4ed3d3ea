//! Thrust and Isp rescaling relative to a thruster's unmixed baseline.

use mixer_core::constants::{ISP_CURVE_END_KEY, ISP_CURVE_END_VALUE};
use mixer_core::rounding::{coarsen_isp_change, coarsen_thrust_change, round, round_to_decimals};
use mixer_propulsion::PropellantCombination;
use serde::Serialize;

/// Stats of the thruster before any propellant change, captured once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThrusterBaseline {
    pub max_thrust: f64,
    pub isp_vacuum: f64,
    /// `None` for thrusters without a sea-level curve point.
    pub isp_sea_level: Option<f64>,
}

impl ThrusterBaseline {
    /// Multiply the thrust by an externally supplied scale factor.
    pub fn scaled(self, thrust_scale: f64) -> Self {
        Self {
            max_thrust: self.max_thrust * thrust_scale,
            ..self
        }
    }
}

/// A single point of an Isp curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IspKey {
    pub key: f64,
    pub value: f64,
}

/// Isp as a function of atmospheric pressure (or velocity).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IspCurve {
    keys: Vec<IspKey>,
}

impl IspCurve {
    /// Vacuum point, with optional sea-level point and terminal sentinel.
    pub fn from_points(vacuum: f64, sea_level: Option<f64>) -> Self {
        let mut keys = vec![IspKey {
            key: 0.0,
            value: vacuum,
        }];
        if let Some(sea_level) = sea_level {
            keys.push(IspKey {
                key: 1.0,
                value: sea_level,
            });
            keys.push(IspKey {
                key: ISP_CURVE_END_KEY,
                value: ISP_CURVE_END_VALUE,
            });
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[IspKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value stored at exactly `key`, if any.
    pub fn value_at(&self, key: f64) -> Option<f64> {
        self.keys.iter().find(|k| k.key == key).map(|k| k.value)
    }

    /// First point of the curve.
    pub fn first_value(&self) -> Option<f64> {
        self.keys.first().map(|k| k.value)
    }

    /// Second point of the curve; sea level for atmosphere curves.
    pub fn second_value(&self) -> Option<f64> {
        self.keys.get(1).map(|k| k.value)
    }
}

/// Stats derived for the current combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescaledStats {
    pub thrust_multiplier: f64,
    pub isp_multiplier: f64,
    pub max_thrust: f64,
    pub isp_vacuum: f64,
    pub isp_sea_level: Option<f64>,
    pub max_fuel_flow: f64,
    pub isp_curve: IspCurve,
}

/// Rescale `baseline` from the original to the current combination.
///
/// Returns `None` when either combination is missing or empty, or when no
/// baseline was captured; callers then keep whatever stats they last applied.
pub fn rescale_stats(
    original: Option<&PropellantCombination>,
    current: Option<&PropellantCombination>,
    baseline: Option<&ThrusterBaseline>,
    gravity: f64,
) -> Option<RescaledStats> {
    let original = original.filter(|c| !c.is_empty())?;
    let current = current.filter(|c| !c.is_empty())?;
    let baseline = baseline?;

    let thrust_multiplier =
        round_to_decimals(current.thrust_multiplier() / original.thrust_multiplier(), 2);
    let thrust_change = coarsen_thrust_change(baseline.max_thrust * (thrust_multiplier - 1.0));
    let max_thrust = (baseline.max_thrust + thrust_change).max(0.0);

    let isp_multiplier =
        round_to_decimals(current.isp_multiplier() / original.isp_multiplier(), 2);
    let isp_vacuum_change = coarsen_isp_change(round(baseline.isp_vacuum * (isp_multiplier - 1.0)));
    let isp_vacuum = (baseline.isp_vacuum + isp_vacuum_change).max(0.0);

    let isp_sea_level = baseline.isp_sea_level.map(|sea_level| {
        if thrust_multiplier <= 0.0 || !thrust_multiplier.is_finite() {
            return 0.0;
        }
        let delta = coarsen_isp_change(round(
            (sea_level - baseline.isp_vacuum) * isp_multiplier / thrust_multiplier,
        ));
        (isp_vacuum + delta).max(0.0)
    });

    let max_fuel_flow = if gravity > 0.0 && isp_vacuum > 0.0 {
        max_thrust / (gravity * isp_vacuum)
    } else {
        0.0
    };

    Some(RescaledStats {
        thrust_multiplier,
        isp_multiplier,
        max_thrust,
        isp_vacuum,
        isp_sea_level,
        max_fuel_flow,
        isp_curve: IspCurve::from_points(isp_vacuum, isp_sea_level),
    })
}

/// Rounded percentage change from `original` to `current`; zero without a baseline.
pub fn percent_change(original: f64, current: f64) -> f64 {
    if original <= 0.0 {
        return 0.0;
    }
    (100.0 * (current / original - 1.0)).round()
}

/// Write-once baseline plus the most recently applied stats of one thruster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThrusterStats {
    baseline: Option<ThrusterBaseline>,
    current: Option<RescaledStats>,
}

impl ThrusterStats {
    /// Record the baseline if none was captured yet; returns whether it was stored.
    pub fn capture_baseline(&mut self, baseline: ThrusterBaseline) -> bool {
        if self.baseline.is_some() {
            return false;
        }
        log::info!(
            "captured baseline: thrust {:.1}, Isp {:.1} vac / {:?} sl",
            baseline.max_thrust,
            baseline.isp_vacuum,
            baseline.isp_sea_level
        );
        self.baseline = Some(baseline);
        true
    }

    /// Restore a baseline persisted by the host, replacing any captured one.
    pub fn restore_baseline(&mut self, baseline: ThrusterBaseline) {
        self.baseline = Some(baseline);
    }

    pub fn baseline(&self) -> Option<&ThrusterBaseline> {
        self.baseline.as_ref()
    }

    pub fn current(&self) -> Option<&RescaledStats> {
        self.current.as_ref()
    }

    /// Recompute current stats; the previous ones survive a failed rescale.
    ///
    /// `thrust_scale` multiplies the baseline thrust before rescaling.
    pub fn update(
        &mut self,
        original: Option<&PropellantCombination>,
        current: Option<&PropellantCombination>,
        thrust_scale: f64,
        gravity: f64,
    ) -> Option<&RescaledStats> {
        let baseline = self.baseline.map(|b| b.scaled(thrust_scale));
        match rescale_stats(original, current, baseline.as_ref(), gravity) {
            Some(stats) => {
                self.current = Some(stats);
                self.current.as_ref()
            }
            None => None,
        }
    }
}
