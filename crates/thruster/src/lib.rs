//! Thruster façade.
//!
//! Rescaling and ignition are written once against the [`Thruster`]
//! capability trait; engines and RCS blocks differ only in how they report
//! their stats and which scale exponent applies to their thrust.

pub mod catalog;
pub mod controller;
pub mod display;
pub mod scale;

pub use catalog::{Catalog, CatalogError, ThrusterSetup, load_catalog};
pub use controller::{EngineController, ThrusterController};
pub use scale::{ScaleExponents, ScaleFactor, ScaleQuantity};

use mixer_core::constants::{G0, KILONEWTONS_TO_NEWTONS};
use mixer_propulsion::Propellant;
use mixer_rescale::{IspCurve, ThrusterBaseline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrusterKind {
    Engine,
    Rcs,
}

impl ThrusterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThrusterKind::Engine => "engine",
            ThrusterKind::Rcs => "rcs",
        }
    }

    /// Scale exponent applied to this kind's thrust.
    pub fn scale_quantity(self) -> ScaleQuantity {
        match self {
            ThrusterKind::Engine => ScaleQuantity::Engine,
            ThrusterKind::Rcs => ScaleQuantity::Rcs,
        }
    }
}

/// Host surface a thruster exposes to the mixer.
pub trait Thruster {
    fn kind(&self) -> ThrusterKind;
    fn max_thrust(&self) -> f64;
    fn set_max_thrust(&mut self, max_thrust: f64);
    fn set_max_fuel_flow(&mut self, max_fuel_flow: f64);
    fn isp_curve(&self) -> &IspCurve;
    fn set_isp_curve(&mut self, curve: IspCurve);
    fn set_propellants(&mut self, propellants: &[Propellant]);
    /// Velocity-keyed curves carry no sea-level point.
    fn uses_velocity_curve(&self) -> bool;
    fn gravity(&self) -> f64;

    /// Stats to remember as the baseline; `None` while the Isp curve is empty.
    fn baseline(&self) -> Option<ThrusterBaseline> {
        let curve = self.isp_curve();
        let isp_vacuum = curve.first_value()?;
        let isp_sea_level = if self.uses_velocity_curve() {
            None
        } else {
            curve.second_value()
        };
        Some(ThrusterBaseline {
            max_thrust: self.max_thrust(),
            isp_vacuum,
            isp_sea_level,
        })
    }
}

/// Mass flow in kg/s used to size ignitor amounts.
///
/// Uses sea-level Isp unless the thruster has a velocity curve.
pub fn mass_flow_rate(thruster: &dyn Thruster) -> f64 {
    let curve = thruster.isp_curve();
    let isp = if thruster.uses_velocity_curve() {
        curve.first_value()
    } else {
        curve.second_value().or_else(|| curve.first_value())
    };
    match isp {
        Some(isp) if isp > 0.0 && thruster.gravity() > 0.0 => {
            KILONEWTONS_TO_NEWTONS * thruster.max_thrust() / (thruster.gravity() * isp)
        }
        _ => 0.0,
    }
}

/// In-memory thruster used by the CLI and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedThruster {
    kind: ThrusterKind,
    max_thrust: f64,
    max_fuel_flow: f64,
    isp_curve: IspCurve,
    velocity_curve: bool,
    gravity: f64,
    propellants: Vec<Propellant>,
}

impl SimulatedThruster {
    pub fn new(
        kind: ThrusterKind,
        max_thrust: f64,
        isp_vacuum: f64,
        isp_sea_level: Option<f64>,
    ) -> Self {
        let isp_curve = IspCurve::from_points(isp_vacuum, isp_sea_level);
        let max_fuel_flow = if isp_vacuum > 0.0 {
            max_thrust / (G0 * isp_vacuum)
        } else {
            0.0
        };
        Self {
            kind,
            max_thrust,
            max_fuel_flow,
            isp_curve,
            velocity_curve: false,
            gravity: G0,
            propellants: Vec::new(),
        }
    }

    pub fn with_velocity_curve(mut self, velocity_curve: bool) -> Self {
        self.velocity_curve = velocity_curve && self.kind == ThrusterKind::Engine;
        self
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn max_fuel_flow(&self) -> f64 {
        self.max_fuel_flow
    }

    pub fn propellants(&self) -> &[Propellant] {
        &self.propellants
    }
}

impl Thruster for SimulatedThruster {
    fn kind(&self) -> ThrusterKind {
        self.kind
    }

    fn max_thrust(&self) -> f64 {
        self.max_thrust
    }

    fn set_max_thrust(&mut self, max_thrust: f64) {
        self.max_thrust = max_thrust;
    }

    fn set_max_fuel_flow(&mut self, max_fuel_flow: f64) {
        self.max_fuel_flow = max_fuel_flow;
    }

    fn isp_curve(&self) -> &IspCurve {
        &self.isp_curve
    }

    fn set_isp_curve(&mut self, curve: IspCurve) {
        self.isp_curve = curve;
    }

    fn set_propellants(&mut self, propellants: &[Propellant]) {
        self.propellants = propellants.to_vec();
    }

    fn uses_velocity_curve(&self) -> bool {
        self.velocity_curve
    }

    fn gravity(&self) -> f64 {
        self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_reads_the_curve() {
        let engine = SimulatedThruster::new(ThrusterKind::Engine, 215.0, 320.0, Some(250.0));
        assert_eq!(
            engine.baseline(),
            Some(ThrusterBaseline {
                max_thrust: 215.0,
                isp_vacuum: 320.0,
                isp_sea_level: Some(250.0),
            })
        );

        let jet = engine.clone().with_velocity_curve(true);
        assert_eq!(jet.baseline().and_then(|b| b.isp_sea_level), None);

        let mut empty = engine;
        empty.set_isp_curve(IspCurve::default());
        assert_eq!(empty.baseline(), None);
    }

    #[test]
    fn rcs_never_uses_velocity_curves() {
        let rcs = SimulatedThruster::new(ThrusterKind::Rcs, 1.0, 240.0, Some(100.0))
            .with_velocity_curve(true);
        assert!(!rcs.uses_velocity_curve());
    }

    #[test]
    fn mass_flow_prefers_sea_level_isp() {
        let engine = SimulatedThruster::new(ThrusterKind::Engine, 200.0, 320.0, Some(250.0));
        let expected = 1000.0 * 200.0 / (G0 * 250.0);
        assert!((mass_flow_rate(&engine) - expected).abs() < 1e-9);

        let jet = engine.with_velocity_curve(true);
        let expected = 1000.0 * 200.0 / (G0 * 320.0);
        assert!((mass_flow_rate(&jet) - expected).abs() < 1e-9);

        let dead = SimulatedThruster::new(ThrusterKind::Engine, 200.0, 0.0, None);
        assert_eq!(mass_flow_rate(&dead), 0.0);
    }
}
