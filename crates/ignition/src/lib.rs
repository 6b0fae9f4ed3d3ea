//! Ignition simulation for multi-propellant engines.
//!
//! An ignition attempt first checks the resources that are always consumed,
//! then tops up the mixture's ignition potential with optional ignitors in
//! declared order. Resources are drained only when ignition succeeds.

pub mod controller;

pub use controller::{
    EngineSnapshot, IgnitionController, IgnitionEffects, IgnitionState, SiblingMode,
    other_mode_active, should_be_ignited,
};

use indexmap::IndexMap;
use mixer_core::constants::IGNITION_THRESHOLD;
use mixer_core::rounding::round_to_significant_figure;
use mixer_propulsion::PropellantCombination;
use thiserror::Error;

/// A resource consumed to help a mixture ignite.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnitionResource {
    pub resource_name: String,
    /// Units drained per ignition; zero until frozen when only `scaled_amount` is authored.
    pub amount: f64,
    /// Units per unit of engine mass flow.
    pub scaled_amount: f64,
    pub added_ignition_potential: f64,
    pub always_required: bool,
}

impl IgnitionResource {
    pub fn new(resource_name: impl Into<String>, amount: f64) -> Self {
        Self {
            resource_name: resource_name.into(),
            amount: amount.max(0.0),
            scaled_amount: 0.0,
            added_ignition_potential: 0.0,
            always_required: false,
        }
    }

    pub fn scaled(resource_name: impl Into<String>, scaled_amount: f64) -> Self {
        Self {
            scaled_amount: scaled_amount.max(0.0),
            ..Self::new(resource_name, 0.0)
        }
    }

    pub fn with_added_potential(mut self, potential: f64) -> Self {
        self.added_ignition_potential = potential.max(0.0);
        self
    }

    pub fn with_always_required(mut self, always_required: bool) -> Self {
        self.always_required = always_required;
        self
    }

    /// Derive the fixed amount from the engine's mass flow rate.
    ///
    /// Only resources with no authored amount are touched. Returns whether the
    /// amount was derived by this call.
    pub fn freeze_amount(&mut self, mass_flow_rate: f64) -> bool {
        if self.amount != 0.0 || self.scaled_amount <= 0.0 {
            return false;
        }
        self.amount = round_to_significant_figure(self.scaled_amount * mass_flow_rate);
        log::debug!(
            "froze ignitor {} at {} units (mass rate {mass_flow_rate:.3})",
            self.resource_name,
            self.amount
        );
        true
    }

    /// One display line such as `0.04 ElectricCharge (always consumed)`.
    pub fn describe(&self) -> String {
        let usage = if self.always_required {
            "always consumed"
        } else {
            "consumed if necessary"
        };
        format!("{} {} ({usage})", self.amount, self.resource_name)
    }
}

/// Resources available to the engine, and the sink for consumption requests.
pub trait ResourcePool {
    /// Total amount of `resource` reachable from the engine.
    fn connected_amount(&self, resource: &str) -> f64;
    /// Ask the host to drain `amount` of `resource`; the host arbitrates.
    fn request_consumption(&mut self, resource: &str, amount: f64);
}

/// A failed ignition attempt; the display text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IgnitionFailure {
    #[error("Ignition failed: not enough {0}")]
    MissingRequired(String),
    #[error("Ignition failed: not enough {0}")]
    MissingResource(String),
    #[error("Ignition failed: ignitor was insufficient")]
    InsufficientIgnitor { potential: f64 },
    #[error("Ignition failed: no propellant combination")]
    NoCombination,
}

/// A successful ignition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Ignition {
    /// Single-propellant mixtures light without simulation.
    Unassisted,
    /// Another mode of the same engine is already burning.
    SiblingMode,
    /// The mixture lit; `drained` lists every consumption that was requested.
    Achieved {
        potential: f64,
        drained: IndexMap<String, f64>,
    },
}

impl Ignition {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Ignition::Achieved { .. } => Some("Ignition!"),
            Ignition::Unassisted | Ignition::SiblingMode => None,
        }
    }
}

fn claim(
    resource: &IgnitionResource,
    pool: &dyn ResourcePool,
    drains: &mut IndexMap<String, f64>,
) -> bool {
    if pool.connected_amount(&resource.resource_name) < resource.amount {
        return false;
    }
    drains.insert(resource.resource_name.clone(), resource.amount);
    true
}

/// Try to ignite `combination`, draining ignitors from `pool` on success.
pub fn attempt_ignition<'a>(
    required: impl IntoIterator<Item = &'a IgnitionResource>,
    optional: impl IntoIterator<Item = &'a IgnitionResource>,
    combination: &PropellantCombination,
    pool: &mut dyn ResourcePool,
) -> Result<Ignition, IgnitionFailure> {
    if combination.is_single_propellant() {
        return Ok(Ignition::Unassisted);
    }

    let mut drains = IndexMap::new();
    let mut potential = combination.ignition_potential();
    for resource in required {
        if !claim(resource, pool, &mut drains) {
            return Err(IgnitionFailure::MissingRequired(resource.resource_name.clone()));
        }
        potential += resource.added_ignition_potential;
    }

    let mut first_missing = None;
    if potential <= IGNITION_THRESHOLD {
        for resource in optional {
            if claim(resource, pool, &mut drains) {
                potential += resource.added_ignition_potential;
            } else if first_missing.is_none() {
                first_missing = Some(resource.resource_name.clone());
            }
            if potential > IGNITION_THRESHOLD {
                break;
            }
        }
    }

    if potential <= IGNITION_THRESHOLD {
        return Err(match first_missing {
            Some(name) => IgnitionFailure::MissingResource(name),
            None => IgnitionFailure::InsufficientIgnitor { potential },
        });
    }

    for (resource, amount) in &drains {
        pool.request_consumption(resource, *amount);
    }
    Ok(Ignition::Achieved {
        potential,
        drained: drains,
    })
}

/// Partition resources into the always-consumed and the optional ones.
pub fn split_resources(
    resources: &[IgnitionResource],
) -> (Vec<&IgnitionResource>, Vec<&IgnitionResource>) {
    resources.iter().partition(|r| r.always_required)
}


#[cfg(test)]
mod tests {
    use super::testing::MockPool;
    use super::*;
    use mixer_propulsion::{CombinationSource, Propellant, PropellantConfig, PropellantDatabase};

    fn pair_with_potential(potential: f64) -> PropellantCombination {
        let db = PropellantDatabase::new(
            [
                PropellantConfig {
                    ignition_potential: potential,
                    ..PropellantConfig::identity("Fuel")
                },
                PropellantConfig {
                    ignition_potential: potential,
                    is_oxidizer: true,
                    ..PropellantConfig::identity("Oxidizer")
                },
            ],
            [],
        );
        PropellantCombination::new(
            vec![Propellant::new("Fuel", 0.5), Propellant::new("Oxidizer", 0.5)],
            &db,
            CombinationSource::FuelOxidizerPair,
        )
        .with_overrides(None, None, Some(potential))
    }

    const NONE: [IgnitionResource; 0] = [];

    #[test]
    fn threshold_is_strict() {
        let spark = IgnitionResource::new("ElectricCharge", 1.0);
        let mut pool = MockPool::default();
        let failed = attempt_ignition(&NONE, &NONE, &pair_with_potential(0.999), &mut pool);
        assert!(matches!(failed, Err(IgnitionFailure::InsufficientIgnitor { .. })));

        let lit = attempt_ignition(&NONE, [&spark], &pair_with_potential(1.0), &mut pool).unwrap();
        assert_eq!(lit.message(), Some("Ignition!"));
        assert!(pool.requests.is_empty());
    }

    #[test]
    fn missing_required_resource_drains_nothing() {
        let required = [
            IgnitionResource::new("ElectricCharge", 5.0).with_always_required(true),
            IgnitionResource::new("TEATEB", 1.0).with_always_required(true),
        ];
        let optional = [IgnitionResource::new("Spark", 1.0).with_added_potential(1.0)];
        let mut pool = MockPool::default()
            .with("ElectricCharge", 100.0)
            .with("Spark", 10.0);
        let result = attempt_ignition(&required, &optional, &pair_with_potential(0.0), &mut pool);
        assert_eq!(
            result,
            Err(IgnitionFailure::MissingRequired("TEATEB".into()))
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "Ignition failed: not enough TEATEB"
        );
        assert!(pool.requests.is_empty());
    }

    #[test]
    fn optional_resources_are_used_in_order_until_lit() {
        let required = [IgnitionResource::new("ElectricCharge", 2.0)
            .with_always_required(true)
            .with_added_potential(0.2)];
        let optional = [
            IgnitionResource::new("TEATEB", 1.0).with_added_potential(0.5),
            IgnitionResource::new("Spark", 1.0).with_added_potential(0.5),
            IgnitionResource::new("Pyro", 1.0).with_added_potential(0.5),
        ];
        let mut pool = MockPool::default()
            .with("ElectricCharge", 10.0)
            .with("Spark", 3.0)
            .with("Pyro", 3.0);
        let lit = attempt_ignition(&required, &optional, &pair_with_potential(0.4), &mut pool)
            .unwrap();
        match lit {
            Ignition::Achieved { potential, .. } => assert!((potential - 1.1).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            pool.requests,
            vec![("ElectricCharge".to_string(), 2.0), ("Spark".to_string(), 1.0)]
        );
    }

    #[test]
    fn first_missing_optional_is_reported() {
        let optional = [
            IgnitionResource::new("TEATEB", 1.0).with_added_potential(0.1),
            IgnitionResource::new("Spark", 1.0).with_added_potential(0.1),
        ];
        let mut pool = MockPool::default().with("Spark", 1.0);
        let result = attempt_ignition(&NONE, &optional, &pair_with_potential(0.2), &mut pool);
        assert_eq!(result, Err(IgnitionFailure::MissingResource("TEATEB".into())));
        assert!(pool.requests.is_empty());
    }

    #[test]
    fn single_propellants_light_without_consumption() {
        let db = PropellantDatabase::default();
        let mono = PropellantCombination::new(
            vec![Propellant::new("MonoPropellant", 1.0)],
            &db,
            CombinationSource::SinglePropellant,
        );
        let required = [IgnitionResource::new("ElectricCharge", 1.0).with_always_required(true)];
        let mut pool = MockPool::default();
        let lit = attempt_ignition(&required, &NONE, &mono, &mut pool).unwrap();
        assert_eq!(lit, Ignition::Unassisted);
        assert_eq!(lit.message(), None);
        assert!(pool.requests.is_empty());
    }

    #[test]
    fn scaled_amounts_freeze_once() {
        let mut resource = IgnitionResource::scaled("ElectricCharge", 0.5);
        assert!(resource.freeze_amount(0.0748));
        assert!((resource.amount - 0.04).abs() < 1e-12);
        assert!(!resource.freeze_amount(100.0));
        assert!((resource.amount - 0.04).abs() < 1e-12);

        let spark = IgnitionResource::new("ElectricCharge", 0.5).with_always_required(true);
        assert_eq!(spark.describe(), "0.5 ElectricCharge (always consumed)");
        assert_eq!(
            IgnitionResource::new("TEATEB", 2.0).describe(),
            "2 TEATEB (consumed if necessary)"
        );
    }

    #[test]
    fn split_keeps_declared_order() {
        let resources = [
            IgnitionResource::new("A", 1.0),
            IgnitionResource::new("B", 1.0).with_always_required(true),
            IgnitionResource::new("C", 1.0),
        ];
        let (required, optional) = split_resources(&resources);
        assert_eq!(required.len(), 1);
        assert_eq!(
            optional.iter().map(|r| r.resource_name.as_str()).collect::<Vec<_>>(),
            ["A", "C"]
        );
    }
}
