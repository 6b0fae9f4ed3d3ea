//! Resolved propellant combinations and their aggregate performance multipliers.

use std::fmt;

use crate::{Propellant, PropellantDatabase};

/// Ratio-weighted performance of a set of propellants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub thrust_multiplier: f64,
    pub isp_multiplier: f64,
    pub ignition_potential: f64,
    pub tank_density: f64,
}

impl Aggregates {
    /// Result for combinations with no ratio to weight by.
    pub const NEUTRAL: Aggregates = Aggregates {
        thrust_multiplier: 1.0,
        isp_multiplier: 1.0,
        ignition_potential: 1.0,
        tank_density: 0.0,
    };
}

/// Weighted geometric means of the multipliers and weighted arithmetic mean of
/// tank density over the entries not flagged `ignore_for_isp`.
pub fn aggregate(entries: &[Propellant], database: &PropellantDatabase) -> Aggregates {
    let counted = || entries.iter().filter(|p| !p.ignore_for_isp);
    let total_ratio: f64 = counted().map(|p| p.ratio).sum();
    if total_ratio <= 0.0 {
        return Aggregates::NEUTRAL;
    }

    counted().fold(
        Aggregates {
            thrust_multiplier: 1.0,
            isp_multiplier: 1.0,
            ignition_potential: 1.0,
            tank_density: 0.0,
        },
        |acc, propellant| {
            let config = database.lookup(&propellant.name);
            let weight = propellant.ratio / total_ratio;
            Aggregates {
                thrust_multiplier: acc.thrust_multiplier * config.thrust_multiplier.powf(weight),
                isp_multiplier: acc.isp_multiplier * config.isp_multiplier.powf(weight),
                ignition_potential: acc.ignition_potential
                    * config.ignition_potential.powf(weight),
                tank_density: acc.tank_density + config.tank_density * weight,
            }
        },
    )
}

/// Which resolution rule produced a combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombinationSource {
    ExplicitRatios,
    Authored { label: String },
    SinglePropellant,
    FuelOxidizerPair,
}

impl fmt::Display for CombinationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationSource::ExplicitRatios => f.write_str("explicit ratios"),
            CombinationSource::Authored { label } => write!(f, "authored combination {label}"),
            CombinationSource::SinglePropellant => f.write_str("single propellant"),
            CombinationSource::FuelOxidizerPair => f.write_str("fuel/oxidizer pair"),
        }
    }
}

/// An immutable, resolved set of propellant entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantCombination {
    propellants: Vec<Propellant>,
    aggregates: Aggregates,
    source: CombinationSource,
}

impl PropellantCombination {
    /// Build a combination, computing its aggregates up front.
    pub fn new(
        propellants: Vec<Propellant>,
        database: &PropellantDatabase,
        source: CombinationSource,
    ) -> Self {
        let aggregates = aggregate(&propellants, database);
        Self {
            propellants,
            aggregates,
            source,
        }
    }

    /// Replace derived multipliers with authored values where given.
    pub fn with_overrides(
        mut self,
        thrust_multiplier: Option<f64>,
        isp_multiplier: Option<f64>,
        ignition_potential: Option<f64>,
    ) -> Self {
        if let Some(value) = thrust_multiplier {
            self.aggregates.thrust_multiplier = value;
        }
        if let Some(value) = isp_multiplier {
            self.aggregates.isp_multiplier = value;
        }
        if let Some(value) = ignition_potential {
            self.aggregates.ignition_potential = value;
        }
        self
    }

    pub fn propellants(&self) -> &[Propellant] {
        &self.propellants
    }

    pub fn aggregates(&self) -> Aggregates {
        self.aggregates
    }

    pub fn source(&self) -> &CombinationSource {
        &self.source
    }

    pub fn thrust_multiplier(&self) -> f64 {
        self.aggregates.thrust_multiplier
    }

    pub fn isp_multiplier(&self) -> f64 {
        self.aggregates.isp_multiplier
    }

    pub fn ignition_potential(&self) -> f64 {
        self.aggregates.ignition_potential
    }

    pub fn tank_density(&self) -> f64 {
        self.aggregates.tank_density
    }

    pub fn is_empty(&self) -> bool {
        self.propellants.is_empty()
    }

    /// Single-propellant mixtures light without ignition simulation.
    pub fn is_single_propellant(&self) -> bool {
        self.propellants.len() == 1
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.propellants.iter().map(|p| p.name.as_str())
    }

    /// Human-readable ratios such as `3 LiquidFuel : 5 Oxidizer`.
    ///
    /// Ratios are scaled by the smallest integer in `1..=20` that makes every
    /// entry whole; if none does, normalized fractions are shown instead.
    pub fn ratio_string(&self) -> String {
        match self.propellants.as_slice() {
            [] => String::new(),
            [single] => single.name.clone(),
            propellants => {
                let total: f64 = propellants.iter().map(|p| p.ratio).sum();
                if total <= 0.0 {
                    return propellants
                        .iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(" : ");
                }
                let multiplier = (1..=20u32)
                    .find(|&d| {
                        propellants
                            .iter()
                            .all(|p| (p.ratio / total * d as f64 + 1e-5) % 1.0 < 2e-5)
                    })
                    .unwrap_or(1);

                propellants
                    .iter()
                    .map(|p| {
                        let mut ratio =
                            (1e4 * multiplier as f64 * p.ratio / total).round() / 1e4;
                        if multiplier > 1 {
                            ratio = ratio.round();
                        }
                        format!("{} {}", ratio, p.name)
                    })
                    .collect::<Vec<_>>()
                    .join(" : ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropellantConfig;
    use proptest::prelude::*;

    fn database() -> PropellantDatabase {
        PropellantDatabase::new(
            [
                PropellantConfig {
                    thrust_multiplier: 0.8,
                    isp_multiplier: 1.3,
                    ignition_potential: 0.5,
                    tank_density: 0.2,
                    ..PropellantConfig::identity("Hydrogen")
                },
                PropellantConfig {
                    thrust_multiplier: 1.2,
                    isp_multiplier: 0.9,
                    ignition_potential: 0.0,
                    tank_density: 0.6,
                    is_oxidizer: true,
                    ..PropellantConfig::identity("Oxygen")
                },
            ],
            [],
        )
    }

    #[test]
    fn single_entry_aggregates_equal_the_propellant() {
        let db = database();
        let agg = aggregate(&[Propellant::new("Hydrogen", 3.0)], &db);
        assert!((agg.thrust_multiplier - 0.8).abs() < 1e-12);
        assert!((agg.isp_multiplier - 1.3).abs() < 1e-12);
        assert!((agg.ignition_potential - 0.5).abs() < 1e-12);
        assert!((agg.tank_density - 0.2).abs() < 1e-12);
    }

    #[test]
    fn ignored_entries_do_not_weigh_in() {
        let db = database();
        let agg = aggregate(
            &[
                Propellant::new("Hydrogen", 1.0),
                Propellant::new("Oxygen", 5.0).with_ignore_for_isp(true),
            ],
            &db,
        );
        assert!((agg.isp_multiplier - 1.3).abs() < 1e-12);
    }

    #[test]
    fn zero_total_ratio_falls_back_to_neutral() {
        let db = database();
        let agg = aggregate(
            &[Propellant::new("Hydrogen", 1.0).with_ignore_for_isp(true)],
            &db,
        );
        assert_eq!(agg, Aggregates::NEUTRAL);
        assert_eq!(aggregate(&[], &db), Aggregates::NEUTRAL);
    }

    #[test]
    fn ratio_string_uses_smallest_whole_multiplier() {
        let db = database();
        let combo = PropellantCombination::new(
            vec![
                Propellant::new("Hydrogen", 0.375),
                Propellant::new("Oxygen", 0.625),
            ],
            &db,
            CombinationSource::FuelOxidizerPair,
        );
        assert_eq!(combo.ratio_string(), "3 Hydrogen : 5 Oxygen");

        let single = PropellantCombination::new(
            vec![Propellant::new("Hydrogen", 1.0)],
            &db,
            CombinationSource::SinglePropellant,
        );
        assert_eq!(single.ratio_string(), "Hydrogen");
    }

    #[test]
    fn overrides_replace_derived_values() {
        let db = database();
        let combo = PropellantCombination::new(
            vec![Propellant::new("Hydrogen", 1.0), Propellant::new("Oxygen", 1.0)],
            &db,
            CombinationSource::Authored {
                label: "HydroLox".into(),
            },
        )
        .with_overrides(Some(2.0), None, Some(1.0));
        assert_eq!(combo.thrust_multiplier(), 2.0);
        assert_eq!(combo.ignition_potential(), 1.0);
        assert!((combo.isp_multiplier() - (1.3f64 * 0.9).sqrt()).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn aggregates_ignore_ratio_scale(
            h in 0.01f64..100.0,
            o in 0.01f64..100.0,
            k in 0.01f64..1000.0,
        ) {
            let db = database();
            let base = aggregate(
                &[Propellant::new("Hydrogen", h), Propellant::new("Oxygen", o)],
                &db,
            );
            let scaled = aggregate(
                &[Propellant::new("Hydrogen", h * k), Propellant::new("Oxygen", o * k)],
                &db,
            );
            prop_assert!((base.thrust_multiplier - scaled.thrust_multiplier).abs() < 1e-9);
            prop_assert!((base.isp_multiplier - scaled.isp_multiplier).abs() < 1e-9);
            prop_assert!((base.ignition_potential - scaled.ignition_potential).abs() < 1e-9);
            prop_assert!((base.tank_density - scaled.tank_density).abs() < 1e-9);
        }
    }
}
