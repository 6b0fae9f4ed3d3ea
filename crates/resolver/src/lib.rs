//! Resolution of connected propellant slots into a concrete combination.
//!
//! Rules are tried in priority order and the first applicable one wins:
//! explicit ratios on every slot, an authored combination with the same
//! resource set, a lone propellant, and finally a fuel/oxidizer pair
//! synthesized from the authored mixture constants.

use mixer_core::rounding::nearest_clean_fraction;
use mixer_propulsion::{
    CombinationSource, NameSet, Propellant, PropellantCombination, PropellantConfig,
    PropellantDatabase, PropellantSlot,
};
use thiserror::Error;

/// Why no combination could be determined for a group.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("no propellant slots to resolve")]
    NoSlots,
    #[error("{count} propellants without ratios match no authored combination")]
    Unmatched { count: usize },
    #[error("`{first}` and `{second}` are not one fuel and one oxidizer")]
    NotFuelOxidizerPair { first: String, second: String },
    #[error("neither `{fuel}` nor `{oxidizer}` has a mixture constant")]
    MissingMixtureConstants { fuel: String, oxidizer: String },
    #[error("mixture of `{fuel}` and `{oxidizer}` rounds to a fuel fraction of {fraction}")]
    DegenerateMixture {
        fuel: String,
        oxidizer: String,
        fraction: f64,
    },
}

/// Combinations resolved against both name sets of one group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedPair {
    pub original: Option<PropellantCombination>,
    pub current: Option<PropellantCombination>,
}

/// Resolve the slots of a single group, reporting why resolution failed.
///
/// Slots whose resource name is empty under `names` are not connected to
/// anything and are dropped before the rules run.
pub fn try_resolve(
    database: &PropellantDatabase,
    slots: &[PropellantSlot],
    names: NameSet,
) -> Result<PropellantCombination, ResolutionError> {
    let slots: Vec<&PropellantSlot> = slots
        .iter()
        .filter(|slot| !slot.resource(names).trim().is_empty())
        .collect();
    if slots.is_empty() {
        return Err(ResolutionError::NoSlots);
    }

    if slots.iter().all(|slot| slot.has_ratio()) {
        let propellants = slots
            .iter()
            .map(|slot| {
                Propellant::new(slot.resource(names), slot.ratio)
                    .with_draw_gauge(slot.draw_gauge)
                    .with_ignore_for_isp(slot.ignore_for_isp)
            })
            .collect();
        return Ok(PropellantCombination::new(
            propellants,
            database,
            CombinationSource::ExplicitRatios,
        ));
    }

    // Slots excluded from Isp take no part in matching or synthesis.
    let counted: Vec<&PropellantSlot> = slots
        .into_iter()
        .filter(|slot| !slot.ignore_for_isp)
        .collect();
    if counted.is_empty() {
        return Err(ResolutionError::NoSlots);
    }

    let resource_names: Vec<&str> = counted.iter().map(|slot| slot.resource(names)).collect();
    if let Some(authored) = database.find_combination(&resource_names) {
        log::debug!(
            "{:?} matched authored combination `{}`",
            resource_names,
            authored.label
        );
        return Ok(PropellantCombination::new(
            authored.propellants.clone(),
            database,
            CombinationSource::Authored {
                label: authored.label.clone(),
            },
        )
        .with_overrides(
            authored.thrust_multiplier,
            authored.isp_multiplier,
            authored.ignition_potential,
        ));
    }

    match counted.as_slice() {
        [single] => {
            let config = database.lookup(single.resource(names));
            Ok(PropellantCombination::new(
                vec![config.propellant(1.0, true)],
                database,
                CombinationSource::SinglePropellant,
            ))
        }
        [first, second] => synthesize_pair(
            database,
            &database.lookup(first.resource(names)),
            &database.lookup(second.resource(names)),
        ),
        many => Err(ResolutionError::Unmatched { count: many.len() }),
    }
}

fn synthesize_pair(
    database: &PropellantDatabase,
    first: &PropellantConfig,
    second: &PropellantConfig,
) -> Result<PropellantCombination, ResolutionError> {
    let (fuel, oxidizer) = match (first.is_oxidizer, second.is_oxidizer) {
        (false, true) => (first, second),
        (true, false) => (second, first),
        _ => {
            return Err(ResolutionError::NotFuelOxidizerPair {
                first: first.resource_name.clone(),
                second: second.resource_name.clone(),
            });
        }
    };

    let total = fuel.mixture_constant + oxidizer.mixture_constant;
    if total == 0 {
        return Err(ResolutionError::MissingMixtureConstants {
            fuel: fuel.resource_name.clone(),
            oxidizer: oxidizer.resource_name.clone(),
        });
    }

    let fuel_fraction = nearest_clean_fraction(fuel.mixture_constant as f64 / total as f64);
    if fuel_fraction <= 0.0 || fuel_fraction >= 1.0 {
        return Err(ResolutionError::DegenerateMixture {
            fuel: fuel.resource_name.clone(),
            oxidizer: oxidizer.resource_name.clone(),
            fraction: fuel_fraction,
        });
    }

    Ok(PropellantCombination::new(
        vec![
            fuel.propellant(fuel_fraction, true),
            oxidizer.propellant(1.0 - fuel_fraction, false),
        ],
        database,
        CombinationSource::FuelOxidizerPair,
    ))
}

/// Resolve one group's slots; `None` means the thruster is unconfigured.
pub fn resolve_combination(
    database: &PropellantDatabase,
    slots: &[PropellantSlot],
    names: NameSet,
) -> Option<PropellantCombination> {
    match try_resolve(database, slots, names) {
        Ok(combination) => {
            log::debug!(
                "resolved {:?} names to {} via {:?}",
                names,
                combination.ratio_string(),
                combination.source()
            );
            Some(combination)
        }
        Err(err) => {
            log::warn!("no propellant combination for {:?} names: {err}", names);
            None
        }
    }
}

/// Resolve the slots belonging to `group_key` out of a mixed list.
pub fn resolve_group(
    database: &PropellantDatabase,
    slots: &[PropellantSlot],
    group_key: &str,
    names: NameSet,
) -> Option<PropellantCombination> {
    let group: Vec<PropellantSlot> = PropellantSlot::in_group(slots, group_key)
        .into_iter()
        .cloned()
        .collect();
    resolve_combination(database, &group, names)
}

/// Resolve both the original and the current combination of a group.
pub fn resolve_pair(
    database: &PropellantDatabase,
    slots: &[PropellantSlot],
    group_key: &str,
) -> ResolvedPair {
    ResolvedPair {
        original: resolve_group(database, slots, group_key, NameSet::Original),
        current: resolve_group(database, slots, group_key, NameSet::Current),
    }
}
