//! Conversion of authored records into runtime thrusters and databases.

use std::path::Path;

use mixer_config::{
    AuthoredDatabase, CombinationRecord, ConfigError, IgnitionResourceRecord, PropellantRecord,
    ScaleExponentsRecord, SlotRecord, ThrusterKindConfig, ThrusterRecord, load_database,
};
use mixer_core::constants::G0;
use mixer_ignition::IgnitionResource;
use mixer_propulsion::{
    AuthoredCombination, Propellant, PropellantConfig, PropellantDatabase, PropellantSlot,
};
use thiserror::Error;

use crate::{
    EngineController, ScaleExponents, ScaleFactor, SimulatedThruster, ThrusterController,
    ThrusterKind,
};

/// Errors surfaced when selecting or converting thrusters.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("thruster '{0}' not found in catalog")]
    NotFound(String),
    #[error("thruster catalog is empty")]
    Empty,
    #[error("thruster '{0}' has an unsupported kind")]
    UnsupportedKind(String),
}

pub fn propellant_config(record: &PropellantRecord) -> PropellantConfig {
    PropellantConfig {
        resource_name: record.name.clone(),
        thrust_multiplier: record.thrust_multiplier,
        isp_multiplier: record.isp_multiplier,
        ignition_potential: record.ignition_potential,
        tank_density: record.tank_density,
        is_oxidizer: record.is_oxidizer,
        mixture_constant: record.mixture_constant,
    }
}

pub fn authored_combination(record: &CombinationRecord) -> AuthoredCombination {
    use mixer_config::Record;

    let propellants = record
        .propellants
        .iter()
        .map(|entry| {
            Propellant::new(entry.name.clone(), entry.ratio)
                .with_draw_gauge(entry.draw_gauge)
                .with_ignore_for_isp(entry.ignore_for_isp)
        })
        .collect();
    AuthoredCombination {
        thrust_multiplier: record.thrust_multiplier,
        isp_multiplier: record.isp_multiplier,
        ignition_potential: record.ignition_potential,
        ..AuthoredCombination::new(record.label(), propellants)
    }
}

pub fn scale_exponents(record: &ScaleExponentsRecord) -> ScaleExponents {
    ScaleExponents {
        mass: record.mass,
        cost: record.cost,
        tank: record.tank,
        engine: record.engine,
        rcs: record.rcs,
    }
}

fn slot(record: &SlotRecord, group_key: &str) -> PropellantSlot {
    let group = record.group.as_deref().unwrap_or(group_key);
    let slot = PropellantSlot::new(group, record.resource.clone())
        .with_ratio(record.ratio)
        .with_draw_gauge(record.draw_gauge)
        .with_ignore_for_isp(record.ignore_for_isp);
    match &record.original {
        Some(original) => slot.with_original(original.clone()),
        None => slot,
    }
}

fn ignition_resource(record: &IgnitionResourceRecord) -> IgnitionResource {
    IgnitionResource {
        resource_name: record.name.clone(),
        amount: record.amount,
        scaled_amount: record.scaled_amount,
        added_ignition_potential: record.added_ignition_potential,
        always_required: record.always_required,
    }
}

/// Runtime pieces built from one thruster record.
#[derive(Debug, Clone)]
pub struct ThrusterSetup {
    pub name: String,
    pub thruster: SimulatedThruster,
    pub controller: ThrusterController,
    pub ignition_resources: Vec<IgnitionResource>,
    pub allow_shutdown: bool,
    pub throttle_locked: bool,
}

impl ThrusterSetup {
    /// Engine controller for this setup; ignitors are attached only to engines.
    pub fn into_engine(self) -> (SimulatedThruster, EngineController) {
        let resources = match self.controller.kind() {
            ThrusterKind::Engine => self.ignition_resources,
            ThrusterKind::Rcs => Vec::new(),
        };
        (
            self.thruster,
            EngineController::new(self.name, self.controller, resources),
        )
    }
}

/// Convert a thruster record into its runtime representation.
pub fn from_record(
    record: &ThrusterRecord,
    exponents: ScaleExponents,
) -> Result<ThrusterSetup, CatalogError> {
    let kind = match record.kind {
        ThrusterKindConfig::Engine => ThrusterKind::Engine,
        ThrusterKindConfig::Rcs => ThrusterKind::Rcs,
        ThrusterKindConfig::Unsupported => {
            return Err(CatalogError::UnsupportedKind(record.name.clone()));
        }
    };
    let group_key = record.group.clone().unwrap_or_else(|| record.name.clone());

    let thruster = SimulatedThruster::new(
        kind,
        record.max_thrust_kn,
        record.isp_vacuum_s,
        record.isp_sea_level_s,
    )
    .with_velocity_curve(record.use_velocity_curve)
    .with_gravity(record.gravity_m_s2.unwrap_or(G0));

    let slots = record.slots.iter().map(|s| slot(s, &group_key)).collect();
    let controller = ThrusterController::new(kind, group_key, slots, ScaleFactor::new(exponents));

    Ok(ThrusterSetup {
        name: record.name.clone(),
        thruster,
        controller,
        ignition_resources: record.ignition_resources.iter().map(ignition_resource).collect(),
        allow_shutdown: record.allow_shutdown.unwrap_or(true),
        throttle_locked: record.throttle_locked,
    })
}

/// Propellant database plus thruster definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    database: PropellantDatabase,
    exponents: ScaleExponents,
    thrusters: Vec<ThrusterRecord>,
}

impl From<AuthoredDatabase> for Catalog {
    fn from(authored: AuthoredDatabase) -> Self {
        let database = PropellantDatabase::new(
            authored.propellants.iter().map(propellant_config),
            authored.combinations.iter().map(authored_combination),
        );
        Self {
            database,
            exponents: scale_exponents(&authored.scale_exponents),
            thrusters: authored.thrusters,
        }
    }
}

impl Catalog {
    pub fn database(&self) -> &PropellantDatabase {
        &self.database
    }

    pub fn exponents(&self) -> ScaleExponents {
        self.exponents
    }

    pub fn thrusters(&self) -> &[ThrusterRecord] {
        &self.thrusters
    }

    /// Case-insensitive lookup by thruster name.
    pub fn find(&self, name: &str) -> Result<&ThrusterRecord, CatalogError> {
        if self.thrusters.is_empty() {
            return Err(CatalogError::Empty);
        }
        self.thrusters
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn build(&self, name: &str) -> Result<ThrusterSetup, CatalogError> {
        from_record(self.find(name)?, self.exponents)
    }
}

/// Load the authored database under `root` and convert it.
pub fn load_catalog<P: AsRef<Path>>(root: P) -> Result<Catalog, CatalogError> {
    Ok(Catalog::from(load_database(root)?))
}
