//! Authored database records and loaders for the propellant mixer.
//!
//! Records are plain serde models; converting them into runtime types happens in
//! the thruster façade. Loading is lenient per entry: a record that fails to
//! parse or validate is logged and skipped, while I/O failures and documents
//! that are not a list at all abort the load.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const PROPELLANTS_FILE: &str = "propellants.yaml";
const COMBINATIONS_FILE: &str = "combinations.yaml";
const SCALE_EXPONENTS_FILE: &str = "scale_exponents.yaml";
const THRUSTERS_DIR: &str = "thrusters";

fn one() -> f64 {
    1.0
}

/// Per-resource constants authored for a single propellant.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PropellantRecord {
    pub name: String,
    #[serde(default = "one")]
    pub thrust_multiplier: f64,
    #[serde(default = "one")]
    pub isp_multiplier: f64,
    #[serde(default = "one")]
    pub ignition_potential: f64,
    #[serde(default)]
    pub tank_density: f64,
    #[serde(default)]
    pub is_oxidizer: bool,
    #[serde(default)]
    pub mixture_constant: u32,
}

/// A pre-authored propellant combination.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CombinationRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Optional overrides for the derived aggregates.
    #[serde(default)]
    pub thrust_multiplier: Option<f64>,
    #[serde(default)]
    pub isp_multiplier: Option<f64>,
    #[serde(default)]
    pub ignition_potential: Option<f64>,
    #[serde(default)]
    pub propellants: Vec<CombinationEntryRecord>,
}

/// One entry of an authored combination.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CombinationEntryRecord {
    pub name: String,
    pub ratio: f64,
    #[serde(default)]
    pub draw_gauge: bool,
    #[serde(default)]
    pub ignore_for_isp: bool,
}

/// Exponents applied to the scale factor for each scaled quantity.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ScaleExponentsRecord {
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub tank: Option<f64>,
    #[serde(default)]
    pub engine: Option<f64>,
    #[serde(default)]
    pub rcs: Option<f64>,
}

/// Thruster definition used by the CLI and scenario tests.
#[derive(Debug, Deserialize, Clone)]
pub struct ThrusterRecord {
    pub name: String,
    pub kind: ThrusterKindConfig,
    #[serde(default)]
    pub group: Option<String>,
    pub max_thrust_kn: f64,
    pub isp_vacuum_s: f64,
    #[serde(default)]
    pub isp_sea_level_s: Option<f64>,
    #[serde(default)]
    pub use_velocity_curve: bool,
    #[serde(default)]
    pub gravity_m_s2: Option<f64>,
    #[serde(default)]
    pub allow_shutdown: Option<bool>,
    #[serde(default)]
    pub throttle_locked: bool,
    #[serde(default)]
    pub slots: Vec<SlotRecord>,
    #[serde(default)]
    pub ignition_resources: Vec<IgnitionResourceRecord>,
}

/// Thruster kinds understood by the façade.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ThrusterKindConfig {
    #[serde(rename = "engine")]
    Engine,
    #[serde(rename = "rcs")]
    Rcs,
    #[serde(other)]
    Unsupported,
}

/// A propellant slot feeding a thruster.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SlotRecord {
    pub resource: String,
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub ratio: f64,
    #[serde(default)]
    pub draw_gauge: bool,
    #[serde(default)]
    pub ignore_for_isp: bool,
    #[serde(default)]
    pub group: Option<String>,
}

/// Ignitor resource consumed when an engine lights.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IgnitionResourceRecord {
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub scaled_amount: f64,
    #[serde(default)]
    pub added_ignition_potential: f64,
    #[serde(default)]
    pub always_required: bool,
}

/// Everything loaded from an authored database root.
#[derive(Debug, Clone, Default)]
pub struct AuthoredDatabase {
    pub propellants: Vec<PropellantRecord>,
    pub combinations: Vec<CombinationRecord>,
    pub scale_exponents: ScaleExponentsRecord,
    pub thrusters: Vec<ThrusterRecord>,
}

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Reasons a single record is rejected and skipped.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidRecord {
    #[error("record has no name")]
    MissingName,
    #[error("`{field}` must be a non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("combination lists no propellants")]
    EmptyCombination,
    #[error("ratio of `{name}` must be positive, got {ratio}")]
    NonPositiveRatio { name: String, ratio: f64 },
}

/// A record that can be validated after deserialization.
pub trait Record: DeserializeOwned {
    /// Short label used in diagnostics.
    fn label(&self) -> String;

    fn validate(&self) -> Result<(), InvalidRecord>;
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidRecord> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidRecord::Negative { field, value })
    }
}

fn require_name(name: &str) -> Result<(), InvalidRecord> {
    if name.trim().is_empty() {
        Err(InvalidRecord::MissingName)
    } else {
        Ok(())
    }
}

impl Record for PropellantRecord {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn validate(&self) -> Result<(), InvalidRecord> {
        require_name(&self.name)?;
        non_negative("thrust_multiplier", self.thrust_multiplier)?;
        non_negative("isp_multiplier", self.isp_multiplier)?;
        non_negative("ignition_potential", self.ignition_potential)?;
        non_negative("tank_density", self.tank_density)
    }
}

impl Record for CombinationRecord {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .propellants
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("+"),
        }
    }

    fn validate(&self) -> Result<(), InvalidRecord> {
        if self.propellants.is_empty() {
            return Err(InvalidRecord::EmptyCombination);
        }
        for entry in &self.propellants {
            require_name(&entry.name)?;
            if !(entry.ratio.is_finite() && entry.ratio > 0.0) {
                return Err(InvalidRecord::NonPositiveRatio {
                    name: entry.name.clone(),
                    ratio: entry.ratio,
                });
            }
        }
        for (field, value) in [
            ("thrust_multiplier", self.thrust_multiplier),
            ("isp_multiplier", self.isp_multiplier),
            ("ignition_potential", self.ignition_potential),
        ] {
            if let Some(value) = value {
                non_negative(field, value)?;
            }
        }
        Ok(())
    }
}

impl Record for ThrusterRecord {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn validate(&self) -> Result<(), InvalidRecord> {
        require_name(&self.name)?;
        non_negative("max_thrust_kn", self.max_thrust_kn)?;
        non_negative("isp_vacuum_s", self.isp_vacuum_s)?;
        if let Some(isp) = self.isp_sea_level_s {
            non_negative("isp_sea_level_s", isp)?;
        }
        for slot in &self.slots {
            require_name(&slot.resource)?;
            non_negative("ratio", slot.ratio)?;
        }
        for resource in &self.ignition_resources {
            require_name(&resource.name)?;
            non_negative("amount", resource.amount)?;
            non_negative("scaled_amount", resource.scaled_amount)?;
            non_negative("added_ignition_potential", resource.added_ignition_potential)?;
        }
        Ok(())
    }
}

/// Load propellant records from a YAML list, a TOML file, or a directory of TOML files.
pub fn load_propellants<P: AsRef<Path>>(path: P) -> Result<Vec<PropellantRecord>, ConfigError> {
    load_records(path)
}

/// Load authored combinations, preserving declaration order.
pub fn load_combinations<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<CombinationRecord>, ConfigError> {
    load_records(path)
}

/// Load thruster definitions.
pub fn load_thrusters<P: AsRef<Path>>(path: P) -> Result<Vec<ThrusterRecord>, ConfigError> {
    load_records(path)
}

/// Load the scale exponent table from a YAML mapping.
pub fn load_scale_exponents<P: AsRef<Path>>(path: P) -> Result<ScaleExponentsRecord, ConfigError> {
    let path = path.as_ref();
    let reader = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_reader(reader)?)
}

/// Load the full authored database rooted at `root`.
///
/// `propellants.yaml` is required; combinations, scale exponents and thruster
/// definitions are optional and default to empty.
pub fn load_database<P: AsRef<Path>>(root: P) -> Result<AuthoredDatabase, ConfigError> {
    let root = root.as_ref();
    let propellants = load_propellants(root.join(PROPELLANTS_FILE))?;

    let combinations_path = root.join(COMBINATIONS_FILE);
    let combinations = if combinations_path.exists() {
        load_combinations(combinations_path)?
    } else {
        Vec::new()
    };

    let exponents_path = root.join(SCALE_EXPONENTS_FILE);
    let scale_exponents = if exponents_path.exists() {
        load_scale_exponents(exponents_path)?
    } else {
        ScaleExponentsRecord::default()
    };

    let thrusters_path = root.join(THRUSTERS_DIR);
    let thrusters = if thrusters_path.exists() {
        load_thrusters(thrusters_path)?
    } else {
        Vec::new()
    };

    log::info!(
        "loaded authored database from {}: {} propellants, {} combinations, {} thrusters",
        root.display(),
        propellants.len(),
        combinations.len(),
        thrusters.len()
    );

    Ok(AuthoredDatabase {
        propellants,
        combinations,
        scale_exponents,
        thrusters,
    })
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: Record,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        Ok(read_toml_record(path)?.into_iter().collect())
    } else {
        let reader = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let values: Vec<serde_yaml::Value> = serde_yaml::from_reader(reader)?;
        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_yaml::from_value::<T>(value) {
                Ok(record) => accept(record, path),
                Err(err) => {
                    log::warn!("skipping entry {index} in {}: {err}", path.display());
                    None
                }
            })
            .collect();
        if records.len() < total {
            log::warn!(
                "{}: kept {} of {} entries",
                path.display(),
                records.len(),
                total
            );
        }
        Ok(records)
    }
}

fn read_dir_records<T: Record>(dir: &Path) -> Result<Vec<T>, ConfigError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    let mut records = Vec::new();
    for path in entries {
        records.extend(read_toml_record(&path)?);
    }
    Ok(records)
}

fn read_toml_record<T: Record>(path: &Path) -> Result<Option<T>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match toml::from_str::<T>(&contents) {
        Ok(record) => Ok(accept(record, path)),
        Err(err) => {
            log::warn!("skipping {}: {err}", path.display());
            Ok(None)
        }
    }
}

fn accept<T: Record>(record: T, path: &Path) -> Option<T> {
    match record.validate() {
        Ok(()) => Some(record),
        Err(reason) => {
            log::warn!(
                "skipping `{}` in {}: {reason}",
                record.label(),
                path.display()
            );
            None
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
