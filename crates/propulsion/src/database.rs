//! Read-only lookup context for authored propellant data.

use std::borrow::Cow;
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{Propellant, PropellantConfig};

/// A combination authored in the database, matched by its set of resource names.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredCombination {
    pub label: String,
    pub propellants: Vec<Propellant>,
    pub thrust_multiplier: Option<f64>,
    pub isp_multiplier: Option<f64>,
    pub ignition_potential: Option<f64>,
}

impl AuthoredCombination {
    pub fn new(label: impl Into<String>, propellants: Vec<Propellant>) -> Self {
        Self {
            label: label.into(),
            propellants,
            thrust_multiplier: None,
            isp_multiplier: None,
            ignition_potential: None,
        }
    }

    /// True when `names` holds exactly this combination's resources, in any order.
    pub fn matches(&self, names: &[&str]) -> bool {
        if self.propellants.len() != names.len() {
            return false;
        }
        name_counts(self.propellants.iter().map(|p| p.name.as_str())) == name_counts(names.iter().copied())
    }
}

fn name_counts<'a>(names: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// Authored propellant and combination records, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct PropellantDatabase {
    propellants: IndexMap<String, PropellantConfig>,
    combinations: Vec<AuthoredCombination>,
}

impl PropellantDatabase {
    /// Later propellant entries with the same name replace earlier ones.
    /// Combinations keep their declaration order.
    pub fn new(
        propellants: impl IntoIterator<Item = PropellantConfig>,
        combinations: impl IntoIterator<Item = AuthoredCombination>,
    ) -> Self {
        let propellants = propellants
            .into_iter()
            .map(|config| (config.resource_name.clone(), config))
            .collect();
        Self {
            propellants,
            combinations: combinations.into_iter().collect(),
        }
    }

    /// Authored config for `name`, or a neutral one if nobody authored it.
    pub fn lookup(&self, name: &str) -> Cow<'_, PropellantConfig> {
        match self.propellants.get(name) {
            Some(config) => Cow::Borrowed(config),
            None => Cow::Owned(PropellantConfig::identity(name)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropellantConfig> {
        self.propellants.get(name)
    }

    pub fn propellants(&self) -> impl Iterator<Item = &PropellantConfig> {
        self.propellants.values()
    }

    pub fn combinations(&self) -> &[AuthoredCombination] {
        &self.combinations
    }

    /// First authored combination whose name set equals `names`.
    pub fn find_combination(&self, names: &[&str]) -> Option<&AuthoredCombination> {
        self.combinations.iter().find(|c| c.matches(names))
    }
}
