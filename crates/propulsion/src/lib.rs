//! Propellant descriptors, connected slots, and the authored propellant database.

pub mod combination;
pub mod database;

pub use combination::{Aggregates, CombinationSource, PropellantCombination, aggregate};
pub use database::{AuthoredCombination, PropellantDatabase};

/// Authored constants for a single resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantConfig {
    pub resource_name: String,
    pub thrust_multiplier: f64,
    pub isp_multiplier: f64,
    pub ignition_potential: f64,
    pub tank_density: f64,
    pub is_oxidizer: bool,
    pub mixture_constant: u32,
}

impl PropellantConfig {
    /// Neutral config synthesized for resources nobody authored.
    pub fn identity(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            thrust_multiplier: 1.0,
            isp_multiplier: 1.0,
            ignition_potential: 1.0,
            tank_density: 0.0,
            is_oxidizer: false,
            mixture_constant: 0,
        }
    }

    /// Build a combination entry for this resource.
    pub fn propellant(&self, ratio: f64, draw_gauge: bool) -> Propellant {
        Propellant::new(self.resource_name.clone(), ratio).with_draw_gauge(draw_gauge)
    }
}

/// One entry of a resolved combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Propellant {
    pub name: String,
    pub ratio: f64,
    pub draw_gauge: bool,
    pub ignore_for_isp: bool,
}

impl Propellant {
    pub fn new(name: impl Into<String>, ratio: f64) -> Self {
        Self {
            name: name.into(),
            ratio,
            draw_gauge: false,
            ignore_for_isp: false,
        }
    }

    pub fn with_draw_gauge(mut self, draw_gauge: bool) -> Self {
        self.draw_gauge = draw_gauge;
        self
    }

    pub fn with_ignore_for_isp(mut self, ignore_for_isp: bool) -> Self {
        self.ignore_for_isp = ignore_for_isp;
        self
    }
}

/// Which resource name of a slot a resolution reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSet {
    /// Names the part was built with; the baseline for stat comparisons.
    Original,
    /// Names currently selected by the player.
    Current,
}

/// A resource contribution from one connected module.
#[derive(Debug, Clone, PartialEq)]
pub struct PropellantSlot {
    pub resource_name: String,
    /// Falls back to `resource_name` when unset.
    pub resource_name_original: Option<String>,
    /// `0.0` means unspecified.
    pub ratio: f64,
    pub draw_gauge: bool,
    pub ignore_for_isp: bool,
    pub group_key: String,
}

impl PropellantSlot {
    pub fn new(group_key: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource_name_original: None,
            ratio: 0.0,
            draw_gauge: false,
            ignore_for_isp: false,
            group_key: group_key.into(),
        }
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.resource_name_original = Some(original.into());
        self
    }

    pub fn with_draw_gauge(mut self, draw_gauge: bool) -> Self {
        self.draw_gauge = draw_gauge;
        self
    }

    pub fn with_ignore_for_isp(mut self, ignore_for_isp: bool) -> Self {
        self.ignore_for_isp = ignore_for_isp;
        self
    }

    /// Point the slot at another resource, remembering the one it was built with.
    pub fn swap_resource(&mut self, resource_name: impl Into<String>) {
        if self.resource_name_original.is_none() {
            self.resource_name_original = Some(self.resource_name.clone());
        }
        self.resource_name = resource_name.into();
    }

    /// Resource name read under the given name set.
    pub fn resource(&self, names: NameSet) -> &str {
        match names {
            NameSet::Current => &self.resource_name,
            NameSet::Original => self
                .resource_name_original
                .as_deref()
                .unwrap_or(&self.resource_name),
        }
    }

    pub fn has_ratio(&self) -> bool {
        self.ratio != 0.0
    }

    /// Slots of one group, in connection order.
    pub fn in_group<'a>(slots: &'a [PropellantSlot], group_key: &str) -> Vec<&'a PropellantSlot> {
        slots.iter().filter(|s| s.group_key == group_key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_name_falls_back_to_current() {
        let slot = PropellantSlot::new("main", "LiquidFuel");
        assert_eq!(slot.resource(NameSet::Original), "LiquidFuel");
        assert_eq!(slot.resource(NameSet::Current), "LiquidFuel");
    }

    #[test]
    fn swapping_keeps_the_first_original() {
        let mut slot = PropellantSlot::new("main", "LiquidFuel");
        slot.swap_resource("Kerosene");
        slot.swap_resource("LqdMethane");
        assert_eq!(slot.resource(NameSet::Original), "LiquidFuel");
        assert_eq!(slot.resource(NameSet::Current), "LqdMethane");
    }

    #[test]
    fn groups_filter_by_key() {
        let slots = [
            PropellantSlot::new("main", "LiquidFuel"),
            PropellantSlot::new("vernier", "Hydrazine"),
            PropellantSlot::new("main", "Oxidizer"),
        ];
        let main: Vec<_> = PropellantSlot::in_group(&slots, "main")
            .into_iter()
            .map(|s| s.resource_name.as_str())
            .collect();
        assert_eq!(main, ["LiquidFuel", "Oxidizer"]);
    }
}
