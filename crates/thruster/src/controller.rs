//! Per-thruster orchestration of resolution, rescaling and ignition.

use mixer_export::ignitors::{self, CodecError};
use mixer_ignition::{
    EngineSnapshot, IgnitionController, IgnitionEffects, IgnitionResource, IgnitionState,
    ResourcePool, SiblingMode,
};
use mixer_propulsion::{PropellantDatabase, PropellantSlot};
use mixer_rescale::{RescaledStats, ThrusterBaseline, ThrusterStats, percent_change};
use mixer_resolver::{ResolvedPair, resolve_pair};

use crate::{ScaleFactor, Thruster, ThrusterKind, mass_flow_rate};

/// Connected slots and derived stats of one thruster.
#[derive(Debug, Clone)]
pub struct ThrusterController {
    kind: ThrusterKind,
    group_key: String,
    slots: Vec<PropellantSlot>,
    resolved: ResolvedPair,
    stats: ThrusterStats,
    scale: ScaleFactor,
}

impl ThrusterController {
    pub fn new(
        kind: ThrusterKind,
        group_key: impl Into<String>,
        slots: Vec<PropellantSlot>,
        scale: ScaleFactor,
    ) -> Self {
        Self {
            kind,
            group_key: group_key.into(),
            slots,
            resolved: ResolvedPair::default(),
            stats: ThrusterStats::default(),
            scale,
        }
    }

    pub fn kind(&self) -> ThrusterKind {
        self.kind
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn slots(&self) -> &[PropellantSlot] {
        &self.slots
    }

    pub fn resolved(&self) -> &ResolvedPair {
        &self.resolved
    }

    pub fn stats(&self) -> &ThrusterStats {
        &self.stats
    }

    pub fn scale(&self) -> &ScaleFactor {
        &self.scale
    }

    /// Baseline with the current scale factor applied to its thrust.
    pub fn scaled_baseline(&self) -> Option<ThrusterBaseline> {
        let thrust_scale = self.scale.scale(self.kind.scale_quantity());
        self.stats.baseline().map(|b| b.scaled(thrust_scale))
    }

    /// Restore a persisted baseline before the first resolution.
    pub fn restore_baseline(&mut self, baseline: ThrusterBaseline) {
        self.stats.restore_baseline(baseline);
    }

    /// Point every slot of this thruster's group that currently holds `from` at `to`.
    ///
    /// Returns how many slots changed; callers re-run [`Self::update_and_apply`].
    pub fn swap_resource(&mut self, from: &str, to: &str) -> usize {
        let mut swapped = 0;
        for slot in self
            .slots
            .iter_mut()
            .filter(|s| s.group_key == self.group_key && s.resource_name == from)
        {
            slot.swap_resource(to);
            swapped += 1;
        }
        swapped
    }

    /// Change the external scale factor, re-resolving when it moved.
    pub fn set_scale_factor(
        &mut self,
        factor: f64,
        database: &PropellantDatabase,
        thruster: &mut dyn Thruster,
    ) -> bool {
        if !self.scale.set_factor(factor) {
            return false;
        }
        self.update_and_apply(database, thruster);
        true
    }

    /// Resolve both combinations, rescale and push the result into `thruster`.
    ///
    /// The baseline is captured from `thruster` on the first successful
    /// resolution. Without both combinations the thruster is left untouched.
    pub fn update_and_apply(
        &mut self,
        database: &PropellantDatabase,
        thruster: &mut dyn Thruster,
    ) -> Option<RescaledStats> {
        self.resolved = resolve_pair(database, &self.slots, &self.group_key);
        let original = self.resolved.original.as_ref().filter(|c| !c.is_empty())?;
        let current = self.resolved.current.as_ref().filter(|c| !c.is_empty())?;

        if self.stats.baseline().is_none() {
            match thruster.baseline() {
                Some(baseline) => {
                    self.stats.capture_baseline(baseline);
                }
                None => log::warn!("{}: thruster has no Isp curve to capture", self.group_key),
            }
        }

        let thrust_scale = self.scale.scale(self.kind.scale_quantity());
        let stats = self
            .stats
            .update(Some(original), Some(current), thrust_scale, thruster.gravity())?
            .clone();

        thruster.set_max_thrust(stats.max_thrust);
        thruster.set_max_fuel_flow(stats.max_fuel_flow);
        thruster.set_isp_curve(stats.isp_curve.clone());
        thruster.set_propellants(current.propellants());
        log::debug!(
            "{}: applied {} -> {:.1} thrust, {:.1}s Isp",
            self.group_key,
            current.ratio_string(),
            stats.max_thrust,
            stats.isp_vacuum
        );
        Some(stats)
    }

    pub fn thrust_change_percent(&self) -> Option<f64> {
        let baseline = self.scaled_baseline()?;
        let current = self.stats.current()?;
        Some(percent_change(baseline.max_thrust, current.max_thrust))
    }

    pub fn isp_change_percent(&self) -> Option<f64> {
        let baseline = self.stats.baseline()?;
        let current = self.stats.current()?;
        Some(percent_change(baseline.isp_vacuum, current.isp_vacuum))
    }
}

/// An engine mode: a thruster controller plus its ignition state machine.
#[derive(Debug, Clone)]
pub struct EngineController {
    engine_id: String,
    thruster: ThrusterController,
    ignition: IgnitionController,
}

impl EngineController {
    pub fn new(
        engine_id: impl Into<String>,
        thruster: ThrusterController,
        resources: Vec<IgnitionResource>,
    ) -> Self {
        Self {
            engine_id: engine_id.into(),
            thruster,
            ignition: IgnitionController::new(resources),
        }
    }

    pub fn group_name(&self) -> &str {
        if self.engine_id.is_empty() {
            "Engine"
        } else {
            &self.engine_id
        }
    }

    pub fn thruster(&self) -> &ThrusterController {
        &self.thruster
    }

    pub fn thruster_mut(&mut self) -> &mut ThrusterController {
        &mut self.thruster
    }

    pub fn ignition(&self) -> &IgnitionController {
        &self.ignition
    }

    /// Freeze scaled ignitor amounts from the engine's mass flow.
    ///
    /// Call after the first [`ThrusterController::update_and_apply`] so the
    /// mass flow reflects the applied stats.
    pub fn freeze_ignition_resources(&mut self, thruster: &dyn Thruster) {
        let mass_rate = mass_flow_rate(thruster);
        for resource in self.ignition.resources_mut() {
            resource.freeze_amount(mass_rate);
        }
    }

    /// One line per ignitor, in declared order.
    pub fn ignition_description(&self) -> Vec<String> {
        self.ignition
            .resources()
            .iter()
            .map(IgnitionResource::describe)
            .collect()
    }

    pub fn persisted_ignition_resources(&self) -> Result<String, CodecError> {
        ignitors::encode(self.ignition.resources())
    }

    /// Replace ignitors with a persisted list; the state machine restarts unignited.
    pub fn restore_ignition_resources(&mut self, encoded: &str) -> Result<(), CodecError> {
        let resources = ignitors::decode(encoded)?;
        self.ignition = IgnitionController::new(resources);
        Ok(())
    }

    pub fn tick(
        &mut self,
        engine: &EngineSnapshot,
        siblings: &[SiblingMode],
        pool: &mut dyn ResourcePool,
        effects: &mut dyn IgnitionEffects,
    ) -> IgnitionState {
        let current = self.thruster.resolved().current.as_ref();
        self.ignition.tick(engine, siblings, current, pool, effects)
    }
}
