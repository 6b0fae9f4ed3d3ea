//! Per-tick ignition state machine for a single engine mode.

use mixer_propulsion::PropellantCombination;

use crate::{
    Ignition, IgnitionFailure, IgnitionResource, ResourcePool, attempt_ignition, split_resources,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnitionState {
    #[default]
    Unignited,
    Ignited,
}

/// What the host engine reports at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineSnapshot {
    pub requested_throttle: f64,
    /// Throttle command from the pilot.
    pub main_throttle: f64,
    pub engine_ignited: bool,
    pub flameout: bool,
    pub allow_shutdown: bool,
    /// Solid motors cannot be throttled and burn once lit.
    pub throttle_locked: bool,
    pub multi_mode: bool,
}

/// Another propellant mode of the same physical engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiblingMode {
    pub ignited: bool,
    pub flameout: bool,
    pub deprived: bool,
}

impl SiblingMode {
    pub fn is_burning(&self) -> bool {
        self.ignited && !self.flameout && !self.deprived
    }
}

/// Host callbacks fired by the state machine.
pub trait IgnitionEffects {
    fn engage(&mut self);
    fn flameout(&mut self);
    fn shutdown(&mut self);
    fn post_message(&mut self, message: &str);
}

/// Whether the engine wants to be burning this tick.
pub fn should_be_ignited(engine: &EngineSnapshot) -> bool {
    let throttled_off = engine.requested_throttle <= 0.0 && !engine.multi_mode;
    if throttled_off || engine.flameout || (!engine.engine_ignited && engine.allow_shutdown) {
        return false;
    }
    if !engine.engine_ignited {
        return engine.main_throttle > 0.0 || engine.throttle_locked;
    }
    true
}

pub fn other_mode_active(siblings: &[SiblingMode]) -> bool {
    siblings.iter().any(SiblingMode::is_burning)
}

/// Ignition state of one engine mode plus its ignitor resources.
#[derive(Debug, Clone, Default)]
pub struct IgnitionController {
    state: IgnitionState,
    resources: Vec<IgnitionResource>,
}

impl IgnitionController {
    pub fn new(resources: Vec<IgnitionResource>) -> Self {
        Self {
            state: IgnitionState::Unignited,
            resources,
        }
    }

    pub fn state(&self) -> IgnitionState {
        self.state
    }

    pub fn resources(&self) -> &[IgnitionResource] {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut [IgnitionResource] {
        &mut self.resources
    }

    /// Run one attempt against `combination`, or accept a burning sibling mode.
    pub fn attempt(
        &self,
        engine: &EngineSnapshot,
        siblings: &[SiblingMode],
        combination: Option<&PropellantCombination>,
        pool: &mut dyn ResourcePool,
    ) -> Result<Ignition, IgnitionFailure> {
        if engine.multi_mode && other_mode_active(siblings) {
            return Ok(Ignition::SiblingMode);
        }
        let combination = combination.ok_or(IgnitionFailure::NoCombination)?;
        let (required, optional) = split_resources(&self.resources);
        attempt_ignition(required, optional, combination, pool)
    }

    /// Advance one fixed tick and return the resulting state.
    pub fn tick(
        &mut self,
        engine: &EngineSnapshot,
        siblings: &[SiblingMode],
        combination: Option<&PropellantCombination>,
        pool: &mut dyn ResourcePool,
        effects: &mut dyn IgnitionEffects,
    ) -> IgnitionState {
        if !(should_be_ignited(engine) || other_mode_active(siblings)) {
            self.state = IgnitionState::Unignited;
            return self.state;
        }
        if self.state == IgnitionState::Ignited {
            return self.state;
        }

        match self.attempt(engine, siblings, combination, pool) {
            Ok(ignition) => {
                log::info!("ignition succeeded: {ignition:?}");
                if let Some(message) = ignition.message() {
                    effects.post_message(message);
                }
                self.state = IgnitionState::Ignited;
                if engine.engine_ignited {
                    effects.engage();
                }
            }
            Err(failure) => {
                log::info!("{failure}");
                effects.post_message(&failure.to_string());
                self.state = IgnitionState::Unignited;
                if engine.engine_ignited {
                    effects.flameout();
                    effects.shutdown();
                }
            }
        }
        self.state
    }
}
