//! Host-facing entities: the climate entity, the vane selects and the switches.
//!
//! Adapters never touch the link. Host requests become `Command`s that the
//! component queues; reported state flows back through `on_state_changed`, which
//! publishes to the `Host` only what changed since the last publication.

use thiserror::Error;

use crate::config::EntityCategory;

mod climate;
mod select;
mod switch;

pub use climate::{Climate, ClimateCall, ClimateState, ClimateTraits, CLIMATE_TRAITS};
pub use select::{Label, VaneAxis, VaneSelect};
pub use switch::{Switch, SwitchKind};

/// The framework the entities are registered with and reported to.
pub trait Host {
    fn register(&mut self, entity: &EntityInfo<'_>);
    fn publish_climate(&mut self, state: &ClimateState);
    fn publish_select(&mut self, select: SelectHandle, option: &str);
    fn publish_switch(&mut self, switch: SwitchHandle, on: bool);
}

#[derive(Clone, Copy, Debug)]
pub enum EntityKind<'a> {
    Climate(&'a ClimateTraits),
    Select { handle: SelectHandle, options: &'a [Label] },
    Switch(SwitchHandle),
}

#[derive(Clone, Copy, Debug)]
pub struct EntityInfo<'a> {
    pub name: &'a str,
    pub category: Option<EntityCategory>,
    pub kind: EntityKind<'a>,
}

/// Identifies a vane select when the host forwards a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SelectHandle(VaneAxis);

impl SelectHandle {
    pub fn axis(&self) -> VaneAxis {
        self.0
    }
}

/// Identifies a switch when the host forwards a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SwitchHandle(SwitchKind);

impl SwitchHandle {
    pub fn kind(&self) -> SwitchKind {
        self.0
    }
}

/// Handles of every entity registered by `DaewooAc::setup`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntityHandles {
    pub vertical_vane: Option<SelectHandle>,
    pub horizontal_vane: Option<SelectHandle>,
    pub display: SwitchHandle,
    pub uv_light: Option<SwitchHandle>,
    pub horizontal_swing: Option<SwitchHandle>,
}

#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityError {
    #[error("option is not one of the configured labels")]
    UnknownOption,
    #[error("entity is not configured")]
    NotConfigured,
}
