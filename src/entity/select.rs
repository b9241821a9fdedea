use heapless::String;

use super::{EntityError, Host, SelectHandle};
use crate::command::Command;
use crate::config::{ConfigError, MAX_LABEL_LEN};
use crate::protocol::types::{HorizontalVane, VerticalVane, VANE_POSITIONS};
use crate::state::DeviceState;

pub type Label = String<MAX_LABEL_LEN>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VaneAxis {
    Vertical,
    Horizontal,
}

impl VaneAxis {
    fn default_labels(self) -> &'static [&'static str; VANE_POSITIONS] {
        match self {
            VaneAxis::Vertical => &VerticalVane::DEFAULT_LABELS,
            VaneAxis::Horizontal => &HorizontalVane::DEFAULT_LABELS,
        }
    }

    fn command(self, index: usize) -> Option<Command> {
        match self {
            VaneAxis::Vertical => VerticalVane::ALL.get(index).copied().map(Command::SetVerticalVane),
            VaneAxis::Horizontal => HorizontalVane::ALL.get(index).copied().map(Command::SetHorizontalVane),
        }
    }

    fn reported_index(self, state: &DeviceState) -> usize {
        match self {
            VaneAxis::Vertical => state.vertical_vane.index(),
            VaneAxis::Horizontal => state.horizontal_vane.index(),
        }
    }
}

/// Select entity for one vane. Option `i` always maps to vane position `i`,
/// whatever the label says.
#[derive(Debug)]
pub struct VaneSelect {
    axis: VaneAxis,
    options: [Label; VANE_POSITIONS],
    published: Option<usize>,
}

impl VaneSelect {
    pub fn new(axis: VaneAxis, options: Option<&[&str]>) -> Result<Self, ConfigError> {
        let labels = options.unwrap_or(&axis.default_labels()[..]);
        if labels.len() != VANE_POSITIONS {
            return Err(ConfigError::VaneOptionCount { vane: axis, count: labels.len() });
        }

        let mut stored: [Label; VANE_POSITIONS] = Default::default();
        for (index, (slot, label)) in stored.iter_mut().zip(labels).enumerate() {
            slot.push_str(label)
                .map_err(|_| ConfigError::OptionTooLong { vane: axis, index })?;
        }

        Ok(VaneSelect { axis, options: stored, published: None })
    }

    pub fn handle(&self) -> SelectHandle {
        SelectHandle(self.axis)
    }

    pub fn options(&self) -> &[Label] {
        &self.options
    }

    pub fn select(&self, option: &str) -> Result<Command, EntityError> {
        let index = self
            .options
            .iter()
            .position(|label| label.as_str() == option)
            .ok_or(EntityError::UnknownOption)?;
        self.axis.command(index).ok_or(EntityError::UnknownOption)
    }

    pub fn on_state_changed<H: Host>(&mut self, state: &DeviceState, host: &mut H) {
        let index = self.axis.reported_index(state);
        if self.published == Some(index) {
            return;
        }
        if let Some(label) = self.options.get(index) {
            host.publish_select(self.handle(), label);
            self.published = Some(index);
        }
    }
}
