use super::{Host, SwitchHandle};
use crate::command::Command;
use crate::config::EntityCategory;
use crate::state::DeviceState;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SwitchKind {
    Display,
    UvLight,
    HorizontalSwing,
}

impl SwitchKind {
    fn command(self, on: bool) -> Command {
        match self {
            SwitchKind::Display => Command::SetDisplay(on),
            SwitchKind::UvLight => Command::SetUvLight(on),
            SwitchKind::HorizontalSwing => Command::SetHorizontalSwing(on),
        }
    }

    fn reported(self, state: &DeviceState) -> bool {
        match self {
            SwitchKind::Display => state.display,
            SwitchKind::UvLight => state.uv_light,
            SwitchKind::HorizontalSwing => state.horizontal_swing,
        }
    }

    /// Category the switch is registered with. Switches always surface as
    /// controls, so a configured category is dropped.
    pub fn category(self, configured: Option<EntityCategory>) -> Option<EntityCategory> {
        if let Some(category) = configured {
            debug!("{:?} switch always registers as a control, ignoring {:?}", self, category);
        }
        None
    }
}

#[derive(Debug)]
pub struct Switch {
    kind: SwitchKind,
    published: Option<bool>,
}

impl Switch {
    pub fn new(kind: SwitchKind) -> Self {
        Switch { kind, published: None }
    }

    pub fn handle(&self) -> SwitchHandle {
        SwitchHandle(self.kind)
    }

    pub fn write(&self, on: bool) -> Command {
        self.kind.command(on)
    }

    pub fn on_state_changed<H: Host>(&mut self, state: &DeviceState, host: &mut H) {
        let on = self.kind.reported(state);
        if self.published != Some(on) {
            host.publish_switch(self.handle(), on);
            self.published = Some(on);
        }
    }
}
