use crate::protocol::types::*;
use crate::protocol::{StatusDelta, StatusPayload};

/// Last state reported by the unit. Only ever changed by a decoded status frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceState {
    pub mode: Mode,
    pub fan_mode: FanMode,
    pub target_temperature: u8,
    pub current_temperature: u8,
    pub vertical_vane: VerticalVane,
    pub horizontal_vane: HorizontalVane,
    pub horizontal_swing: bool,
    pub display: bool,
    pub uv_light: bool,
    /// Raw payload of the last status frame. `None` until the unit has answered.
    pub payload: Option<StatusPayload>,
}

impl Default for DeviceState {
    fn default() -> Self {
        DeviceState {
            mode: Mode::Off,
            fan_mode: FanMode::Auto,
            target_temperature: 24,
            current_temperature: 22,
            vertical_vane: VerticalVane::Static,
            horizontal_vane: HorizontalVane::Static,
            horizontal_swing: false,
            display: true,
            uv_light: false,
            payload: None,
        }
    }
}

impl DeviceState {
    pub fn is_known(&self) -> bool {
        self.payload.is_some()
    }

    pub fn swing_mode(&self) -> SwingMode {
        SwingMode::from_parts(self.vertical_vane, self.horizontal_swing)
    }

    /// Merges a decoded status into this state. Returns whether any reported field
    /// changed, which is always the case for the first status received.
    pub fn apply(&mut self, delta: &StatusDelta) -> bool {
        let previous = *self;

        self.mode = delta.mode;
        self.fan_mode = delta.fan_mode;
        self.target_temperature = delta
            .target_temperature
            .clamp(MIN_TARGET_TEMPERATURE, MAX_TARGET_TEMPERATURE);
        self.current_temperature = delta
            .current_temperature
            .clamp(MIN_CURRENT_TEMPERATURE, MAX_CURRENT_TEMPERATURE);
        self.vertical_vane = delta.vertical_vane;
        self.horizontal_vane = delta.horizontal_vane;
        self.horizontal_swing = delta.horizontal_swing;
        self.display = delta.display;
        self.uv_light = delta.uv_light;
        self.payload = Some(delta.payload);

        if self.current_temperature != delta.current_temperature {
            debug!(
                "room temperature {} outside {}-{}, reporting {}",
                delta.current_temperature, MIN_CURRENT_TEMPERATURE, MAX_CURRENT_TEMPERATURE,
                self.current_temperature
            );
        }

        let changed = !previous.is_known() || previous.without_payload() != self.without_payload();
        if changed {
            debug!("device state updated: {:?}", self.without_payload());
        }
        changed
    }

    pub fn snapshot(&self) -> DeviceState {
        *self
    }

    fn without_payload(&self) -> DeviceState {
        DeviceState { payload: None, ..*self }
    }
}
