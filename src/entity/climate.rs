use heapless::Vec;

use super::Host;
use crate::command::Command;
use crate::protocol::types::*;
use crate::state::DeviceState;

/// A climate request from the host. Every field is optional; absent fields are
/// left as they are.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClimateCall {
    pub mode: Option<Mode>,
    pub target_temperature: Option<u8>,
    pub fan_mode: Option<FanMode>,
    pub swing_mode: Option<SwingMode>,
}

impl ClimateCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_target_temperature(mut self, celsius: u8) -> Self {
        self.target_temperature = Some(celsius);
        self
    }

    pub fn with_fan_mode(mut self, fan_mode: FanMode) -> Self {
        self.fan_mode = Some(fan_mode);
        self
    }

    pub fn with_swing_mode(mut self, swing_mode: SwingMode) -> Self {
        self.swing_mode = Some(swing_mode);
        self
    }
}

/// What the climate entity reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClimateState {
    pub mode: Mode,
    pub target_temperature: u8,
    pub current_temperature: u8,
    pub fan_mode: FanMode,
    pub swing_mode: SwingMode,
}

impl From<&DeviceState> for ClimateState {
    fn from(state: &DeviceState) -> Self {
        ClimateState {
            mode: state.mode,
            target_temperature: state.target_temperature,
            current_temperature: state.current_temperature,
            fan_mode: state.fan_mode,
            swing_mode: state.swing_mode(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClimateTraits {
    pub modes: &'static [Mode],
    pub fan_modes: &'static [FanMode],
    pub swing_modes: &'static [SwingMode],
    pub supports_current_temperature: bool,
    pub visual_min_temperature: u8,
    pub visual_max_temperature: u8,
    pub visual_temperature_step: u8,
}

pub const CLIMATE_TRAITS: ClimateTraits = ClimateTraits {
    modes: &Mode::ALL,
    fan_modes: &FanMode::ALL,
    swing_modes: &SwingMode::ALL,
    supports_current_temperature: true,
    visual_min_temperature: MIN_CURRENT_TEMPERATURE,
    visual_max_temperature: MAX_CURRENT_TEMPERATURE,
    visual_temperature_step: 1,
};

#[derive(Debug, Default)]
pub struct Climate {
    published: Option<ClimateState>,
}

impl Climate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traits(&self) -> &'static ClimateTraits {
        &CLIMATE_TRAITS
    }

    /// Turns `call` into commands, in mode, temperature, fan, swing order.
    pub fn control(&self, call: &ClimateCall) -> Vec<Command, 4> {
        let mut commands = Vec::new();
        let requested = [
            call.mode.map(Command::SetMode),
            call.target_temperature.map(|celsius| {
                let clamped = celsius.clamp(MIN_TARGET_TEMPERATURE, MAX_TARGET_TEMPERATURE);
                if clamped != celsius {
                    debug!("target temperature {} clamped to {}", celsius, clamped);
                }
                Command::SetTargetTemperature(clamped)
            }),
            call.fan_mode.map(Command::SetFanMode),
            call.swing_mode.map(Command::SetSwingMode),
        ];
        for command in requested.into_iter().flatten() {
            // at most four, one per field
            let _ = commands.push(command);
        }
        commands
    }

    pub fn on_state_changed<H: Host>(&mut self, state: &DeviceState, host: &mut H) {
        let current = ClimateState::from(state);
        if self.published != Some(current) {
            host.publish_climate(&current);
            self.published = Some(current);
        }
    }
}
