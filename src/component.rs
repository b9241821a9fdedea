use embedded_hal::serial;

use crate::config::{ConfigError, DaewooConfig, EntityCategory, VaneSelectConfig};
use crate::entity::*;
use crate::interface::DaewooDevice;
use crate::state::DeviceState;

/// The whole air conditioner as the host sees it: the device driver plus one
/// climate entity and the optional vane selects and switches.
pub struct DaewooAc<S> where S: serial::Read<u8> + serial::Write<u8> {
    device: DaewooDevice<S>,
    climate: Climate,
    vertical_vane: Option<VaneSelect>,
    horizontal_vane: Option<VaneSelect>,
    display: Switch,
    uv_light: Option<Switch>,
    horizontal_swing: Option<Switch>,
}

fn vane_select(axis: VaneAxis, config: Option<&VaneSelectConfig<'_>>) -> Result<Option<VaneSelect>, ConfigError> {
    config.map(|c| VaneSelect::new(axis, c.options)).transpose()
}

fn vane_category(axis: VaneAxis, configured: Option<EntityCategory>) -> Option<EntityCategory> {
    if let Some(category) = configured {
        debug!("{:?} vane select always registers as a control, ignoring {:?}", axis, category);
    }
    None
}

impl<S> DaewooAc<S> where S: serial::Read<u8> + serial::Write<u8> {
    /// Validates `config` and registers every configured entity with `host`.
    /// Nothing is registered when the configuration is rejected.
    pub fn setup<H: Host>(config: DaewooConfig<'_, S>, host: &mut H) -> Result<(Self, EntityHandles), ConfigError> {
        let (update_interval_ms, response_timeout_ms) = config.timing_ms()?;
        let display_config = config.display.ok_or(ConfigError::MissingDisplaySwitch)?;
        let vertical_vane = vane_select(VaneAxis::Vertical, config.vertical_vane.as_ref())?;
        let horizontal_vane = vane_select(VaneAxis::Horizontal, config.horizontal_vane.as_ref())?;
        let uart = config.uart.ok_or(ConfigError::MissingUart)?;

        let climate = Climate::new();
        host.register(&EntityInfo {
            name: config.name,
            category: None,
            kind: EntityKind::Climate(climate.traits()),
        });

        for (select, select_config) in [
            (&vertical_vane, &config.vertical_vane),
            (&horizontal_vane, &config.horizontal_vane),
        ] {
            if let (Some(select), Some(select_config)) = (select, select_config) {
                let handle = select.handle();
                host.register(&EntityInfo {
                    name: select_config.name,
                    category: vane_category(handle.axis(), select_config.entity_category),
                    kind: EntityKind::Select { handle, options: select.options() },
                });
            }
        }

        let display = Switch::new(SwitchKind::Display);
        let uv_light = config.uv_light.map(|_| Switch::new(SwitchKind::UvLight));
        let horizontal_swing = config.horizontal_swing.map(|_| Switch::new(SwitchKind::HorizontalSwing));

        for (switch, switch_config) in [
            (Some(&display), Some(display_config)),
            (uv_light.as_ref(), config.uv_light),
            (horizontal_swing.as_ref(), config.horizontal_swing),
        ] {
            if let (Some(switch), Some(switch_config)) = (switch, switch_config) {
                let handle = switch.handle();
                host.register(&EntityInfo {
                    name: switch_config.name,
                    category: handle.kind().category(switch_config.entity_category),
                    kind: EntityKind::Switch(handle),
                });
            }
        }

        let handles = EntityHandles {
            vertical_vane: vertical_vane.as_ref().map(VaneSelect::handle),
            horizontal_vane: horizontal_vane.as_ref().map(VaneSelect::handle),
            display: display.handle(),
            uv_light: uv_light.as_ref().map(Switch::handle),
            horizontal_swing: horizontal_swing.as_ref().map(Switch::handle),
        };

        info!(
            "{}: polling every {} ms, response timeout {} ms",
            config.name, update_interval_ms, response_timeout_ms
        );

        let ac = DaewooAc {
            device: DaewooDevice::new(uart, update_interval_ms, response_timeout_ms),
            climate,
            vertical_vane,
            horizontal_vane,
            display,
            uv_light,
            horizontal_swing,
        };
        Ok((ac, handles))
    }

    /// Runs one pass of the loop and publishes whatever the unit reported.
    /// `now_ms` is a free-running millisecond clock; it may wrap.
    pub fn tick<H: Host>(&mut self, now_ms: u32, host: &mut H) {
        if let Some(state) = self.device.tick(now_ms) {
            self.publish(&state, host);
        }
    }

    fn publish<H: Host>(&mut self, state: &DeviceState, host: &mut H) {
        self.climate.on_state_changed(state, host);
        for select in [self.vertical_vane.as_mut(), self.horizontal_vane.as_mut()].into_iter().flatten() {
            select.on_state_changed(state, host);
        }
        self.display.on_state_changed(state, host);
        for switch in [self.uv_light.as_mut(), self.horizontal_swing.as_mut()].into_iter().flatten() {
            switch.on_state_changed(state, host);
        }
    }

    pub fn control(&mut self, call: &ClimateCall) {
        let commands = self.climate.control(call);
        for &command in commands.iter() {
            self.device.enqueue(command);
        }
    }

    pub fn set_select(&mut self, handle: SelectHandle, option: &str) -> Result<(), EntityError> {
        let select = match handle.axis() {
            VaneAxis::Vertical => self.vertical_vane.as_ref(),
            VaneAxis::Horizontal => self.horizontal_vane.as_ref(),
        };
        let command = select.ok_or(EntityError::NotConfigured)?.select(option)?;
        self.device.enqueue(command);
        Ok(())
    }

    pub fn set_switch(&mut self, handle: SwitchHandle, on: bool) -> Result<(), EntityError> {
        let switch = match handle.kind() {
            SwitchKind::Display => Some(&self.display),
            SwitchKind::UvLight => self.uv_light.as_ref(),
            SwitchKind::HorizontalSwing => self.horizontal_swing.as_ref(),
        };
        let command = switch.ok_or(EntityError::NotConfigured)?.write(on);
        self.device.enqueue(command);
        Ok(())
    }

    pub fn state(&self) -> &DeviceState {
        self.device.state()
    }

    pub fn device(&self) -> &DaewooDevice<S> {
        &self.device
    }

    pub fn release(self) -> S {
        self.device.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SwitchConfig, VaneSelectConfig};
    use crate::mock::{MockSerial, Published, RecordingHost};
    use crate::protocol::types::*;
    use crate::protocol::{status_frame, COOL_24, STATUS_FRAME_LEN};

    const INTERVAL: u32 = 5000;

    fn config<'a>(serial: &MockSerial) -> DaewooConfig<'a, MockSerial> {
        let mut config = DaewooConfig::new("AC", serial.clone(), SwitchConfig::new("Display"));
        config.vertical_vane = Some(VaneSelectConfig::new("Vertical vane"));
        config.uv_light = Some(SwitchConfig {
            name: "UV light",
            entity_category: Some(EntityCategory::Config),
        });
        config
    }

    /// Sets up the component and answers its first poll with `COOL_24`.
    fn running() -> (DaewooAc<MockSerial>, EntityHandles, MockSerial, RecordingHost) {
        let serial = MockSerial::new();
        let mut host = RecordingHost::default();
        let (mut ac, handles) = DaewooAc::setup(config(&serial), &mut host).unwrap();
        ac.tick(0, &mut host);
        serial.reply(&COOL_24);
        ac.tick(10, &mut host);
        serial.take_sent();
        host.take_published();
        (ac, handles, serial, host)
    }

    #[test]
    fn setup_registers_configured_entities() {
        let serial = MockSerial::new();
        let mut host = RecordingHost::default();
        let (_, handles) = DaewooAc::setup(config(&serial), &mut host).unwrap();
        assert_eq!(host.registered, ["AC", "Vertical vane", "Display", "UV light"]);
        assert!(handles.vertical_vane.is_some());
        assert!(handles.horizontal_vane.is_none());
        assert!(handles.horizontal_swing.is_none());
    }

    #[test]
    fn bad_vane_options_register_nothing() {
        let serial = MockSerial::new();
        let mut host = RecordingHost::default();
        let mut config = config(&serial);
        let six = ["1", "2", "3", "4", "5", "6"];
        config.horizontal_vane = Some(VaneSelectConfig::new("Horizontal vane").with_options(&six));

        assert_eq!(
            DaewooAc::setup(config, &mut host).err(),
            Some(ConfigError::VaneOptionCount { vane: VaneAxis::Horizontal, count: 6 })
        );
        assert!(host.registered.is_empty());
    }

    #[test]
    fn missing_uart_and_display_are_rejected() {
        let serial = MockSerial::new();
        let mut host = RecordingHost::default();

        let mut no_uart = config(&serial);
        no_uart.uart = None;
        assert_eq!(DaewooAc::setup(no_uart, &mut host).err(), Some(ConfigError::MissingUart));

        let mut no_display = config(&serial);
        no_display.display = None;
        assert_eq!(
            DaewooAc::setup(no_display, &mut host).err(),
            Some(ConfigError::MissingDisplaySwitch)
        );
        assert!(host.registered.is_empty());
    }

    #[test]
    fn first_status_publishes_every_entity() {
        let serial = MockSerial::new();
        let mut host = RecordingHost::default();
        let (mut ac, handles) = DaewooAc::setup(config(&serial), &mut host).unwrap();
        ac.tick(0, &mut host);
        assert!(host.published.is_empty());

        serial.reply(&COOL_24);
        ac.tick(10, &mut host);
        let vertical = handles.vertical_vane.unwrap();
        assert_eq!(
            host.take_published(),
            [
                Published::Climate(ClimateState {
                    mode: Mode::Cool,
                    target_temperature: 24,
                    current_temperature: 23,
                    fan_mode: FanMode::Auto,
                    swing_mode: SwingMode::Off,
                }),
                Published::Select(vertical, "Static".into()),
                Published::Switch(handles.display, true),
                Published::Switch(handles.uv_light.unwrap(), false),
            ]
        );
    }

    #[test]
    fn set_target_temperature_end_to_end() {
        let (mut ac, _, serial, mut host) = running();

        ac.control(&ClimateCall::new().with_target_temperature(22));
        assert_eq!(ac.device().scheduler().pending(), 1);

        ac.tick(INTERVAL, &mut host);
        let sent = serial.take_sent();
        assert_eq!(sent.len(), STATUS_FRAME_LEN);
        assert_eq!(sent[10], 22);
        assert!(host.published.is_empty());

        serial.reply(&status_frame(|p| p[8] = 22));
        ac.tick(INTERVAL + 50, &mut host);
        assert_eq!(ac.state().target_temperature, 22);
        assert_eq!(ac.device().scheduler().pending(), 0);
        assert_eq!(host.last_climate().map(|c| c.target_temperature), Some(22));
    }

    #[test]
    fn uv_light_is_retried_after_timeouts() {
        let (mut ac, handles, serial, mut host) = running();
        let uv = handles.uv_light.unwrap();
        ac.set_switch(uv, true).unwrap();

        for cycle in 1..=2 {
            let now = cycle * INTERVAL;
            ac.tick(now, &mut host);
            let sent = serial.take_sent();
            assert_eq!(sent.len(), STATUS_FRAME_LEN);
            assert_eq!(sent[8] & 0x02, 0x02);
            ac.tick(now + 1000, &mut host);
            assert_eq!(ac.device().scheduler().pending(), 1);
        }

        ac.tick(3 * INTERVAL, &mut host);
        assert_eq!(serial.take_sent()[8] & 0x02, 0x02);
        serial.reply(&status_frame(|p| p[6] |= 0x02));
        ac.tick(3 * INTERVAL + 50, &mut host);
        assert_eq!(ac.device().scheduler().pending(), 0);
        assert_eq!(host.take_published(), [Published::Switch(uv, true)]);

        ac.tick(4 * INTERVAL, &mut host);
        assert_eq!(serial.take_sent(), [0xaa, 0x02, 0x01, 0xad]);
    }

    #[test]
    fn corrupted_frame_changes_nothing() {
        let (mut ac, _, serial, mut host) = running();
        let before = *ac.state();

        ac.tick(INTERVAL, &mut host);
        let mut frame = status_frame(|p| p[8] = 30);
        frame[21] ^= 0xff;
        serial.reply(&frame);
        ac.tick(INTERVAL + 50, &mut host);

        assert_eq!(*ac.state(), before);
        assert!(host.published.is_empty());
    }

    #[test]
    fn select_requests() {
        let (mut ac, handles, serial, mut host) = running();
        let vertical = handles.vertical_vane.unwrap();

        assert_eq!(ac.set_select(vertical, "Sideways"), Err(EntityError::UnknownOption));
        assert_eq!(ac.device().scheduler().pending(), 0);

        ac.set_select(vertical, "Swing").unwrap();
        ac.tick(INTERVAL, &mut host);
        assert_eq!(serial.take_sent()[5], VerticalVane::Swing as u8);
    }

    #[test]
    fn unconfigured_entities_are_rejected() {
        let serial = MockSerial::new();
        let mut full = config(&serial);
        full.horizontal_vane = Some(VaneSelectConfig::new("Horizontal vane"));
        full.horizontal_swing = Some(SwitchConfig::new("Horizontal swing"));
        let (_, full_handles) = DaewooAc::setup(full, &mut RecordingHost::default()).unwrap();

        let (mut ac, ..) = running();
        assert_eq!(
            ac.set_select(full_handles.horizontal_vane.unwrap(), "Left"),
            Err(EntityError::NotConfigured)
        );
        assert_eq!(
            ac.set_switch(full_handles.horizontal_swing.unwrap(), true),
            Err(EntityError::NotConfigured)
        );
        assert_eq!(ac.device().scheduler().pending(), 0);
    }

    #[test]
    fn category_overrides() {
        let serial = MockSerial::new();
        let mut config = config(&serial);
        config.display.as_mut().unwrap().entity_category = Some(EntityCategory::Diagnostic);

        #[derive(Default)]
        struct Categories(std::vec::Vec<Option<EntityCategory>>);
        impl Host for Categories {
            fn register(&mut self, entity: &EntityInfo<'_>) {
                self.0.push(entity.category);
            }
            fn publish_climate(&mut self, _: &ClimateState) {}
            fn publish_select(&mut self, _: SelectHandle, _: &str) {}
            fn publish_switch(&mut self, _: SwitchHandle, _: bool) {}
        }

        let mut host = Categories::default();
        DaewooAc::setup(config, &mut host).unwrap();
        // climate, vertical vane, display, UV light
        assert_eq!(host.0, [None, None, None, None]);
    }
}
