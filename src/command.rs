use crate::protocol::types::{FanMode, HorizontalVane, Mode, SwingMode, VerticalVane};

/// An outbound change requested by an entity. Commands are queued by the entity
/// adapters and turned into write frames by the scheduler, one per cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    SetMode(Mode),
    /// Degrees Celsius. Clamped to the unit's range when encoded.
    SetTargetTemperature(u8),
    SetFanMode(FanMode),
    SetSwingMode(SwingMode),
    SetVerticalVane(VerticalVane),
    SetHorizontalVane(HorizontalVane),
    SetDisplay(bool),
    SetUvLight(bool),
    SetHorizontalSwing(bool),
}
