use super::encoding::*;

pub const MIN_TARGET_TEMPERATURE: u8 = 16;
pub const MAX_TARGET_TEMPERATURE: u8 = 32;

pub const MIN_CURRENT_TEMPERATURE: u8 = 10;
pub const MAX_CURRENT_TEMPERATURE: u8 = 40;

/// Number of discrete positions each vane can take.
pub const VANE_POSITIONS: usize = 7;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Off,
    Auto,
    Cool,
    Dry,
    Heat,
    Fan,
}

impl Mode {
    pub const ALL: [Mode; 6] = [Mode::Off, Mode::Cool, Mode::Heat, Mode::Dry, Mode::Fan, Mode::Auto];

    /// Power byte followed by mode byte. `Off` only clears the power byte.
    pub(crate) fn from_bytes(power: u8, mode: u8) -> Option<Self> {
        match (power, mode) {
            (0x00, _) => Some(Mode::Off),
            (0x01, 0x00) => Some(Mode::Auto),
            (0x01, 0x01) => Some(Mode::Cool),
            (0x01, 0x02) => Some(Mode::Dry),
            (0x01, 0x03) => Some(Mode::Heat),
            (0x01, 0x04) => Some(Mode::Fan),
            _ => None,
        }
    }

    pub(crate) fn mode_byte(&self) -> Option<u8> {
        match self {
            Mode::Off => None,
            Mode::Auto => Some(0x00),
            Mode::Cool => Some(0x01),
            Mode::Dry => Some(0x02),
            Mode::Heat => Some(0x03),
            Mode::Fan => Some(0x04),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FanMode {
    Auto = 0x00,
    Low = 0x01,
    Medium = 0x02,
    High = 0x03,
    /// Not a fan byte of its own: auto speed with the quiet flag set.
    Quiet = 0xff,
}

impl FanMode {
    pub const ALL: [FanMode; 5] = [FanMode::Auto, FanMode::Low, FanMode::Medium, FanMode::High, FanMode::Quiet];

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(FanMode::Auto),
            0x01 => Some(FanMode::Low),
            0x02 => Some(FanMode::Medium),
            0x03 => Some(FanMode::High),
            _ => None,
        }
    }
}

impl OneByteEncodable for FanMode {
    fn encoded_as_byte(&self) -> u8 {
        match self {
            FanMode::Quiet => FanMode::Auto as u8,
            other => *other as u8,
        }
    }
}

/// Vertical louver. Discriminants are the wire values, which run bottom to top;
/// `index()` gives the position in the select's option list, which runs top to bottom.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VerticalVane {
    Swing = 0x00,
    Down = 0x01,
    MediumDown = 0x02,
    Medium = 0x03,
    UpMedium = 0x04,
    Up = 0x05,
    Static = 0x06,
}

impl VerticalVane {
    pub const ALL: [VerticalVane; VANE_POSITIONS] = [
        VerticalVane::Swing,
        VerticalVane::Up,
        VerticalVane::UpMedium,
        VerticalVane::Medium,
        VerticalVane::MediumDown,
        VerticalVane::Down,
        VerticalVane::Static,
    ];

    pub const DEFAULT_LABELS: [&'static str; VANE_POSITIONS] =
        ["Swing", "Up", "Up & Medium", "Medium", "Medium & Down", "Down", "Static"];

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| *v as u8 == byte)
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(VANE_POSITIONS - 1)
    }
}

impl OneByteEncodable for VerticalVane {
    fn encoded_as_byte(&self) -> u8 {
        *self as u8
    }
}

/// Horizontal louver. Wire values follow the option list order.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HorizontalVane {
    Swing = 0x00,
    Left = 0x01,
    LeftCenter = 0x02,
    Center = 0x03,
    CenterRight = 0x04,
    Right = 0x05,
    Static = 0x06,
}

impl HorizontalVane {
    pub const ALL: [HorizontalVane; VANE_POSITIONS] = [
        HorizontalVane::Swing,
        HorizontalVane::Left,
        HorizontalVane::LeftCenter,
        HorizontalVane::Center,
        HorizontalVane::CenterRight,
        HorizontalVane::Right,
        HorizontalVane::Static,
    ];

    pub const DEFAULT_LABELS: [&'static str; VANE_POSITIONS] =
        ["Swing", "Left", "Left & Center", "Center", "Center & Right", "Right", "Static"];

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl OneByteEncodable for HorizontalVane {
    fn encoded_as_byte(&self) -> u8 {
        *self as u8
    }
}

/// Climate-level swing, derived from the vertical vane and the horizontal swing flag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SwingMode {
    Off,
    Both,
    Vertical,
    Horizontal,
}

impl SwingMode {
    pub const ALL: [SwingMode; 4] = [SwingMode::Off, SwingMode::Both, SwingMode::Vertical, SwingMode::Horizontal];

    pub fn from_parts(vertical: VerticalVane, horizontal_swing: bool) -> Self {
        match (vertical == VerticalVane::Swing, horizontal_swing) {
            (true, true) => SwingMode::Both,
            (true, false) => SwingMode::Vertical,
            (false, true) => SwingMode::Horizontal,
            (false, false) => SwingMode::Off,
        }
    }
}
