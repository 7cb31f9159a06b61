//! Register map and codec for the VG gripper family.
//!
//! The gripper exposes a tiny holding-register map behind unit id 65:
//!
//! | Address | Meaning                                  | Access |
//! |---------|------------------------------------------|--------|
//! | 0       | Channel A control (`mode << 8 \| target`) | write  |
//! | 1       | Channel B control                        | write  |
//! | 2       | Vacuum current limit (mA)                | read   |
//! | 258     | Channel A vacuum (1/1000 relative)       | read   |
//! | 259     | Channel B vacuum                         | read   |
//!
//! Everything in this module is pure: encode/decode functions map
//! gripper-level concepts to raw 16-bit register values and back, with no
//! I/O and no state. Addresses and the unit id are protocol constants, not
//! configuration.

use std::fmt;

// ============================================================================
// Protocol constants
// ============================================================================

/// Modbus unit id of the VG gripper family.
pub const VG_UNIT_ID: u8 = 65;

/// Channel A control register.
pub const REG_CONTROL_A: u16 = 0;

/// Channel B control register.
pub const REG_CONTROL_B: u16 = 1;

/// Vacuum current limit register (milliamperes).
pub const REG_VACUUM_LIMIT: u16 = 2;

/// Channel A actual vacuum register (1/1000 of relative vacuum).
pub const REG_VACUUM_A: u16 = 258;

/// Channel B actual vacuum register.
pub const REG_VACUUM_B: u16 = 259;

/// Highest target vacuum the device should ever be commanded to, in
/// percent. The low byte of the control register can represent up to 255;
/// commanding above this ceiling is a caller contract violation, not a
/// codec error.
pub const MAX_TARGET_VACUUM: u8 = 80;

/// Full-scale grip target (100 % vacuum), used by the all-channel grip
/// commands.
pub const FULL_VACUUM: u8 = 0xFF;

// ============================================================================
// Control mode
// ============================================================================

/// Control mode field of a channel control register (bits 15-8).
///
/// | Value | Name    | Effect                                              |
/// |-------|---------|-----------------------------------------------------|
/// | 0x00  | Release | Release the work item, stop the pump if unneeded    |
/// | 0x01  | Grip    | Build up and maintain the target vacuum             |
/// | 0x02  | Idle    | Neither release nor grip (slightly lower power)     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlMode {
    Release = 0x00,
    Grip = 0x01,
    Idle = 0x02,
}

impl ControlMode {
    /// Numeric value of the mode field.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a mode field value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Release),
            0x01 => Some(Self::Grip),
            0x02 => Some(Self::Idle),
            _ => None,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => write!(f, "Release"),
            Self::Grip => write!(f, "Grip"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

// ============================================================================
// Channels and models
// ============================================================================

/// A suction channel on the gripper.
///
/// Dual-channel models expose A and B; single-channel models expose only A.
/// Larger variants present further channels at consecutive register
/// offsets, modeled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    A,
    B,
}

impl ChannelId {
    /// Control register address for this channel.
    pub fn control_address(self) -> u16 {
        match self {
            Self::A => REG_CONTROL_A,
            Self::B => REG_CONTROL_B,
        }
    }

    /// Actual-vacuum telemetry register address for this channel.
    pub fn vacuum_address(self) -> u16 {
        match self {
            Self::A => REG_VACUUM_A,
            Self::B => REG_VACUUM_B,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Gripper model, determining how many channels are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GripperModel {
    /// Dual-channel VG10.
    Vg10,
    /// Single-channel VGC10.
    Vgc10,
}

impl GripperModel {
    /// The channels present on this model, in register order.
    pub fn channels(self) -> &'static [ChannelId] {
        match self {
            Self::Vg10 => &[ChannelId::A, ChannelId::B],
            Self::Vgc10 => &[ChannelId::A],
        }
    }

    /// Number of channels on this model.
    pub fn channel_count(self) -> usize {
        self.channels().len()
    }

    /// Whether this model exposes the given channel.
    pub fn has_channel(self, channel: ChannelId) -> bool {
        self.channels().contains(&channel)
    }
}

// ============================================================================
// Encode / decode
// ============================================================================

/// Encode a channel control register value.
///
/// The register is split into two 8-bit fields: the control mode in bits
/// 15-8 and the target vacuum (percent) in bits 7-0. The device uses the
/// target field only when the mode is [`ControlMode::Grip`], but the codec
/// encodes whatever target is supplied.
///
/// # Example
///
/// ```rust
/// use onrobot_vg::registers::{encode_control, ControlMode};
///
/// // Grip at 20 % vacuum
/// assert_eq!(encode_control(ControlMode::Grip, 0x14), 0x0114);
/// // Release
/// assert_eq!(encode_control(ControlMode::Release, 0), 0x0000);
/// ```
pub fn encode_control(mode: ControlMode, target: u8) -> u16 {
    (mode.to_u8() as u16) << 8 | target as u16
}

/// Decode the vacuum current limit register.
///
/// The register already carries milliamperes, so this is the identity.
pub fn decode_vacuum_limit(raw: u16) -> u16 {
    raw
}

/// Decode an actual-vacuum telemetry register.
///
/// The register already carries 1/1000 of relative vacuum (finer than the
/// percent setpoint), so this is the identity.
pub fn decode_vacuum_level(raw: u16) -> u16 {
    raw
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_register_map() {
        assert_eq!(VG_UNIT_ID, 65);
        assert_eq!(REG_CONTROL_A, 0);
        assert_eq!(REG_CONTROL_B, 1);
        assert_eq!(REG_VACUUM_LIMIT, 2);
        assert_eq!(REG_VACUUM_A, 258);
        assert_eq!(REG_VACUUM_B, 259);
    }

    #[test]
    fn test_channel_addresses() {
        assert_eq!(ChannelId::A.control_address(), 0);
        assert_eq!(ChannelId::B.control_address(), 1);
        assert_eq!(ChannelId::A.vacuum_address(), 258);
        assert_eq!(ChannelId::B.vacuum_address(), 259);
    }

    #[test]
    fn test_encode_control_documented_examples() {
        // The values documented in the device manual.
        assert_eq!(encode_control(ControlMode::Release, 0x00), 0x0000);
        assert_eq!(encode_control(ControlMode::Grip, 0x14), 0x0114); // 20 %
        assert_eq!(encode_control(ControlMode::Grip, 0x28), 0x0128); // 40 %
        assert_eq!(encode_control(ControlMode::Grip, 0x4B), 0x014B); // 75 %
        assert_eq!(encode_control(ControlMode::Idle, 0x00), 0x0200);
    }

    #[test]
    fn test_encode_control_full_vacuum() {
        assert_eq!(encode_control(ControlMode::Grip, FULL_VACUUM), 0x01FF);
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [ControlMode::Release, ControlMode::Grip, ControlMode::Idle] {
            assert_eq!(ControlMode::from_u8(mode.to_u8()), Some(mode));
        }
        assert_eq!(ControlMode::from_u8(0x03), None);
        assert_eq!(ControlMode::from_u8(0xFF), None);
    }

    #[test]
    fn test_model_channels() {
        assert_eq!(GripperModel::Vg10.channel_count(), 2);
        assert_eq!(GripperModel::Vgc10.channel_count(), 1);
        assert!(GripperModel::Vg10.has_channel(ChannelId::B));
        assert!(!GripperModel::Vgc10.has_channel(ChannelId::B));
        assert!(GripperModel::Vgc10.has_channel(ChannelId::A));
    }

    proptest! {
        #[test]
        fn encode_control_matches_bitfield(
            mode in prop::sample::select(vec![
                ControlMode::Release,
                ControlMode::Grip,
                ControlMode::Idle,
            ]),
            target in any::<u8>(),
        ) {
            let encoded = encode_control(mode, target);
            prop_assert_eq!(encoded, (mode.to_u8() as u16) << 8 | target as u16);
            // Low byte is the target, high byte is the mode.
            prop_assert_eq!(encoded & 0x00FF, target as u16);
            prop_assert_eq!(encoded >> 8, mode.to_u8() as u16);
        }

        #[test]
        fn telemetry_decode_is_identity(raw in any::<u16>()) {
            prop_assert_eq!(decode_vacuum_limit(raw), raw);
            prop_assert_eq!(decode_vacuum_level(raw), raw);
        }
    }
}
