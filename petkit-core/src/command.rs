//! Petkit BLE command definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// These ids are the contract with the appliance firmware and must not change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Bring-up
    GetBattery = 66,
    InitDevice = 73,
    SetDateTime = 84,
    SyncSecret = 86,

    // Device information
    GetDeviceInfo = 200,
    GetDeviceType = 201,
    GetDeviceState = 210,
    GetDeviceConfig = 211,
    GetDeviceDetails = 213,

    // Settings
    SetLight = 215,
    SetDnd = 216,
    SetMode = 220,
    SetDeviceConfig = 221,
    ResetFilter = 222,
    UpdateLight = 225,
    UpdateDnd = 226,

    // Update trigger
    RequestUpdate = 230,
}

/// Frame type discriminator
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Standard write
    Write = 1,

    /// Update trigger
    Update = 2,
}

impl Command {
    /// All commands, in id order.
    pub const ALL: [Command; 17] = [
        Self::GetBattery,
        Self::InitDevice,
        Self::SetDateTime,
        Self::SyncSecret,
        Self::GetDeviceInfo,
        Self::GetDeviceType,
        Self::GetDeviceState,
        Self::GetDeviceConfig,
        Self::GetDeviceDetails,
        Self::SetLight,
        Self::SetDnd,
        Self::SetMode,
        Self::SetDeviceConfig,
        Self::ResetFilter,
        Self::UpdateLight,
        Self::UpdateDnd,
        Self::RequestUpdate,
    ];

    /// Raw command id
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Frame type this command is sent with
    pub fn frame_type(self) -> FrameType {
        match self {
            Self::RequestUpdate => FrameType::Update,
            _ => FrameType::Write,
        }
    }

    /// Check if this command changes device-visible state
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::SetLight
                | Self::SetDnd
                | Self::SetMode
                | Self::SetDeviceConfig
                | Self::ResetFilter
                | Self::UpdateLight
                | Self::UpdateDnd
        )
    }

    /// Check if this command belongs to the bring-up handshake
    pub fn is_handshake(self) -> bool {
        matches!(
            self,
            Self::InitDevice | Self::SyncSecret | Self::SetDateTime | Self::GetDeviceDetails
        )
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::GetBattery => "GET_BATTERY",
            Self::InitDevice => "INIT_DEVICE",
            Self::SetDateTime => "SET_DATETIME",
            Self::SyncSecret => "SYNC_SECRET",
            Self::GetDeviceInfo => "GET_DEVICE_INFO",
            Self::GetDeviceType => "GET_DEVICE_TYPE",
            Self::GetDeviceState => "GET_DEVICE_STATE",
            Self::GetDeviceConfig => "GET_DEVICE_CONFIG",
            Self::GetDeviceDetails => "GET_DEVICE_DETAILS",
            Self::SetLight => "SET_LIGHT",
            Self::SetDnd => "SET_DND",
            Self::SetMode => "SET_MODE",
            Self::SetDeviceConfig => "SET_DEVICE_CONFIG",
            Self::ResetFilter => "RESET_FILTER",
            Self::UpdateLight => "UPDATE_LIGHT",
            Self::UpdateDnd => "UPDATE_DND",
            Self::RequestUpdate => "REQUEST_UPDATE",
        }
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for Command {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.id() == value)
            .ok_or(Error::UnknownCommand(value))
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> u8 {
        frame_type as u8
    }
}

impl TryFrom<u8> for FrameType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Write),
            2 => Ok(Self::Update),
            _ => Err(Error::UnknownFrameType(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!(u16::from(Command::GetBattery), 66);
        assert_eq!(Command::try_from(213).unwrap(), Command::GetDeviceDetails);
    }

    #[test]
    fn test_command_table_ids() {
        let ids: Vec<u16> = Command::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![66, 73, 84, 86, 200, 201, 210, 211, 213, 215, 216, 220, 221, 222, 225, 226, 230]
        );
    }

    #[test]
    fn test_frame_types() {
        assert_eq!(Command::RequestUpdate.frame_type(), FrameType::Update);
        for cmd in Command::ALL.iter().filter(|c| **c != Command::RequestUpdate) {
            assert_eq!(cmd.frame_type(), FrameType::Write, "{cmd}");
        }
        assert_eq!(u8::from(FrameType::Update), 2);
    }

    #[test]
    fn test_command_is_mutating() {
        assert!(Command::SetLight.is_mutating());
        assert!(Command::ResetFilter.is_mutating());
        assert!(!Command::GetBattery.is_mutating());
        assert!(!Command::RequestUpdate.is_mutating());
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(Command::try_from(9999), Err(Error::UnknownCommand(9999))));
        assert!(FrameType::try_from(7).is_err());
    }
}
