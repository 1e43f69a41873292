//! Bring-up state reported by the device

use std::fmt;

use bytes::Bytes;

/// Serial values the device reports before it has been read
const UNINITIALIZED: [&str; 3] = ["", "Uninitialized", "0"];

/// Device serial number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Serial {
    /// Not read yet (or reported as a placeholder)
    #[default]
    Uninitialized,

    /// Serial as reported by the device
    Known(String),
}

impl Serial {
    /// Parse a reported serial, mapping placeholders to [`Serial::Uninitialized`]
    ///
    /// # Examples
    ///
    /// ```
    /// use petkit_types::Serial;
    ///
    /// assert_eq!(Serial::parse("0"), Serial::Uninitialized);
    /// assert!(Serial::parse("W5C2401").is_known());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_matches(char::from(0)).trim();
        if UNINITIALIZED.iter().any(|s| *s == trimmed) {
            Self::Uninitialized
        } else {
            Self::Known(trimmed.to_string())
        }
    }

    /// Check if the serial has been read
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Known(serial) => Some(serial),
            Self::Uninitialized => None,
        }
    }
}

impl From<&str> for Serial {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Serial {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(serial) => f.write_str(serial),
            Self::Uninitialized => f.write_str("Uninitialized"),
        }
    }
}

/// Identity and readiness facts gathered during bring-up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BringUpState {
    /// Raw device id from the device-details reply
    pub device_id: Option<Bytes>,

    /// Device serial
    pub serial: Serial,

    /// Device reports it accepted the host
    pub device_initialized: bool,
}

impl BringUpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the device id is known
    pub fn identity_known(&self) -> bool {
        self.device_id.as_ref().is_some_and(|id| !id.is_empty())
    }
}

impl fmt::Display for BringUpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .device_id
            .as_ref()
            .map(|id| format!("{:02X?}", id.as_ref()))
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "BringUp[id: {}, SN: {}, initialized: {}]",
            id, self.serial, self.device_initialized
        )
    }
}
