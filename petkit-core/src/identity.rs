//! Device identity derivation
//!
//! The appliance authenticates the host with two 8-byte blocks built from the
//! raw device id it reports: the id itself, zero-padded, and a secret derived
//! by reversing the id bytes.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};

/// Width of the padded device id and the derived secret
pub const IDENTITY_WIDTH: usize = 8;

/// Substituted for a trailing `00 00` pair in the reversed id
pub const SECRET_PLACEHOLDER: [u8; 2] = [13, 37];

/// Identity material for one discovered device
///
/// Immutable once derived.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    raw: Bytes,
    device_id: [u8; IDENTITY_WIDTH],
    secret: [u8; IDENTITY_WIDTH],
}

impl DeviceIdentity {
    /// Derive identity from the raw device id bytes
    ///
    /// # Algorithm
    ///
    /// 1. `device_id` = raw bytes right-padded with zeros to 8 bytes
    /// 2. Reverse the raw bytes
    /// 3. If the last two reversed bytes are both zero, replace them with [`SECRET_PLACEHOLDER`]
    /// 4. `secret` = result right-padded with zeros to 8 bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentityLength`] when `raw` is empty or longer than 8 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use petkit_core::DeviceIdentity;
    ///
    /// let identity = DeviceIdentity::derive(&[0x00, 0x00, 0x12, 0x34]).unwrap();
    /// assert_eq!(identity.device_id(), &[0x00, 0x00, 0x12, 0x34, 0, 0, 0, 0]);
    /// assert_eq!(identity.secret(), &[0x34, 0x12, 13, 37, 0, 0, 0, 0]);
    /// ```
    pub fn derive(raw: &[u8]) -> Result<Self> {
        if raw.is_empty() || raw.len() > IDENTITY_WIDTH {
            return Err(Error::InvalidIdentityLength {
                max: IDENTITY_WIDTH,
                actual: raw.len(),
            });
        }

        let mut device_id = [0u8; IDENTITY_WIDTH];
        device_id[..raw.len()].copy_from_slice(raw);

        let mut reversed: Vec<u8> = raw.iter().rev().copied().collect();
        let n = reversed.len();
        if n >= 2 && reversed[n - 2] == 0 && reversed[n - 1] == 0 {
            reversed[n - 2..].copy_from_slice(&SECRET_PLACEHOLDER);
        }

        let mut secret = [0u8; IDENTITY_WIDTH];
        secret[..n].copy_from_slice(&reversed);

        Ok(Self {
            raw: Bytes::copy_from_slice(raw),
            device_id,
            secret,
        })
    }

    /// Raw id bytes as reported by the device
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Zero-padded device id
    pub fn device_id(&self) -> &[u8; IDENTITY_WIDTH] {
        &self.device_id
    }

    /// Derived secret
    pub fn secret(&self) -> &[u8; IDENTITY_WIDTH] {
        &self.secret
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("raw", &hex::encode(&self.raw))
            .field("device_id", &hex::encode(self.device_id))
            .field("secret", &hex::encode(self.secret))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_derive_pads_device_id() {
        let identity = DeviceIdentity::derive(&[1, 2, 3]).unwrap();
        assert_eq!(identity.device_id(), &[1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(identity.secret(), &[3, 2, 1, 0, 0, 0, 0, 0]);
        assert_eq!(identity.raw(), &[1, 2, 3]);
    }

    #[test]
    fn test_derive_replaces_trailing_zero_pair() {
        let identity = DeviceIdentity::derive(&[0, 0, 0xAB, 0xCD, 0xEF, 0x01]).unwrap();
        assert_eq!(identity.secret(), &[0x01, 0xEF, 0xCD, 0xAB, 13, 37, 0, 0]);
    }

    #[test]
    fn test_derive_single_zero_not_replaced() {
        // Only one trailing zero after reversal
        let identity = DeviceIdentity::derive(&[0, 5, 6]).unwrap();
        assert_eq!(identity.secret(), &[6, 5, 0, 0, 0, 0, 0, 0]);

        let identity = DeviceIdentity::derive(&[0]).unwrap();
        assert_eq!(identity.secret(), &[0; 8]);
    }

    #[test]
    fn test_derive_full_width() {
        let raw = [1, 2, 3, 4, 5, 6, 7, 8];
        let identity = DeviceIdentity::derive(&raw).unwrap();
        assert_eq!(identity.device_id(), &raw);
        assert_eq!(identity.secret(), &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_derive_rejects_bad_length() {
        assert!(matches!(
            DeviceIdentity::derive(&[]),
            Err(Error::InvalidIdentityLength { actual: 0, .. })
        ));
        assert!(matches!(
            DeviceIdentity::derive(&[1; 9]),
            Err(Error::InvalidIdentityLength { actual: 9, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_derive_is_deterministic(raw in proptest::collection::vec(any::<u8>(), 1..=8)) {
            let a = DeviceIdentity::derive(&raw).unwrap();
            let b = DeviceIdentity::derive(&raw).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.device_id().len(), IDENTITY_WIDTH);
            prop_assert_eq!(a.secret().len(), IDENTITY_WIDTH);
            prop_assert_eq!(&a.device_id()[..raw.len()], raw.as_slice());
        }
    }
}
