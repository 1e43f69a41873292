//! Date/time payload for `SET_DATETIME`

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Local, NaiveDate, Offset, TimeZone};

/// Encode a wall-clock time for the device
///
/// Layout: seconds since 2000-01-01T00:00:00 in the time's own zone
/// (4 bytes, big-endian), then the UTC offset in whole hours plus 12.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use petkit_core::timestamp;
///
/// let tz = FixedOffset::east_opt(3 * 3600).unwrap();
/// let time = tz.with_ymd_and_hms(2000, 1, 1, 0, 1, 0).unwrap();
/// assert_eq!(&timestamp::encode(&time)[..], &[0, 0, 0, 60, 15]);
/// ```
pub fn encode<Tz: TimeZone>(time: &DateTime<Tz>) -> Bytes {
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let elapsed = (time.naive_local() - epoch).num_seconds().clamp(0, u32::MAX as i64) as u32;

    let offset_hours = time.offset().fix().local_minus_utc() / 3600;
    let zone = (offset_hours + 12).clamp(0, u8::MAX as i32) as u8;

    let mut buf = BytesMut::with_capacity(5);
    buf.put_u32(elapsed);
    buf.put_u8(zone);
    buf.freeze()
}

/// Encode the current local time
pub fn now() -> Bytes {
    encode(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_encode_epoch_utc() {
        let time = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(&encode(&time)[..], &[0, 0, 0, 0, 12]);
    }

    #[test]
    fn test_encode_uses_local_wall_clock() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let time = tz.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let bytes = encode(&time);
        assert_eq!(&bytes[..4], &86_400u32.to_be_bytes());
        assert_eq!(bytes[4], 7);
    }

    #[test]
    fn test_encode_before_epoch_clamps() {
        let time = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(&encode(&time)[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_now_has_fixed_width() {
        assert_eq!(now().len(), 5);
    }
}
