//! Command frames and the frame encoder contract

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

use crate::{
    command::{Command, FrameType},
    error::{Error, Result},
};

/// Turns a logical frame into transport-ready bytes
///
/// The wire layout must stay byte-compatible with the appliance firmware.
/// [`PetkitFrameCodec`] is the default implementation.
pub trait FrameEncoder: Send + Sync {
    /// Encode `(sequence, command_id, frame_type, payload)` into one frame
    fn encode(&self, sequence: u8, command_id: u16, frame_type: u8, payload: &[u8]) -> Result<Bytes>;
}

/// Logical command frame
#[derive(Clone, PartialEq, Eq)]
pub struct CommandFrame {
    /// Sequence number assigned by the session
    pub sequence: u8,

    /// Raw command id
    pub command_id: u16,

    /// Frame type discriminator
    pub frame_type: u8,

    /// Command-specific payload
    pub payload: Bytes,
}

impl CommandFrame {
    /// Create a frame for a known command
    ///
    /// # Examples
    ///
    /// ```
    /// use petkit_core::{Command, CommandFrame};
    ///
    /// let frame = CommandFrame::new(7, Command::SetLight, vec![1]);
    /// assert_eq!(frame.command_id, 215);
    /// assert_eq!(frame.frame_type, 1);
    /// ```
    pub fn new(sequence: u8, command: Command, payload: impl Into<Bytes>) -> Self {
        Self {
            sequence,
            command_id: command.id(),
            frame_type: command.frame_type().into(),
            payload: payload.into(),
        }
    }

    /// Resolve the command id against the command table
    pub fn command(&self) -> Result<Command> {
        Command::try_from(self.command_id)
    }

    /// Resolve the frame type
    pub fn kind(&self) -> Result<FrameType> {
        FrameType::try_from(self.frame_type)
    }

    /// Encode through `encoder`
    pub fn encode_with(&self, encoder: &dyn FrameEncoder) -> Result<Bytes> {
        encoder.encode(self.sequence, self.command_id, self.frame_type, &self.payload)
    }
}

impl fmt::Debug for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandFrame")
            .field("sequence", &self.sequence)
            .field("command_id", &self.command_id)
            .field("frame_type", &self.frame_type)
            .field("payload", &hex::encode(&self.payload))
            .finish()
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            Ok(cmd) => write!(f, "Frame[{}](seq={}, len={})", cmd, self.sequence, self.payload.len()),
            Err(_) => write!(
                f,
                "Frame[{}](seq={}, len={})",
                self.command_id,
                self.sequence,
                self.payload.len()
            ),
        }
    }
}

/// Default Petkit frame envelope
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬─────────┬────────┬─────────┬────────┬──────┬─────────┬──────┐
/// │  Start   │ Command │  Type  │   Seq   │ Length │ Pad  │ Payload │ End  │
/// │ FA FC FD │ 1 byte  │ 1 byte │ 1 byte  │ 1 byte │  00  │ N bytes │  FB  │
/// └──────────┴─────────┴────────┴─────────┴────────┴──────┴─────────┴──────┘
/// ```
///
/// # Examples
///
/// ```
/// use petkit_core::{FrameEncoder, PetkitFrameCodec};
///
/// let bytes = PetkitFrameCodec.encode(3, 215, 1, &[1]).unwrap();
/// assert_eq!(&bytes[..], &[0xFA, 0xFC, 0xFD, 215, 1, 3, 1, 0, 1, 0xFB]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PetkitFrameCodec;

impl PetkitFrameCodec {
    /// Start marker
    pub const START: [u8; 3] = [0xFA, 0xFC, 0xFD];

    /// End marker
    pub const END: u8 = 0xFB;

    /// Bytes before the payload
    pub const HEADER_SIZE: usize = 8;

    /// Envelope overhead (header + end marker)
    pub const OVERHEAD: usize = Self::HEADER_SIZE + 1;

    /// Maximum payload size
    pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

    /// Decode one frame
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than the envelope
    /// - Start or end marker is wrong
    /// - Length byte disagrees with the buffer size
    pub fn decode(&self, mut buf: Bytes) -> Result<CommandFrame> {
        if buf.len() < Self::OVERHEAD {
            return Err(Error::FrameTooShort {
                expected: Self::OVERHEAD,
                actual: buf.len(),
            });
        }

        if buf[..3] != Self::START {
            return Err(Error::InvalidMarker(format!("start {:02X?}", &buf[..3])));
        }
        if buf[buf.len() - 1] != Self::END {
            return Err(Error::InvalidMarker(format!("end {:02X}", buf[buf.len() - 1])));
        }

        buf.advance(3);
        let command_id = buf.get_u8() as u16;
        let frame_type = buf.get_u8();
        let sequence = buf.get_u8();
        let declared = buf.get_u8() as usize;
        buf.advance(1);

        let actual = buf.len() - 1;
        if declared != actual {
            return Err(Error::LengthMismatch { declared, actual });
        }

        Ok(CommandFrame {
            sequence,
            command_id,
            frame_type,
            payload: buf.slice(..actual),
        })
    }
}

impl FrameEncoder for PetkitFrameCodec {
    fn encode(&self, sequence: u8, command_id: u16, frame_type: u8, payload: &[u8]) -> Result<Bytes> {
        let command = u8::try_from(command_id).map_err(|_| Error::CommandIdOutOfRange(command_id))?;
        if payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(Self::OVERHEAD + payload.len());
        buf.put_slice(&Self::START);
        buf.put_u8(command);
        buf.put_u8(frame_type);
        buf.put_u8(sequence);
        buf.put_u8(payload.len() as u8);
        buf.put_u8(0);
        buf.put_slice(payload);
        buf.put_u8(Self::END);

        trace!(
            command = command_id,
            sequence = sequence,
            frame = %hex::encode(&buf),
            "Encoded frame"
        );

        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_empty_payload() {
        let bytes = PetkitFrameCodec.encode(0, 200, 1, &[]).unwrap();
        assert_eq!(&bytes[..], &[0xFA, 0xFC, 0xFD, 200, 1, 0, 0, 0, 0xFB]);
    }

    #[test]
    fn test_encode_decode() {
        let original = CommandFrame::new(42, Command::SetMode, vec![1, 2]);
        let encoded = original.encode_with(&PetkitFrameCodec).unwrap();
        let decoded = PetkitFrameCodec.decode(encoded).unwrap();

        assert_eq!(original, decoded);
        assert_eq!(decoded.command().unwrap(), Command::SetMode);
        assert_eq!(decoded.kind().unwrap(), FrameType::Write);
    }

    #[test]
    fn test_update_frame_type_on_wire() {
        let frame = CommandFrame::new(9, Command::RequestUpdate, vec![1]);
        let encoded = frame.encode_with(&PetkitFrameCodec).unwrap();
        assert_eq!(encoded[4], 2);
    }

    #[test]
    fn test_encode_rejects_wide_command() {
        let result = PetkitFrameCodec.encode(0, 300, 1, &[]);
        assert!(matches!(result, Err(Error::CommandIdOutOfRange(300))));
    }

    #[test]
    fn test_encode_rejects_large_payload() {
        let result = PetkitFrameCodec.encode(0, 221, 1, &[0; 256]);
        assert!(matches!(result, Err(Error::PayloadTooLarge { size: 256, .. })));
    }

    #[test]
    fn test_decode_too_short() {
        let result = PetkitFrameCodec.decode(Bytes::from_static(&[0xFA, 0xFC]));
        assert!(matches!(result, Err(Error::FrameTooShort { .. })));
    }

    #[test]
    fn test_decode_bad_markers() {
        let mut raw = PetkitFrameCodec.encode(1, 66, 1, &[0, 0]).unwrap().to_vec();
        let last = raw.len() - 1;
        raw[last] = 0x00;
        let result = PetkitFrameCodec.decode(Bytes::from(raw.clone()));
        assert!(matches!(result, Err(Error::InvalidMarker(_))));

        raw[last] = PetkitFrameCodec::END;
        raw[0] = 0x00;
        let result = PetkitFrameCodec.decode(Bytes::from(raw));
        assert!(result.unwrap_err().is_malformed_frame());
    }

    #[test]
    fn test_decode_length_mismatch() {
        let mut raw = PetkitFrameCodec.encode(1, 66, 1, &[0, 0]).unwrap().to_vec();
        raw[6] = 5;
        let result = PetkitFrameCodec.decode(Bytes::from(raw));
        assert!(matches!(
            result,
            Err(Error::LengthMismatch { declared: 5, actual: 2 })
        ));
    }
}
