//! Blob codec
//!
//! Bincode encoding for stored objects, plus the checksummed frame the file
//! store writes around each blob.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                        │
//! │   Magic: "FTBL" (4) | Version: u16 (2) | Len: u64 (8)    │
//! ├──────────────────────────────────────────────────────────┤
//! │ Payload (Len bytes, bincode)                             │
//! ├──────────────────────────────────────────────────────────┤
//! │ Footer (4 bytes)                                         │
//! │   PayloadCRC: u32                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FileTableError, Result};

/// Magic bytes identifying a FileTable blob file
pub const MAGIC: &[u8; 4] = b"FTBL";

/// Current frame format version
pub const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + PayloadLen (8) = 14 bytes
pub const HEADER_SIZE: usize = 14;

/// Footer size: PayloadCRC (4)
pub const FOOTER_SIZE: usize = 4;

/// Serialize a value to a blob
pub fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(bincode::serialize(value)?))
}

/// Deserialize a value from a blob
pub fn decode<T: DeserializeOwned>(blob: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(blob)?)
}

/// Wrap a payload in header and CRC footer
pub fn encode_framed(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len() + FOOTER_SIZE);
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u64_le(payload.len() as u64);
    buf.put_slice(payload);
    buf.put_u32_le(crc32fast::hash(payload));
    buf.freeze()
}

/// Validate a frame and return its payload
pub fn decode_framed(frame: Bytes) -> Result<Bytes> {
    if frame.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(FileTableError::Corruption(format!(
            "Frame too short: {} bytes (min {})",
            frame.len(),
            HEADER_SIZE + FOOTER_SIZE
        )));
    }

    if &frame[0..4] != MAGIC {
        return Err(FileTableError::Corruption(format!(
            "Invalid magic: expected FTBL, got {:?}",
            &frame[0..4]
        )));
    }

    let version = u16::from_le_bytes([frame[4], frame[5]]);
    if version != VERSION {
        return Err(FileTableError::Corruption(format!(
            "Unsupported frame version: {}",
            version
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&frame[6..HEADER_SIZE]);
    let declared_len = u64::from_le_bytes(len_bytes);

    // The declared length is untrusted; compare it against what the frame holds
    let payload_len = frame.len() - HEADER_SIZE - FOOTER_SIZE;
    if declared_len != payload_len as u64 {
        return Err(FileTableError::Corruption(format!(
            "Frame length mismatch: header declares {} payload bytes, frame holds {}",
            declared_len, payload_len
        )));
    }

    let payload_end = HEADER_SIZE + payload_len;
    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&frame[payload_end..]);
    let stored_crc = u32::from_le_bytes(crc_bytes);

    let payload = frame.slice(HEADER_SIZE..payload_end);
    let actual_crc = crc32fast::hash(&payload);
    if stored_crc != actual_crc {
        return Err(FileTableError::Corruption(format!(
            "CRC mismatch: stored {:08x}, computed {:08x}",
            stored_crc, actual_crc
        )));
    }

    Ok(payload)
}
