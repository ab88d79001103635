//! Binary record codec
//!
//! File layout: the 4-byte magic, then records back to back:
//!
//! ```text
//! i64 LE   timestamp (microseconds since the Unix epoch, UTC)
//! u8       level
//! u8       domain
//! u32 LE   text length
//! [u8]     UTF-8 text
//! ```
//!
//! A truncated trailing record (process killed mid-write) is ignored on read.

use crate::constants::{BINARY_LOG_MAGIC, MAX_RECORD_TEXT_BYTES};
use crate::error::{LogError, Result};
use crate::logging::{LogDomain, LogLevel, LogMessage};
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;

const HEADER_LEN: usize = 8 + 1 + 1 + 4;

/// Record decoded from a rotation file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub domain: LogDomain,
    pub text: String,
}

impl BinaryRecord {
    pub fn to_line(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.level.label(),
            self.domain.native_name(),
            self.text
        )
    }
}

/// Append one encoded record to `out`
pub fn encode(message: &LogMessage, out: &mut Vec<u8>) {
    let text = truncate_utf8(message.text(), MAX_RECORD_TEXT_BYTES);

    out.reserve(HEADER_LEN + text.len());
    out.extend_from_slice(&message.timestamp().timestamp_micros().to_le_bytes());
    out.push(message.level().as_u8());
    out.push(message.domain() as u8);
    out.extend_from_slice(&(text.len() as u32).to_le_bytes());
    out.extend_from_slice(text.as_bytes());
}

/// Decode a whole rotation file body (magic included)
pub fn decode(bytes: &[u8]) -> io::Result<Vec<BinaryRecord>> {
    let body = bytes
        .strip_prefix(BINARY_LOG_MAGIC.as_slice())
        .ok_or_else(|| invalid("missing binary log header"))?;

    let mut records = Vec::new();
    let mut rest = body;

    while rest.len() >= HEADER_LEN {
        let (header, tail) = rest.split_at(HEADER_LEN);
        let micros = i64::from_le_bytes(field(&header[0..8])?);
        let level = LogLevel::from_u8(header[8]).ok_or_else(|| invalid("bad level"))?;
        let domain = LogDomain::from_u8(header[9]).ok_or_else(|| invalid("bad domain"))?;
        let len = u32::from_le_bytes(field(&header[10..14])?) as usize;

        if tail.len() < len {
            break;
        }
        let (text, next) = tail.split_at(len);
        let timestamp =
            DateTime::from_timestamp_micros(micros).ok_or_else(|| invalid("bad timestamp"))?;

        records.push(BinaryRecord {
            timestamp,
            level,
            domain,
            text: String::from_utf8_lossy(text).into_owned(),
        });
        rest = next;
    }

    Ok(records)
}

/// Read and decode a rotation file
pub fn read_records(path: &Path) -> Result<Vec<BinaryRecord>> {
    let bytes = std::fs::read(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn field<const N: usize>(bytes: &[u8]) -> io::Result<[u8; N]> {
    bytes.try_into().map_err(|_| invalid("bad header"))
}

fn invalid(reason: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason.to_string())
}
