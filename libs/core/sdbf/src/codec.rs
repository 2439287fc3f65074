// [libs/core/sdbf/src/codec.rs]
//! Textual digest framing: one colon-delimited, base64-bodied record per
//! line, in the `sdbf` (stream) or `sdbf-dd` (block) dialect.

use std::io::{BufRead, Write};
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::digest::{Sdbf, Shape};
use crate::errors::SdbfError;
use crate::params::BF_SIZE;

/// Magic prefix of stream-shape records.
pub const MAGIC_STREAM: &str = "sdbf";
/// Magic prefix of block-shape records.
pub const MAGIC_DD: &str = "sdbf-dd";
/// The only supported on-disk format version.
pub const FORMAT_VERSION: u32 = 2;

/// Base64 length of one 256-byte filter, padding included.
const DD_FILTER_B64_LEN: usize = 344;

/// Encode a digest as a single record line (no trailing newline).
pub fn encode(digest: &Sdbf) -> String {
    match &digest.shape {
        Shape::Stream { last_count } => {
            let mut line = format!(
                "{MAGIC_STREAM}:{FORMAT_VERSION:02}:{}:{}:sha1:{}:{}:{:x}:{}:{}:{}:",
                digest.name.len(),
                digest.name,
                digest.bf_size,
                digest.hash_count,
                digest.mask,
                digest.max_elem,
                digest.bf_count,
                last_count,
            );
            line.push_str(&BASE64.encode(&digest.buffer));
            line
        }
        Shape::Block {
            block_size,
            elem_counts,
        } => {
            let mut line = format!(
                "{MAGIC_DD}:{FORMAT_VERSION:02}:{}:{}:sha1:{}:{}:{:x}:{}:{}:{}",
                digest.name.len(),
                digest.name,
                digest.bf_size,
                digest.hash_count,
                digest.mask,
                digest.max_elem,
                digest.bf_count,
                block_size,
            );
            for (index, count) in elem_counts.iter().enumerate() {
                line.push_str(&format!(
                    ":{count:02X}:{}",
                    BASE64.encode(digest.filter(index as u32))
                ));
            }
            line
        }
    }
}

/// Write one digest record followed by a newline.
pub fn write_digest<W: Write>(out: &mut W, digest: &Sdbf) -> std::io::Result<()> {
    writeln!(out, "{}", encode(digest))
}

/// Cursor over the colon-delimited fields of a record line.
struct FieldCursor<'a> {
    rest: &'a str,
}

impl<'a> FieldCursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    /// Next field up to (and consuming) a colon.
    fn field(&mut self, what: &str) -> Result<&'a str, SdbfError> {
        match self.rest.split_once(':') {
            Some((field, rest)) => {
                self.rest = rest;
                Ok(field)
            }
            None => Err(SdbfError::MalformedHeader(format!("missing field: {what}"))),
        }
    }

    /// Decimal field.
    fn number(&mut self, what: &str) -> Result<u32, SdbfError> {
        self.field(what)?
            .parse()
            .map_err(|_| SdbfError::MalformedHeader(format!("non-numeric field: {what}")))
    }

    /// Hexadecimal field.
    fn hex(&mut self, what: &str) -> Result<u32, SdbfError> {
        u32::from_str_radix(self.field(what)?, 16)
            .map_err(|_| SdbfError::MalformedHeader(format!("non-hex field: {what}")))
    }

    /// Exactly `len` bytes (the digest name may itself contain colons),
    /// consuming the colon that follows them.
    fn exact(&mut self, len: usize, what: &str) -> Result<&'a str, SdbfError> {
        if self.rest.len() <= len || !self.rest.is_char_boundary(len) {
            return Err(SdbfError::MalformedHeader(format!("truncated field: {what}")));
        }
        let (taken, rest) = self.rest.split_at(len);
        let Some(rest) = rest.strip_prefix(':') else {
            return Err(SdbfError::MalformedHeader(format!(
                "missing delimiter after: {what}"
            )));
        };
        self.rest = rest;
        Ok(taken)
    }

    /// Everything after the last consumed delimiter; the cursor is left
    /// empty.
    fn remainder(&mut self) -> &'a str {
        std::mem::take(&mut self.rest)
    }
}

/// Decode one record line into a digest.
///
/// Unsupported magic or version, malformed header fields, or a decoded
/// filter body whose length disagrees with the advertised geometry are all
/// fatal for this record.
pub fn decode(line: &str) -> Result<Sdbf, SdbfError> {
    let mut cursor = FieldCursor::new(line.trim_end());

    let magic = cursor.field("magic")?;
    let version = cursor.number("version")?;
    if (magic != MAGIC_STREAM && magic != MAGIC_DD) || version != FORMAT_VERSION {
        return Err(SdbfError::UnsupportedFormat {
            magic: magic.to_owned(),
            version,
        });
    }
    let name_len = cursor.number("name length")? as usize;
    let name = cursor.exact(name_len, "name")?.to_owned();
    let hash_family = cursor.field("hash family")?;
    if hash_family != "sha1" {
        return Err(SdbfError::MalformedHeader(format!(
            "unknown hash family: {hash_family}"
        )));
    }
    let bf_size = cursor.number("filter size")?;
    let hash_count = cursor.number("hash count")?;
    let mask = cursor.hex("mask")?;
    let max_elem = cursor.number("max element count")?;
    let bf_count = cursor.number("filter count")?;
    if bf_count == 0 {
        return Err(SdbfError::MalformedHeader("zero filter count".to_owned()));
    }
    // Only the 256-byte geometry exists in the wild; the comparator's
    // tiered popcount and the dd frame length both assume it.
    if bf_size as usize != BF_SIZE {
        return Err(SdbfError::MalformedHeader(format!(
            "unsupported filter size: {bf_size}"
        )));
    }
    let expected = bf_count as usize * bf_size as usize;

    let (buffer, shape) = if magic == MAGIC_STREAM {
        let last_count = cursor.number("last element count")?;
        let buffer = BASE64.decode(cursor.remainder())?;
        (buffer, Shape::Stream { last_count })
    } else {
        let block_size = cursor.number("block size")?;
        let mut buffer = Vec::with_capacity(expected);
        let mut elem_counts = Vec::with_capacity(bf_count as usize);
        for index in 0..bf_count {
            let count_field = cursor.field("element count")?;
            let count = u16::from_str_radix(count_field, 16).map_err(|_| {
                SdbfError::MalformedHeader(format!("non-hex element count #{index}"))
            })?;
            let body = if index + 1 < bf_count {
                cursor.field("filter body")?
            } else {
                cursor.remainder()
            };
            if body.len() != DD_FILTER_B64_LEN {
                return Err(SdbfError::MalformedHeader(format!(
                    "filter body #{index} is {} base64 chars, expected {DD_FILTER_B64_LEN}",
                    body.len()
                )));
            }
            let decoded = BASE64.decode(body)?;
            if decoded.len() != BF_SIZE {
                return Err(SdbfError::FilterLengthMismatch {
                    expected: BF_SIZE,
                    actual: decoded.len(),
                });
            }
            buffer.extend_from_slice(&decoded);
            elem_counts.push(count);
        }
        (
            buffer,
            Shape::Block {
                block_size,
                elem_counts,
            },
        )
    };

    if buffer.len() != expected {
        return Err(SdbfError::FilterLengthMismatch {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(Sdbf {
        name,
        bf_size,
        hash_count,
        mask,
        max_elem,
        bf_count,
        buffer,
        shape,
        hamming: OnceLock::new(),
    })
}

/// Read every digest record from a line-oriented source, tolerating blank
/// or whitespace-only lines between records.
pub fn read_digests<R: BufRead>(input: R) -> Result<Vec<Sdbf>, SdbfError> {
    let mut digests = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        digests.push(decode(&line)?);
    }
    debug!(count = digests.len(), "digest records loaded");
    Ok(digests)
}
