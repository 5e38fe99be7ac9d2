//! Script chunk parsing and encoding.
//!
//! A script chunk is either a single opcode byte or a data push: a header
//! (the opcode, plus a 1/2/4-byte little-endian length for OP_PUSHDATA1/2/4)
//! followed by its payload. Chunks are views into the owning script's buffer
//! described by a start offset and byte length; payload bytes are borrowed
//! from that buffer on demand.

use std::ops::Range;

use crate::opcodes::*;
use crate::ScriptError;

/// Largest payload any push encoding can describe.
pub const MAX_PUSH_PAYLOAD: usize = u32::MAX as usize;

/// Length-field width for a push encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushWidth {
    /// Pick the minimal encoding for the payload length.
    Auto,
    /// OP_PUSHDATA1 with a one-byte length.
    One,
    /// OP_PUSHDATA2 with a two-byte length.
    Two,
    /// OP_PUSHDATA4 with a four-byte length.
    Four,
}

/// A single parsed element of a script, as a view into its buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    start: usize,
    len: usize,
    op: u8,
    header_len: u8,
}

impl ScriptChunk {
    /// A one-byte opcode chunk at `start`.
    pub(crate) fn opcode(start: usize, op: u8) -> Self {
        ScriptChunk { start, len: 1, op, header_len: 0 }
    }

    /// A direct push of `data_len` (at most 75) bytes at `start`.
    pub(crate) fn direct_push(start: usize, data_len: u8) -> Self {
        ScriptChunk {
            start,
            len: 1 + data_len as usize,
            op: data_len,
            header_len: 1,
        }
    }

    /// The leading byte. For direct pushes (1-75 bytes) this is the payload length.
    pub fn op(&self) -> u8 {
        self.op
    }

    /// Offset of the chunk's first byte in the script buffer.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Total encoded length, header and payload included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: every chunk has at least its opcode byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Byte range of the whole chunk within the script buffer.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// True for chunks that carry no payload (any byte above OP_PUSHDATA4).
    pub fn is_opcode(&self) -> bool {
        self.op > OP_PUSHDATA4
    }

    /// True for data pushes, including the empty push OP_0.
    pub fn is_push(&self) -> bool {
        !self.is_opcode()
    }

    /// Number of payload bytes; zero for opcode chunks.
    pub fn data_len(&self) -> usize {
        self.len - self.header_len as usize
    }

    /// Borrow the pushed payload from the owning buffer.
    ///
    /// # Returns
    /// `Some(payload)` for push chunks (empty for OP_0), `None` for opcode chunks.
    pub fn data<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        if self.is_opcode() {
            return None;
        }
        Some(&buf[self.start + self.header_len as usize..self.start + self.len])
    }

    /// Copy the payload out of the buffer, detaching it from the script.
    pub fn to_owned_data(&self, buf: &[u8]) -> Option<Vec<u8>> {
        self.data(buf).map(<[u8]>::to_vec)
    }

    /// Borrow the whole encoded chunk (header and payload).
    pub fn raw<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.range()]
    }

    /// True when the push uses the minimal encoding for its payload length.
    ///
    /// Opcode chunks are always compact.
    pub fn is_compact(&self) -> bool {
        let n = self.data_len();
        match self.op {
            OP_PUSHDATA1 => n > OP_DATA_75 as usize,
            OP_PUSHDATA2 => n > 0xff,
            OP_PUSHDATA4 => n > 0xffff,
            _ => true,
        }
    }

    /// Human-readable rendering used for debug output.
    ///
    /// Opcodes render by name. Pushes render as `'text'` when every byte is
    /// printable ASCII, otherwise as hex (bracketed when under 16 bytes).
    /// Non-compact pushes are prefixed with the length-field width.
    pub fn render(&self, buf: &[u8]) -> String {
        let data = match self.data(buf) {
            None => return opcode_to_string(self.op).to_string(),
            Some(d) if d.is_empty() => return opcode_to_string(OP_0).to_string(),
            Some(d) => d,
        };

        let body = if data.iter().all(|b| (0x20..=0x7e).contains(b)) {
            let mut s = String::with_capacity(data.len() + 2);
            s.push('\'');
            for &b in data {
                if b == b'\'' || b == b'\\' {
                    s.push('\\');
                }
                s.push(b as char);
            }
            s.push('\'');
            s
        } else if data.len() < 16 {
            format!("[{}]", hex::encode(data))
        } else {
            hex::encode(data)
        };

        if self.is_compact() {
            return body;
        }
        let width = match self.op {
            OP_PUSHDATA1 => 1,
            OP_PUSHDATA2 => 2,
            _ => 4,
        };
        format!("{}:{}", width, body)
    }
}

/// Decode one chunk starting at `offset`.
///
/// # Arguments
/// * `buf` - The full script buffer.
/// * `offset` - Position of the chunk's opcode byte; must be below `buf.len()`.
///
/// # Returns
/// The chunk view, or `DataTooSmall` if a length field or payload runs past
/// the end of the buffer.
pub fn parse_chunk(buf: &[u8], offset: usize) -> Result<ScriptChunk, ScriptError> {
    let op = *buf.get(offset).ok_or(ScriptError::IndexOutOfRange)?;
    let rest = &buf[offset + 1..];

    let (header_len, data_len) = match op {
        OP_0..=OP_DATA_75 => (1, op as usize),
        OP_PUSHDATA1 => {
            let field = rest.get(..1).ok_or(ScriptError::DataTooSmall)?;
            (2, field[0] as usize)
        }
        OP_PUSHDATA2 => {
            let field = rest.get(..2).ok_or(ScriptError::DataTooSmall)?;
            (3, u16::from_le_bytes([field[0], field[1]]) as usize)
        }
        OP_PUSHDATA4 => {
            let field = rest.get(..4).ok_or(ScriptError::DataTooSmall)?;
            (5, u32::from_le_bytes([field[0], field[1], field[2], field[3]]) as usize)
        }
        _ => (1, 0),
    };

    let len = header_len + data_len;
    if buf.len() - offset < len {
        return Err(ScriptError::DataTooSmall);
    }

    Ok(ScriptChunk {
        start: offset,
        len,
        op,
        header_len: header_len as u8,
    })
}

/// Decode a whole buffer into chunks. Any truncation fails the entire parse.
pub fn parse_chunks(buf: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let chunk = parse_chunk(buf, pos)?;
        pos += chunk.len();
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Compute the push header for a payload of `data_len` bytes.
///
/// # Arguments
/// * `data_len` - Payload length.
/// * `width` - `Auto` for the minimal header, or an explicit length-field width.
///
/// # Returns
/// The header bytes, or `DataTooBig` if the requested width (or any width,
/// for `Auto`) cannot represent `data_len`.
pub fn push_data_prefix(data_len: usize, width: PushWidth) -> Result<Vec<u8>, ScriptError> {
    if data_len > MAX_PUSH_PAYLOAD {
        return Err(ScriptError::DataTooBig);
    }
    let width = match width {
        PushWidth::Auto if data_len <= OP_DATA_75 as usize => return Ok(vec![data_len as u8]),
        PushWidth::Auto if data_len <= 0xff => PushWidth::One,
        PushWidth::Auto if data_len <= 0xffff => PushWidth::Two,
        PushWidth::Auto => PushWidth::Four,
        explicit => explicit,
    };

    let mut buf = Vec::with_capacity(5);
    match width {
        PushWidth::One => {
            let n = u8::try_from(data_len).map_err(|_| ScriptError::DataTooBig)?;
            buf.push(OP_PUSHDATA1);
            buf.push(n);
        }
        PushWidth::Two => {
            let n = u16::try_from(data_len).map_err(|_| ScriptError::DataTooBig)?;
            buf.push(OP_PUSHDATA2);
            buf.extend_from_slice(&n.to_le_bytes());
        }
        _ => {
            buf.push(OP_PUSHDATA4);
            buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        }
    }
    Ok(buf)
}

/// Encode `payload` as a complete push (header followed by the payload).
pub fn encode_push(payload: &[u8], width: PushWidth) -> Result<Vec<u8>, ScriptError> {
    let mut out = push_data_prefix(payload.len(), width)?;
    out.extend_from_slice(payload);
    Ok(out)
}
