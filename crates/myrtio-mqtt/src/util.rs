//! Low-level helpers for the packet codec

use crate::error::ProtocolError;

/// Largest value a variable byte integer can carry.
pub const MAX_VARINT: usize = 268_435_455;

/// Number of bytes `value` occupies as a variable byte integer.
pub const fn varint_len(value: usize) -> usize {
    match value {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Encodes `value` into `buf` and returns the number of bytes written.
pub fn encode_varint(mut value: usize, buf: &mut [u8]) -> Result<usize, ProtocolError> {
    if value > MAX_VARINT {
        return Err(ProtocolError::MalformedLength);
    }
    let mut written = 0;
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        *buf
            .get_mut(written)
            .ok_or(ProtocolError::BufferTooSmall)? = byte;
        written += 1;
        if value == 0 {
            return Ok(written);
        }
    }
}

/// Decodes a variable byte integer from the start of `buf`.
///
/// Returns `Ok(None)` while more bytes are needed, otherwise the value and
/// the number of bytes it occupied.
pub fn decode_varint(buf: &[u8]) -> Result<Option<(usize, usize)>, ProtocolError> {
    let mut value = 0usize;
    let mut multiplier = 1usize;
    for (i, &byte) in buf.iter().enumerate() {
        if i == 4 {
            return Err(ProtocolError::MalformedLength);
        }
        value += usize::from(byte & 0x7F) * multiplier;
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
        multiplier *= 128;
    }
    if buf.len() >= 4 {
        return Err(ProtocolError::MalformedLength);
    }
    Ok(None)
}

/// Packet identifier allocator.
///
/// Hands out 1, 2, ..., 65535 and wraps back to 1; zero is never used.
#[derive(Debug, Clone)]
pub struct PacketIds {
    next: u16,
}

impl PacketIds {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u16 {
        let id = self.next;
        self.next = if self.next == u16::MAX { 1 } else { self.next + 1 };
        id
    }
}

impl Default for PacketIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded cursor writing into a byte buffer
pub(crate) struct Writer<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> Writer<'b> {
    pub(crate) fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn put_u8(&mut self, value: u8) -> Result<(), ProtocolError> {
        self.put_bytes(&[value])
    }

    pub(crate) fn put_u16(&mut self, value: u16) -> Result<(), ProtocolError> {
        self.put_bytes(&value.to_be_bytes())
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let end = self.pos + bytes.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(ProtocolError::BufferTooSmall)?
            .copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Length-prefixed binary data / UTF-8 string
    pub(crate) fn put_binary(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let len = u16::try_from(bytes.len()).map_err(|_| ProtocolError::PacketTooLarge)?;
        self.put_u16(len)?;
        self.put_bytes(bytes)
    }

    pub(crate) fn put_varint(&mut self, value: usize) -> Result<(), ProtocolError> {
        let rest = self
            .buf
            .get_mut(self.pos..)
            .ok_or(ProtocolError::BufferTooSmall)?;
        self.pos += encode_varint(value, rest)?;
        Ok(())
    }

    /// Writes an empty property block (v5 only)
    pub(crate) fn put_empty_properties(&mut self) -> Result<(), ProtocolError> {
        #[cfg(feature = "v5")]
        self.put_u8(0)?;
        Ok(())
    }
}

/// Bounded cursor reading from a byte buffer
pub(crate) struct Reader<'b> {
    buf: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    pub(crate) fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'b [u8], ProtocolError> {
        let end = self.pos + n;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or(ProtocolError::UnexpectedEnd)?;
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn take_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn take_u16(&mut self) -> Result<u16, ProtocolError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn take_binary(&mut self) -> Result<&'b [u8], ProtocolError> {
        let len = self.take_u16()?;
        self.take(usize::from(len))
    }

    pub(crate) fn take_varint(&mut self) -> Result<usize, ProtocolError> {
        let rest = self.buf.get(self.pos..).unwrap_or_default();
        let (value, used) = decode_varint(rest)?.ok_or(ProtocolError::UnexpectedEnd)?;
        self.pos += used;
        Ok(value)
    }

    /// Skips a property block (v5 only)
    pub(crate) fn skip_properties(&mut self) -> Result<(), ProtocolError> {
        #[cfg(feature = "v5")]
        {
            let len = self.take_varint()?;
            self.take(len)?;
        }
        Ok(())
    }

    pub(crate) fn rest(&mut self) -> &'b [u8] {
        let rest = self.buf.get(self.pos..).unwrap_or_default();
        self.pos = self.buf.len();
        rest
    }
}
