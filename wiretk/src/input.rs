use super::{v64, Error, Tag, WireType};

/////////////////////////////////////////////// Input //////////////////////////////////////////////

/// A read cursor over a borrowed buffer.  Reads never go past the current limit; nested
/// length-delimited regions are entered with [Input::push_limit] and left with
/// [Input::pop_limit].
#[derive(Clone, Debug)]
pub struct Input<'a> {
    buf: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> Input<'a> {
    /// A cursor over all of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            limit: buf.len(),
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offset reads may not pass.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes left before the limit.
    pub fn bytes_until_limit(&self) -> usize {
        self.limit - self.offset
    }

    /// True when everything up to the limit has been read.
    pub fn at_limit(&self) -> bool {
        self.offset >= self.limit
    }

    /// Restrict reads to the next `len` bytes.  Returns the old limit, to hand back to
    /// [Input::pop_limit].
    pub fn push_limit(&mut self, len: usize) -> Result<usize, Error> {
        let had = self.bytes_until_limit();
        if len > had {
            return Err(Error::TruncatedInput { required: len, had });
        }
        let saved = self.limit;
        self.limit = self.offset + len;
        Ok(saved)
    }

    /// Leave a region entered with [Input::push_limit].  The region must have been consumed
    /// exactly.
    pub fn pop_limit(&mut self, saved: usize) -> Result<(), Error> {
        if self.offset != self.limit {
            return Err(Error::LimitMismatch {
                offset: self.offset,
                limit: self.limit,
            });
        }
        self.limit = saved;
        Ok(())
    }

    fn remain(&self) -> &'a [u8] {
        &self.buf[self.offset..self.limit]
    }

    /// Read a varint of up to 64 bits.
    pub fn read_varint64(&mut self) -> Result<u64, Error> {
        let remain = self.remain();
        let (x, rest) = v64::unpack(remain)?;
        self.offset += remain.len() - rest.len();
        Ok(x.into())
    }

    /// Read a varint and keep its low 32 bits.
    pub fn read_varint32(&mut self) -> Result<u32, Error> {
        Ok(self.read_varint64()? as u32)
    }

    /// Read a varint and check it fits in a `usize`.
    pub fn read_length(&mut self) -> Result<usize, Error> {
        let x = self.read_varint64()?;
        usize::try_from(x).map_err(|_| Error::UnsignedOverflow { value: x })
    }

    /// Read a tag.  A zero tag, a tag wider than 32 bits, or a group wire type is an error.
    pub fn read_tag(&mut self) -> Result<Tag, Error> {
        let tag = self.read_varint64()?;
        if tag > u32::MAX as u64 {
            return Err(Error::TagTooLarge { tag });
        }
        Tag::from_u32(tag as u32)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let remain = self.remain();
        if remain.len() < len {
            return Err(Error::TruncatedInput {
                required: len,
                had: remain.len(),
            });
        }
        self.offset += len;
        Ok(&remain[..len])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a varint as a bool.  Any nonzero value is true.
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_varint64()? != 0)
    }

    /// Read four little-endian bytes.
    pub fn read_fixed32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read eight little-endian bytes.
    pub fn read_fixed64(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read an IEEE-754 single.
    pub fn read_float(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.read_fixed32()?))
    }

    /// Read an IEEE-754 double.
    pub fn read_double(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.read_fixed64()?))
    }

    /// Read a varint length and then that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_length()?;
        self.read_bytes(len)
    }

    /// Read a length-delimited UTF-8 string.
    pub fn read_str(&mut self) -> Result<&'a str, Error> {
        let bytes = self.read_length_delimited()?;
        std::str::from_utf8(bytes).map_err(|_| Error::StringEncoding)
    }

    /// Skip over one value of the given wire type.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), Error> {
        match wire_type {
            WireType::Varint => {
                self.read_varint64()?;
            }
            WireType::SixtyFour => {
                self.read_bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::ThirtyTwo => {
                self.read_bytes(4)?;
            }
        }
        Ok(())
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
