// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The V2 binary interchange format.
//!
//! A fixed 40 byte big endian header carries the cookie, the byte length of
//! the payload, and the configuration. The payload is one zig-zag LEB128
//! varint per entry: a positive entry is the count for the current slot, a
//! negative entry skips that many empty slots. The encoding is a single
//! dense stream independent of the in-memory counter width, and the bytes
//! match the V2 output of the other HDR histogram implementations exactly.

mod varint;

use varint::{varint_read, varint_write, zig_zag_decode, zig_zag_encode};

use crate::{Config, Error, Histogram, Width};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Write;

// 0x1c849303 identifies V2, the 0x10 marks the single dense word size class
pub(crate) const V2_COOKIE: u32 = 0x1c84_9303 | 0x10;
pub(crate) const V2_HEADER_SIZE: usize = 40;

impl Histogram {
    /// Encode this histogram into the V2 binary format.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        // worst case one 9 byte varint per slot through the last occupied one
        let mut buf =
            Vec::with_capacity(V2_HEADER_SIZE + 9 * (self.max_nonzero_index() + 1));

        buf.write_u32::<BigEndian>(V2_COOKIE)?;
        // payload length, patched once the counts are encoded
        buf.write_u32::<BigEndian>(0)?;
        // normalizing index offset
        buf.write_u32::<BigEndian>(0)?;
        buf.write_u32::<BigEndian>(u32::from(self.sigfig()))?;
        buf.write_u64::<BigEndian>(self.low())?;
        buf.write_u64::<BigEndian>(self.high())?;
        // integer to double conversion ratio
        buf.write_f64::<BigEndian>(1.0)?;

        debug_assert_eq!(buf.len(), V2_HEADER_SIZE);

        let payload_len = self.encode_counts(&mut buf)?;
        (&mut buf[4..8]).write_u32::<BigEndian>(payload_len as u32)?;

        Ok(buf)
    }

    /// Encode this histogram into the provided writer. Returns the number of
    /// bytes written.
    pub fn encode_into<W: Write>(&self, writer: &mut W) -> Result<usize, Error> {
        let buf = self.encode()?;
        writer.write_all(&buf)?;
        Ok(buf.len())
    }

    // Encode slots 0 through the last occupied slot, collapsing runs of two
    // or more empty slots into a negative entry.
    fn encode_counts(&self, buf: &mut Vec<u8>) -> Result<usize, Error> {
        let limit = self.max_nonzero_index();
        let start = buf.len();
        let mut index = 0;

        while index <= limit {
            let count = self.count_at_index(index);
            index += 1;

            let mut zeros: i64 = 0;
            if count == 0 {
                zeros = 1;
                while index <= limit && self.count_at_index(index) == 0 {
                    zeros += 1;
                    index += 1;
                }
            }

            let entry: i64 = if zeros > 1 {
                -zeros
            } else {
                i64::try_from(count).map_err(|_| Error::CountNotSerializable)?
            };
            varint_write(zig_zag_encode(entry), buf);
        }

        Ok(buf.len() - start)
    }

    /// Decode a histogram from the V2 binary format, storing counts at the
    /// default 64-bit width.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_with_width(bytes, Width::U64)
    }

    /// Decode a histogram from the V2 binary format into counters of the
    /// provided width. Decoding fails without yielding a histogram if the
    /// stream is truncated or holds counts the width cannot store.
    pub fn decode_with_width(bytes: &[u8], width: Width) -> Result<Self, Error> {
        let mut header = bytes;
        let cookie = header.read_u32::<BigEndian>().map_err(|_| Error::Truncated)?;
        if cookie != V2_COOKIE {
            return Err(Error::UnknownCookie);
        }
        let payload_len = header
            .read_u32::<BigEndian>()
            .map_err(|_| Error::Truncated)? as usize;
        let _normalizing_offset = header
            .read_u32::<BigEndian>()
            .map_err(|_| Error::Truncated)?;
        let sigfig = header
            .read_u32::<BigEndian>()
            .map_err(|_| Error::Truncated)?;
        let low = header
            .read_u64::<BigEndian>()
            .map_err(|_| Error::Truncated)?;
        let high = header
            .read_u64::<BigEndian>()
            .map_err(|_| Error::Truncated)?;
        let _conversion_ratio = header
            .read_f64::<BigEndian>()
            .map_err(|_| Error::Truncated)?;

        let sigfig = u8::try_from(sigfig).map_err(|_| Error::InvalidConfig)?;
        let config = Config::new(low, high, sigfig)?;
        let mut histogram = Histogram::from_config(config, width);

        let payload = bytes
            .get(V2_HEADER_SIZE..V2_HEADER_SIZE + payload_len)
            .ok_or(Error::Truncated)?;
        histogram.decode_counts(payload)?;
        histogram.restat();
        Ok(histogram)
    }

    // Replay the varint payload into the counts array, starting at slot 0.
    fn decode_counts(&mut self, payload: &[u8]) -> Result<(), Error> {
        let len = self.distinct_values();
        let mut offset = 0;
        let mut index: usize = 0;

        while offset < payload.len() {
            let (raw, consumed) = varint_read(&payload[offset..])?;
            offset += consumed;

            let entry = zig_zag_decode(raw);
            if entry < 0 {
                // a run of empty slots, already zero in the fresh array
                let zeros = entry.unsigned_abs() as usize;
                index = index.checked_add(zeros).ok_or(Error::ValueOverflow)?;
                if index > len {
                    return Err(Error::ValueOverflow);
                }
            } else {
                if index >= len {
                    return Err(Error::ValueOverflow);
                }
                self.counts_mut().set(index, entry as u64)?;
                index += 1;
            }
        }
        Ok(())
    }
}
