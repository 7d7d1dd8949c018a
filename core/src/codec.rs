//! Fibonacci coding of nonnegative integers.
//!
//! A value `v` is coded as `v + 1` written in its Zeckendorf representation
//! (a sum of non-consecutive Fibonacci numbers `1, 2, 3, 5, 8, ...`), lowest
//! Fibonacci index first, followed by one extra set bit. No valid code contains
//! two adjacent set bits before its end, so the trailing `11` delimits every
//! code and codes can be concatenated at the bit level.

use crate::error::DecodeError;

const FIB_LEN: usize = 47;

/// `FIBONACCI[i]` is the Fibonacci number with index `i + 2`. The last entry
/// exceeds `u32::MAX + 1`, so every encodable value fits below it.
const FIBONACCI: [u64; FIB_LEN] = {
    let mut table = [0u64; FIB_LEN];
    table[0] = 1;
    table[1] = 2;
    let mut i = 2;
    while i < FIB_LEN {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }
    table
};

/// Append-only bit sink, most significant bit first within each byte.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self { Self::default() }

    pub fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    pub fn bit_len(&self) -> usize { self.bit_len }


    /// Returns the stream; only the final byte carries zero padding.
    pub fn finish(self) -> Vec<u8> { self.bytes }
}

/// Bit cursor over an encoded stream.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self { Self { bytes, pos: 0 } }

    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = *self.bytes.get(self.pos / 8)?;
        let bit = byte & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }


    pub fn remaining_bits(&self) -> usize { self.bytes.len() * 8 - self.pos }
}

/// Appends the code of a single value.
pub fn encode_single(writer: &mut BitWriter, value: u32) {
    let mut n = u64::from(value) + 1;
    let mut top = 0;
    while top + 1 < FIB_LEN && FIBONACCI[top + 1] <= n {
        top += 1;
    }
    let mut bits = [false; FIB_LEN];
    for i in (0..=top).rev() {
        if FIBONACCI[i] <= n {
            bits[i] = true;
            n -= FIBONACCI[i];
        }
    }
    for &bit in &bits[..=top] {
        writer.push_bit(bit);
    }
    writer.push_bit(true);
}

/// Appends one code per value, in order. An empty slice appends nothing.
pub fn encode_many(writer: &mut BitWriter, values: &[u32]) {
    for &value in values {
        encode_single(writer, value);
    }
}

/// Reads the next code.
pub fn decode_single(reader: &mut BitReader<'_>) -> Result<u32, DecodeError> {
    decode_next(reader).ok_or(DecodeError::Truncated { expected: 1, decoded: 0 })?
}

/// Reads exactly `count` codes.
pub fn decode_many(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u32>, DecodeError> {
    let mut values = Vec::with_capacity(count.min(reader.remaining_bits() / 2));
    for decoded in 0..count {
        match decode_next(reader) {
            Some(value) => values.push(value?),
            None => return Err(DecodeError::Truncated { expected: count, decoded }),
        }
    }
    Ok(values)
}

/// `None` when the stream runs out before a terminator.
fn decode_next(reader: &mut BitReader<'_>) -> Option<Result<u32, DecodeError>> {
    let mut sum: u64 = 0;
    let mut index = 0;
    let mut prev = false;
    loop {
        let bit = reader.read_bit()?;
        if bit && prev {
            return Some(u32::try_from(sum - 1).map_err(|_| DecodeError::Overflow));
        }
        if bit {
            if index >= FIB_LEN {
                return Some(Err(DecodeError::Overflow));
            }
            sum += FIBONACCI[index];
        }
        prev = bit;
        index += 1;
    }
}

pub fn encode_to_vec(values: &[u32]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    encode_many(&mut writer, values);
    writer.finish()
}

pub fn decode_from_slice(bytes: &[u8], count: usize) -> Result<Vec<u32>, DecodeError> {
    decode_many(&mut BitReader::new(bytes), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bits_of(values: &[u32]) -> String {
        let mut writer = BitWriter::new();
        encode_many(&mut writer, values);
        let len = writer.bit_len();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        (0..len).map(|_| if reader.read_bit().unwrap() { '1' } else { '0' }).collect()
    }

    #[test]
    fn known_codes() {
        assert_eq!(bits_of(&[0]), "11");
        assert_eq!(bits_of(&[1]), "011");
        assert_eq!(bits_of(&[2]), "0011");
        assert_eq!(bits_of(&[3]), "1011");
        assert_eq!(bits_of(&[11]), "101011");
        assert_eq!(encode_to_vec(&[0]), vec![0xC0]);
        assert_eq!(encode_to_vec(&[0, 1]), vec![0b1101_1000]);
    }

    #[test]
    fn empty_sequence_appends_nothing() {
        assert!(encode_to_vec(&[]).is_empty());
        assert_eq!(decode_from_slice(&[], 0).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn single_matches_many_for_singleton() {
        for value in [0, 1, 7, 1000, u32::MAX] {
            let mut single = BitWriter::new();
            encode_single(&mut single, value);
            assert_eq!(single.finish(), encode_to_vec(&[value]));
        }
    }

    #[test]
    fn round_trips_mixed_values() {
        let values = vec![0, 1, 2, 3, 4, 5, 89, 144, 1_000_000, u32::MAX - 1, u32::MAX, 0];
        let bytes = encode_to_vec(&values);
        assert_eq!(decode_from_slice(&bytes, values.len()).unwrap(), values);
    }

    #[test]
    fn codes_concatenate_without_padding() {
        let mut writer = BitWriter::new();
        encode_single(&mut writer, 0);
        encode_single(&mut writer, 1);
        encode_many(&mut writer, &[2, 3]);
        assert_eq!(writer.bit_len(), 2 + 3 + 4 + 4);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 2);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode_single(&mut reader).unwrap(), 0);
        assert_eq!(decode_single(&mut reader).unwrap(), 1);
        assert_eq!(decode_many(&mut reader, 2).unwrap(), vec![2, 3]);
    }

    #[test]
    fn truncated_stream_fails() {
        let bytes = encode_to_vec(&[5, 6]);
        assert_eq!(
            decode_from_slice(&bytes, 3),
            Err(DecodeError::Truncated { expected: 3, decoded: 2 })
        );
        // cut in the middle of the first code
        let long = encode_to_vec(&[1_000_000]);
        assert!(matches!(
            decode_from_slice(&long[..1], 1),
            Err(DecodeError::Truncated { expected: 1, decoded: 0 })
        ));
    }

    #[test]
    fn overlong_code_overflows() {
        // alternating bits never terminate within the table
        let bytes = vec![0b1010_1010; 8];
        assert_eq!(decode_from_slice(&bytes, 1), Err(DecodeError::Overflow));
    }

    #[test]
    fn max_value_fits_table() {
        let bytes = encode_to_vec(&[u32::MAX]);
        assert_eq!(decode_from_slice(&bytes, 1).unwrap(), vec![u32::MAX]);
    }

    proptest! {
        #[test]
        fn any_values_round_trip(values in prop::collection::vec(any::<u32>(), 0..200)) {
            let bytes = encode_to_vec(&values);
            prop_assert_eq!(decode_from_slice(&bytes, values.len()).unwrap(), values);
        }

        #[test]
        fn single_code_is_a_one_element_list(value in any::<u32>()) {
            let mut single = BitWriter::new();
            encode_single(&mut single, value);
            prop_assert_eq!(single.finish(), encode_to_vec(&[value]));
        }
    }
}
