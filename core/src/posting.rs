use crate::codec::{decode_many, decode_single, encode_many, encode_single, BitReader, BitWriter};
use crate::error::DecodeError;
use crate::DocId;

/// One term's occurrences in one document.
///
/// `file_delta` is the gap from the cumulative sum of all earlier deltas in the
/// term's posting list; `positions` are 1-based token offsets, delta-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub file_delta: u32,
    pub frequency: u32,
    pub positions: Vec<u32>,
}

impl Posting {
    /// Builds a posting from ascending absolute positions.
    pub fn from_positions(file_delta: u32, positions: &[u32]) -> Self {
        let positions = to_deltas(positions);
        Self { file_delta, frequency: positions.len() as u32, positions }
    }

    /// Absolute 1-based positions of the term in the document.
    pub fn absolute_positions(&self) -> Vec<u32> {
        self.positions
            .iter()
            .scan(0u32, |acc, &gap| {
                *acc = acc.saturating_add(gap);
                Some(*acc)
            })
            .collect()
    }
}

/// First element as-is, every later element as the gap from its predecessor.
pub fn to_deltas(values: &[u32]) -> Vec<u32> {
    let mut prev = 0u32;
    values
        .iter()
        .map(|&v| {
            let gap = v.wrapping_sub(prev);
            prev = v;
            gap
        })
        .collect()
}

/// Sum of every delta in a posting list; the next document's delta base.
pub fn cumulative_sum(list: &[Posting]) -> u64 {
    list.iter().map(|p| u64::from(p.file_delta)).sum()
}

/// Absolute document ids of a posting list, in list order.
pub fn document_ids(list: &[Posting]) -> Vec<DocId> {
    let mut acc: DocId = 0;
    list.iter()
        .map(|p| {
            acc = acc.saturating_add(p.file_delta);
            acc
        })
        .collect()
}

/// Binary wire form: delta, frequency, then positions, bit-concatenated.
pub fn write_posting(writer: &mut BitWriter, posting: &Posting) {
    encode_single(writer, posting.file_delta);
    encode_single(writer, posting.frequency);
    encode_many(writer, &posting.positions);
}

pub fn read_posting(reader: &mut BitReader<'_>) -> Result<Posting, DecodeError> {
    let file_delta = decode_single(reader)?;
    let frequency = decode_single(reader)?;
    let positions = decode_many(reader, frequency as usize)?;
    Ok(Posting { file_delta, frequency, positions })
}

pub fn encode_posting(posting: &Posting) -> Vec<u8> {
    let mut writer = BitWriter::new();
    write_posting(&mut writer, posting);
    writer.finish()
}

pub fn decode_posting(bytes: &[u8]) -> Result<Posting, DecodeError> {
    read_posting(&mut BitReader::new(bytes))
}
