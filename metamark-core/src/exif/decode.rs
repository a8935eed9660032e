//! TIFF structure decoding.
//!
//! Decoding is best-effort by design: a malformed header yields `None` and a
//! corrupt entry inside an otherwise valid IFD is skipped, so a damaged file
//! degrades to a smaller record instead of an error.

use super::record::MetadataRecord;
use super::tag::{Ifd, Tag, EXIF_IFD_POINTER, GPS_IFD_POINTER};
use super::value::{lossy_text, Rational, Value};

/// TIFF magic number following the byte-order mark.
pub(crate) const TIFF_MAGIC: u16 = 0x002A;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn detect(tiff: &[u8]) -> Option<ByteOrder> {
        match tiff.get(..2)? {
            b"II" => Some(ByteOrder::Little),
            b"MM" => Some(ByteOrder::Big),
            _ => None,
        }
    }

    fn u16(&self, bytes: &[u8], offset: usize) -> Option<u16> {
        let raw: [u8; 2] = bytes
            .get(offset..offset.checked_add(2)?)?
            .try_into()
            .ok()?;
        Some(match self {
            ByteOrder::Little => u16::from_le_bytes(raw),
            ByteOrder::Big => u16::from_be_bytes(raw),
        })
    }

    fn u32(&self, bytes: &[u8], offset: usize) -> Option<u32> {
        let raw: [u8; 4] = bytes
            .get(offset..offset.checked_add(4)?)?
            .try_into()
            .ok()?;
        Some(match self {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        })
    }
}

/// Size in bytes of one element of a TIFF field type, `None` for types this
/// decoder does not handle.
fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        1 | 2 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 => Some(4),
        5 | 10 => Some(8),
        _ => None,
    }
}

struct RawEntry {
    tag_id: u16,
    value: Value,
}

fn decode_value(order: ByteOrder, field_type: u16, data: &[u8]) -> Option<Value> {
    let value = match field_type {
        1 | 7 => Value::Bytes(data.to_vec()),
        2 => {
            let end = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            Value::Text(lossy_text(&data[..end]))
        }
        3 => Value::Integer(
            (0..data.len() / 2)
                .filter_map(|i| order.u16(data, i * 2))
                .map(i64::from)
                .collect(),
        ),
        8 => Value::Integer(
            (0..data.len() / 2)
                .filter_map(|i| order.u16(data, i * 2))
                .map(|v| i64::from(v as i16))
                .collect(),
        ),
        4 => Value::Integer(
            (0..data.len() / 4)
                .filter_map(|i| order.u32(data, i * 4))
                .map(i64::from)
                .collect(),
        ),
        9 => Value::Integer(
            (0..data.len() / 4)
                .filter_map(|i| order.u32(data, i * 4))
                .map(|v| i64::from(v as i32))
                .collect(),
        ),
        5 => Value::Rational(
            (0..data.len() / 8)
                .filter_map(|i| {
                    let num = order.u32(data, i * 8)?;
                    let den = order.u32(data, i * 8 + 4)?;
                    Some(Rational::new(i64::from(num), i64::from(den)))
                })
                .collect(),
        ),
        10 => Value::Rational(
            (0..data.len() / 8)
                .filter_map(|i| {
                    let num = order.u32(data, i * 8)? as i32;
                    let den = order.u32(data, i * 8 + 4)? as i32;
                    Some(Rational::new(i64::from(num), i64::from(den)))
                })
                .collect(),
        ),
        _ => return None,
    };
    Some(value)
}

fn decode_entry(tiff: &[u8], order: ByteOrder, offset: usize) -> Option<RawEntry> {
    let tag_id = order.u16(tiff, offset)?;
    let field_type = order.u16(tiff, offset.checked_add(2)?)?;
    let count = order.u32(tiff, offset.checked_add(4)?)? as usize;
    let size = type_size(field_type)?.checked_mul(count)?;

    // Values up to four bytes are stored inline; anything larger lives in
    // the heap at an offset from the TIFF origin.
    let data_offset = if size <= 4 {
        offset.checked_add(8)?
    } else {
        order.u32(tiff, offset.checked_add(8)?)? as usize
    };
    let data = tiff.get(data_offset..data_offset.checked_add(size)?)?;
    let value = decode_value(order, field_type, data)?;
    Some(RawEntry { tag_id, value })
}

fn decode_ifd(tiff: &[u8], order: ByteOrder, offset: usize) -> Vec<RawEntry> {
    let Some(count) = order.u16(tiff, offset) else {
        return Vec::new();
    };
    (0..count as usize)
        .filter_map(|index| {
            let entry_offset = offset.checked_add(2 + index * 12)?;
            decode_entry(tiff, order, entry_offset)
        })
        .collect()
}

fn first_integer(value: &Value) -> Option<usize> {
    match value {
        Value::Integer(values) => values.first().and_then(|v| usize::try_from(*v).ok()),
        _ => None,
    }
}

/// Decode a TIFF block into a flattened record.
///
/// IFD0 entries come first in record order, then the Exif sub-IFD, then the
/// GPS sub-IFD. The Exif pointer is transparent; the GPS pointer keeps its
/// slot as the `GPSInfo` key whose value is the number of GPS entries
/// decoded. The thumbnail IFD chained after IFD0 is ignored.
pub(crate) fn decode_tiff(tiff: &[u8]) -> Option<MetadataRecord> {
    let order = ByteOrder::detect(tiff)?;
    if order.u16(tiff, 2)? != TIFF_MAGIC {
        return None;
    }
    let ifd0_offset = order.u32(tiff, 4)? as usize;

    let mut record = MetadataRecord::new();
    let mut exif_offset = None;
    let mut gps_offset = None;
    for entry in decode_ifd(tiff, order, ifd0_offset) {
        match entry.tag_id {
            EXIF_IFD_POINTER => exif_offset = first_integer(&entry.value),
            GPS_IFD_POINTER => {
                gps_offset = first_integer(&entry.value);
                // Keeps the pointer's slot; the count is filled in below.
                record.insert(Tag::GpsInfo, Value::int(0));
            }
            id => record.insert(Tag::from_id(Ifd::Primary, id), entry.value),
        }
    }
    if let Some(offset) = exif_offset {
        for entry in decode_ifd(tiff, order, offset) {
            record.insert(Tag::from_id(Ifd::Exif, entry.tag_id), entry.value);
        }
    }
    if let Some(offset) = gps_offset {
        let entries = decode_ifd(tiff, order, offset);
        record.insert(Tag::GpsInfo, Value::int(entries.len() as i64));
        for entry in entries {
            record.insert(Tag::from_id(Ifd::Gps, entry.tag_id), entry.value);
        }
    }
    Some(record)
}
