//! TIFF structure encoding.
//!
//! Output is canonical rather than a reproduction of the input file: always
//! little endian, IFD0 at offset 8, entries sorted by tag identifier, and
//! sub-IFDs emitted only when they have content. The layout is header, IFD0,
//! Exif IFD, GPS IFD, then one heap for all out-of-line values.

use super::decode::TIFF_MAGIC;
use super::record::MetadataRecord;
use super::tag::{Ifd, Tag, EXIF_IFD_POINTER, GPS_IFD_POINTER};
use super::value::Value;

struct EncodedEntry {
    tag_id: u16,
    field_type: u16,
    count: u32,
    bytes: Vec<u8>,
}

fn encode_value(value: &Value) -> (u16, u32, Vec<u8>) {
    match value {
        Value::Text(text) => {
            let mut bytes = text.as_bytes().to_vec();
            bytes.push(0);
            (2, bytes.len() as u32, bytes)
        }
        Value::Integer(values) => {
            if values.iter().any(|&v| v < 0) {
                // EXIF has no 64-bit integer type, so out-of-range values
                // saturate at the SLONG bounds.
                let mut bytes = Vec::with_capacity(values.len() * 4);
                for &v in values {
                    let clamped = v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                    bytes.extend_from_slice(&clamped.to_le_bytes());
                }
                (9, values.len() as u32, bytes)
            } else if values.iter().all(|&v| v <= i64::from(u16::MAX)) {
                let mut bytes = Vec::with_capacity(values.len() * 2);
                for &v in values {
                    bytes.extend_from_slice(&(v as u16).to_le_bytes());
                }
                (3, values.len() as u32, bytes)
            } else {
                let mut bytes = Vec::with_capacity(values.len() * 4);
                for &v in values {
                    let clamped = v.min(i64::from(u32::MAX)) as u32;
                    bytes.extend_from_slice(&clamped.to_le_bytes());
                }
                (4, values.len() as u32, bytes)
            }
        }
        Value::Rational(values) => {
            let signed = values.iter().any(|r| r.num < 0 || r.den < 0);
            let mut bytes = Vec::with_capacity(values.len() * 8);
            for r in values {
                if signed {
                    let num = r.num.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                    let den = r.den.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                    bytes.extend_from_slice(&num.to_le_bytes());
                    bytes.extend_from_slice(&den.to_le_bytes());
                } else {
                    let num = r.num.min(i64::from(u32::MAX)) as u32;
                    let den = r.den.min(i64::from(u32::MAX)) as u32;
                    bytes.extend_from_slice(&num.to_le_bytes());
                    bytes.extend_from_slice(&den.to_le_bytes());
                }
            }
            (if signed { 10 } else { 5 }, values.len() as u32, bytes)
        }
        Value::Bytes(bytes) => (7, bytes.len() as u32, bytes.clone()),
    }
}

fn ifd_size(entries: usize) -> usize {
    2 + entries * 12 + 4
}

fn write_ifd(out: &mut Vec<u8>, entries: &[EncodedEntry], heap_base: usize, heap: &mut Vec<u8>) {
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag_id.to_le_bytes());
        out.extend_from_slice(&entry.field_type.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.bytes.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..entry.bytes.len()].copy_from_slice(&entry.bytes);
            out.extend_from_slice(&inline);
        } else {
            let offset = heap_base + heap.len();
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            heap.extend_from_slice(&entry.bytes);
            // TIFF offsets must stay word aligned.
            if heap.len() % 2 == 1 {
                heap.push(0);
            }
        }
    }
    // No chained IFD.
    out.extend_from_slice(&0u32.to_le_bytes());
}

/// Encode a record into a little-endian TIFF block.
pub(crate) fn encode_tiff(record: &MetadataRecord) -> Vec<u8> {
    let mut primary = Vec::new();
    let mut exif = Vec::new();
    let mut gps = Vec::new();
    for (tag, value) in record.iter() {
        // The GPSInfo key is a presence marker, not a stored entry; it comes
        // back as the GPS pointer below.
        if tag == Tag::GpsInfo {
            continue;
        }
        let (field_type, count, bytes) = encode_value(value);
        let entry = EncodedEntry {
            tag_id: tag.id(),
            field_type,
            count,
            bytes,
        };
        match tag.ifd() {
            Ifd::Primary => primary.push(entry),
            Ifd::Exif => exif.push(entry),
            Ifd::Gps => gps.push(entry),
        }
    }

    let want_gps = !gps.is_empty() || record.contains(Tag::GpsInfo);
    if want_gps && gps.is_empty() {
        // A bare presence marker still needs a decodable GPS IFD.
        gps.push(EncodedEntry {
            tag_id: Tag::GpsVersionId.id(),
            field_type: 1,
            count: 4,
            bytes: vec![2, 3, 0, 0],
        });
    }
    let want_exif = !exif.is_empty();

    let ifd0_entries = primary.len() + usize::from(want_exif) + usize::from(want_gps);
    let ifd0_offset = 8usize;
    let exif_offset = ifd0_offset + ifd_size(ifd0_entries);
    let gps_offset = exif_offset + if want_exif { ifd_size(exif.len()) } else { 0 };
    let heap_offset = gps_offset + if want_gps { ifd_size(gps.len()) } else { 0 };

    if want_exif {
        primary.push(EncodedEntry {
            tag_id: EXIF_IFD_POINTER,
            field_type: 4,
            count: 1,
            bytes: (exif_offset as u32).to_le_bytes().to_vec(),
        });
    }
    if want_gps {
        primary.push(EncodedEntry {
            tag_id: GPS_IFD_POINTER,
            field_type: 4,
            count: 1,
            bytes: (gps_offset as u32).to_le_bytes().to_vec(),
        });
    }
    primary.sort_by_key(|e| e.tag_id);
    exif.sort_by_key(|e| e.tag_id);
    gps.sort_by_key(|e| e.tag_id);

    let mut out = Vec::with_capacity(heap_offset);
    out.extend_from_slice(b"II");
    out.extend_from_slice(&TIFF_MAGIC.to_le_bytes());
    out.extend_from_slice(&(ifd0_offset as u32).to_le_bytes());

    let mut heap = Vec::new();
    write_ifd(&mut out, &primary, heap_offset, &mut heap);
    if want_exif {
        write_ifd(&mut out, &exif, heap_offset, &mut heap);
    }
    if want_gps {
        write_ifd(&mut out, &gps, heap_offset, &mut heap);
    }
    out.extend_from_slice(&heap);
    out
}
