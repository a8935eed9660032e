//! JPEG segment surgery.
//!
//! Metadata lives in an APP1 segment near the start of a JPEG stream. This
//! module locates, removes and inserts that segment by splicing bytes; the
//! compressed scan data is never touched, so pixel content survives every
//! rewrite bit for bit.

use crate::error::{MetamarkError, Result};

pub(crate) const MARKER_SOI: u8 = 0xD8;
pub(crate) const MARKER_APP1: u8 = 0xE1;
const MARKER_SOS: u8 = 0xDA;
const MARKER_EOI: u8 = 0xD9;

/// Identifier prefix of an EXIF APP1 payload.
pub(crate) const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest TIFF block that fits an APP1 segment: the u16 segment length
/// counts itself plus the six identifier bytes.
pub(crate) const MAX_TIFF_PAYLOAD: usize = 65527;

/// A marker segment located in the stream.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SegmentSpan {
    pub marker: u8,
    /// Offset of the 0xFF marker byte.
    pub start: usize,
    /// Offset of the first payload byte, past the two length bytes.
    pub data_start: usize,
    /// One past the final payload byte.
    pub end: usize,
}

/// Walk marker segments from SOI up to the scan data.
///
/// Returns the located segments and the offset where scanning stopped (the
/// SOS or EOI marker, or the end of the buffer). Everything from that offset
/// on is opaque to the rewriting code and copied through verbatim.
pub(crate) fn walk_segments(bytes: &[u8]) -> Result<(Vec<SegmentSpan>, usize)> {
    if bytes.len() < 2 || bytes[0] != 0xFF || bytes[1] != MARKER_SOI {
        return Err(MetamarkError::Decode("Missing JPEG SOI marker".to_string()));
    }

    let mut spans = Vec::new();
    let mut pos = 2;
    loop {
        // Markers may be padded with extra 0xFF fill bytes.
        while pos + 1 < bytes.len() && bytes[pos] == 0xFF && bytes[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= bytes.len() {
            return Ok((spans, bytes.len()));
        }
        if bytes[pos] != 0xFF {
            return Err(MetamarkError::Decode(format!(
                "Expected a marker at offset {pos}"
            )));
        }

        let marker = bytes[pos + 1];
        if marker == MARKER_SOS || marker == MARKER_EOI {
            return Ok((spans, pos));
        }
        // TEM and restart markers carry no length.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        if pos + 4 > bytes.len() {
            return Err(MetamarkError::Decode(
                "Truncated JPEG segment header".to_string(),
            ));
        }
        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if length < 2 {
            return Err(MetamarkError::Decode(format!(
                "Invalid JPEG segment length {length}"
            )));
        }
        let end = pos + 2 + length;
        if end > bytes.len() {
            return Err(MetamarkError::Decode(
                "JPEG segment overruns the file".to_string(),
            ));
        }
        spans.push(SegmentSpan {
            marker,
            start: pos,
            data_start: pos + 4,
            end,
        });
        pos = end;
    }
}

fn is_exif_span(bytes: &[u8], span: &SegmentSpan) -> bool {
    span.marker == MARKER_APP1 && bytes[span.data_start..span.end].starts_with(EXIF_HEADER)
}

/// TIFF block of the first EXIF APP1 segment, if any.
pub(crate) fn extract_exif_payload(bytes: &[u8]) -> Option<&[u8]> {
    let (spans, _) = walk_segments(bytes).ok()?;
    spans
        .iter()
        .find(|span| is_exif_span(bytes, span))
        .map(|span| &bytes[span.data_start + EXIF_HEADER.len()..span.end])
}

/// Copy of the stream with every EXIF APP1 segment removed.
pub(crate) fn strip_exif(bytes: &[u8]) -> Result<Vec<u8>> {
    let (spans, _) = walk_segments(bytes)?;
    let mut out = Vec::with_capacity(bytes.len());
    out.extend_from_slice(&bytes[..2]);
    let mut cursor = 2;
    for span in &spans {
        out.extend_from_slice(&bytes[cursor..span.start]);
        if !is_exif_span(bytes, span) {
            out.extend_from_slice(&bytes[span.start..span.end]);
        }
        cursor = span.end;
    }
    out.extend_from_slice(&bytes[cursor..]);
    Ok(out)
}

/// Copy of the stream with its EXIF segment replaced by `tiff`.
///
/// Existing EXIF segments are dropped and a single fresh APP1 is inserted
/// directly after SOI.
pub(crate) fn replace_exif(bytes: &[u8], tiff: &[u8]) -> Result<Vec<u8>> {
    if tiff.len() > MAX_TIFF_PAYLOAD {
        return Err(MetamarkError::MetadataTooLarge {
            size: tiff.len(),
            limit: MAX_TIFF_PAYLOAD,
        });
    }
    let stripped = strip_exif(bytes)?;
    let payload_len = EXIF_HEADER.len() + tiff.len();

    let mut out = Vec::with_capacity(stripped.len() + payload_len + 4);
    out.extend_from_slice(&stripped[..2]);
    out.push(0xFF);
    out.push(MARKER_APP1);
    out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&stripped[2..]);
    Ok(out)
}
