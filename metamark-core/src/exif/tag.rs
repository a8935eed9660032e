//! EXIF tag identities and the known-name table.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

/// Directory a tag lives in within the TIFF structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ifd {
    /// IFD0, the primary image directory.
    Primary,
    /// The Exif sub-IFD (pointer tag 0x8769).
    Exif,
    /// The GPS sub-IFD (pointer tag 0x8825).
    Gps,
}

/// An EXIF tag, either a known name or a raw identifier.
///
/// The known set covers the tags this system reasons about (critical fields,
/// the watermark field, and the common baseline tags cameras write). Anything
/// else round-trips through [`Tag::Unknown`] without losing its identifier or
/// home directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    ImageDescription,
    Make,
    Model,
    Orientation,
    XResolution,
    YResolution,
    ResolutionUnit,
    Software,
    DateTime,
    Artist,
    YCbCrPositioning,
    Copyright,
    ExposureTime,
    FNumber,
    IsoSpeedRatings,
    ExifVersion,
    DateTimeOriginal,
    DateTimeDigitized,
    Flash,
    FocalLength,
    MakerNote,
    UserComment,
    PixelXDimension,
    PixelYDimension,
    /// Presence marker for the GPS sub-IFD; decodes from the pointer tag.
    GpsInfo,
    GpsVersionId,
    GpsLatitudeRef,
    GpsLatitude,
    GpsLongitudeRef,
    GpsLongitude,
    GpsAltitudeRef,
    GpsAltitude,
    GpsTimeStamp,
    GpsDateStamp,
    /// Escape hatch for tags outside the known table.
    Unknown { ifd: Ifd, id: u16 },
}

/// Pointer from the primary IFD to the Exif sub-IFD.
pub(crate) const EXIF_IFD_POINTER: u16 = 0x8769;

/// Pointer from the primary IFD to the GPS sub-IFD.
pub(crate) const GPS_IFD_POINTER: u16 = 0x8825;

const KNOWN: &[(Tag, Ifd, u16, &str)] = &[
    (Tag::ImageDescription, Ifd::Primary, 0x010E, "ImageDescription"),
    (Tag::Make, Ifd::Primary, 0x010F, "Make"),
    (Tag::Model, Ifd::Primary, 0x0110, "Model"),
    (Tag::Orientation, Ifd::Primary, 0x0112, "Orientation"),
    (Tag::XResolution, Ifd::Primary, 0x011A, "XResolution"),
    (Tag::YResolution, Ifd::Primary, 0x011B, "YResolution"),
    (Tag::ResolutionUnit, Ifd::Primary, 0x0128, "ResolutionUnit"),
    (Tag::Software, Ifd::Primary, 0x0131, "Software"),
    (Tag::DateTime, Ifd::Primary, 0x0132, "DateTime"),
    (Tag::Artist, Ifd::Primary, 0x013B, "Artist"),
    (Tag::YCbCrPositioning, Ifd::Primary, 0x0213, "YCbCrPositioning"),
    (Tag::Copyright, Ifd::Primary, 0x8298, "Copyright"),
    (Tag::GpsInfo, Ifd::Primary, GPS_IFD_POINTER, "GPSInfo"),
    (Tag::ExposureTime, Ifd::Exif, 0x829A, "ExposureTime"),
    (Tag::FNumber, Ifd::Exif, 0x829D, "FNumber"),
    (Tag::IsoSpeedRatings, Ifd::Exif, 0x8827, "ISOSpeedRatings"),
    (Tag::ExifVersion, Ifd::Exif, 0x9000, "ExifVersion"),
    (Tag::DateTimeOriginal, Ifd::Exif, 0x9003, "DateTimeOriginal"),
    (Tag::DateTimeDigitized, Ifd::Exif, 0x9004, "DateTimeDigitized"),
    (Tag::Flash, Ifd::Exif, 0x9209, "Flash"),
    (Tag::FocalLength, Ifd::Exif, 0x920A, "FocalLength"),
    (Tag::MakerNote, Ifd::Exif, 0x927C, "MakerNote"),
    (Tag::UserComment, Ifd::Exif, 0x9286, "UserComment"),
    (Tag::PixelXDimension, Ifd::Exif, 0xA002, "PixelXDimension"),
    (Tag::PixelYDimension, Ifd::Exif, 0xA003, "PixelYDimension"),
    (Tag::GpsVersionId, Ifd::Gps, 0x0000, "GPSVersionID"),
    (Tag::GpsLatitudeRef, Ifd::Gps, 0x0001, "GPSLatitudeRef"),
    (Tag::GpsLatitude, Ifd::Gps, 0x0002, "GPSLatitude"),
    (Tag::GpsLongitudeRef, Ifd::Gps, 0x0003, "GPSLongitudeRef"),
    (Tag::GpsLongitude, Ifd::Gps, 0x0004, "GPSLongitude"),
    (Tag::GpsAltitudeRef, Ifd::Gps, 0x0005, "GPSAltitudeRef"),
    (Tag::GpsAltitude, Ifd::Gps, 0x0006, "GPSAltitude"),
    (Tag::GpsTimeStamp, Ifd::Gps, 0x0007, "GPSTimeStamp"),
    (Tag::GpsDateStamp, Ifd::Gps, 0x001D, "GPSDateStamp"),
];

impl Tag {
    /// Resolve a numeric identifier within its directory to a tag.
    pub fn from_id(ifd: Ifd, id: u16) -> Tag {
        KNOWN
            .iter()
            .find(|(_, known_ifd, known_id, _)| *known_ifd == ifd && *known_id == id)
            .map(|(tag, ..)| *tag)
            .unwrap_or(Tag::Unknown { ifd, id })
    }

    /// Numeric identifier written into the TIFF entry.
    pub fn id(&self) -> u16 {
        match self {
            Tag::Unknown { id, .. } => *id,
            _ => KNOWN
                .iter()
                .find(|(tag, ..)| tag == self)
                .map(|(_, _, id, _)| *id)
                .unwrap_or(0),
        }
    }

    /// Directory this tag is encoded into.
    pub fn ifd(&self) -> Ifd {
        match self {
            Tag::Unknown { ifd, .. } => *ifd,
            _ => KNOWN
                .iter()
                .find(|(tag, ..)| tag == self)
                .map(|(_, ifd, ..)| *ifd)
                .unwrap_or(Ifd::Primary),
        }
    }

    /// Human-readable tag name. Unknown tags render as `Tag0xNNNN`.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Tag::Unknown { id, .. } => Cow::Owned(format!("Tag0x{id:04X}")),
            _ => KNOWN
                .iter()
                .find(|(tag, ..)| tag == self)
                .map(|(_, _, _, name)| Cow::Borrowed(*name))
                .unwrap_or(Cow::Borrowed("Tag")),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}
