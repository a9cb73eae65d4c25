use std::io::Cursor;

use nom_exif::{EntryValue, Exif, ExifIter, ExifTag, LatLng, MediaParser, MediaSource};

/// A numerator/denominator pair as stored in EXIF rational tags.
///
/// Valid records never carry a zero denominator — [`decode`] rejects those
/// with [`DecodeError::ZeroDenominator`] instead of letting them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    pub fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// The rational as a float. The denominator is non-zero by construction.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }
}

/// Metadata extracted from a single image.
///
/// Every field is independently optional: a missing tag leaves its field
/// `None` and never fails the decode. `latitude` and `longitude` are always
/// populated together or absent together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Capture time in the raw EXIF form, `"YYYY:MM:DD HH:MM:SS"`.
    pub capture_timestamp: Option<String>,
    /// Exposure time in seconds.
    pub exposure_time: Option<Rational>,
    pub f_number: Option<Rational>,
    pub iso: Option<u32>,
    /// Focal length in millimeters.
    pub focal_length: Option<Rational>,
    /// Signed decimal degrees, negative in the southern hemisphere.
    pub latitude: Option<f64>,
    /// Signed decimal degrees, negative in the western hemisphere.
    pub longitude: Option<f64>,
}

/// Why a byte stream could not be decoded into a [`MetadataRecord`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Not a recognized image format, a truncated stream, or an image with
    /// no metadata segment at all.
    #[error("no readable metadata: {0}")]
    Unreadable(#[from] nom_exif::Error),
    /// A rational tag carried a zero denominator.
    #[error("malformed {0}: zero denominator")]
    ZeroDenominator(&'static str),
}

/// Decode the EXIF metadata embedded in `bytes`.
///
/// Accepts any format `nom-exif` understands (JPEG, TIFF, HEIC/HEIF). The
/// function is pure over its input: no I/O, no side effects.
///
/// # Example
///
/// ```rust,no_run
/// use exif_view::exif::decode;
///
/// # fn main() -> anyhow::Result<()> {
/// let bytes = std::fs::read("photo.jpg")?;
/// let record = decode(&bytes)?;
/// println!("Camera: {:?} {:?}", record.make, record.model);
/// if let (Some(lat), Some(lon)) = (record.latitude, record.longitude) {
///     println!("Taken at {lat:.6}, {lon:.6}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn decode(bytes: &[u8]) -> Result<MetadataRecord, DecodeError> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::seekable(Cursor::new(bytes))?;

    let iter: ExifIter = parser.parse(ms)?;

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let mut record = MetadataRecord {
        make: exif.get(ExifTag::Make).and_then(entry_to_string),
        model: exif.get(ExifTag::Model).and_then(entry_to_string),
        capture_timestamp: exif
            .get(ExifTag::DateTimeOriginal)
            .or_else(|| exif.get(ExifTag::ModifyDate))
            .and_then(entry_to_timestamp),
        exposure_time: entry_to_rational(exif.get(ExifTag::ExposureTime), "exposure time")?,
        f_number: entry_to_rational(exif.get(ExifTag::FNumber), "f-number")?,
        iso: exif.get(ExifTag::ISOSpeedRatings).and_then(entry_to_u32),
        focal_length: entry_to_rational(exif.get(ExifTag::FocalLength), "focal length")?,
        latitude: None,
        longitude: None,
    };

    // Latitude and longitude are set together or not at all; parse_gps_info
    // only yields a value when both coordinate triples and both hemisphere
    // references are present.
    if let Some(gps) = gps_info {
        record.latitude = Some(dms_to_decimal(&gps.latitude, gps.latitude_ref)?);
        record.longitude = Some(dms_to_decimal(&gps.longitude, gps.longitude_ref)?);
    }

    Ok(record)
}

/// Convert an EntryValue to a trimmed, non-empty string.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .trim_matches('"')
        .trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Convert a date/time EntryValue back to the raw EXIF `YYYY:MM:DD HH:MM:SS`
/// form. `nom-exif` parses well-formed timestamps into `Time` values;
/// malformed ones come through as text and are kept as-is.
fn entry_to_timestamp(val: &EntryValue) -> Option<String> {
    match val {
        EntryValue::Time(t) => Some(t.format("%Y:%m:%d %H:%M:%S").to_string()),
        _ => entry_to_string(val),
    }
}

fn entry_to_rational(
    val: Option<&EntryValue>,
    tag_name: &'static str,
) -> Result<Option<Rational>, DecodeError> {
    let rational = match val {
        Some(EntryValue::URational(r)) => Some(Rational::new(r.0, r.1)),
        Some(EntryValue::URationalArray(arr)) => arr.first().map(|r| Rational::new(r.0, r.1)),
        _ => None,
    };
    match rational {
        Some(r) if r.denom == 0 => Err(DecodeError::ZeroDenominator(tag_name)),
        other => Ok(other),
    }
}

fn entry_to_u32(val: &EntryValue) -> Option<u32> {
    match val {
        EntryValue::U16(v) => Some(*v as u32),
        EntryValue::U32(v) => Some(*v),
        EntryValue::U64(v) => u32::try_from(*v).ok(),
        other => other.to_string().trim().parse().ok(),
    }
}

/// Convert a DMS triple (degrees, minutes, seconds as rationals) plus a
/// hemisphere reference to signed decimal degrees:
/// `deg + min/60 + sec/3600`, negated for `S` and `W`.
fn dms_to_decimal(dms: &LatLng, hemisphere: char) -> Result<f64, DecodeError> {
    for part in [&dms.0, &dms.1, &dms.2] {
        if part.1 == 0 {
            return Err(DecodeError::ZeroDenominator("GPS coordinate"));
        }
    }

    let degrees = dms.0.0 as f64 / dms.0.1 as f64;
    let minutes = dms.1.0 as f64 / dms.1.1 as f64;
    let seconds = dms.2.0 as f64 / dms.2.1 as f64;

    let dd = degrees + minutes / 60.0 + seconds / 3600.0;

    Ok(if hemisphere == 'S' || hemisphere == 'W' {
        -dd
    } else {
        dd
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latlng(d: (u32, u32), m: (u32, u32), s: (u32, u32)) -> LatLng {
        [d, m, s].into()
    }

    // ── dms_to_decimal ───────────────────────────────────────────────

    #[test]
    fn dms_north_south_antisymmetry() {
        let dms = latlng((39, 1), (54, 1), (2238, 100));
        let north = dms_to_decimal(&dms, 'N').unwrap();
        let south = dms_to_decimal(&dms, 'S').unwrap();
        assert_eq!(north, -south);
        assert!(north > 0.0);
    }

    #[test]
    fn dms_east_west_antisymmetry() {
        let dms = latlng((116, 1), (23, 1), (2946, 100));
        let east = dms_to_decimal(&dms, 'E').unwrap();
        let west = dms_to_decimal(&dms, 'W').unwrap();
        assert_eq!(east, -west);
    }

    #[test]
    fn dms_zero_is_sign_invariant() {
        let dms = latlng((0, 1), (0, 1), (0, 1));
        for hemisphere in ['N', 'S', 'E', 'W'] {
            assert_eq!(dms_to_decimal(&dms, hemisphere).unwrap(), 0.0);
        }
    }

    #[test]
    fn dms_monotonic_in_degrees() {
        let mut previous = f64::NEG_INFINITY;
        for degrees in [0u32, 10, 45, 89, 180] {
            let dms = latlng((degrees, 1), (30, 1), (15, 1));
            let dd = dms_to_decimal(&dms, 'N').unwrap();
            assert!(dd > previous);
            previous = dd;
        }
    }

    #[test]
    fn dms_exact_conversion() {
        // 30° 30' 0" = 30.5°
        let dms = latlng((30, 1), (30, 1), (0, 1));
        assert_eq!(dms_to_decimal(&dms, 'N').unwrap(), 30.5);
    }

    #[test]
    fn dms_zero_denominator_is_an_error() {
        let dms = latlng((39, 1), (54, 0), (0, 1));
        let err = dms_to_decimal(&dms, 'N').unwrap_err();
        assert!(matches!(err, DecodeError::ZeroDenominator(_)));
    }

    // ── decode: error paths ──────────────────────────────────────────

    #[test]
    fn decode_rejects_non_image_bytes() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn decode_rejects_truncated_jpeg() {
        // SOI marker only, no segments
        assert!(decode(&[0xFF, 0xD8]).is_err());
    }

    // ── decode: well-formed streams, via hand-built TIFF fixtures ────

    const ASCII: u16 = 2;
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    const RATIONAL: u16 = 5;

    const TAG_MAKE: u16 = 0x010F;
    const TAG_MODEL: u16 = 0x0110;
    const TAG_EXIF_OFFSET: u16 = 0x8769;
    const TAG_EXPOSURE_TIME: u16 = 0x829A;
    const TAG_F_NUMBER: u16 = 0x829D;
    const TAG_ISO: u16 = 0x8827;
    const TAG_DATETIME_ORIGINAL: u16 = 0x9003;
    const TAG_FOCAL_LENGTH: u16 = 0x920A;

    #[derive(Clone)]
    struct Entry {
        tag: u16,
        typ: u16,
        count: u32,
        value: Vec<u8>,
    }

    fn ascii(tag: u16, s: &str) -> Entry {
        let mut value = s.as_bytes().to_vec();
        value.push(0);
        Entry { tag, typ: ASCII, count: value.len() as u32, value }
    }

    fn rational(tag: u16, num: u32, denom: u32) -> Entry {
        let mut value = num.to_le_bytes().to_vec();
        value.extend_from_slice(&denom.to_le_bytes());
        Entry { tag, typ: RATIONAL, count: 1, value }
    }

    fn short(tag: u16, v: u16) -> Entry {
        Entry { tag, typ: SHORT, count: 1, value: v.to_le_bytes().to_vec() }
    }

    fn long(tag: u16, v: u32) -> Entry {
        Entry { tag, typ: LONG, count: 1, value: v.to_le_bytes().to_vec() }
    }

    fn padded_len(len: usize) -> usize {
        len + (len & 1)
    }

    fn out_of_line_len(entries: &[Entry]) -> usize {
        entries
            .iter()
            .map(|e| if e.value.len() > 4 { padded_len(e.value.len()) } else { 0 })
            .sum()
    }

    /// Serialize one IFD at `ifd_offset`: entry count, entries sorted by
    /// tag, next-IFD offset of zero, then the out-of-line value area.
    fn write_ifd(out: &mut Vec<u8>, mut entries: Vec<Entry>, ifd_offset: usize) {
        entries.sort_by_key(|e| e.tag);
        let mut value_cursor = ifd_offset + 2 + entries.len() * 12 + 4;

        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for entry in &entries {
            out.extend_from_slice(&entry.tag.to_le_bytes());
            out.extend_from_slice(&entry.typ.to_le_bytes());
            out.extend_from_slice(&entry.count.to_le_bytes());
            if entry.value.len() <= 4 {
                let mut inline = entry.value.clone();
                inline.resize(4, 0);
                out.extend_from_slice(&inline);
            } else {
                out.extend_from_slice(&(value_cursor as u32).to_le_bytes());
                value_cursor += padded_len(entry.value.len());
            }
        }
        out.extend_from_slice(&0u32.to_le_bytes());
        for entry in &entries {
            if entry.value.len() > 4 {
                out.extend_from_slice(&entry.value);
                if entry.value.len() & 1 == 1 {
                    out.push(0);
                }
            }
        }
    }

    /// A minimal little-endian TIFF: header, IFD0, and an optional Exif
    /// sub-IFD placed directly after IFD0's value area.
    fn build_tiff(mut ifd0: Vec<Entry>, exif_ifd: Vec<Entry>) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());

        if exif_ifd.is_empty() {
            write_ifd(&mut out, ifd0, 8);
        } else {
            let exif_offset = 8 + 2 + (ifd0.len() + 1) * 12 + 4 + out_of_line_len(&ifd0);
            ifd0.push(long(TAG_EXIF_OFFSET, exif_offset as u32));
            write_ifd(&mut out, ifd0, 8);
            write_ifd(&mut out, exif_ifd, exif_offset);
        }
        // nom-exif parses through a 128-byte header window and errors with
        // UnexpectedEof on any shorter stream. The IFD chain already ends at
        // its zero next-offset, so trailing zero bytes are ignored by the
        // parser — pad tiny fixtures past the window so they stay readable.
        if out.len() < 256 {
            out.resize(256, 0);
        }
        out
    }

    #[test]
    fn decode_make_model_only() {
        let tiff = build_tiff(
            vec![ascii(TAG_MAKE, "Canon"), ascii(TAG_MODEL, "Canon EOS R5")],
            vec![],
        );
        let record = decode(&tiff).unwrap();

        assert_eq!(record.make.as_deref(), Some("Canon"));
        assert_eq!(record.model.as_deref(), Some("Canon EOS R5"));
        assert_eq!(record.capture_timestamp, None);
        assert_eq!(record.exposure_time, None);
        assert_eq!(record.f_number, None);
        assert_eq!(record.iso, None);
        assert_eq!(record.focal_length, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
    }

    #[test]
    fn decode_full_exposure_block() {
        let tiff = build_tiff(
            vec![ascii(TAG_MAKE, "Nikon")],
            vec![
                rational(TAG_EXPOSURE_TIME, 1, 200),
                rational(TAG_F_NUMBER, 28, 10),
                short(TAG_ISO, 400),
                ascii(TAG_DATETIME_ORIGINAL, "2023:05:17 14:30:00"),
                rational(TAG_FOCAL_LENGTH, 500, 10),
            ],
        );
        let record = decode(&tiff).unwrap();

        assert_eq!(record.make.as_deref(), Some("Nikon"));
        assert_eq!(record.exposure_time, Some(Rational::new(1, 200)));
        assert_eq!(record.f_number, Some(Rational::new(28, 10)));
        assert_eq!(record.iso, Some(400));
        assert_eq!(record.focal_length, Some(Rational::new(500, 10)));
        let ts = record.capture_timestamp.expect("timestamp present");
        assert!(
            ts.contains("2023") && ts.contains("14:30"),
            "unexpected timestamp: {ts}"
        );
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
    }

    #[test]
    fn decode_zero_denominator_exposure_fails() {
        let tiff = build_tiff(
            vec![ascii(TAG_MAKE, "Nikon")],
            vec![rational(TAG_EXPOSURE_TIME, 1, 0)],
        );
        let err = decode(&tiff).unwrap_err();
        assert!(matches!(err, DecodeError::ZeroDenominator("exposure time")));
    }
}
