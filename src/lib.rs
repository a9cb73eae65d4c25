//! # exif-view
//!
//! Desktop EXIF viewer — inspect the camera, exposure, timestamp, and GPS
//! metadata embedded in a photo, next to a thumbnail preview.
//!
//! The library half of the crate is the metadata decoder and its display
//! formatting; the `exif-view` binary (behind the `gui` feature) is the
//! eframe application that drives them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_view::{exif, format};
//!
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     let record = exif::decode(&bytes)?;
//!
//!     println!("Make:     {}", format::or_unknown(record.make.as_deref()));
//!     println!("Model:    {}", format::or_unknown(record.model.as_deref()));
//!     println!("Taken:    {}", format::timestamp(record.capture_timestamp.as_deref()));
//!     if let Some(f) = record.f_number {
//!         println!("Aperture: {}", format::f_number(f));
//!     }
//!     if let Some(t) = record.exposure_time {
//!         println!("Shutter:  {}", format::exposure_time(t));
//!     }
//!     if let (Some(lat), Some(lon)) = (record.latitude, record.longitude) {
//!         println!("Location: {}", format::coordinates(lat, lon, 6));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`exif`] — metadata decoding: [`exif::decode`], [`exif::MetadataRecord`]
//! - [`format`] — display formatting for decoded values
//! - [`config`] — viewer configuration loading/saving

pub mod config;
pub mod exif;
pub mod format;
