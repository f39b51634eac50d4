//! Field alert map data pipeline.
//!
//! Loads a site location workbook and an alert workbook, joins them on
//! site code, ranks the alerted sites by geodesic distance from a
//! reference point and prepares the records for a map renderer.
//!
//! ```ignore
//! use field_map::{prepare, filter, GeoPoint, ALERT_SHEET};
//!
//! let reference = GeoPoint::new(38.7223, -9.1393);
//! let prepared = prepare(&loc_bytes, &alert_bytes, reference, ALERT_SHEET)?;
//! let state = filter::FilterState::default();
//! let visible = filter::apply(&prepared.records, prepared.has_chain_code, &state);
//! ```

pub mod cache;
pub mod cli;
pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod types;
pub mod util;
pub mod workbook;

pub use error::{MapError, Result, Warning};
pub use geo::GeoPoint;
pub use loader::ALERT_SHEET;
pub use pipeline::prepare;
