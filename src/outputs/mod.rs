//! File outputs.
//!
//! # Submodules
//!
//! - [`html`]: Assembles report sections into one static HTML page
//! - [`json`]: Writes a normalized [`crate::models::Feed`] to disk
//!
//! # Output Structure
//!
//! ```text
//! reports/
//! ├── report.html
//! ├── leaflet.css   # supplied by the caller
//! └── leaflet.js    # supplied by the caller
//! ```

pub mod html;
pub mod json;
