//! # qrgen
//!
//! Turns structured intents into QR codes.
//!
//! `qrgen` builds the payload string for a WiFi network, contact card, calendar
//! event, link, phone number, location and more, following the micro-format that
//! scanner apps expect (`WIFI:...`, `MECARD:...`, `mailto:...`, `VEVENT`). The
//! payload is encoded into a QR symbol and drawn in the requested output format.
//!
//! ## Features
//!
//! - Payload builders for twelve intents with the correct escaping, field order
//!   and optional-field omission.
//! - Four error correction levels: L, M, Q, H.
//! - Output as PNG, SVG (document, embeddable fragment, single path), half-block
//!   text, or a run-length compressed HTML table.
//! - Route and query-string glue for serving all of the above over HTTP.
//!
//! ## Example
//!
//! Render a WiFi network as an HTML table:
//!
//! ```rust
//! use qrgen::payload::{wifi, WifiFields, WifiType};
//! use qrgen::{render, ErrorCorrectionLevel, OutputFormat};
//!
//! let payload = wifi(&WifiFields {
//!     auth: Some(WifiType::Wpa),
//!     ssid: Some("home".into()),
//!     password: Some("secret".into()),
//!     ..Default::default()
//! });
//! assert_eq!(payload, "WIFI:T:WPA;S:home;P:secret;;");
//!
//! let out = render(&payload, ErrorCorrectionLevel::M, OutputFormat::Html).unwrap();
//! assert_eq!(out.media_type, "text/html");
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: One builder per intent.
//! - [`escape`]: Reserved-character escaping for WiFi and bookmark fields.
//! - [`encoder`]: The QR encoder seam and the module matrix.
//! - [`render`]: Output formats.
//! - [`dispatch`]: Route and query-string parsing.

pub mod config;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod format;
pub mod payload;
pub mod render;

pub use config::RenderOptions;
pub use error::{ConfigError, QrgenError, Result};
pub use format::{ErrorCorrectionLevel, OutputFormat};
pub use render::{render, Rendered, Renderer};
