//! # lookupd Providers
//!
//! One stateless client per external lookup service. Each client owns a
//! [`reqwest::Client`], builds the upstream request from normalized inputs,
//! and parses the response into typed models. Clients perform no caching and
//! hold no shared state; the write-through cache lives with the handlers that
//! call them.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod autocomplete;
pub mod email;
pub mod geoapify;
pub mod google;
pub mod maptiler;
pub mod nominatim;
pub mod whois;

pub use autocomplete::{AutocompleteResponse, PlacesClient, PlacesConfig, Prediction};
pub use email::{EmailMessage, MailerClient, MailerConfig};
pub use geoapify::{GeoapifyClient, GeoapifyConfig, GeoapifyResponse};
pub use google::{GeocodingClient, GeocodingConfig, GeocodingResponse};
pub use maptiler::{MapTilerClient, MapTilerConfig, MapTilerResponse};
pub use nominatim::{NominatimClient, NominatimConfig, NominatimResult};
pub use whois::{WhoisClient, WhoisConfig, WhoisRecord};
