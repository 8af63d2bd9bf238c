//! Kernel utilities shared across slices.
//! Keep this crate lightweight: layered config loading, the shared API state, the health
//! route and the error body every HTTP handler responds with.
//!
//! ## Config loading
//! ```rust,no_run
//! use folio_kernel::config::load_config;
//! use folio_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use folio_domain as domain;
