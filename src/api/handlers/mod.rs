//! HTTP request handlers for API endpoints.

pub mod health;
pub mod mappings;
pub mod redirect;
pub mod shorten;
pub mod update;

pub use health::health_handler;
pub use mappings::{mapping_handler, mapping_list_handler};
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use update::{update_expiry_handler, update_handler};
