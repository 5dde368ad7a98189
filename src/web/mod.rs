//! Web front end: JSON API, admin pages and the HTTP server.

mod api;
mod error;
mod handlers;
mod server;

pub use api::*;
pub use error::ServerError;
pub use handlers::AppState;
pub use server::TutorServer;
