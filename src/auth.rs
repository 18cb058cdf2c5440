//! Session credentials, access-token claims, and persisted user models.

pub mod claims;
pub mod secret;
pub mod session;

pub use claims::*;
pub use secret::*;
pub use session::*;
