//! Typed client for the Agora API.
//!
//! All state a client needs lives in an explicit [`Session`]: where the
//! server is and, once logged in, the bearer token. Nothing is global, so
//! several sessions (say, two users in a test) can coexist.

pub mod error;
pub mod session;
pub mod settings;

pub use error::ClientError;
pub use session::Session;
