pub mod auth;
pub mod dm;
pub mod error;
pub mod extract;
pub mod feed;
pub mod middleware;
pub mod password;
pub mod router;
pub mod users;

mod rows;
