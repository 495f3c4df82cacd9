//! Query functions over a borrowed [`rusqlite::Connection`].
//!
//! Everything here is synchronous. Route handlers run these inside
//! [`crate::state::State::db`], which moves the work onto the blocking pool.
pub mod check_ins;
pub mod content;
pub mod couples;
pub mod users;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
