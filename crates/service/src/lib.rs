//! Service layer: booking rules and CRUD operations on top of `models`.
//! - `availability` decides which slots are free.
//! - `db` holds one module of free functions per resource.
//! - `export` and `seed` back the admin console and the setup command.

pub mod errors;
pub mod clock;
pub mod availability;
pub mod db;
pub mod export;
pub mod seed;
#[cfg(test)]
pub mod test_support;
