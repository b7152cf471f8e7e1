//! Google REST sources.
//!
//! Both sources authenticate with a bearer token read from the token file of
//! their stream (see [`token`]). Token acquisition and refresh happen outside
//! the engine.

pub mod people;
pub mod tasks;
pub mod token;

pub use people::GooglePeopleSource;
pub use tasks::GoogleTasksSource;
pub use token::{AccessToken, TokenFile};
