//! Request extractors.

mod actor;

pub use actor::{ACTOR_HEADER, Actor};
