//! Emitters for the decoded world.
pub mod json;
