//! Data transfer objects for the application layer.

mod meme_dto;

pub use meme_dto::{CreateMemeResponse, SweepReport};
