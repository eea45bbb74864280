//! Use case implementations.

mod create_meme_use_case;

pub use create_meme_use_case::CreateMemeUseCase;
