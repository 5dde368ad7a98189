//! Generation service client and tutor prompts.

mod backend;
mod client;
mod prompts;

pub use backend::GenerationBackend;
pub use client::*;
pub use prompts::{
    build_tutor_prompt, CONTEXT_END_MARKER, CONTEXT_START_MARKER, IMAGE_LEARNING_PROMPT,
};
