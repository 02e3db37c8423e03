//! Answer generation: context assembly and prompt composition

pub mod prompt;

pub use prompt::{
    assemble_context, compose_user_message, CHAT_SYSTEM_PROMPT, RAG_SYSTEM_PROMPT,
};
