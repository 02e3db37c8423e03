//! Context assembly and prompt composition for RAG answers

use crate::types::Hit;

/// System instruction for direct chat
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// System instruction for RAG answers
pub const RAG_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the provided context to answer.";

/// Concatenate ranked hits into one bounded context block.
///
/// Each hit becomes a block of `"[{source}#{chunk}]\n{text}\n"`, with
/// `source` falling back to `"?"` and `chunk` rendering as empty when
/// absent. Blocks are accumulated in hit order while the running total
/// (counting the block about to be added) stays within `max_chars`; the
/// first block that would overflow stops assembly outright, so the output
/// is always a prefix of the ranked hits. A first block that alone
/// exceeds the budget yields the empty string.
pub fn assemble_context(hits: &[Hit], max_chars: usize) -> String {
    let mut blocks = Vec::new();
    let mut used = 0usize;

    for hit in hits {
        let source = hit.metadata.source.as_deref().unwrap_or("?");
        let chunk = hit
            .metadata
            .chunk
            .map(|n| n.to_string())
            .unwrap_or_default();
        let block = format!("[{}#{}]\n{}\n", source, chunk, hit.text);

        if used + block.len() > max_chars {
            break;
        }
        used += block.len();
        blocks.push(block);
    }

    blocks.join("\n")
}

/// The composite user message the chat collaborator expects, verbatim.
pub fn compose_user_message(context: &str, question: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, question)
}
