use docqa_core::types::SearchResult;

/// Returned by `generate` when there is no context to ground an answer in.
pub const NO_CONTEXT_ANSWER: &str = "I couldn't find relevant information to answer your question.";

/// Render retrieved chunks as `Source:`/`Content:` blocks separated by a blank line.
pub fn render_context(chunks: &[SearchResult]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            let source = if chunk.metadata.source.is_empty() {
                "Unknown"
            } else {
                chunk.metadata.source.as_str()
            };
            format!("Source: {}\nContent: {}", source, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, chunks: &[SearchResult]) -> String {
    format!(
        "Based on the following context from documents, answer the user's question \
accurately and concisely.

Context:
{context}

Question: {question}

Instructions:
- Answer based only on the provided context
- Be precise and factual
- If the context doesn't contain enough information, say so
- Cite the source document when relevant

Answer:",
        context = render_context(chunks),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::types::ChunkMetadata;

    fn hit(source: &str, content: &str) -> SearchResult {
        SearchResult {
            content: content.to_string(),
            metadata: ChunkMetadata { source: source.to_string(), ..Default::default() },
            similarity: 0.9,
        }
    }

    #[test]
    fn context_blocks_carry_source_attribution() {
        let ctx = render_context(&[hit("docs/a.txt", "alpha"), hit("", "beta")]);
        assert_eq!(ctx, "Source: docs/a.txt\nContent: alpha\n\nSource: Unknown\nContent: beta");
    }

    #[test]
    fn prompt_wraps_context_and_question() {
        let prompt = build_prompt("What is alpha?", &[hit("docs/a.txt", "alpha")]);
        assert!(prompt.starts_with("Based on the following context from documents"));
        let expected = "Context:\nSource: docs/a.txt\nContent: alpha\n\nQuestion: What is alpha?";
        assert!(prompt.contains(expected));
        assert!(prompt.ends_with("Answer:"));
    }
}
