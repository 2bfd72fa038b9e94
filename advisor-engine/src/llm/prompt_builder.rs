use advisor_core::{ConversationMessage, MessageRole, RetrievalContext};

/// Assembles the single prompt sent to the language model: fixed system
/// instruction, retrieved context with provenance, bounded conversation
/// history, then the user question.
pub struct PromptBuilder;

const SYSTEM_INSTRUCTION: &str = "You are a financial analysis assistant for a portfolio \
tracking application. Answer questions about markets, stocks, and investing using the \
retrieved reference material below when it is relevant. Cite the bracketed source names \
you rely on. If the reference material does not cover the question, say so and answer \
from general knowledge. Do not invent prices or figures. Keep answers concise and do not \
give personalized investment advice.";

impl PromptBuilder {
    /// Build the prompt. Only the last `history_window` messages of
    /// `history` are included; older messages have no effect on the output.
    pub fn build(
        message: &str,
        context: &RetrievalContext,
        history: &[ConversationMessage],
        history_window: usize,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(SYSTEM_INSTRUCTION);
        prompt.push_str("\n\n");

        if context.is_empty() {
            prompt.push_str("REFERENCE MATERIAL:\n");
            prompt.push_str("[No relevant documents were retrieved for this question]\n");
        } else {
            prompt.push_str("REFERENCE MATERIAL:\n");
            prompt.push_str(&context.context);
            prompt.push('\n');

            let sources: Vec<&str> = context.sources.iter().map(|s| s.as_str()).collect();
            prompt.push_str(&format!("Sources: {}\n", sources.join(", ")));
        }

        let recent = recent_history(history, history_window);
        if !recent.is_empty() {
            prompt.push_str("\nCONVERSATION SO FAR:\n");
            for msg in recent {
                let speaker = match msg.role {
                    MessageRole::User => "User",
                    MessageRole::Assistant => "Assistant",
                };
                prompt.push_str(&format!("{}: {}\n", speaker, msg.content));
            }
        }

        prompt.push_str("\nQUESTION:\n");
        prompt.push_str(message);
        prompt.push('\n');

        prompt
    }
}

fn recent_history(history: &[ConversationMessage], window: usize) -> &[ConversationMessage] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}
