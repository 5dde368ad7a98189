//! Prompts sent to the generation service.

/// Marker opening the knowledge base block in the tutor prompt.
pub const CONTEXT_START_MARKER: &str = "---Knowledge Base---";

/// Marker closing the knowledge base block in the tutor prompt.
pub const CONTEXT_END_MARKER: &str = "---";

/// Prompt sent alongside an uploaded image when the admin teaches from it.
pub const IMAGE_LEARNING_PROMPT: &str = "The following image contains a mathematical or physics concept, formula, \
or problem from an HSC-level textbook. Analyze it, summarize the key information, \
and integrate this knowledge into your base to solve future user questions. \
Confirm learning with the message: 'New content added to knowledge base from image.'";

/// Build the tutor prompt for a question.
///
/// `context` is embedded verbatim between the knowledge base markers and
/// `question` is appended verbatim. Neither is escaped. The caller rejects
/// empty questions.
#[must_use]
pub fn build_tutor_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an HSC-level Math and Physics Tutor for students in Bangladesh. \
You have the following supplementary information from textbooks/notes that you MUST use to answer the question: \
\n{CONTEXT_START_MARKER}\n{context}\n{CONTEXT_END_MARKER}\n\
Now, provide a detailed and accurate solution to the question below. \
Respond in Bengali (Bangla) for the user's ease of understanding. \
Question: {question}"
    )
}
