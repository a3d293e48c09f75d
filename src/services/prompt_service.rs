const FORMAT_INSTRUCTIONS: &str = r#"Generate flashcards from the following text. Format your response as JSON with this structure:
{
  "flashcards": [
    {"question": "Question 1", "answer": "Answer 1"},
    {"question": "Question 2", "answer": "Answer 2"}
  ]
}"#;

const DEFAULT_DIRECTIVE: &str =
    "Create standard Q&A flashcards covering the key concepts, definitions, and important points.";

/// Builds the model prompt for a study request. Returns `None` for blank
/// content; nothing should be sent to the model in that case.
pub fn build_prompt(content: &str, instruction: &str) -> Option<String> {
    if content.trim().is_empty() {
        return None;
    }

    let directive = if instruction.trim().is_empty() {
        DEFAULT_DIRECTIVE.to_string()
    } else {
        format!(
            "CUSTOM INSTRUCTIONS: {}\n\nPlease follow the above instructions when creating the flashcards.",
            instruction.trim()
        )
    };

    Some(format!(
        "{}\n\n{}\n\nText to generate flashcards from:\n{}",
        FORMAT_INSTRUCTIONS, directive, content
    ))
}
