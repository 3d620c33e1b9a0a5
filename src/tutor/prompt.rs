// src/tutor/prompt.rs
// Builds the user message that carries the student's pedagogical context.

use crate::session::StudentProfile;

/// Combines the student's class, board, language preference and name with the
/// literal question into a single user message for the chat API.
pub fn context_prompt(profile: &StudentProfile, question: &str) -> String {
    format!(
        "Student is in {class} under {board} board. \
         The preferred language style is {language}. \
         The student's name is {name}. \
         Answer the following question in a way that matches the student's \
         maturity level and preferred language style.\n\
         Question: {question}",
        class = profile.class_level,
        board = profile.board,
        language = profile.language_style,
        name = profile.display_name,
        question = question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn prompt_carries_all_profile_fields_and_question() {
        let profile = StudentProfile {
            session_id: "s1".into(),
            class_level: "Class 7".into(),
            board: "ICSE".into(),
            language_style: "Hinglish".into(),
            display_name: "Ravi".into(),
            registered_at: Utc::now(),
        };

        let prompt = context_prompt(&profile, "Why is the sky blue?");
        assert!(prompt.contains("Class 7"));
        assert!(prompt.contains("ICSE"));
        assert!(prompt.contains("Hinglish"));
        assert!(prompt.contains("Ravi"));
        assert!(prompt.ends_with("Question: Why is the sky blue?"));
    }
}
