//! Kid-friendly check for reward-image prompts.
//!
//! A prompt is rejected if, lowercased, it contains any blocked keyword as a
//! substring. This is a coarse filter, not a moderation service.

use crate::error::ValidationError;

pub const BLOCKED_KEYWORDS: &[&str] = &[
    "scary", "horror", "violent", "blood", "gore", "weapon", "gun", "knife", "zombie", "ghost",
    "demon", "devil", "evil", "dark", "creepy", "spooky", "monster", "skull", "death", "kill",
    "fight", "war", "angry", "mean",
];

/// The first blocked keyword found in `prompt`, if any.
pub fn blocked_keyword(prompt: &str) -> Option<&'static str> {
    let lower = prompt.to_lowercase();
    BLOCKED_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lower.contains(keyword))
}

pub fn is_kid_friendly(prompt: &str) -> bool {
    blocked_keyword(prompt).is_none()
}

/// Trimmed prompt, or why it cannot be used.
pub fn validate_prompt(prompt: &str) -> Result<&str, ValidationError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    match blocked_keyword(trimmed) {
        Some(keyword) => Err(ValidationError::PromptNotKidFriendly {
            keyword: keyword.to_string(),
        }),
        None => Ok(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_prompt_passes() {
        assert!(is_kid_friendly("a happy puppy on a rainbow"));
        assert_eq!(validate_prompt("  unicorn  "), Ok("unicorn"));
    }

    #[test]
    fn blocked_keyword_is_case_insensitive() {
        assert_eq!(blocked_keyword("A SCARY castle"), Some("scary"));
        assert!(matches!(
            validate_prompt("Zombie party"),
            Err(ValidationError::PromptNotKidFriendly { .. })
        ));
    }

    #[test]
    fn matches_inside_longer_words() {
        // "warm" contains "war".
        assert!(!is_kid_friendly("a warm blanket"));
    }

    #[test]
    fn blank_prompt_rejected() {
        assert_eq!(validate_prompt("   "), Err(ValidationError::EmptyPrompt));
    }
}
