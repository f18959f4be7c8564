//! Fixed entry point and universal navigation tokens.

use crate::message::Reply;
use bot_core::TaskId;

pub const BACK_LABEL: &str = "Back";
pub const DONE_LABEL: &str = "Done";

pub const MENU_PROMPT: &str = "Choose an option:";
pub const GREETING: &str = "Hi, I'm a bot for solving economics problems. \
     Use the buttons to navigate between tasks.";
pub const UNSUPPORTED_CONTENT: &str = "Sorry, this type of message is not supported.";

// Lowercase; Russian aliases are accepted too.
const BACK_TOKENS: [&str; 2] = ["back", "назад"];
const DONE_TOKENS: [&str; 2] = ["done", "готово"];

fn matches_token(text: &str, tokens: &[&str]) -> bool {
    let text = text.trim().to_lowercase();
    tokens.contains(&text.as_str())
}

/// Back-navigation reply, case-insensitive.
pub fn is_back(text: &str) -> bool {
    matches_token(text, &BACK_TOKENS)
}

/// List-completion sentinel, case-insensitive.
pub fn is_done(text: &str) -> bool {
    matches_token(text, &DONE_TOKENS)
}

pub fn is_start_command(text: &str) -> bool {
    matches!(text.trim(), "/start" | "/help")
}

pub fn menu_labels() -> Vec<String> {
    TaskId::ALL
        .iter()
        .map(|task| task.menu_label().to_string())
        .collect()
}

/// The menu prompt with one quick reply per task.
pub fn menu_reply() -> Reply {
    Reply::prompt_with(MENU_PROMPT, menu_labels())
}

/// A prompt offering only the back button.
pub fn back_prompt(text: impl Into<String>) -> Reply {
    Reply::prompt_with(text, vec![BACK_LABEL.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_is_case_insensitive() {
        for t in ["Back", "BACK", " back ", "Назад", "НАЗАД"] {
            assert!(is_back(t), "{t:?}");
        }
        assert!(!is_back("backward"));
        assert!(!is_back(""));
    }

    #[test]
    fn done_accepts_both_locales() {
        assert!(is_done("Done"));
        assert!(is_done("готово"));
        assert!(is_done("ГОТОВО"));
        assert!(!is_done("rent, 5"));
    }

    #[test]
    fn menu_offers_every_task() {
        let reply = menu_reply();
        assert_eq!(reply.text(), Some(MENU_PROMPT));
        assert_eq!(reply.quick_replies().len(), TaskId::ALL.len());
        assert_eq!(reply.quick_replies()[0], "Build aggregate PPF");
    }
}
