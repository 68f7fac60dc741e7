//! Conversation transcript codec
//!
//! The whole conversation for a session is stored as one flat string: turns
//! are delimited by a literal separator token and tagged with a literal role
//! marker prefix. The string is the sole source of truth for conversation
//! state; structured [`ChatMessage`] lists exist only in memory, decoded on
//! demand for backend submission or display.
//!
//! Known limitation: user text containing the separator literal corrupts
//! parsing. This is accepted and not guarded against.

use serde::{Deserialize, Serialize};

use crate::state::{ChatMessage, ChatRole};

/// Delimits turns inside the stored transcript string.
pub const SEPARATOR: &str = "<split>";

/// Marker prefix for user turns.
pub const USER_MARKER: &str = "You: ";

/// Marker prefix for assistant turns.
pub const BOT_MARKER: &str = "Bot: ";

/// The encoded conversation history for one session.
///
/// Appending is the only mutation: one user turn plus one assistant turn per
/// request cycle, never rewritten, never truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(String);

impl Transcript {
    pub fn new() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a user turn and open the assistant placeholder.
    ///
    /// Returns `false` without touching the transcript when `text` trims to
    /// empty. The stored content is the untrimmed original; only emptiness is
    /// judged on the trimmed text.
    pub fn append_user(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.0
            .push_str(&format!("{USER_MARKER}{text}{SEPARATOR}{BOT_MARKER}"));
        true
    }

    /// Close the open assistant turn with the backend's reply (or an error
    /// string standing in for one).
    pub fn close_turn(&mut self, reply: &str) {
        self.0.push_str(reply);
        self.0.push_str(SEPARATOR);
    }

    /// Decode for chat-variant submission: role-tagged messages with a
    /// synthesized system turn in front.
    ///
    /// Fragments without a recognized marker are dropped. An open assistant
    /// placeholder decodes to an assistant message with empty content and is
    /// kept, matching the wire payload the backend expects mid-turn.
    pub fn to_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::new(ChatRole::System, system_prompt)];
        for part in self.0.split(SEPARATOR) {
            if let Some(content) = part.strip_prefix(USER_MARKER) {
                messages.push(ChatMessage::new(ChatRole::User, content));
            } else if let Some(content) = part.strip_prefix(BOT_MARKER) {
                messages.push(ChatMessage::new(ChatRole::Assistant, content));
            }
        }
        messages
    }

    /// Decode for single-question-variant submission: separators become
    /// newlines and the bare marker words are stripped wherever they occur.
    ///
    /// Substring removal is deliberate: `Bot:` inside user content is
    /// stripped too, an accepted quirk of this variant. Turn boundaries and
    /// roles are lost by design.
    pub fn flatten_question(&self) -> String {
        self.0
            .replace(SEPARATOR, "\n")
            .replace("Bot:", "")
            .replace("You:", "")
    }

    /// Decode for display: one block per turn, markers left in place,
    /// whitespace-only fragments dropped.
    pub fn display_blocks(&self) -> Vec<&str> {
        self.0
            .split(SEPARATOR)
            .filter(|part| !part.trim().is_empty())
            .collect()
    }
}

impl From<String> for Transcript {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_transcript() -> Transcript {
        let mut t = Transcript::new();
        assert!(t.append_user("hi"));
        t.close_turn("hello");
        t
    }

    #[test]
    fn test_append_user_encodes_open_turn() {
        let mut t = Transcript::new();
        assert!(t.append_user("hi"));
        assert_eq!(t.as_str(), "You: hi<split>Bot: ");
    }

    #[test]
    fn test_close_turn_appends_separator() {
        let t = closed_transcript();
        assert_eq!(t.as_str(), "You: hi<split>Bot: hello<split>");
    }

    #[test]
    fn test_append_user_empty_is_noop() {
        let mut t = closed_transcript();
        let before = t.clone();
        assert!(!t.append_user(""));
        assert!(!t.append_user("   \n\t"));
        assert_eq!(t, before);
    }

    #[test]
    fn test_append_user_stores_untrimmed_text() {
        let mut t = Transcript::new();
        assert!(t.append_user("  hi  "));
        assert_eq!(t.as_str(), "You:   hi  <split>Bot: ");
    }

    #[test]
    fn test_to_messages_round_trip() {
        let mut t = Transcript::new();
        t.append_user("what is rust?");
        let messages = t.to_messages("You are a helpful assistant.");
        assert_eq!(messages[0], ChatMessage::new(ChatRole::System, "You are a helpful assistant."));
        assert_eq!(messages[1], ChatMessage::new(ChatRole::User, "what is rust?"));
        // Open assistant placeholder decodes to an empty assistant message
        assert_eq!(messages[2], ChatMessage::new(ChatRole::Assistant, ""));
    }

    #[test]
    fn test_to_messages_drops_unmarked_fragments() {
        let t = Transcript::from("garbage<split>You: hi<split>Bot: hello<split>".to_string());
        let messages = t.to_messages("sys");
        assert_eq!(messages.len(), 3); // system + user + assistant
        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[2].content, "hello");
    }

    #[test]
    fn test_decode_is_idempotent() {
        let t = closed_transcript();
        assert_eq!(t.to_messages("sys"), t.to_messages("sys"));
        assert_eq!(t.display_blocks(), t.display_blocks());
    }

    #[test]
    fn test_append_preserves_decoded_prefix() {
        let mut t = closed_transcript();
        let before = t.to_messages("sys");
        t.append_user("and again");
        t.close_turn("sure");
        let after = t.to_messages("sys");
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn test_display_blocks_keep_markers_verbatim() {
        let t = closed_transcript();
        assert_eq!(t.display_blocks(), vec!["You: hi", "Bot: hello"]);
    }

    #[test]
    fn test_display_blocks_drop_whitespace_fragments() {
        // The trailing separator leaves an empty fragment; an all-blank turn
        // is dropped the same way.
        let t = Transcript::from("You: hi<split>   <split>Bot: hello<split>".to_string());
        assert_eq!(t.display_blocks(), vec!["You: hi", "Bot: hello"]);
    }

    #[test]
    fn test_flatten_question_strips_markers_everywhere() {
        let mut t = Transcript::new();
        t.append_user("hi");
        assert_eq!(t.flatten_question(), " hi\n ");
    }

    #[test]
    fn test_flatten_question_strips_marker_inside_content() {
        let mut t = Transcript::new();
        t.append_user("say Bot: to me");
        // "Bot:" is removed wherever it occurs, not only as a prefix
        assert_eq!(t.flatten_question(), " say  to me\n ");
    }

    #[test]
    fn test_empty_transcript_decodes_to_system_only() {
        let t = Transcript::new();
        assert_eq!(t.to_messages("sys").len(), 1);
        assert!(t.display_blocks().is_empty());
        assert_eq!(t.flatten_question(), "");
    }
}
