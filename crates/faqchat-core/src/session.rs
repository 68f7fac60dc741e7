//! Turn submission protocol.
//!
//! One submission moves the session Idle -> AwaitingResponse -> Idle: the
//! user turn is appended and the assistant placeholder opened, the single
//! backend call runs, and the assistant turn is closed with the reply (or a
//! fallback error string). Session state is explicit and passed through the
//! handlers; there is no ambient storage.

use crate::client::{BackendError, ChatBackendClient, QuestionBackendClient};
use crate::config::{BackendVariant, Config};
use crate::transcript::Transcript;

/// The backend a session submits turns to.
#[derive(Clone)]
pub enum Backend {
    /// Chat variant: role-structured history plus a synthesized system turn.
    Chat {
        client: ChatBackendClient,
        system_prompt: String,
    },
    /// Single-question variant: history flattened into one string.
    Question(QuestionBackendClient),
}

impl Backend {
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.timeout();
        match config.backend {
            BackendVariant::Chat => Backend::Chat {
                client: ChatBackendClient::with_timeout(&config.chat_url, timeout),
                system_prompt: config.system_prompt.clone(),
            },
            BackendVariant::Question => {
                Backend::Question(QuestionBackendClient::with_timeout(&config.question_url, timeout))
            }
        }
    }

    /// Encode the captured turn for this variant and issue the one backend
    /// call of the submission cycle.
    pub async fn reply(&self, turn: &PendingTurn) -> Result<String, BackendError> {
        match self {
            Backend::Chat {
                client,
                system_prompt,
            } => {
                let messages = turn.transcript.to_messages(system_prompt);
                client.generate(&messages).await
            }
            Backend::Question(client) => {
                let question = turn.transcript.flatten_question();
                client.ask(&question).await
            }
        }
    }
}

/// Snapshot of the transcript taken when a submission was accepted, with the
/// user turn appended and the assistant placeholder open. Encoding for the
/// wire happens against this snapshot, so later appends can't leak into an
/// in-flight request.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    transcript: Transcript,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The submission was a no-op; transcript unchanged, input cleared.
    Ignored,
    /// The user turn was appended; the backend call may proceed.
    Submitted(PendingTurn),
}

/// Conversation state for one session.
///
/// The transcript string is the sole source of truth; `input` mirrors the
/// UI's text field and `in_flight` is the per-session submission lock.
#[derive(Debug, Default)]
pub struct SessionState {
    pub transcript: Transcript,
    pub input: String,
    in_flight: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(transcript: Transcript) -> Self {
        Self {
            transcript,
            input: String::new(),
            in_flight: false,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// First phase of a submission.
    ///
    /// No-ops (missing trigger, whitespace-only input, a request already in
    /// flight) leave the transcript byte-for-byte unchanged. The input field
    /// clears even on the missing-trigger and empty-input no-ops, matching
    /// the observed UI contract; an in-flight reject keeps the draft.
    pub fn begin_submit(&mut self, trigger: Option<u64>) -> SubmitOutcome {
        if trigger.is_none() {
            self.input.clear();
            return SubmitOutcome::Ignored;
        }
        // The submission lock keeps the typed draft: the user can retry once
        // the pending turn resolves
        if self.in_flight {
            return SubmitOutcome::Ignored;
        }

        let text = std::mem::take(&mut self.input);
        if !self.transcript.append_user(&text) {
            return SubmitOutcome::Ignored;
        }

        self.in_flight = true;
        SubmitOutcome::Submitted(PendingTurn {
            transcript: self.transcript.clone(),
        })
    }

    /// Second phase: close the assistant turn with the reply, or with the
    /// fallback error string when the call failed. Errors end the turn, not
    /// the session; further submissions remain possible.
    pub fn finish_submit(&mut self, result: Result<String, BackendError>) {
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => err.fallback_reply(),
        };
        self.transcript.close_turn(&reply);
        self.in_flight = false;
    }

    /// Run a whole submission cycle against `backend`, blocking the caller
    /// until the reply (or error) is folded back into the transcript.
    ///
    /// Returns `true` when a turn was actually submitted.
    pub async fn submit(&mut self, backend: &Backend, trigger: Option<u64>) -> bool {
        match self.begin_submit(trigger) {
            SubmitOutcome::Ignored => false,
            SubmitOutcome::Submitted(turn) => {
                let result = backend.reply(&turn).await;
                self.finish_submit(result);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_missing_trigger_is_noop_but_clears_input() {
        let mut session = SessionState::new();
        session.transcript.append_user("hi");
        session.transcript.close_turn("hello");
        let before = session.transcript.clone();

        session.input = "next question".to_string();
        assert!(matches!(session.begin_submit(None), SubmitOutcome::Ignored));
        assert_eq!(session.transcript, before);
        assert_eq!(session.input, "");
    }

    #[test]
    fn test_whitespace_input_is_noop() {
        let mut session = SessionState::new();
        session.input = "   ".to_string();
        assert!(matches!(session.begin_submit(Some(1)), SubmitOutcome::Ignored));
        assert!(session.transcript.is_empty());
        assert_eq!(session.input, "");
        assert!(!session.in_flight());
    }

    #[test]
    fn test_accepted_submit_opens_turn_and_locks() {
        let mut session = SessionState::new();
        session.input = "hi".to_string();

        let outcome = session.begin_submit(Some(1));
        let turn = match outcome {
            SubmitOutcome::Submitted(turn) => turn,
            SubmitOutcome::Ignored => panic!("submission was ignored"),
        };

        assert_eq!(session.transcript.as_str(), "You: hi<split>Bot: ");
        assert_eq!(turn.transcript, session.transcript);
        assert_eq!(session.input, "");
        assert!(session.in_flight());
    }

    #[test]
    fn test_overlapping_submit_is_rejected() {
        let mut session = SessionState::new();
        session.input = "first".to_string();
        assert!(matches!(
            session.begin_submit(Some(1)),
            SubmitOutcome::Submitted(_)
        ));

        let before = session.transcript.clone();
        session.input = "second".to_string();
        assert!(matches!(session.begin_submit(Some(2)), SubmitOutcome::Ignored));
        assert_eq!(session.transcript, before);
        // The rejected submit keeps the typed draft for a later retry
        assert_eq!(session.input, "second");
    }

    #[test]
    fn test_draft_survives_until_pending_turn_resolves() {
        let mut session = SessionState::new();
        session.input = "first".to_string();
        session.begin_submit(Some(1));

        session.input = "second".to_string();
        session.begin_submit(Some(2));
        session.finish_submit(Ok("hello".to_string()));

        assert_eq!(session.input, "second");
        assert!(matches!(
            session.begin_submit(Some(3)),
            SubmitOutcome::Submitted(_)
        ));
        assert!(session.transcript.as_str().contains("You: second"));
    }

    #[test]
    fn test_finish_submit_closes_turn_with_reply() {
        let mut session = SessionState::new();
        session.input = "hi".to_string();
        session.begin_submit(Some(1));
        session.finish_submit(Ok("hello".to_string()));

        assert_eq!(session.transcript.as_str(), "You: hi<split>Bot: hello<split>");
        assert!(!session.in_flight());
    }

    #[test]
    fn test_backend_error_becomes_closed_error_turn() {
        let mut session = SessionState::new();
        session.input = "hi".to_string();
        session.begin_submit(Some(1));
        session.finish_submit(Err(BackendError::Status(StatusCode::BAD_GATEWAY)));

        let blocks = session.transcript.display_blocks();
        let last = blocks.last().unwrap();
        assert!(last.starts_with("Bot: Error: "));
        // Turn is closed: the transcript still ends with a separator
        assert!(session.transcript.as_str().ends_with("<split>"));
        assert!(!session.in_flight());
    }

    #[test]
    fn test_session_survives_error_turn() {
        let mut session = SessionState::new();
        session.input = "hi".to_string();
        session.begin_submit(Some(1));
        session.finish_submit(Err(BackendError::MalformedResponse));

        session.input = "again".to_string();
        assert!(matches!(
            session.begin_submit(Some(2)),
            SubmitOutcome::Submitted(_)
        ));
    }

    #[test]
    fn test_malformed_response_uses_exact_fallback_literal() {
        let mut session = SessionState::new();
        session.input = "hi".to_string();
        session.begin_submit(Some(1));
        session.finish_submit(Err(BackendError::MalformedResponse));

        assert_eq!(
            session.transcript.as_str(),
            "You: hi<split>Bot: Error: Invalid response format<split>"
        );
    }
}
