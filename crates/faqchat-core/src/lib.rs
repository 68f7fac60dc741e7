pub mod client;
pub mod config;
pub mod session;
pub mod state;
pub mod store;
pub mod transcript;

// Re-export main types for convenience
pub use client::{BackendError, ChatBackendClient, QuestionBackendClient};
pub use config::{BackendVariant, Config};
pub use session::{Backend, PendingTurn, SessionState, SubmitOutcome};
pub use state::{ChatMessage, ChatRole};
pub use store::SessionStore;
pub use transcript::Transcript;
