//! Per-chat upload sessions and routing of inbound messages.
//!
//! A chat is either idle or waiting for the spreadsheet that follows
//! `/relatorio`. The transition functions here are pure; [`SessionStore`]
//! only holds the current state for each chat.

use std::collections::HashMap;
use std::sync::Mutex;

/// What an awaited upload will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPurpose {
    Relatorio,
}

impl UploadPurpose {
    pub fn name(self) -> &'static str {
        match self {
            UploadPurpose::Relatorio => "relatorio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingUpload(UploadPurpose),
}

/// The shape of an inbound chat message, as far as routing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    Text(&'a str),
    Document,
    Other,
}

/// What the handler should do with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Chat is not on the allow-list.
    Refuse,
    /// Hand the text to the command parser.
    Command(&'a str),
    /// Feed the attached document to the importer.
    Import(UploadPurpose),
    /// Still waiting for a file; ask for it again.
    RepromptUpload,
    /// Pending upload dropped by `/cancelar`.
    CancelUpload,
    /// A document nobody asked for.
    UnexpectedDocument,
    Ignore,
}

/// Decide where a message goes and what state the chat ends up in.
///
/// While an upload is pending every non-file message re-prompts and leaves
/// the flag set, except `/cancelar`, which returns the chat to idle.
pub fn route<'a>(
    authorized: bool,
    state: SessionState,
    inbound: Inbound<'a>,
) -> (SessionState, Route<'a>) {
    if !authorized {
        return (state, Route::Refuse);
    }

    match (state, inbound) {
        (SessionState::AwaitingUpload(purpose), Inbound::Document) => {
            (SessionState::Idle, Route::Import(purpose))
        }
        (SessionState::AwaitingUpload(_), Inbound::Text(text)) if is_cancel(text) => {
            (SessionState::Idle, Route::CancelUpload)
        }
        (SessionState::AwaitingUpload(_), _) => (state, Route::RepromptUpload),

        (SessionState::Idle, Inbound::Text(text)) if text.trim_start().starts_with('/') => {
            (state, Route::Command(text))
        }
        (SessionState::Idle, Inbound::Document) => (state, Route::UnexpectedDocument),
        (SessionState::Idle, _) => (state, Route::Ignore),
    }
}

/// State after a command has been accepted.
pub fn arm(purpose: UploadPurpose) -> SessionState {
    SessionState::AwaitingUpload(purpose)
}

fn is_cancel(text: &str) -> bool {
    let head = text.split_whitespace().next().unwrap_or("");
    head.split('@').next() == Some("/cancelar")
}

/// Current session state per chat.
///
/// Teloxide handles different chats concurrently, so the map sits behind a
/// mutex. The guard is never held across an `.await`.
#[derive(Debug, Default)]
pub struct SessionStore {
    states: Mutex<HashMap<i64, UploadPurpose>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: i64) -> SessionState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .get(&chat_id)
            .map_or(SessionState::Idle, |p| SessionState::AwaitingUpload(*p))
    }

    pub fn set(&self, chat_id: i64, state: SessionState) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        match state {
            SessionState::Idle => {
                states.remove(&chat_id);
            }
            SessionState::AwaitingUpload(purpose) => {
                states.insert(chat_id, purpose);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AWAITING: SessionState = SessionState::AwaitingUpload(UploadPurpose::Relatorio);

    #[test]
    fn unauthorized_chats_are_refused_without_state_change() {
        for state in [SessionState::Idle, AWAITING] {
            for inbound in [
                Inbound::Text("/criar 1 10 2024-01-02 \"x\" false"),
                Inbound::Text("/relatorio"),
                Inbound::Document,
                Inbound::Other,
            ] {
                assert_eq!(route(false, state, inbound), (state, Route::Refuse));
            }
        }
    }

    #[test]
    fn idle_commands_go_to_parser() {
        assert_eq!(
            route(true, SessionState::Idle, Inbound::Text("/listar")),
            (SessionState::Idle, Route::Command("/listar"))
        );
        assert_eq!(
            route(true, SessionState::Idle, Inbound::Text("bom dia")),
            (SessionState::Idle, Route::Ignore)
        );
        assert_eq!(
            route(true, SessionState::Idle, Inbound::Document),
            (SessionState::Idle, Route::UnexpectedDocument)
        );
    }

    #[test]
    fn file_consumes_pending_upload() {
        assert_eq!(
            route(true, AWAITING, Inbound::Document),
            (SessionState::Idle, Route::Import(UploadPurpose::Relatorio))
        );
    }

    #[test]
    fn other_messages_keep_waiting() {
        for inbound in [
            Inbound::Text("/listar"),
            Inbound::Text("/relatorio"),
            Inbound::Text("segue"),
            Inbound::Other,
        ] {
            assert_eq!(route(true, AWAITING, inbound), (AWAITING, Route::RepromptUpload));
        }
    }

    #[test]
    fn cancel_returns_to_idle() {
        assert_eq!(
            route(true, AWAITING, Inbound::Text("/cancelar")),
            (SessionState::Idle, Route::CancelUpload)
        );
        assert_eq!(
            route(true, AWAITING, Inbound::Text("/cancelar@PontoGoBot")),
            (SessionState::Idle, Route::CancelUpload)
        );
    }

    #[test]
    fn store_tracks_chats_independently() {
        let store = SessionStore::new();
        assert_eq!(store.get(1), SessionState::Idle);

        store.set(1, arm(UploadPurpose::Relatorio));
        assert_eq!(store.get(1), AWAITING);
        assert_eq!(store.get(2), SessionState::Idle);

        store.set(1, SessionState::Idle);
        assert_eq!(store.get(1), SessionState::Idle);
        assert_eq!(UploadPurpose::Relatorio.name(), "relatorio");
    }
}
