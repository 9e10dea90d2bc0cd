//! Widget session state: the visible transcript and the send flow.

use serde::Serialize;

use super::consumer::stream_chat;
use crate::chat::{ChatTurn, Role, is_pricing_query};

const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// One rendered message in the widget transcript
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WidgetMessage {
    pub role: Role,
    pub content: String,
    pub show_contact_form: bool,
}

impl WidgetMessage {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            show_contact_form: false,
        }
    }
}

/// In-memory state for one widget session. The transcript lives only as
/// long as the widget; nothing is persisted.
pub struct ChatWidget {
    http: reqwest::Client,
    chat_url: String,
    bearer_token: String,
    messages: Vec<WidgetMessage>,
    is_loading: bool,
}

impl ChatWidget {
    pub fn new(chat_url: &str, bearer_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            chat_url: chat_url.to_string(),
            bearer_token: bearer_token.to_string(),
            messages: Vec::new(),
            is_loading: false,
        }
    }

    pub fn messages(&self) -> &[WidgetMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Run one chat turn: append the user message, stream the assistant
    /// reply into the transcript tail, and surface the contact form when
    /// the user asked about pricing. A send is refused while a response
    /// is outstanding. Transport failures become a canned apology
    /// message; a partial reply is kept as-is.
    pub async fn send<F>(&mut self, input: &str, mut on_update: F)
    where
        F: FnMut(&str),
    {
        let input = input.trim();
        if input.is_empty() || self.is_loading {
            return;
        }
        self.is_loading = true;
        self.messages.push(WidgetMessage::new(Role::User, input));

        // Decided once per turn, before the reply streams in
        let is_pricing = is_pricing_query(input);

        let transcript: Vec<ChatTurn> = self
            .messages
            .iter()
            .map(|m| ChatTurn::new(m.role, &m.content))
            .collect();

        let messages = &mut self.messages;
        let result = stream_chat(
            &self.http,
            &self.chat_url,
            &self.bearer_token,
            &transcript,
            |text| {
                replace_assistant_tail(messages, text);
                on_update(text);
            },
        )
        .await;

        match result {
            Ok(_) => {
                if is_pricing
                    && let Some(last) = self.messages.last_mut()
                    && last.role == Role::Assistant
                {
                    last.show_contact_form = true;
                }
            }
            Err(err) => {
                tracing::error!("Chat error: {}", err);
                self.messages
                    .push(WidgetMessage::new(Role::Assistant, APOLOGY_MESSAGE));
            }
        }

        self.is_loading = false;
    }
}

/// Replace the in-progress assistant turn in place, or start it. The
/// swap is a single assignment so a render never sees a partial line
/// twice.
fn replace_assistant_tail(messages: &mut Vec<WidgetMessage>, text: &str) {
    match messages.last_mut() {
        Some(last) if last.role == Role::Assistant => {
            last.content = text.to_string();
        }
        _ => messages.push(WidgetMessage::new(Role::Assistant, text)),
    }
}
