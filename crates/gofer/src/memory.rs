use crate::models::message::Message;

/// How much of the transcript is shown to the provider. The log itself is
/// never trimmed; the policy only bounds the context slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    #[default]
    Unbounded,
    LastMessages(usize),
}

/// An append-only, ordered log of the messages in one agent run. Messages
/// are never edited, reordered or removed; the conversation is discarded
/// when the run ends.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    window: WindowPolicy,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: WindowPolicy) -> Self {
        Self {
            messages: Vec::new(),
            window,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The slice handed to the provider, after applying the window policy.
    pub fn as_context(&self) -> &[Message] {
        match self.window {
            WindowPolicy::Unbounded => &self.messages,
            WindowPolicy::LastMessages(n) => {
                let start = self.messages.len().saturating_sub(n);
                &self.messages[start..]
            }
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
