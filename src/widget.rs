//! Widget state: which screen is showing, the transcript, the input draft and
//! the call button. All transitions are synchronous.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attachment::encode_image_attachment;
use crate::error::MarkupResult;
use crate::message::{RawMessage, Sender};
use crate::render::render_message;
use crate::theme::ThemeConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatView {
    #[default]
    Welcome,
    Chat,
    History,
    Faq,
}

/// Entry in the bottom navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub view: ChatView,
    pub label: &'static str,
}

pub const NAV_ITEMS: [NavItem; 3] = [
    NavItem { view: ChatView::Welcome, label: "Home" },
    NavItem { view: ChatView::History, label: "Chats" },
    NavItem { view: ChatView::Faq, label: "FAQ" },
];

const NAV_ACTIVE: &str = "bg-blue-600/20 backdrop-blur-md border border-blue-400/20 text-white";
const NAV_IDLE: &str = "text-gray-400 hover:text-white hover:bg-white/10 border border-transparent hover:border-white/20";

impl NavItem {
    pub fn is_active(&self, current: ChatView) -> bool {
        self.view == current
    }

    /// Button classes for this item given the current view
    pub fn class(&self, current: ChatView) -> String {
        format!(
            "flex flex-col items-center space-y-1 p-3 rounded-xl transition-all duration-300 min-w-[80px] hover:scale-105 {}",
            if self.is_active(current) { NAV_ACTIVE } else { NAV_IDLE }
        )
    }
}

/// What the host should do after the call button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Start,
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    view: ChatView,
    messages: Vec<RawMessage>,
    draft: String,
    disabled: bool,
    call_connected: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ChatView {
        self.view
    }

    pub fn messages(&self) -> &[RawMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// While disabled (e.g. a reply is pending) submissions are ignored.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Send button state: something to send and input enabled.
    pub fn can_submit(&self) -> bool {
        !self.disabled && !self.draft.trim().is_empty()
    }

    pub fn navigate(&mut self, view: ChatView) {
        debug!(?view, "navigate");
        self.view = view;
    }

    /// Leave the welcome screen, optionally sending a quick action as the
    /// first user message.
    pub fn start_chat(&mut self, quick_action: Option<&str>) -> MarkupResult<()> {
        let first = quick_action.map(RawMessage::user_text).transpose()?;
        self.view = ChatView::Chat;
        self.messages.extend(first);
        Ok(())
    }

    /// Send the trimmed draft. Returns the new message, or `None` when the
    /// draft is blank or input is disabled; the draft is kept in that case.
    pub fn submit(&mut self) -> Option<&RawMessage> {
        if !self.can_submit() {
            return None;
        }
        let message = RawMessage::user_text(&self.draft).ok()?;
        self.draft.clear();
        self.messages.push(message);
        self.messages.last()
    }

    pub fn attach_image(&mut self, mime: &str, bytes: &[u8]) -> MarkupResult<&RawMessage> {
        let data_uri = encode_image_attachment(mime, bytes)?;
        self.messages.push(RawMessage::image(Sender::User, data_uri));
        debug!(bytes = bytes.len(), "image attached");
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn receive_bot_reply(&mut self, text: impl Into<String>) -> MarkupResult<&RawMessage> {
        self.messages.push(RawMessage::bot_text(text)?);
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn is_call_connected(&self) -> bool {
        self.call_connected
    }

    /// Call button: stops a connected call, starts one otherwise.
    pub fn toggle_call(&mut self) -> CallAction {
        self.call_connected = !self.call_connected;
        if self.call_connected {
            CallAction::Start
        } else {
            CallAction::Stop
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.draft.clear();
    }

    /// All bubbles in order
    pub fn render_transcript(&self, theme: &ThemeConfig) -> String {
        self.messages
            .iter()
            .map(|m| render_message(m, theme))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_trims_and_clears_draft() {
        let mut session = ChatSession::new();
        session.set_draft("  hello  ");
        let sent = session.submit().unwrap();
        assert_eq!(sent.text(), Some("hello"));
        assert_eq!(session.draft(), "");
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_blank_or_disabled_submit_is_ignored() {
        let mut session = ChatSession::new();
        session.set_draft("   ");
        assert!(session.submit().is_none());

        session.set_draft("hi");
        session.set_disabled(true);
        assert!(!session.can_submit());
        assert!(session.submit().is_none());
        assert_eq!(session.draft(), "hi");
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_start_chat_with_quick_action() {
        let mut session = ChatSession::new();
        assert_eq!(session.view(), ChatView::Welcome);
        session.start_chat(Some("New arrivals")).unwrap();
        assert_eq!(session.view(), ChatView::Chat);
        assert_eq!(session.messages()[0].text(), Some("New arrivals"));

        let mut session = ChatSession::new();
        session.start_chat(None).unwrap();
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_blank_quick_action_leaves_session_untouched() {
        let mut session = ChatSession::new();
        assert!(session.start_chat(Some("   ")).is_err());
        assert_eq!(session.view(), ChatView::Welcome);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_toggle_call() {
        let mut session = ChatSession::new();
        assert_eq!(session.toggle_call(), CallAction::Start);
        assert!(session.is_call_connected());
        assert_eq!(session.toggle_call(), CallAction::Stop);
        assert!(!session.is_call_connected());
    }

    #[test]
    fn test_nav_active_class() {
        let home = NAV_ITEMS[0];
        assert!(home.is_active(ChatView::Welcome));
        assert!(home.class(ChatView::Welcome).contains("bg-blue-600/20"));
        assert!(home.class(ChatView::Faq).contains("text-gray-400"));
        assert!(!NAV_ITEMS.iter().any(|i| i.is_active(ChatView::Chat)));
    }

    #[test]
    fn test_attachment_rejects_non_image() {
        let mut session = ChatSession::new();
        assert!(session.attach_image("text/plain", b"x").is_err());
        assert!(session.attach_image("image/gif", b"GIF89a").is_ok());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_transcript_renders_in_order() {
        let mut session = ChatSession::new();
        session.start_chat(Some("first")).unwrap();
        session.receive_bot_reply("second").unwrap();
        let html = session.render_transcript(&ThemeConfig::default());
        assert!(html.find("first").unwrap() < html.find("second").unwrap());
    }
}
