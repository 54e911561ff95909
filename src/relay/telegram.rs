//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ReplyParameters};
use tracing::warn;

use crate::relay::language::Language;

/// Telegram's hard limit on message length, in characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send plain text. Model output is not markup, so no parse mode.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        let text = truncate_message(text);
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Show the language keyboard, prompting in the caller's current language.
    pub async fn send_language_picker(&self, chat_id: i64, current: Language) -> Result<i64, String> {
        self.bot
            .send_message(ChatId(chat_id), current.choose_prompt())
            .reply_markup(language_keyboard())
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send language picker: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Show "typing..." while the pipeline runs. Failures only get logged.
    pub async fn send_typing(&self, chat_id: i64) {
        if let Err(e) = self.bot.send_chat_action(ChatId(chat_id), ChatAction::Typing).await {
            warn!("Failed to send typing action: {e}");
        }
    }

    /// Acknowledge an inline button press with a toast.
    pub async fn answer_callback(&self, query: &CallbackQuery, text: &str) {
        if let Err(e) = self.bot.answer_callback_query(query.id.clone()).text(text).await {
            warn!("Failed to answer callback query: {e}");
        }
    }
}

/// Two buttons per row, one per selectable language.
pub fn language_keyboard() -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = Language::ALL
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|lang| InlineKeyboardButton::callback(lang.label(), lang.callback_data()))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Cut text to Telegram's message limit on a char boundary.
fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_MESSAGE_CHARS - 3).collect();
    format!("{truncated}...")
}
