//! The teloxide-backed [`MessageSender`].

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup};

use engine::chat::MessageSender;
use engine::{EngineError, ResultEngine};

#[derive(Clone, Debug)]
pub struct TgSender {
    bot: teloxide::Bot,
}

impl TgSender {
    pub(crate) fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

impl MessageSender for TgSender {
    async fn send_text(&self, user_id: i64, text: &str) -> ResultEngine<()> {
        self.bot
            .send_message(ChatId(user_id), text)
            .await
            .map_err(|err| EngineError::transport("telegram.send_message", err))?;
        Ok(())
    }

    /// One inline button per row; the button label doubles as the
    /// callback payload the chat layer matches on.
    async fn send_keyboard(
        &self,
        user_id: i64,
        text: &str,
        options: &[String],
    ) -> ResultEngine<()> {
        let rows: Vec<Vec<InlineKeyboardButton>> = options
            .iter()
            .map(|option| {
                vec![InlineKeyboardButton::callback(
                    option.clone(),
                    option.clone(),
                )]
            })
            .collect();

        self.bot
            .send_message(ChatId(user_id), text)
            .reply_markup(InlineKeyboardMarkup::new(rows))
            .await
            .map_err(|err| EngineError::transport("telegram.send_keyboard", err))?;
        Ok(())
    }
}
