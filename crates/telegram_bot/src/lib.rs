//! Telegram front end.
//!
//! The bot is a thin shell: updates are mapped onto the engine's chat
//! layer, which owns command parsing and the conversation state machine.
//! Nothing in here touches the database or the rate source directly.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::UserId;

use engine::chat::{Chat, StatusStore};
use engine::{Broker, Engine, RatesProvider, Repo};

mod handlers;
mod sender;

pub use sender::TgSender;

/// Per-update dependencies handed to the dptree handlers.
pub struct ConfigParameters<R, X, B, K> {
    allowed_users: Option<Vec<UserId>>,
    chat: Arc<Chat<R, X, B, TgSender, K>>,
}

impl<R, X, B, K> Clone for ConfigParameters<R, X, B, K> {
    fn clone(&self) -> Self {
        Self {
            allowed_users: self.allowed_users.clone(),
            chat: Arc::clone(&self.chat),
        }
    }
}

pub struct Bot<R, X, B, K> {
    bot: teloxide::Bot,
    allowed_users: Option<Vec<UserId>>,
    chat: Arc<Chat<R, X, B, TgSender, K>>,
}

impl<R, X, B, K> Bot<R, X, B, K>
where
    R: Repo + 'static,
    X: RatesProvider + 'static,
    B: Broker + 'static,
    K: StatusStore + 'static,
{
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        engine: Engine<R, X, B>,
        statuses: K,
    ) -> Self {
        let bot = teloxide::Bot::new(token);
        let chat = Arc::new(Chat::new(engine, TgSender::new(bot.clone()), statuses));
        Self {
            bot,
            allowed_users,
            chat,
        }
    }

    pub fn builder() -> BotBuilder<R, X, B, K> {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            chat: Arc::clone(&self.chat),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message::<R, X, B, K>))
            .branch(
                Update::filter_callback_query().endpoint(handlers::handle_callback::<R, X, B, K>),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

pub struct BotBuilder<R, X, B, K> {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    engine: Option<Engine<R, X, B>>,
    statuses: Option<K>,
}

impl<R, X, B, K> Default for BotBuilder<R, X, B, K> {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_users: None,
            engine: None,
            statuses: None,
        }
    }
}

impl<R, X, B, K> BotBuilder<R, X, B, K>
where
    R: Repo + 'static,
    X: RatesProvider + 'static,
    B: Broker + 'static,
    K: StatusStore + 'static,
{
    pub fn token(mut self, token: &str) -> Self {
        self.token = token.to_string();
        self
    }

    /// An empty list means no restriction.
    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> Self {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn engine(mut self, engine: Engine<R, X, B>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn statuses(mut self, statuses: K) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn build(self) -> Result<Bot<R, X, B, K>, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("telegram token is missing".to_string());
        }
        let engine = self.engine.ok_or("engine is missing")?;
        let statuses = self.statuses.ok_or("status store is missing")?;
        Ok(Bot::new(&self.token, self.allowed_users, engine, statuses))
    }
}
