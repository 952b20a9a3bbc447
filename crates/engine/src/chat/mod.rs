//! Chat layer: turns incoming texts and keyboard selections into engine
//! operations and user-facing replies.
//!
//! This is where the category-choice state machine lives. The machine has
//! two states, `Idle` and `AwaitingCategoryChoice`; a purchase naming a
//! category the user doesn't have suspends the command into the status
//! store and offers a keyboard, and the next input either resumes the
//! command or resets the machine. Any pending-state input that is neither
//! a valid selection nor a `/category` creation resets immediately.

mod commands;
mod ui;

use std::future::Future;

use crate::{
    Broker, Currency, Engine, EngineError, PendingStatus, Period, RatesProvider, Repo,
    ResultEngine,
};

pub use commands::Command;
pub use ui::CREATE_CATEGORY_BUTTON;

/// An incoming text message.
#[derive(Clone, Debug)]
pub struct Incoming {
    pub user_id: i64,
    pub text: String,
}

/// A keyboard selection (callback) from a previously offered choice.
#[derive(Clone, Debug)]
pub struct Callback {
    pub user_id: i64,
    pub data: String,
}

/// One-way message transport. Failures surface as this command's error and
/// are never retried here.
pub trait MessageSender: Send + Sync {
    fn send_text(&self, user_id: i64, text: &str)
    -> impl Future<Output = ResultEngine<()>> + Send;
    fn send_keyboard(
        &self,
        user_id: i64,
        text: &str,
        options: &[String],
    ) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Key-value store for the per-user pending status. A missing key reads as
/// [`PendingStatus::Idle`]; `set` overwrites whole.
pub trait StatusStore: Send + Sync {
    fn get(&self, user_id: i64) -> impl Future<Output = ResultEngine<PendingStatus>> + Send;
    fn set(
        &self,
        user_id: i64,
        status: PendingStatus,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
    fn clear(&self, user_id: i64) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// The conversational front of the engine.
#[derive(Debug)]
pub struct Chat<R, X, B, S, K> {
    engine: Engine<R, X, B>,
    sender: S,
    statuses: K,
}

impl<R, X, B, S, K> Chat<R, X, B, S, K>
where
    R: Repo,
    X: RatesProvider,
    B: Broker,
    S: MessageSender,
    K: StatusStore,
{
    pub fn new(engine: Engine<R, X, B>, sender: S, statuses: K) -> Self {
        Self {
            engine,
            sender,
            statuses,
        }
    }

    /// Entry point for a text message. Each call is one independent unit
    /// of work; the pending status decides how the text is interpreted.
    pub async fn incoming_message(&self, msg: Incoming) -> ResultEngine<()> {
        let status = self.statuses.get(msg.user_id).await?;
        if let PendingStatus::AwaitingCategoryChoice { command } = status {
            return self.pending_text(msg.user_id, &msg.text, &command).await;
        }

        match Command::parse(&msg.text) {
            Command::Start => self.sender.send_text(msg.user_id, ui::GREETING).await,
            Command::Help => self.sender.send_text(msg.user_id, ui::HELP).await,
            Command::Add {
                sum,
                category,
                date,
            } => {
                self.run_add(msg.user_id, &msg.text, &sum, &category, &date)
                    .await
            }
            Command::NewCategory { name } => self.new_category(msg.user_id, &name, None).await,
            Command::ListCategories => self.list_categories(msg.user_id).await,
            Command::Currency { code } => self.change_currency(msg.user_id, &code).await,
            Command::Limit { value } => self.change_limit(msg.user_id, &value).await,
            Command::Report { period } => self.run_report(msg.user_id, &period).await,
            Command::Unknown => self.sender.send_text(msg.user_id, ui::UNKNOWN_COMMAND).await,
        }
    }

    /// Entry point for a keyboard selection.
    pub async fn incoming_callback(&self, cb: Callback) -> ResultEngine<()> {
        match self.statuses.get(cb.user_id).await? {
            PendingStatus::AwaitingCategoryChoice { command } => {
                self.category_chosen(cb.user_id, &cb.data, &command).await
            }
            PendingStatus::Idle => {
                // A selection we have no pending command for.
                self.statuses.clear(cb.user_id).await?;
                self.sender.send_text(cb.user_id, ui::INVALID_STATUS).await
            }
        }
    }

    /// Text received while a category choice is pending. Only `/category`
    /// is meaningful here; everything else resets the machine.
    async fn pending_text(&self, user_id: i64, text: &str, command: &str) -> ResultEngine<()> {
        if let Command::NewCategory { name } = Command::parse(text) {
            return self.new_category(user_id, &name, Some(command)).await;
        }
        self.statuses.clear(user_id).await?;
        self.sender.send_text(user_id, ui::INVALID_STATUS).await
    }

    /// A keyboard button was pressed while a command is suspended.
    async fn category_chosen(
        &self,
        user_id: i64,
        data: &str,
        command: &str,
    ) -> ResultEngine<()> {
        if data == ui::CREATE_CATEGORY_BUTTON {
            // Keep the pending command: a follow-up /category replays it.
            return self
                .sender
                .send_text(user_id, ui::CREATE_CATEGORY_HINT)
                .await;
        }

        match self.engine.attach_category(user_id, data).await {
            Ok(()) => {
                self.statuses.clear(user_id).await?;
                self.replay(user_id, command, data).await
            }
            Err(EngineError::CategoryNotExist(_)) => {
                self.statuses.clear(user_id).await?;
                self.sender.send_text(user_id, ui::INVALID_STATUS).await
            }
            Err(err) => {
                self.statuses.clear(user_id).await?;
                tracing::error!("attach category for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }

    /// Creates a category, attaches it to the user and, when a command is
    /// suspended, replays it against the new category.
    async fn new_category(
        &self,
        user_id: i64,
        name: &str,
        pending: Option<&str>,
    ) -> ResultEngine<()> {
        match self.engine.create_category(name).await {
            Ok(_) => {}
            Err(err @ EngineError::CategoryAlreadyExists(_)) => {
                if pending.is_some() {
                    self.statuses.clear(user_id).await?;
                }
                return self.sender.send_text(user_id, &err.to_string()).await;
            }
            Err(err) => {
                if pending.is_some() {
                    self.statuses.clear(user_id).await?;
                }
                tracing::error!("create category for {user_id} failed: {err}");
                return self.sender.send_text(user_id, &ui::failure_text(&err)).await;
            }
        }

        if let Err(err) = self.engine.attach_category(user_id, name).await {
            if pending.is_some() {
                self.statuses.clear(user_id).await?;
            }
            tracing::error!("attach category for {user_id} failed: {err}");
            return self.sender.send_text(user_id, &ui::failure_text(&err)).await;
        }

        match pending {
            Some(command) => {
                self.statuses.clear(user_id).await?;
                self.replay(user_id, command, name).await
            }
            None => self.sender.send_text(user_id, ui::CATEGORY_CREATED).await,
        }
    }

    /// Re-runs a suspended purchase command with the resolved category.
    async fn replay(&self, user_id: i64, command: &str, category: &str) -> ResultEngine<()> {
        match Command::parse(command) {
            Command::Add { sum, date, .. } => {
                self.run_add(user_id, command, &sum, category, &date).await
            }
            _ => self.sender.send_text(user_id, ui::INVALID_STATUS).await,
        }
    }

    async fn run_add(
        &self,
        user_id: i64,
        command_text: &str,
        sum: &str,
        category: &str,
        date: &str,
    ) -> ResultEngine<()> {
        match self.engine.add_purchase(user_id, sum, category, date).await {
            Ok(expenses) => {
                self.sender
                    .send_text(user_id, &ui::purchase_added_text(&expenses))
                    .await
            }
            Err(EngineError::CategoryNotExist(_) | EngineError::UserHasntCategory(_)) => {
                self.offer_categories(user_id, command_text).await
            }
            Err(
                EngineError::SummaParsing(_)
                | EngineError::DateParsing(_)
                | EngineError::InvalidDate(_),
            ) => self.sender.send_text(user_id, ui::INVALID_INPUT).await,
            Err(err) => {
                tracing::error!("add purchase for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }

    /// `Idle -> AwaitingCategoryChoice`: remember the verbatim command and
    /// offer the sorted category names plus the creation affordance.
    async fn offer_categories(&self, user_id: i64, command_text: &str) -> ResultEngine<()> {
        let rows = match self.engine.all_categories().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("listing categories for {user_id} failed: {err}");
                return self.sender.send_text(user_id, &ui::failure_text(&err)).await;
            }
        };
        let mut options: Vec<String> = rows.into_iter().map(|row| row.name).collect();
        options.sort();
        options.push(ui::CREATE_CATEGORY_BUTTON.to_string());

        self.statuses
            .set(
                user_id,
                PendingStatus::AwaitingCategoryChoice {
                    command: command_text.to_string(),
                },
            )
            .await?;

        self.sender
            .send_keyboard(user_id, ui::CHOOSE_CATEGORY, &options)
            .await
    }

    async fn list_categories(&self, user_id: i64) -> ResultEngine<()> {
        match self.engine.user_categories(user_id).await {
            Ok(names) if names.is_empty() => {
                self.sender.send_text(user_id, ui::NO_CATEGORIES).await
            }
            Ok(names) => self.sender.send_text(user_id, &names.join("\n")).await,
            Err(err) => {
                tracing::error!("listing categories for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }

    async fn change_currency(&self, user_id: i64, code: &str) -> ResultEngine<()> {
        let currency = match Currency::try_from(code) {
            Ok(currency) => currency,
            Err(_) => return self.sender.send_text(user_id, ui::INVALID_CURRENCY).await,
        };
        match self.engine.set_currency(user_id, currency).await {
            Ok(()) => self.sender.send_text(user_id, ui::CURRENCY_CHANGED).await,
            Err(err) => {
                tracing::error!("set currency for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }

    async fn change_limit(&self, user_id: i64, value: &str) -> ResultEngine<()> {
        match self.engine.set_limit(user_id, value).await {
            Ok(()) => self.sender.send_text(user_id, ui::LIMIT_CHANGED).await,
            Err(EngineError::LimitParsing(_)) => {
                self.sender.send_text(user_id, ui::INVALID_INPUT).await
            }
            Err(err) => {
                tracing::error!("set limit for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }

    async fn run_report(&self, user_id: i64, period: &str) -> ResultEngine<()> {
        let period = match Period::parse(period, self.engine.today()) {
            Ok(period) => period,
            Err(EngineError::UnknownPeriod(_)) => {
                return self.sender.send_text(user_id, ui::INVALID_INPUT).await;
            }
            Err(err) => return Err(err),
        };

        match self.engine.report(user_id, period).await {
            Ok(report) => self.sender.send_text(user_id, &report.text).await,
            Err(err) => {
                tracing::error!("report for {user_id} failed: {err}");
                self.sender.send_text(user_id, &ui::failure_text(&err)).await
            }
        }
    }
}
