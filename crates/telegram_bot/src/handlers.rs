use teloxide::prelude::*;
use teloxide::types::User;

use engine::chat::{Callback, Incoming, StatusStore};
use engine::{Broker, RatesProvider, Repo};

use crate::ConfigParameters;

pub(crate) async fn handle_message<R, X, B, K>(
    msg: Message,
    cfg: ConfigParameters<R, X, B, K>,
) -> ResponseResult<()>
where
    R: Repo + 'static,
    X: RatesProvider + 'static,
    B: Broker + 'static,
    K: StatusStore + 'static,
{
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let incoming = Incoming {
        user_id: msg.chat.id.0,
        text: text.to_string(),
    };
    // Replies the chat layer could not deliver are not retryable here.
    if let Err(err) = cfg.chat.incoming_message(incoming).await {
        tracing::error!("message from {} not handled: {err}", msg.chat.id);
    }
    Ok(())
}

pub(crate) async fn handle_callback<R, X, B, K>(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters<R, X, B, K>,
) -> ResponseResult<()>
where
    R: Repo + 'static,
    X: RatesProvider + 'static,
    B: Broker + 'static,
    K: StatusStore + 'static,
{
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let user_id = message.chat().id.0;

    // Stop the client-side spinner whatever happens next.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data else {
        return Ok(());
    };

    let callback = Callback { user_id, data };
    if let Err(err) = cfg.chat.incoming_callback(callback).await {
        tracing::error!("callback from {user_id} not handled: {err}");
    }
    Ok(())
}

fn is_allowed<R, X, B, K>(cfg: &ConfigParameters<R, X, B, K>, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}
