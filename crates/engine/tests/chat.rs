mod common;

use chrono_tz::UTC;
use engine::chat::{CREATE_CATEGORY_BUTTON, Callback, Chat, Incoming};
use engine::{Engine, PendingStatus};

use common::{
    FixedRates, MemoryStatuses, MockRepo, RecordingBroker, RecordingSender, Sent,
};

struct World {
    repo: MockRepo,
    rates: FixedRates,
    broker: RecordingBroker,
    sender: RecordingSender,
    statuses: MemoryStatuses,
}

impl World {
    fn new() -> Self {
        Self {
            repo: MockRepo::new(),
            rates: FixedRates::new(),
            broker: RecordingBroker::default(),
            sender: RecordingSender::default(),
            statuses: MemoryStatuses::default(),
        }
    }

    fn chat(
        &self,
    ) -> Chat<&MockRepo, &FixedRates, &RecordingBroker, &RecordingSender, &MemoryStatuses> {
        let engine = Engine::new(&self.repo, &self.rates, &self.broker, UTC);
        Chat::new(engine, &self.sender, &self.statuses)
    }

    async fn say(&self, user_id: i64, text: &str) {
        self.chat()
            .incoming_message(Incoming {
                user_id,
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    async fn press(&self, user_id: i64, data: &str) {
        self.chat()
            .incoming_callback(Callback {
                user_id,
                data: data.to_string(),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn start_greets_the_user() {
    let world = World::new();

    world.say(1, "/start").await;

    let text = world.sender.last_text().unwrap();
    assert!(text.contains("I track your spending"));
}

#[tokio::test]
async fn free_text_is_an_unknown_command() {
    let world = World::new();

    world.say(1, "hello there").await;

    assert_eq!(
        world.sender.last_text().unwrap(),
        "I don't know this command"
    );
}

#[tokio::test]
async fn purchase_reply_reports_the_limit() {
    let world = World::new();

    world.say(1, "/limit 100").await;
    world.say(1, "/add 150").await;

    let text = world.sender.last_text().unwrap();
    assert!(text.starts_with("Purchase added"));
    assert!(text.contains("limit is 100.00 RUB"));
    assert!(text.contains("exceeded the limit"));
}

#[tokio::test]
async fn unknown_category_offers_a_keyboard_and_suspends_the_command() {
    let world = World::new();
    world.repo.seed_category("food");
    world.repo.seed_category("taxi");

    world.say(1, "/add 250 cinema").await;

    let sent = world.sender.sent();
    let Sent::Keyboard(user_id, _, options) = sent.last().unwrap() else {
        panic!("expected a keyboard, got {:?}", sent.last());
    };
    assert_eq!(*user_id, 1);
    // Existing names sorted, creation button last.
    assert_eq!(
        options,
        &[
            "Uncategorized".to_string(),
            "food".to_string(),
            "taxi".to_string(),
            CREATE_CATEGORY_BUTTON.to_string(),
        ]
    );
    assert_eq!(
        world.statuses.current(1),
        PendingStatus::AwaitingCategoryChoice {
            command: "/add 250 cinema".to_string()
        }
    );
}

#[tokio::test]
async fn choosing_an_existing_category_replays_the_purchase() {
    let world = World::new();
    world.repo.seed_category("food");

    world.say(1, "/add 250 cinema").await;
    world.press(1, "food").await;

    assert_eq!(world.statuses.current(1), PendingStatus::Idle);
    let stored = world.repo.stored_purchases();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sum_rub, 250.0);
    assert!(world.sender.last_text().unwrap().starts_with("Purchase added"));
}

#[tokio::test]
async fn choosing_an_unknown_option_resets_the_machine() {
    let world = World::new();

    world.say(1, "/add 250 cinema").await;
    world.press(1, "no such thing").await;

    assert_eq!(world.statuses.current(1), PendingStatus::Idle);
    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("start the command over")
    );
    assert!(world.repo.stored_purchases().is_empty());
}

#[tokio::test]
async fn create_button_keeps_the_command_pending() {
    let world = World::new();

    world.say(1, "/add 250 cinema").await;
    world.press(1, CREATE_CATEGORY_BUTTON).await;

    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("/category <name>")
    );
    assert_eq!(
        world.statuses.current(1),
        PendingStatus::AwaitingCategoryChoice {
            command: "/add 250 cinema".to_string()
        }
    );
}

#[tokio::test]
async fn creating_the_category_mid_choice_replays_the_purchase() {
    let world = World::new();

    world.say(1, "/add 250 cinema").await;
    world.say(1, "/category cinema").await;

    assert_eq!(world.statuses.current(1), PendingStatus::Idle);
    let stored = world.repo.stored_purchases();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sum_rub, 250.0);
    assert!(world.repo.category_names().contains(&"cinema".to_string()));
    assert!(world.sender.last_text().unwrap().starts_with("Purchase added"));
}

#[tokio::test]
async fn non_category_text_during_a_choice_resets_the_machine() {
    let world = World::new();

    world.say(1, "/add 250 cinema").await;
    world.say(1, "/report week").await;

    assert_eq!(world.statuses.current(1), PendingStatus::Idle);
    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("start the command over")
    );
}

#[tokio::test]
async fn callback_without_a_pending_command_is_rejected() {
    let world = World::new();
    world.repo.seed_category("food");

    world.press(1, "food").await;

    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("start the command over")
    );
    assert!(world.repo.stored_purchases().is_empty());
}

#[tokio::test]
async fn category_command_creates_and_attaches() {
    let world = World::new();

    world.say(1, "/category food").await;

    assert_eq!(world.sender.last_text().unwrap(), "Category created");
    assert!(world.repo.category_names().contains(&"food".to_string()));

    world.say(1, "/categories").await;
    assert_eq!(world.sender.last_text().unwrap(), "food");
}

#[tokio::test]
async fn duplicate_category_reports_the_conflict() {
    let world = World::new();

    world.say(1, "/category food").await;
    world.say(1, "/category Food").await;

    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("already exists")
    );
}

#[tokio::test]
async fn empty_category_listing_has_its_own_reply() {
    let world = World::new();

    world.say(1, "/categories").await;

    assert_eq!(
        world.sender.last_text().unwrap(),
        "You have no categories yet"
    );
}

#[tokio::test]
async fn currency_change_validates_the_code() {
    let world = World::new();

    world.say(1, "/currency usd").await;
    assert_eq!(world.sender.last_text().unwrap(), "Currency changed");

    world.say(1, "/currency chf").await;
    assert!(
        world
            .sender
            .last_text()
            .unwrap()
            .contains("Supported currencies")
    );
}

#[tokio::test]
async fn limit_change_validates_the_value() {
    let world = World::new();

    world.say(1, "/limit 1000").await;
    assert_eq!(world.sender.last_text().unwrap(), "Limit changed");

    world.say(1, "/limit lots").await;
    assert!(world.sender.last_text().unwrap().contains("can't read that"));
}

#[tokio::test]
async fn garbage_sum_gets_the_format_hint() {
    let world = World::new();

    world.say(1, "/add 12o.o5").await;

    assert!(world.sender.last_text().unwrap().contains("can't read that"));
}

#[tokio::test]
async fn report_command_renders_the_period() {
    let world = World::new();

    world.say(1, "/add 100").await;
    world.say(1, "/report month").await;

    let text = world.sender.last_text().unwrap();
    assert!(text.starts_with("Expenses from "));
    assert!(text.contains("Uncategorized: 100.00 RUB"));
    assert!(text.contains("Total: 100.00 RUB"));
    assert_eq!(world.broker.published().len(), 1);
}

#[tokio::test]
async fn unknown_report_period_gets_the_format_hint() {
    let world = World::new();

    world.say(1, "/report fortnight").await;

    assert!(world.sender.last_text().unwrap().contains("can't read that"));
}
