//! Reply texts. Kept in one place so the handlers stay readable and the
//! tests can assert against them.

use crate::{EngineError, ExpensesAndLimit, parse::format_sum};

pub(crate) const GREETING: &str =
    "Hi! I track your spending. Add a purchase with /add <sum> [category] [date], \
     then ask for a /report. See /help for everything I understand.";

pub(crate) const HELP: &str = "\
/add <sum> [category] [DD.MM.YYYY] - record a purchase
/category <name> - create a new category
/categories - your categories
/currency <RUB|USD|EUR|CNY> - set your display currency
/limit <value> - set a monthly limit
/report <day|week|month [offset]> - spending report";

pub(crate) const UNKNOWN_COMMAND: &str = "I don't know this command";

pub(crate) const INVALID_INPUT: &str =
    "I can't read that. Check the command format in /help and try again.";

pub(crate) const INVALID_CURRENCY: &str = "Supported currencies: RUB, USD, EUR, CNY.";

pub(crate) const CATEGORY_CREATED: &str = "Category created";

pub(crate) const CURRENCY_CHANGED: &str = "Currency changed";

pub(crate) const LIMIT_CHANGED: &str = "Limit changed";

pub(crate) const PURCHASE_ADDED: &str = "Purchase added";

pub(crate) const NO_CATEGORIES: &str = "You have no categories yet";

pub(crate) const CHOOSE_CATEGORY: &str =
    "You don't have this category yet. Pick one of the existing categories or create \
     your own with /category <name>.";

pub(crate) const CREATE_CATEGORY_HINT: &str =
    "Send /category <name> to create the new category.";

pub(crate) const INVALID_STATUS: &str =
    "I lost the thread of that conversation. Please start the command over.";

/// Keyboard affordance offered alongside the existing categories.
pub const CREATE_CATEGORY_BUTTON: &str = "Create new category";

pub(crate) fn failure_text(err: &EngineError) -> String {
    format!("Something went wrong: {err}")
}

pub(crate) fn purchase_added_text(expenses: &ExpensesAndLimit) -> String {
    let mut text = PURCHASE_ADDED.to_string();
    if expenses.has_limit() {
        let code = expenses.currency.code();
        text.push_str(&format!(
            "\n\nYour monthly limit is {} {}. You have spent {} {} this month.",
            format_sum(expenses.limit),
            code,
            format_sum(expenses.expenses),
            code
        ));
        if expenses.limit_exceeded {
            text.push_str("\nYou have exceeded the limit!");
        }
    }
    text
}
