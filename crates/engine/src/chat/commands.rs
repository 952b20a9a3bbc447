//! The command grammar. Splitting happens here; validation of the split
//! arguments is the parser module's job.

/// A recognized (but not yet validated) command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/add <sum> [category words] [DD.MM.YYYY]`. The last token is the
    /// date iff it has three dot-separated groups, so fractional sums
    /// never shadow dates.
    Add {
        sum: String,
        category: String,
        date: String,
    },
    /// `/category <name>` creates a global category.
    NewCategory { name: String },
    /// `/categories` lists the user's own categories.
    ListCategories,
    /// `/currency <RUB|USD|EUR|CNY>`.
    Currency { code: String },
    /// `/limit <value>`.
    Limit { value: String },
    /// `/report <day|week|month [offset]>`.
    Report { period: String },
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Command {
        let trimmed = text.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };
        // Group chats suffix commands with the bot name.
        let head = head.split('@').next().unwrap_or(head);

        match head {
            "/start" => Command::Start,
            "/help" => Command::Help,
            "/add" => parse_add(rest),
            "/category" if !rest.is_empty() => Command::NewCategory {
                name: rest.to_string(),
            },
            "/categories" => Command::ListCategories,
            "/currency" if !rest.is_empty() => Command::Currency {
                code: rest.to_string(),
            },
            "/limit" if !rest.is_empty() => Command::Limit {
                value: rest.to_string(),
            },
            "/report" if !rest.is_empty() => Command::Report {
                period: rest.to_string(),
            },
            _ => Command::Unknown,
        }
    }
}

fn parse_add(rest: &str) -> Command {
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let sum = if tokens.is_empty() {
        String::new()
    } else {
        tokens.remove(0).to_string()
    };

    let date = match tokens.last() {
        Some(last) if looks_like_date(last) => tokens.pop().unwrap_or_default().to_string(),
        _ => String::new(),
    };

    Command::Add {
        sum,
        category: tokens.join(" "),
        date,
    }
}

fn looks_like_date(token: &str) -> bool {
    token.split('.').count() == 3 && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}
