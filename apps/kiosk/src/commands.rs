//! # Kiosk Commands
//!
//! Parses one input line into a [`Command`].
//!
//! ```text
//! menu                      show the menu
//! add <item_id>             add one to the cart
//! qty <item_id> <text>      set a line's quantity
//! cart                      show lines and total
//! table <text>              enter the table by hand
//! scan | cancel             start / cancel a table scan
//! decode <payload>          sensor decoded a code
//! noise <message>           sensor failed to decode a frame
//! order                     place the order
//! status                    refresh the last order from the backend
//! qr <table_id>             fetch a table's code
//! lookup <table_id>         show a registered table
//! register <number> <seats> create a table and fetch its code
//! reload                    reload the menu
//! help | quit
//! ```

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Menu,
    Add(String),
    Quantity { item_id: String, text: String },
    Cart,
    Table(String),
    Scan,
    Decode(String),
    Noise(String),
    Cancel,
    Order,
    Status,
    Qr(String),
    Lookup(String),
    Register { table_number: u32, seats: u32 },
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  menu | cart | order | status | reload | help | quit
  add <item_id>             qty <item_id> <quantity>
  table <table_id>          scan | decode <payload> | noise <message> | cancel
  qr <table_id>             lookup <table_id>
  register <table_number> <seats>";

/// Parses a line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Option<Result<Command, String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    Some(match word.to_lowercase().as_str() {
        "menu" => Ok(Command::Menu),
        "cart" => Ok(Command::Cart),
        "scan" => Ok(Command::Scan),
        "cancel" => Ok(Command::Cancel),
        "order" => Ok(Command::Order),
        "status" => Ok(Command::Status),
        "reload" => Ok(Command::Reload),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "add" => required(rest, "add <item_id>").map(Command::Add),
        "table" => Ok(Command::Table(rest.to_string())),
        "decode" => Ok(Command::Decode(rest.to_string())),
        "noise" => Ok(Command::Noise(rest.to_string())),
        "qr" => Ok(Command::Qr(rest.to_string())),
        "lookup" => required(rest, "lookup <table_id>").map(Command::Lookup),
        "qty" => match rest.split_once(char::is_whitespace) {
            Some((item_id, text)) => Ok(Command::Quantity {
                item_id: item_id.to_string(),
                text: text.trim().to_string(),
            }),
            None => Err("usage: qty <item_id> <quantity>".to_string()),
        },
        "register" => parse_register(rest),
        other => Err(format!("unknown command '{}' (try 'help')", other)),
    })
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(arg.to_string())
    }
}

fn parse_register(rest: &str) -> Result<Command, String> {
    const USAGE: &str = "usage: register <table_number> <seats>";

    let mut parts = rest.split_whitespace();
    let (Some(number), Some(seats), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(USAGE.to_string());
    };

    match (number.parse(), seats.parse()) {
        (Ok(table_number), Ok(seats)) => Ok(Command::Register {
            table_number,
            seats,
        }),
        _ => Err(USAGE.to_string()),
    }
}
