// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn pos(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn date_opt() -> Arg {
    opt("date", "Date (YYYY-MM-DD), defaults to today")
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage ledger users")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create a user")
                .arg(pos("email", "User email"))
                .arg(opt("base", "Base currency (defaults to the configured base)")),
        )
        .subcommand(
            Command::new("use")
                .about("Switch the current user")
                .arg(pos("email", "User email")),
        )
        .subcommand(json_flags(Command::new("list").about("List users")))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Open an account")
                .arg(pos("name", "Account name"))
                .arg(
                    req("type", "Account type")
                        .value_parser(["CASH", "CHECKING", "SAVINGS", "FIXED_DEPOSIT"])
                        .ignore_case(true),
                )
                .arg(req("currency", "ISO-4217 currency code"))
                .arg(opt("opening", "Opening balance"))
                .arg(opt("rate", "Interest rate (fixed deposits only)"))
                .arg(opt("maturity", "Maturity date (fixed deposits only)")),
        )
        .subcommand(json_flags(
            Command::new("list").about("List accounts").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include deactivated accounts"),
            ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit account details")
                .arg(pos("account", "Account name or id"))
                .arg(opt("name", "New name"))
                .arg(opt("rate", "Interest rate"))
                .arg(opt("maturity", "Maturity date"))
                .arg(
                    Arg::new("activate")
                        .long("activate")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("deactivate"),
                )
                .arg(
                    Arg::new("deactivate")
                        .long("deactivate")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an account, or deactivate it if it has history")
                .arg(pos("account", "Account name or id")),
        )
}

fn card_config_args(cmd: Command) -> Command {
    cmd.arg(opt("credit-limit", "Credit limit (CREDIT)"))
        .arg(opt("linked-account", "Account used for auto-transfer (DEBIT)"))
        .arg(opt("monthly-limit", "Monthly limit (POSTPAY)"))
        .arg(
            opt("due-day", "Day of month payments fall due (POSTPAY, 1-28)")
                .value_parser(value_parser!(u32)),
        )
}

fn card_cmd() -> Command {
    Command::new("card")
        .about("Manage cards and card payments")
        .subcommand_required(true)
        .subcommand(card_config_args(
            Command::new("add")
                .about("Issue a card against an account")
                .arg(pos("name", "Card name"))
                .arg(
                    req("type", "Card type")
                        .value_parser(["CREDIT", "DEBIT", "PREPAID", "POSTPAY"])
                        .ignore_case(true),
                )
                .arg(req("account", "Account name or id"))
                .arg(
                    Arg::new("auto-transfer")
                        .long("auto-transfer")
                        .action(ArgAction::SetTrue)
                        .help("Top up from the linked account when short (DEBIT)"),
                )
                .arg(opt("balance", "Initial balance (PREPAID)")),
        ))
        .subcommand(json_flags(
            Command::new("list").about("List cards").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include deactivated cards"),
            ),
        ))
        .subcommand(card_config_args(
            Command::new("edit")
                .about("Edit a card")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64)))
                .arg(opt("name", "New name"))
                .arg(
                    opt("auto-transfer", "Enable or disable auto-transfer")
                        .value_parser(value_parser!(bool)),
                )
                .arg(
                    Arg::new("activate")
                        .long("activate")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("deactivate"),
                )
                .arg(
                    Arg::new("deactivate")
                        .long("deactivate")
                        .action(ArgAction::SetTrue),
                ),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete a card, or deactivate it if it has history")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64))),
        )
        .subcommand(
            Command::new("charge")
                .about("Load a prepaid card from another account")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64)))
                .arg(req("amount", "Amount to load"))
                .arg(req("from", "Source account name or id"))
                .arg(date_opt()),
        )
        .subcommand(json_flags(
            Command::new("pay")
                .about("Pay with a card")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64)))
                .arg(req("amount", "Amount"))
                .arg(opt("currency", "Currency (defaults to the card account's)"))
                .arg(opt("description", "Description"))
                .arg(opt("category", "Category name or id"))
                .arg(date_opt()),
        ))
        .subcommand(
            Command::new("available")
                .about("Show remaining credit for the month")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64)))
                .arg(date_opt()),
        )
        .subcommand(json_flags(
            Command::new("cycle")
                .about("Show the postpay cycle a date falls into")
                .arg(pos("id", "Card id").value_parser(value_parser!(i64)))
                .arg(date_opt()),
        ))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(pos("name", "Category name")),
        )
        .subcommand(json_flags(Command::new("list").about("List categories")))
        .subcommand(
            Command::new("rm")
                .about("Remove a category")
                .arg(pos("name", "Category name or id")),
        )
}

fn tx_kind(arg: Arg) -> Arg {
    arg.value_parser(["INCOME", "EXPENSE", "TRANSFER"])
        .ignore_case(true)
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(req("account", "Account name or id"))
                .arg(tx_kind(req("type", "Transaction type")))
                .arg(req("amount", "Positive amount"))
                .arg(opt("currency", "Currency (defaults to the account's)"))
                .arg(opt("to", "Destination account for transfers"))
                .arg(opt("card", "Card id").value_parser(value_parser!(i64)))
                .arg(opt("category", "Category name or id"))
                .arg(opt("description", "Description"))
                .arg(date_opt()),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(opt("month", "Month (YYYY-MM)"))
                .arg(opt("account", "Account name or id"))
                .arg(opt("category", "Category name or id"))
                .arg(tx_kind(opt("type", "Transaction type")))
                .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize))),
        ))
        .subcommand(
            Command::new("reverse")
                .about("Record the compensating entry for a transaction")
                .arg(pos("id", "Transaction id").value_parser(value_parser!(i64)))
                .arg(date_opt()),
        )
}

fn scheduled_cmd() -> Command {
    Command::new("scheduled")
        .about("Scheduled and recurring transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Schedule a transaction")
                .arg(req("account", "Account name or id"))
                .arg(tx_kind(req("type", "Transaction type")))
                .arg(req("amount", "Positive amount"))
                .arg(req("due", "Due date (YYYY-MM-DD)"))
                .arg(opt("currency", "Currency (defaults to the account's)"))
                .arg(opt("to", "Destination account for transfers"))
                .arg(opt("card", "Card id").value_parser(value_parser!(i64)))
                .arg(opt("category", "Category name or id"))
                .arg(opt("description", "Description"))
                .arg(
                    opt("frequency", "Repeat every DAILY, WEEKLY, MONTHLY or YEARLY")
                        .value_parser(["DAILY", "WEEKLY", "MONTHLY", "YEARLY"])
                        .ignore_case(true),
                )
                .arg(opt("until", "Last date an occurrence may fall on")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List scheduled transactions")
                .arg(
                    opt("status", "Filter by stored status")
                        .value_parser(["PENDING", "COMPLETED", "CANCELLED"])
                        .ignore_case(true),
                ),
        ))
        .subcommand(json_flags(
            Command::new("complete")
                .about("Materialise a scheduled transaction")
                .arg(pos("id", "Scheduled transaction id").value_parser(value_parser!(i64)))
                .arg(date_opt()),
        ))
        .subcommand(
            Command::new("cancel")
                .about("Cancel a pending scheduled transaction")
                .arg(pos("id", "Scheduled transaction id").value_parser(value_parser!(i64))),
        )
}

fn fx_cmd() -> Command {
    Command::new("fx")
        .about("Exchange rates")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a rate")
                .arg(pos("from", "Source currency"))
                .arg(pos("to", "Target currency"))
                .arg(pos("rate", "Units of target per unit of source"))
                .arg(opt("source", "Where the rate came from").default_value("manual")),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch latest rates for the base currency from Frankfurter (ECB)"),
        )
        .subcommand(json_flags(Command::new("list").about("List the rate table")))
        .subcommand(
            Command::new("convert")
                .about("Convert an amount with the current rate table")
                .arg(pos("amount", "Amount"))
                .arg(pos("from", "Source currency"))
                .arg(pos("to", "Target currency"))
                .arg(opt("locale", "Format the result for a locale")),
        )
        .subcommand(
            Command::new("set-base")
                .about("Set the base currency")
                .arg(pos("currency", "ISO-4217 currency code")),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Monthly category budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .about("Set a budget in the base currency")
                .arg(req("month", "Month (YYYY-MM)"))
                .arg(req("category", "Category name or id"))
                .arg(req("amount", "Budgeted amount")),
        )
        .subcommand(json_flags(
            Command::new("report")
                .about("Spending against budget")
                .arg(req("month", "Month (YYYY-MM)")),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Reports")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("balances").about("Account balances ranked by value in base currency"),
        ))
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data")
        .subcommand_required(true)
        .subcommand(
            Command::new("transactions")
                .about("Export transactions")
                .arg(
                    opt("format", "Output format")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                )
                .arg(req("out", "Output file"))
                .arg(opt("month", "Month (YYYY-MM)")),
        )
}

fn reminders_cmd() -> Command {
    json_flags(
        Command::new("reminders")
            .about("Scheduled transactions that are due soon or overdue")
            .arg(
                opt("days", "Look-ahead window in days")
                    .value_parser(value_parser!(i64))
                    .default_value("3"),
            )
            .arg(date_opt()),
    )
}

pub fn build_cli() -> Command {
    Command::new("hearthbook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-currency household ledger")
        .arg(
            Arg::new("db")
                .long("db")
                .env("HEARTHBOOK_DB")
                .global(true)
                .num_args(1)
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .num_args(1)
                .help("Run as this user (email)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("HEARTHBOOK_LOG")
                .global(true)
                .num_args(1)
                .default_value("warn")
                .help("error, warn, info, debug or trace"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(user_cmd())
        .subcommand(account_cmd())
        .subcommand(card_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(scheduled_cmd())
        .subcommand(fx_cmd())
        .subcommand(budget_cmd())
        .subcommand(report_cmd())
        .subcommand(export_cmd())
        .subcommand(reminders_cmd())
        .subcommand(Command::new("doctor").about("Check rates and balance consistency"))
}
