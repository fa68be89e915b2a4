// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

pub const USER_ENV: &str = "KOPIYKA_USER";

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn tx_fields(cmd: Command, creating: bool) -> Command {
    cmd.arg(
        Arg::new("table")
            .long("table")
            .required(creating)
            .value_parser(value_parser!(i64))
            .help("Table id"),
    )
    .arg(Arg::new("amount").long("amount").required(creating))
    .arg(
        Arg::new("currency")
            .long("currency")
            .help("UAH, USD or EUR (default UAH)"),
    )
    .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default today)"))
    .arg(
        Arg::new("category")
            .long("category")
            .help("Main category name; created when missing"),
    )
    .arg(
        Arg::new("subcategory")
            .long("subcategory")
            .requires("category")
            .help("Subcategory of --category; created when missing"),
    )
    .arg(Arg::new("description").long("description"))
}

fn filter_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("search")
            .long("search")
            .help("Substring of the table title"),
    )
    .arg(Arg::new("from").long("from").help("YYYY-MM-DD, inclusive"))
    .arg(Arg::new("to").long("to").help("YYYY-MM-DD, inclusive"))
    .arg(
        Arg::new("category")
            .long("category")
            .help("Main category; includes its subcategories"),
    )
    .arg(
        Arg::new("subcategory")
            .long("subcategory")
            .help("Exact subcategory; overrides --category"),
    )
    .arg(Arg::new("currency").long("currency"))
}

pub fn build_cli() -> Command {
    Command::new("kopiyka")
        .about("Personal finance tables with categories, currency conversion and analytics")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env(USER_ENV)
                .help("E-mail of the acting user"),
        )
        .subcommand(Command::new("init").about("Create the database and seed default categories"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(Command::new("add").arg(Arg::new("email").long("email").required(true)))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("table")
                .about("Manage tables (ledgers) of the acting user")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("color").long("color").help("#RRGGBB")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("title").long("title"))
                        .arg(Arg::new("color").long("color")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the shared category hierarchy")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .help("Existing main category"),
                        )
                        .arg(
                            Arg::new("new_parent")
                                .long("new-parent")
                                .help("Main category to create (or reuse) as parent"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("children").arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("path").arg(id_arg()))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("promote")
                        .about("Make a subcategory a main category")
                        .arg(id_arg()),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("seed").about("Add missing default categories")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(json_flags(filter_args(
                    Command::new("list")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .arg(
                            Arg::new("convert_to")
                                .long("convert-to")
                                .help("Also show amounts converted to this currency"),
                        ),
                )))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(tx_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rates and conversion")
                .subcommand(Command::new("currencies"))
                .subcommand(Command::new("rates"))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").default_value("UAH"))
                        .arg(Arg::new("to").long("to").default_value("USD")),
                )
                .subcommand(
                    Command::new("set-key").arg(Arg::new("key").long("key").required(true)),
                )
                .subcommand(
                    Command::new("set-reporting").arg(
                        Arg::new("currency").long("currency").required(true),
                    ),
                ),
        )
        .subcommand(json_flags(filter_args(
            Command::new("analytics")
                .about("Spending breakdown in the reporting currency")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .default_value("all")
                        .help("'all' or a number of days"),
                )
                .arg(
                    Arg::new("report_in")
                        .long("report-in")
                        .help("Reporting currency (default: setting, else UAH)"),
                ),
        )))
        .subcommand(json_flags(
            Command::new("dashboard").about("Recent transactions and overall total"),
        ))
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
}
