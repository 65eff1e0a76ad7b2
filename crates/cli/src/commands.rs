//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("deskdb")
        .about("Admin console for the DeskDB research store")
        .subcommand_required(true)
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .help("Database directory (default: .deskdb)")
                .global(true),
        )
        .arg(
            Arg::new("memory")
                .long("memory")
                .help("Ephemeral in-memory database, no disk")
                .action(ArgAction::SetTrue)
                .conflicts_with("db")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log engine activity to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_article())
        .subcommand(build_user())
        .subcommand(build_comment())
        .subcommand(build_newsletter())
        .subcommand(build_search())
        .subcommand(build_stats())
        .subcommand(build_export())
        .subcommand(build_backup())
        .subcommand(build_restore())
        .subcommand(build_clear())
        .subcommand(build_reset())
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id").required(true).value_name("ID").help(help)
}

fn many(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("VALUE")
        .action(ArgAction::Append)
        .help(help)
}

fn article_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("slug").long("slug").help("URL slug"))
        .arg(Arg::new("ticker").long("ticker").help("Token ticker"))
        .arg(
            Arg::new("class")
                .long("class")
                .help("Classification, e.g. DeFi"),
        )
        .arg(Arg::new("location").long("location").help("Jurisdiction or region"))
        .arg(many("tag", "Tag (repeatable)"))
        .arg(many("abstract", "Abstract paragraph (repeatable)"))
}

// =========================================================================
// Articles
// =========================================================================

fn build_article() -> Command {
    Command::new("article")
        .about("Research articles")
        .subcommand_required(true)
        .subcommand(
            Command::new("list").about("List articles").arg(
                Arg::new("status")
                    .long("status")
                    .value_parser(["draft", "test", "published"])
                    .help("Only articles with this status"),
            ),
        )
        .subcommand(
            Command::new("get")
                .about("Get an article by id or slug")
                .arg(id_arg("Article id or slug")),
        )
        .subcommand(article_fields(
            Command::new("create")
                .about("Create an article")
                .arg(Arg::new("title").required(true).help("Article title"))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(["draft", "test", "published"])
                        .help("Initial status (default: draft)"),
                ),
        ))
        .subcommand(article_fields(
            Command::new("update")
                .about("Update article fields")
                .arg(id_arg("Article id"))
                .arg(Arg::new("title").long("title").help("New title")),
        ))
        .subcommand(
            Command::new("status")
                .about("Move an article through draft/test/published")
                .arg(id_arg("Article id"))
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(["draft", "test", "published"]),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an article")
                .arg(id_arg("Article id")),
        )
}

// =========================================================================
// Users
// =========================================================================

fn build_user() -> Command {
    Command::new("user")
        .about("User accounts and watchlists")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List users"))
        .subcommand(
            Command::new("get")
                .about("Get a user by id or username")
                .arg(id_arg("User id or username")),
        )
        .subcommand(
            Command::new("create")
                .about("Register a user")
                .arg(Arg::new("username").required(true))
                .arg(Arg::new("email").required(true))
                .arg(
                    Arg::new("tier")
                        .long("tier")
                        .value_parser(["free", "premium", "admin"])
                        .help("Membership tier (default: free)"),
                ),
        )
        .subcommand(
            Command::new("tier")
                .about("Change a user's membership tier")
                .arg(id_arg("User id"))
                .arg(
                    Arg::new("tier")
                        .required(true)
                        .value_parser(["free", "premium", "admin"]),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Toggle an article on a user's watchlist")
                .arg(id_arg("User id"))
                .arg(Arg::new("article").required(true).help("Article id")),
        )
        .subcommand(
            Command::new("watchlist")
                .about("Show the articles a user watches")
                .arg(id_arg("User id")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a user")
                .arg(id_arg("User id")),
        )
}

// =========================================================================
// Comments
// =========================================================================

fn build_comment() -> Command {
    Command::new("comment")
        .about("Reader comments and moderation")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List comments")
                .arg(
                    Arg::new("article")
                        .long("article")
                        .help("Only comments on this article"),
                )
                .arg(
                    Arg::new("hidden")
                        .long("hidden")
                        .action(ArgAction::SetTrue)
                        .help("Include hidden comments (with --article)"),
                ),
        )
        .subcommand(Command::new("flagged").about("Comments and replies awaiting review"))
        .subcommand(
            Command::new("add")
                .about("Post a comment as a user")
                .arg(Arg::new("article").required(true).help("Article id"))
                .arg(Arg::new("user").required(true).help("Author user id"))
                .arg(Arg::new("content").required(true)),
        )
        .subcommand(
            Command::new("reply")
                .about("Reply to a top-level comment")
                .arg(Arg::new("parent").required(true).help("Parent comment id"))
                .arg(Arg::new("user").required(true).help("Author user id"))
                .arg(Arg::new("content").required(true)),
        )
        .subcommand(
            Command::new("hide")
                .about("Hide a comment or reply")
                .arg(id_arg("Comment id"))
                .arg(
                    Arg::new("undo")
                        .long("undo")
                        .action(ArgAction::SetTrue)
                        .help("Unhide instead"),
                ),
        )
        .subcommand(
            Command::new("flag")
                .about("Flag a comment or reply for review")
                .arg(id_arg("Comment id"))
                .arg(
                    Arg::new("undo")
                        .long("undo")
                        .action(ArgAction::SetTrue)
                        .help("Clear the flag instead"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a comment (with its replies) or a reply")
                .arg(id_arg("Comment id")),
        )
}

// =========================================================================
// Newsletter
// =========================================================================

fn build_newsletter() -> Command {
    Command::new("newsletter")
        .about("Newsletter subscriptions")
        .subcommand_required(true)
        .subcommand(
            Command::new("list").about("List subscriptions").arg(
                Arg::new("active")
                    .long("active")
                    .action(ArgAction::SetTrue)
                    .help("Only active subscriptions"),
            ),
        )
        .subcommand(
            Command::new("subscribe")
                .about("Subscribe (or resubscribe) an email")
                .arg(Arg::new("email").required(true))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("source").long("source").help("Signup source")),
        )
        .subcommand(
            Command::new("unsubscribe")
                .about("Unsubscribe an email")
                .arg(Arg::new("email").required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a subscription record")
                .arg(id_arg("Subscription id")),
        )
}

// =========================================================================
// Search
// =========================================================================

fn build_search() -> Command {
    Command::new("search")
        .about("Relevance search over published research")
        .arg(Arg::new("query").required(true).help("Search text"))
        .arg(many("class", "Allowed classification (repeatable)"))
        .arg(many("location", "Allowed location (repeatable)"))
        .arg(many("tag", "Required tag, any of (repeatable)"))
        .arg(
            Arg::new("since")
                .long("since")
                .value_parser(["1w", "1m", "3m", "6m", "1y"])
                .help("Only articles from this window"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Also search drafts and test articles"),
        )
        .arg(
            Arg::new("exhaustive")
                .long("exhaustive")
                .action(ArgAction::SetTrue)
                .help("Score every article instead of stopping early"),
        )
}

// =========================================================================
// Maintenance
// =========================================================================

fn build_stats() -> Command {
    Command::new("stats").about("Show system metadata and storage use")
}

fn build_export() -> Command {
    Command::new("export").about("Print every partition as JSON without recording a backup")
}

fn build_backup() -> Command {
    Command::new("backup").about("Write a backup and record its time").arg(
        Arg::new("out")
            .long("out")
            .short('o')
            .value_name("PATH")
            .help("Write to a file instead of stdout"),
    )
}

fn build_restore() -> Command {
    Command::new("restore")
        .about("Replace every partition from a backup")
        .arg(
            Arg::new("file")
                .required(true)
                .value_name("PATH")
                .help("Backup file ('-' for stdin)"),
        )
}

fn build_clear() -> Command {
    Command::new("clear").about("Delete all records").arg(
        Arg::new("yes")
            .long("yes")
            .action(ArgAction::SetTrue)
            .help("Confirm"),
    )
}

fn build_reset() -> Command {
    Command::new("reset")
        .about("Reset one partition to empty, e.g. after corruption")
        .arg(
            Arg::new("partition")
                .required(true)
                .value_parser(["articles", "users", "comments", "newsletter", "system"]),
        )
}
