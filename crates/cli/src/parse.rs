//! ArgMatches → Action conversion.
//!
//! Translates clap's parsed arguments into a single [`Action`]. Reading
//! restore input (file or stdin) also happens here so execution only deals
//! with the store.

use std::io::Read;
use std::path::PathBuf;

use clap::ArgMatches;
use deskdb_core::{
    ArticlePatch, ArticleStatus, MembershipTier, NewArticle, NewSubscription, NewUser,
    PartitionKind,
};
use deskdb_search::{DateWindow, SearchFilters, SearchRequest};

/// One command to run against the store.
#[derive(Debug)]
pub enum Action {
    ArticleList { status: Option<ArticleStatus> },
    ArticleGet { key: String },
    ArticleCreate(Box<NewArticle>),
    ArticleUpdate { id: String, patch: Box<ArticlePatch> },
    ArticleStatus { id: String, status: ArticleStatus },
    ArticleDelete { id: String },

    UserList,
    UserGet { key: String },
    UserCreate(NewUser),
    UserTier { id: String, tier: MembershipTier },
    UserWatch { user_id: String, article_id: String },
    UserWatchlist { user_id: String },
    UserDelete { id: String },

    CommentList { article_id: Option<String>, include_hidden: bool },
    CommentFlagged,
    CommentAdd { article_id: String, user_id: String, content: String },
    CommentReply { parent_id: String, user_id: String, content: String },
    CommentHide { id: String, hidden: bool },
    CommentFlag { id: String, flagged: bool },
    CommentDelete { id: String },

    NewsletterList { active_only: bool },
    NewsletterSubscribe(NewSubscription),
    NewsletterUnsubscribe { email: String },
    NewsletterDelete { id: String },

    Search {
        request: SearchRequest,
        include_unpublished: bool,
        exhaustive: bool,
    },

    Stats,
    Export,
    Backup { out: Option<PathBuf> },
    Restore { text: String },
    Clear,
    Reset { partition: PartitionKind },
}

/// Convert clap ArgMatches into an Action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<Action, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "article" => parse_article(sub_matches),
        "user" => parse_user(sub_matches),
        "comment" => parse_comment(sub_matches),
        "newsletter" => parse_newsletter(sub_matches),
        "search" => parse_search(sub_matches),
        "stats" => Ok(Action::Stats),
        "export" => Ok(Action::Export),
        "backup" => Ok(Action::Backup {
            out: opt(sub_matches, "out").map(PathBuf::from),
        }),
        "restore" => Ok(Action::Restore {
            text: read_source(&req(sub_matches, "file")?)?,
        }),
        "clear" => {
            if sub_matches.get_flag("yes") {
                Ok(Action::Clear)
            } else {
                Err("clear deletes every record; pass --yes to confirm".to_string())
            }
        }
        "reset" => Ok(Action::Reset {
            partition: req(sub_matches, "partition")?.parse()?,
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn req(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", name))
}

fn opt(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn all(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn some_if_given(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn subcommand(matches: &ArgMatches) -> Result<(&str, &ArgMatches), String> {
    matches
        .subcommand()
        .ok_or_else(|| "No subcommand provided".to_string())
}

/// Read text from a file path, or stdin for `-`.
fn read_source(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(text)
    } else {
        std::fs::read_to_string(source).map_err(|e| format!("Failed to read {}: {}", source, e))
    }
}

// =========================================================================
// Per-command parsers
// =========================================================================

fn parse_article(matches: &ArgMatches) -> Result<Action, String> {
    let (name, m) = subcommand(matches)?;
    match name {
        "list" => Ok(Action::ArticleList {
            status: opt(m, "status").map(|s| s.parse()).transpose()?,
        }),
        "get" => Ok(Action::ArticleGet { key: req(m, "id")? }),
        "create" => {
            let mut new = NewArticle::new(req(m, "title")?)
                .with_tags(all(m, "tag"))
                .with_abstract(all(m, "abstract"));
            if let Some(slug) = opt(m, "slug") {
                new = new.with_slug(slug);
            }
            if let Some(ticker) = opt(m, "ticker") {
                new = new.with_ticker(ticker);
            }
            if let Some(class) = opt(m, "class") {
                new = new.with_classification(class);
            }
            if let Some(location) = opt(m, "location") {
                new = new.with_location(location);
            }
            if let Some(status) = opt(m, "status") {
                new = new.with_status(status.parse()?);
            }
            Ok(Action::ArticleCreate(Box::new(new)))
        }
        "update" => {
            let patch = ArticlePatch {
                title: opt(m, "title"),
                slug: opt(m, "slug"),
                ticker: opt(m, "ticker"),
                classification: opt(m, "class"),
                location: opt(m, "location"),
                tags: some_if_given(all(m, "tag")),
                abstract_paragraphs: some_if_given(all(m, "abstract")),
                ..ArticlePatch::default()
            };
            if patch.is_empty() {
                return Err("Nothing to update".to_string());
            }
            Ok(Action::ArticleUpdate {
                id: req(m, "id")?,
                patch: Box::new(patch),
            })
        }
        "status" => Ok(Action::ArticleStatus {
            id: req(m, "id")?,
            status: req(m, "status")?.parse()?,
        }),
        "delete" => Ok(Action::ArticleDelete { id: req(m, "id")? }),
        other => Err(format!("Unknown article command: {}", other)),
    }
}

fn parse_user(matches: &ArgMatches) -> Result<Action, String> {
    let (name, m) = subcommand(matches)?;
    match name {
        "list" => Ok(Action::UserList),
        "get" => Ok(Action::UserGet { key: req(m, "id")? }),
        "create" => {
            let mut new = NewUser::new(req(m, "username")?, req(m, "email")?);
            if let Some(tier) = opt(m, "tier") {
                new = new.with_tier(tier.parse()?);
            }
            Ok(Action::UserCreate(new))
        }
        "tier" => Ok(Action::UserTier {
            id: req(m, "id")?,
            tier: req(m, "tier")?.parse()?,
        }),
        "watch" => Ok(Action::UserWatch {
            user_id: req(m, "id")?,
            article_id: req(m, "article")?,
        }),
        "watchlist" => Ok(Action::UserWatchlist { user_id: req(m, "id")? }),
        "delete" => Ok(Action::UserDelete { id: req(m, "id")? }),
        other => Err(format!("Unknown user command: {}", other)),
    }
}

fn parse_comment(matches: &ArgMatches) -> Result<Action, String> {
    let (name, m) = subcommand(matches)?;
    match name {
        "list" => Ok(Action::CommentList {
            article_id: opt(m, "article"),
            include_hidden: m.get_flag("hidden"),
        }),
        "flagged" => Ok(Action::CommentFlagged),
        "add" => Ok(Action::CommentAdd {
            article_id: req(m, "article")?,
            user_id: req(m, "user")?,
            content: req(m, "content")?,
        }),
        "reply" => Ok(Action::CommentReply {
            parent_id: req(m, "parent")?,
            user_id: req(m, "user")?,
            content: req(m, "content")?,
        }),
        "hide" => Ok(Action::CommentHide {
            id: req(m, "id")?,
            hidden: !m.get_flag("undo"),
        }),
        "flag" => Ok(Action::CommentFlag {
            id: req(m, "id")?,
            flagged: !m.get_flag("undo"),
        }),
        "delete" => Ok(Action::CommentDelete { id: req(m, "id")? }),
        other => Err(format!("Unknown comment command: {}", other)),
    }
}

fn parse_newsletter(matches: &ArgMatches) -> Result<Action, String> {
    let (name, m) = subcommand(matches)?;
    match name {
        "list" => Ok(Action::NewsletterList {
            active_only: m.get_flag("active"),
        }),
        "subscribe" => {
            let mut new = NewSubscription::new(req(m, "email")?);
            if let Some(name) = opt(m, "name") {
                new = new.with_name(name);
            }
            if let Some(source) = opt(m, "source") {
                new = new.with_source(source);
            }
            Ok(Action::NewsletterSubscribe(new))
        }
        "unsubscribe" => Ok(Action::NewsletterUnsubscribe {
            email: req(m, "email")?,
        }),
        "delete" => Ok(Action::NewsletterDelete { id: req(m, "id")? }),
        other => Err(format!("Unknown newsletter command: {}", other)),
    }
}

fn parse_search(m: &ArgMatches) -> Result<Action, String> {
    let classes = all(m, "class");
    let locations = all(m, "location");
    let tags = all(m, "tag");
    let since = opt(m, "since")
        .map(|s| s.parse::<DateWindow>())
        .transpose()?;

    let mut filters = SearchFilters::default();
    if !classes.is_empty() || !locations.is_empty() || !tags.is_empty() || since.is_some() {
        filters = SearchFilters::enabled()
            .with_classifications(classes)
            .with_locations(locations)
            .with_tags(tags);
        if let Some(window) = since {
            filters = filters.with_date_range(window);
        }
    }

    Ok(Action::Search {
        request: SearchRequest::new(req(m, "query")?).with_filters(filters),
        include_unpublished: m.get_flag("all"),
        exhaustive: m.get_flag("exhaustive"),
    })
}
