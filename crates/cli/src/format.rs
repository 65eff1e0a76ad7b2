//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one record per line, e.g. `1) [published] Aave (aave)`,
//!   `(nil)`, `OK`
//! - **JSON** (`--json`): `serde_json::to_string_pretty` of the records

use deskdb_core::{
    Article, Comment, DatabaseExport, NewsletterSubscription, StoreError, SystemMetadata, User,
};
use deskdb_search::SearchHit;
use serde::Serialize;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of executing one action.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Unit,
    Nil,
    Bool(bool),
    Article(Box<Article>),
    Articles(Vec<Article>),
    User(User),
    Users(Vec<User>),
    Comment(Box<Comment>),
    Comments(Vec<Comment>),
    Subscription(NewsletterSubscription),
    Subscriptions(Vec<NewsletterSubscription>),
    Hits(Vec<SearchHit>),
    Stats(Stats),
    Export(Box<DatabaseExport>),
    /// Preformatted text, printed as is in every mode
    Text(String),
    Written {
        path: String,
        bytes: usize,
    },
}

/// System metadata plus storage use.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(flatten)]
    pub metadata: SystemMetadata,
    pub used_bytes: u64,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    if let Output::Text(text) = output {
        return text.clone();
    }
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format a store error.
pub fn format_error(err: &StoreError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string(),
            "code": err.code(),
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format a usage error (bad arguments, unreadable input file).
pub fn format_usage_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({ "error": message }))
            .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", message)),
        OutputMode::Human => format!("(error) {}", message),
    }
}

// =========================================================================
// JSON mode
// =========================================================================

fn format_json(output: &Output) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Human mode
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Unit => "OK".to_string(),
        Output::Nil => "(nil)".to_string(),
        Output::Bool(b) => format!("(boolean) {}", b),
        Output::Article(article) => format_article_detail(article),
        Output::Articles(articles) => numbered(articles, format_article_line),
        Output::User(user) => format_user_line(user),
        Output::Users(users) => numbered(users, format_user_line),
        Output::Comment(comment) => format_comment_thread(comment),
        Output::Comments(comments) => numbered(comments, format_comment_thread),
        Output::Subscription(sub) => format_subscription_line(sub),
        Output::Subscriptions(subs) => numbered(subs, format_subscription_line),
        Output::Hits(hits) => numbered(hits, format_hit),
        Output::Stats(stats) => format_stats(&stats.metadata, stats.used_bytes),
        Output::Export(export) => format!(
            "{} articles, {} users, {} comments, {} subscriptions",
            export.articles.len(),
            export.users.len(),
            export.comments.len(),
            export.newsletter.len()
        ),
        Output::Text(text) => text.clone(),
        Output::Written { path, bytes } => format!("Wrote {} bytes to {}", bytes, path),
    }
}

fn numbered<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(empty list)".to_string();
    }
    items
        .iter()
        .enumerate()
        // Continuation lines line up under the first
        .map(|(i, item)| format!("{}) {}", i + 1, line(item).replace('\n', "\n   ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_article_line(article: &Article) -> String {
    format!(
        "[{}] {} ({}) {}",
        article.status, article.title, article.slug, article.id
    )
}

fn format_article_detail(article: &Article) -> String {
    let mut lines = vec![
        format!("id: {}", article.id),
        format!("slug: {}", article.slug),
        format!("title: {}", article.title),
        format!("status: {}", article.status),
    ];
    if !article.ticker.is_empty() {
        lines.push(format!("ticker: {}", article.ticker));
    }
    if !article.classification.is_empty() {
        lines.push(format!("classification: {}", article.classification));
    }
    if !article.location.is_empty() {
        lines.push(format!("location: {}", article.location));
    }
    if !article.tags.is_empty() {
        lines.push(format!("tags: {}", article.tags.join(", ")));
    }
    for member in &article.team {
        lines.push(format!("team: {} ({})", member.name, member.role));
    }
    lines.push(format!("created: {}", article.created_at.to_rfc3339()));
    if let Some(published) = article.published_at {
        lines.push(format!("published: {}", published.to_rfc3339()));
    }
    for paragraph in &article.abstract_paragraphs {
        lines.push(String::new());
        lines.push(paragraph.clone());
    }
    lines.join("\n")
}

fn format_user_line(user: &User) -> String {
    format!(
        "{} <{}> [{}] {} ({} watched)",
        user.username,
        user.email,
        user.tier,
        user.id,
        user.watchlist.len()
    )
}

fn comment_marks(comment: &Comment) -> String {
    let mut marks = String::new();
    if comment.hidden {
        marks.push_str(" [hidden]");
    }
    if comment.flagged {
        marks.push_str(" [flagged]");
    }
    marks
}

fn format_comment_thread(comment: &Comment) -> String {
    let mut lines = vec![format!(
        "{} @{} on {}: {}{}",
        comment.id,
        comment.author.username,
        comment.article_slug,
        comment.content,
        comment_marks(comment)
    )];
    for reply in &comment.replies {
        lines.push(format!(
            "  ↳ {} @{}: {}{}",
            reply.id,
            reply.author.username,
            reply.content,
            comment_marks(reply)
        ));
    }
    lines.join("\n")
}

fn format_subscription_line(sub: &NewsletterSubscription) -> String {
    let status = if sub.is_active() {
        "subscribed"
    } else {
        "unsubscribed"
    };
    if sub.name.is_empty() {
        format!("{} [{}] {}", sub.email, status, sub.id)
    } else {
        format!("{} ({}) [{}] {}", sub.email, sub.name, status, sub.id)
    }
}

fn format_hit(hit: &SearchHit) -> String {
    let fields = hit
        .matched_fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!(
        "({}) {} ({}) [{}]",
        hit.relevance, hit.article.title, hit.article.slug, fields
    );
    if let Some(excerpt) = &hit.excerpt {
        text.push('\n');
        text.push_str(&excerpt.marked("[", "]"));
    }
    text
}

fn format_stats(metadata: &SystemMetadata, used_bytes: u64) -> String {
    let last_backup = metadata
        .last_backup
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    [
        format!("articles: {}", metadata.total_articles),
        format!("published: {}", metadata.total_protocols),
        format!("users: {}", metadata.total_users),
        format!("comments: {}", metadata.total_comments),
        format!("schema version: {}", metadata.version),
        format!("last backup: {}", last_backup),
        format!("storage used: {} bytes", used_bytes),
    ]
    .join("\n")
}
