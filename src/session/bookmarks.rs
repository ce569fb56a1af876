//! Session-scoped bookmarks.
//!
//! A bookmark is a snapshot copied from a card when the user saves it. The
//! store never reads the live table again: exports work from snapshots only.

use indexmap::IndexMap;
use crate::config::{BOOKMARK_EXCERPT_CHARS, STORY_MAX_CHARS};
use crate::searching::highlight::{escape_html, highlight, truncate_chars};
use crate::searching::search_results::Card;

/// What is kept of a card once bookmarked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub rank: Option<String>,
    pub url: Option<String>,
    /// First characters of the story (empty if the card had none).
    pub story_excerpt: String,
}

impl BookmarkSnapshot {
    pub fn from_card(card: &Card, excerpt_chars: usize) -> Self {
        BookmarkSnapshot {
            id: card.id.clone(),
            name: card.name.clone(),
            region: card.region.clone(),
            rank: card.rank.clone(),
            url: card.url.clone(),
            story_excerpt: truncate_chars(card.story_text(), excerpt_chars).to_string(),
        }
    }
}

impl From<&Card> for BookmarkSnapshot {
    fn from(card: &Card) -> Self {
        BookmarkSnapshot::from_card(card, BOOKMARK_EXCERPT_CHARS)
    }
}

/// Bookmarks of one session, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    entries: IndexMap<String, BookmarkSnapshot>,
}

const EXPORT_STYLE: &str = "\
body{font-family:Roboto,Arial,sans-serif;max-width:860px;margin:2em auto;color:#212121;background:#FAFAFA}\
h1{color:#1565C0}\
article.bookmark{background:#FFFFFF;border:1px solid #E0E0E0;border-radius:6px;padding:1em 1.2em;margin:1em 0}\
article.bookmark h2{margin:0 0 .3em 0;font-size:1.2em}\
.meta{color:#616161;font-size:.9em}\
.excerpt{line-height:1.6;font-size:.95rem;margin-top:.6em}\
mark{background:#FFF176;border-radius:3px;padding:1px 2px}";

impl BookmarkStore {
    pub fn new() -> Self {
        BookmarkStore::default()
    }

    /// Saves `snapshot` under `id`, replacing any earlier snapshot.
    pub fn add(&mut self, id: impl Into<String>, snapshot: BookmarkSnapshot) {
        self.entries.insert(id.into(), snapshot);
    }

    /// Removes the bookmark; returns it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<BookmarkSnapshot> {
        self.entries.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&BookmarkSnapshot> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BookmarkSnapshot)> {
        self.entries.iter()
    }

    /// Bookmarks `card` if it is not bookmarked, removes it otherwise.
    /// Returns whether the card is bookmarked afterwards.
    pub fn toggle(&mut self, card: &Card) -> bool {
        if self.remove(&card.id).is_some() {
            false
        } else {
            self.add(card.id.clone(), BookmarkSnapshot::from(card));
            true
        }
    }

    /// Renders every bookmark into one standalone HTML document.
    ///
    /// With a non-blank `term`, each excerpt is highlighted for that term,
    /// independently of whatever search produced the bookmarks.
    pub fn export(&self, term: Option<&str>) -> String {
        let term = term.map(str::trim).unwrap_or("");
        let mut html = String::with_capacity(1024 + self.entries.len() * 512);

        html.push_str("<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Bookmarked cards</title>\n<style>");
        html.push_str(EXPORT_STYLE);
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str(&format!("<h1>Bookmarked cards ({})</h1>\n", self.entries.len()));
        if !term.is_empty() {
            html.push_str(&format!("<p class=\"meta\">Highlighted: «{}»</p>\n", escape_html(term)));
        }

        for (id, snapshot) in &self.entries {
            html.push_str(&render_bookmark(id, snapshot, term));
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn or_dash(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_else(|| "—".to_string())
}

fn render_bookmark(id: &str, snapshot: &BookmarkSnapshot, term: &str) -> String {
    let mut block = format!("<article class=\"bookmark\" data-id=\"{}\">\n", escape_html(id));
    block.push_str(&format!("<h2>{}</h2>\n", or_dash(&snapshot.name)));
    block.push_str(&format!(
        "<div class=\"meta\">Region: {} · Rank: {}</div>\n",
        or_dash(&snapshot.region),
        or_dash(&snapshot.rank)
    ));
    if let Some(url) = &snapshot.url {
        let url = escape_html(url);
        block.push_str(&format!("<div class=\"meta\"><a href=\"{url}\">{url}</a></div>\n"));
    }
    if !snapshot.story_excerpt.is_empty() {
        block.push_str(&format!(
            "<div class=\"excerpt\">{}</div>\n",
            highlight(&snapshot.story_excerpt, term, STORY_MAX_CHARS)
        ));
    }
    block.push_str("</article>\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, name: &str, story: Option<&str>) -> Card {
        Card {
            id: id.to_string(),
            name: Some(name.to_string()),
            region: Some("Тверская область".to_string()),
            rank: Some("рядовой".to_string()),
            url: Some(format!("https://example.org/card/{}", id)),
            story: story.map(str::to_string),
            ..Card::default()
        }
    }

    #[test]
    fn test_add_remove_round_trip() {
        let mut store = BookmarkStore::new();
        let c = card("42", "Иванов Иван", Some("Погиб под Ржевом"));
        store.add("42", BookmarkSnapshot::from(&c));
        assert!(store.contains("42"));
        assert_eq!(store.len(), 1);
        assert!(store.remove("42").is_some());
        assert!(!store.contains("42"));
        assert!(store.remove("42").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_overwrites() {
        let mut store = BookmarkStore::new();
        store.add("1", BookmarkSnapshot::from(&card("1", "Старое имя", None)));
        store.add("1", BookmarkSnapshot::from(&card("1", "Новое имя", None)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().name.as_deref(), Some("Новое имя"));
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut store = BookmarkStore::new();
        let a = card("a", "А", None);
        let b = card("b", "Б", None);
        assert!(store.toggle(&a));
        assert!(store.toggle(&b));
        assert!(!store.toggle(&a));
        assert_eq!(store.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(), vec!["b"]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_decoupled_and_truncated() {
        let mut c = card("7", "Петров", Some(&"ж".repeat(500)));
        let snapshot = BookmarkSnapshot::from(&c);
        c.name = Some("Изменено".to_string());
        assert_eq!(snapshot.name.as_deref(), Some("Петров"));
        assert_eq!(snapshot.story_excerpt.chars().count(), 300);
    }

    #[test]
    fn test_export_one_block_per_bookmark() {
        let mut store = BookmarkStore::new();
        store.add("1", BookmarkSnapshot::from(&card("1", "Иванов", Some("Бой под Москвой"))));
        store.add("2", BookmarkSnapshot::from(&card("2", "Петров", None)));
        store.add("3", BookmarkSnapshot::from(&card("3", "<script>", Some(""))));

        let html = store.export(None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<article class=\"bookmark\"").count(), 3);
        assert_eq!(html.matches("</article>").count(), 3);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<mark>"));
    }

    #[test]
    fn test_export_highlights_with_given_term() {
        let mut store = BookmarkStore::new();
        store.add("1", BookmarkSnapshot::from(&card("1", "Иванов", Some("Бой под Москвой, бой за Ржев"))));
        let html = store.export(Some("БОЙ"));
        assert_eq!(html.matches("<mark>").count(), 2);
        assert!(html.contains("<mark>Бой</mark> под Москвой"));
    }

    #[test]
    fn test_export_empty_store() {
        let html = BookmarkStore::new().export(Some("полк"));
        assert!(html.contains("Bookmarked cards (0)"));
        assert_eq!(html.matches("<article").count(), 0);
    }
}
