//! Per-card views for search results.
//!
//! [`CardView`] holds the pieces of one result card (header, metadata line,
//! story block and optional metrics panel) and renders them either as an
//! HTML fragment or as plain text for the terminal.

use crate::config::DashboardConfig;
use crate::searching::highlight::{escape_html, highlight, truncate_chars, truncation_notice};
use crate::searching::search_results::Card;
use crate::text_metrics::CardMetrics;

/// Awards are cut to this many characters in the metadata line.
pub const AWARDS_MAX_CHARS: usize = 150;

const METADATA_SEPARATOR: &str = " · ";

/// Labelled metadata entries present on the card, in display order.
pub fn metadata_fields(card: &Card) -> Vec<(&'static str, String)> {
    let mut fields = Vec::with_capacity(5);
    if let Some(rank) = &card.rank {
        fields.push(("Rank", rank.clone()));
    }
    if let Some(birthday) = &card.birthday {
        fields.push(("Born", birthday.clone()));
    }
    if let Some(death) = &card.death {
        fields.push(("Died", death.clone()));
    }
    if let Some(region) = &card.region {
        fields.push(("Region", region.clone()));
    }
    if let Some(awards) = &card.awards {
        fields.push(("Awards", truncate_chars(awards, AWARDS_MAX_CHARS).to_string()));
    }
    fields
}

/// The metadata line as plain text, or `"No metadata"`.
pub fn metadata_line(card: &Card) -> String {
    let fields = metadata_fields(card);
    if fields.is_empty() {
        return "No metadata".to_string();
    }
    fields
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join(METADATA_SEPARATOR)
}

/// Story as an HTML fragment: highlighted when a term is given, otherwise
/// escaped with the truncation notice if the story was cut.
pub fn story_html(story: &str, term: Option<&str>, max_chars: usize) -> String {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => highlight(story, term, max_chars),
        None => {
            let mut html = escape_html(truncate_chars(story, max_chars));
            let total = story.chars().count();
            if total > max_chars {
                html.push_str(&truncation_notice(max_chars, total));
            }
            html
        }
    }
}

/// Everything shown for one card on a results page.
#[derive(Debug, Clone)]
pub struct CardView<'a> {
    pub card: &'a Card,
    pub term: Option<&'a str>,
    pub story_max_chars: usize,
    pub metrics: Option<CardMetrics>,
}

impl<'a> CardView<'a> {
    /// Builds the view; metrics are computed only when `show_metrics` is set
    /// and the card has a story.
    pub fn new(card: &'a Card, term: Option<&'a str>, config: &DashboardConfig, show_metrics: bool) -> Self {
        let metrics = card
            .story
            .as_deref()
            .filter(|_| show_metrics)
            .map(|story| CardMetrics::compute(story, config.mattr_window));
        CardView {
            card,
            term,
            story_max_chars: config.story_max_chars,
            metrics,
        }
    }

    pub fn header(&self) -> &str {
        self.card.name.as_deref().unwrap_or("—")
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<article class=\"card\" data-id=\"{}\">\n", escape_html(&self.card.id));
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(self.header())));

        let fields = metadata_fields(self.card);
        if fields.is_empty() {
            html.push_str("<div class=\"meta\">No metadata</div>\n");
        } else {
            let meta = fields
                .iter()
                .map(|(label, value)| format!("<b>{}:</b> {}", label, escape_html(value)))
                .collect::<Vec<_>>()
                .join(METADATA_SEPARATOR);
            html.push_str(&format!("<div class=\"meta\">{}</div>\n", meta));
        }

        if let Some(url) = &self.card.url {
            let url = escape_html(url);
            html.push_str(&format!("<a class=\"source\" href=\"{url}\">Open ↗</a>\n"));
        }

        if let Some(story) = &self.card.story {
            html.push_str(&format!(
                "<div class=\"story\">{}</div>\n",
                story_html(story, self.term, self.story_max_chars)
            ));
        }

        if let Some(m) = &self.metrics {
            html.push_str(&format!(
                "<dl class=\"metrics\"><dt>Characters</dt><dd>{}</dd><dt>Words</dt><dd>{}</dd>\
                 <dt>Unique words</dt><dd>{}</dd><dt>MATTR</dt><dd>{:.3}</dd>\
                 <dt>Narrative</dt><dd>{}</dd></dl>\n",
                m.chars,
                m.words,
                m.unique_words,
                m.diversity,
                m.narrative.label_ru()
            ));
        }

        html.push_str("</article>\n");
        html
    }

    /// Terminal rendering. The story is plain text cut to `excerpt_chars`.
    pub fn to_plain_text(&self, excerpt_chars: usize) -> String {
        let mut out = format!("{} [id {}]\n  {}\n", self.header(), self.card.id, metadata_line(self.card));
        if let Some(url) = &self.card.url {
            out.push_str(&format!("  {}\n", url));
        }
        if let Some(story) = &self.card.story {
            let total = story.chars().count();
            let excerpt = truncate_chars(story, excerpt_chars).replace('\n', " ");
            if total > excerpt_chars {
                out.push_str(&format!("  {}… (showed {} of {} characters)\n", excerpt, excerpt_chars, total));
            } else {
                out.push_str(&format!("  {}\n", excerpt));
            }
        }
        if let Some(m) = &self.metrics {
            out.push_str(&format!(
                "  chars {} · words {} · unique {} · MATTR {:.3} · {} ({})\n",
                m.chars,
                m.words,
                m.unique_words,
                m.diversity,
                m.narrative,
                m.narrative.label_ru()
            ));
        }
        out
    }
}
