//! Per-card text metrics computed on demand for a displayed card.
//!
//! The narrative classifier uses the same thresholds and marker lists as the
//! batch job that produced the yearly narrative tables, so a card gets the
//! same label here as in the aggregates.

use hashbrown::HashSet;

/// Stories shorter than this (in characters) are formulaic.
const FORMULAIC_MAX_CHARS: usize = 100;
/// Family accounts must be longer than this.
const FAMILY_MIN_CHARS: usize = 500;
/// Memoirs must be longer than this.
const MEMOIR_MIN_CHARS: usize = 1000;

const FAMILY_MARKERS: [&str; 5] = ["я помню", "мой дед", "моя бабушка", "мой отец", "мой прадед"];
const BATTLE_MARKERS: [&str; 5] = ["фронт", "бой", "наступление", "дивизия", "полк"];

/// Coarse structure of a card's story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarrativeType {
    /// Short registry-style entry.
    Formulaic,
    /// Long text with front-line vocabulary.
    Memoir,
    /// First-person account by a relative.
    FamilyAccount,
    Mixed,
}

impl NarrativeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeType::Formulaic => "Formulaic",
            NarrativeType::Memoir => "Memoir",
            NarrativeType::FamilyAccount => "Family-account",
            NarrativeType::Mixed => "Mixed",
        }
    }

    /// Label used in the dashboard's Russian UI.
    pub fn label_ru(&self) -> &'static str {
        match self {
            NarrativeType::Formulaic => "Формуляр",
            NarrativeType::Memoir => "Мемуар",
            NarrativeType::FamilyAccount => "Семейная история",
            NarrativeType::Mixed => "Смешанный",
        }
    }
}

impl std::fmt::Display for NarrativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three decimals, halves to even.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Moving-average type-token ratio over whitespace tokens, lowercased.
///
/// With fewer tokens than `window` this is plain `unique / total` (0.0 for no
/// tokens). Otherwise it is the mean of `unique_in_window / window` over every
/// window position. Rounded to three decimals, halves to even.
pub fn lexical_diversity(text: &str, window: usize) -> f64 {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    if window == 0 || words.len() < window {
        let unique: HashSet<&str> = words.iter().copied().collect();
        return round3(unique.len() as f64 / words.len().max(1) as f64);
    }

    let positions = words.len() - window + 1;
    let sum: f64 = words
        .windows(window)
        .map(|w| w.iter().copied().collect::<HashSet<&str>>().len() as f64 / window as f64)
        .sum();
    round3(sum / positions as f64)
}

/// Classifies a story by length and marker words, checked in this order:
/// short ⇒ formulaic, family marker and long ⇒ family account, very long and
/// battle marker ⇒ memoir, anything else ⇒ mixed.
pub fn classify_narrative(story: &str) -> NarrativeType {
    let length = story.chars().count();
    if length < FORMULAIC_MAX_CHARS {
        return NarrativeType::Formulaic;
    }

    let lowered = story.to_lowercase();
    let has_family = FAMILY_MARKERS.iter().any(|m| lowered.contains(m));
    if has_family && length > FAMILY_MIN_CHARS {
        return NarrativeType::FamilyAccount;
    }

    if length > MEMOIR_MIN_CHARS && BATTLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return NarrativeType::Memoir;
    }

    NarrativeType::Mixed
}

/// Metrics panel for one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardMetrics {
    pub chars: usize,
    pub words: usize,
    pub unique_words: usize,
    pub diversity: f64,
    pub narrative: NarrativeType,
}

impl CardMetrics {
    pub fn compute(story: &str, window: usize) -> Self {
        let words: Vec<String> = story.split_whitespace().map(str::to_lowercase).collect();
        let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
        CardMetrics {
            chars: story.chars().count(),
            words: words.len(),
            unique_words: unique.len(),
            diversity: lexical_diversity(story, window),
            narrative: classify_narrative(story),
        }
    }
}
