//! Parquet card fixtures written into temporary directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rand::{Rng, SeedableRng};
use crate::config::ChunkLayout;

/// One row of a fixture file. `None` fields are written as nulls.
#[derive(Debug, Clone, Default)]
pub struct FixtureCard {
    pub id: i64,
    pub fio: Option<String>,
    pub story: Option<String>,
    pub region: Option<String>,
    pub rank: Option<String>,
    pub birthday: Option<String>,
    pub death: Option<String>,
    pub awards_txt: Option<String>,
    pub url: Option<String>,
    pub pub_date: Option<String>,
}

impl FixtureCard {
    pub fn new(id: i64, fio: &str) -> Self {
        FixtureCard {
            id,
            fio: Some(fio.to_string()),
            url: Some(format!("https://memorial.example/card/{}", id)),
            ..FixtureCard::default()
        }
    }

    pub fn story(mut self, story: &str) -> Self {
        self.story = Some(story.to_string());
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn rank(mut self, rank: &str) -> Self {
        self.rank = Some(rank.to_string());
        self
    }

    pub fn birthday(mut self, birthday: &str) -> Self {
        self.birthday = Some(birthday.to_string());
        self
    }
}

const TEXT_COLUMNS: [&str; 9] = [
    "url", "fio", "story", "region", "rank", "birthday", "death", "awards_txt", "pub_date",
];

pub fn card_schema() -> SchemaRef {
    let mut fields = vec![Field::new("id", DataType::Int64, false)];
    fields.extend(TEXT_COLUMNS.iter().map(|name| Field::new(*name, DataType::Utf8, true)));
    Arc::new(Schema::new(fields))
}

fn text_column(cards: &[FixtureCard], field: impl Fn(&FixtureCard) -> Option<&str>) -> ArrayRef {
    Arc::new(StringArray::from(cards.iter().map(|c| field(c)).collect::<Vec<_>>()))
}

pub fn cards_batch(cards: &[FixtureCard]) -> RecordBatch {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cards.iter().map(|c| c.id).collect::<Vec<_>>())),
        text_column(cards, |c| c.url.as_deref()),
        text_column(cards, |c| c.fio.as_deref()),
        text_column(cards, |c| c.story.as_deref()),
        text_column(cards, |c| c.region.as_deref()),
        text_column(cards, |c| c.rank.as_deref()),
        text_column(cards, |c| c.birthday.as_deref()),
        text_column(cards, |c| c.death.as_deref()),
        text_column(cards, |c| c.awards_txt.as_deref()),
        text_column(cards, |c| c.pub_date.as_deref()),
    ];
    RecordBatch::try_new(card_schema(), columns).unwrap()
}

pub fn write_batch(path: &Path, batch: &RecordBatch) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
}

pub fn write_cards(path: &Path, cards: &[FixtureCard]) {
    write_batch(path, &cards_batch(cards));
}

/// Splits `cards` into `parts` consecutive chunks named after the default layout.
pub fn write_chunks(dir: &Path, cards: &[FixtureCard], parts: usize) -> Vec<PathBuf> {
    let layout = ChunkLayout::default();
    let per_chunk = cards.len().div_ceil(parts).max(1);
    cards
        .chunks(per_chunk)
        .enumerate()
        .map(|(i, chunk)| {
            let path = dir.join(format!("{}{:03}{}", layout.chunk_prefix, i, layout.chunk_extension));
            write_cards(&path, chunk);
            path
        })
        .collect()
}

pub const REGIONS: [&str; 4] = ["Тверская область", "Курская область", "Москва", "Алтайский край"];
pub const RANKS: [&str; 4] = ["рядовой", "сержант", "лейтенант", "капитан"];
const SURNAMES: [&str; 6] = ["Иванов", "Петров", "Сидоров", "Кузнецов", "Смирнов", "Попов"];
const STORIES: [&str; 4] = [
    "Погиб в бою под Ржевом.",
    "Мой дед прошёл весь фронт от Москвы до Берлина.",
    "Пропал без вести.",
    "Служил в стрелковом полку, награждён медалью.",
];

/// Deterministic corpus of `n` cards with ids `1..=n`. Some names repeat so
/// the id tie-breaker matters; some cards have no story or birthday.
pub fn generated_corpus(n: usize, seed: u64) -> Vec<FixtureCard> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (1..=n as i64)
        .map(|id| {
            let surname = SURNAMES[rng.random_range(0..SURNAMES.len())];
            let mut card = FixtureCard::new(id, &format!("{} {}", surname, rng.random_range(0..5)))
                .region(REGIONS[rng.random_range(0..REGIONS.len())])
                .rank(RANKS[rng.random_range(0..RANKS.len())]);
            if rng.random_bool(0.8) {
                card = card.story(STORIES[rng.random_range(0..STORIES.len())]);
            }
            if rng.random_bool(0.9) {
                card = card.birthday(&format!("{:02}.05.{}", rng.random_range(1..29), rng.random_range(1880..1930)));
            }
            if rng.random_bool(0.1) {
                card.fio = None;
            }
            card
        })
        .collect()
}
