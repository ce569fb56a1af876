use std::path::Path;
use std::sync::Arc;
use crate::card_store::{discover_single, CardStore, LoadMode, StoreKind};
use crate::searching::paginated_search::SearchService;
use crate::searching::query_builder::{FilterRequest, Predicate, QueryBuilder};
use crate::unit_tests::fixtures::{write_cards, FixtureCard};

mod paginated_search_tests;

/// Writes `cards` to one file under `dir` and loads it as an in-memory sample store.
async fn load_store(dir: &Path, cards: &[FixtureCard]) -> Arc<CardStore> {
    let file = dir.join("cards.parquet");
    write_cards(&file, cards);
    let files = discover_single(&file).await.unwrap().expect("fixture file exists");
    Arc::new(CardStore::load(StoreKind::Sample, files, LoadMode::InMemory).await.unwrap())
}

fn predicate(request: FilterRequest) -> Predicate {
    QueryBuilder::new().build(&request).unwrap()
}

fn service(store: Arc<CardStore>, page_size: usize, max_pages: usize) -> SearchService {
    SearchService::new(store, page_size, max_pages).unwrap()
}
