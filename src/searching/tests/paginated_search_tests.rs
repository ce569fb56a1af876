use super::{load_store, predicate, service};
use crate::card_store::{discover_single, CardStore, LoadMode, StoreKind};
use crate::error::QueryError;
use crate::searching::query_builder::{FilterRequest, Predicate, QueryBuilder};
use crate::unit_tests::fixtures::{generated_corpus, write_batch, FixtureCard};

fn region_corpus(matching: usize, other: usize) -> Vec<FixtureCard> {
    (0..matching + other)
        .map(|i| {
            let region = if i < matching { "Тверская область" } else { "Москва" };
            FixtureCard::new(i as i64 + 1, &format!("Боец {:03}", i)).region(region)
        })
        .collect()
}

#[tokio::test]
async fn test_forty_seven_matches_paged_by_twenty() {
    let tmp = tempfile::tempdir().unwrap();
    let store = load_store(tmp.path(), &region_corpus(47, 30)).await;
    let service = service(store, 20, 50);
    let p = predicate(FilterRequest::default().with_region("Тверская область"));

    let mut lengths = Vec::new();
    for index in 0..3 {
        let page = service.search(&p, index).await.unwrap();
        assert_eq!(page.total, 47);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.page_index, index);
        assert!(page.cards.iter().all(|c| c.region.as_deref() == Some("Тверская область")));
        lengths.push(page.cards.len());
    }
    assert_eq!(lengths, vec![20, 20, 7]);
}

#[tokio::test]
async fn test_out_of_range_page_is_clamped_to_last() {
    let tmp = tempfile::tempdir().unwrap();
    let store = load_store(tmp.path(), &region_corpus(47, 0)).await;
    let service = service(store, 20, 50);

    let page = service.search(&Predicate::match_all(), 999).await.unwrap();
    assert_eq!(page.page_index, 2);
    assert_eq!(page.cards.len(), 7);
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[tokio::test]
async fn test_page_lengths_sum_to_total() {
    let tmp = tempfile::tempdir().unwrap();
    let store = load_store(tmp.path(), &generated_corpus(230, 7)).await;
    let service = service(store, 15, 100);

    for request in [
        FilterRequest::default(),
        FilterRequest::default().with_region("Москва"),
        FilterRequest::default().with_text("полк"),
        FilterRequest::default().with_rank("сержант").with_birth_years(1890, 1915),
    ] {
        let p = predicate(request);
        let first = service.search(&p, 0).await.unwrap();
        let mut seen = 0;
        for index in 0..first.page_count {
            let page = service.search(&p, index).await.unwrap();
            assert_eq!(page.total, first.total);
            seen += page.cards.len() as u64;
        }
        assert_eq!(seen, first.total, "predicate {}", p);
    }
}

#[tokio::test]
async fn test_max_pages_caps_reachable_pages_not_total() {
    let tmp = tempfile::tempdir().unwrap();
    let store = load_store(tmp.path(), &generated_corpus(100, 11)).await;
    let service = service(store, 10, 3);

    let page = service.search(&Predicate::match_all(), 50).await.unwrap();
    assert_eq!(page.total, 100);
    assert_eq!(page.total_pages, 10);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.page_index, 2);
    assert!(page.is_truncated());
    assert_eq!(page.cards.len(), 10);
}

#[tokio::test]
async fn test_zero_matches_is_an_empty_page() {
    let tmp = tempfile::tempdir().unwrap();
    let store = load_store(tmp.path(), &generated_corpus(40, 3)).await;
    let service = service(store, 20, 50);

    let p = predicate(FilterRequest::default().with_text("Нет такого слова"));
    let page = service.search(&p, 4).await.unwrap();
    assert!(page.is_empty());
    assert!(page.cards.is_empty());
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.page_count, 0);
    assert_eq!(page.page_index, 0);
}

#[tokio::test]
async fn test_order_is_by_name_then_id_with_missing_names_last() {
    let tmp = tempfile::tempdir().unwrap();
    let mut nameless = FixtureCard::new(1, "");
    nameless.fio = None;
    let cards = vec![
        nameless,
        FixtureCard::new(9, "Иванов Иван"),
        FixtureCard::new(5, "Иванов Иван"),
        FixtureCard::new(7, "Аксёнов Олег"),
        FixtureCard::new(3, "Иванов Иван"),
    ];
    let store = load_store(tmp.path(), &cards).await;
    let service = service(store, 2, 10);

    let mut ids = Vec::new();
    for index in 0..3 {
        let page = service.search(&Predicate::match_all(), index).await.unwrap();
        ids.extend(page.cards.into_iter().map(|c| c.id));
    }
    assert_eq!(ids, vec!["7", "3", "5", "9", "1"]);

    let again = service.fetch(&Predicate::match_all(), 5, 0).await.unwrap();
    assert_eq!(again.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ids);
}

#[tokio::test]
async fn test_facets() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cards = vec![
        FixtureCard::new(1, "А").region("Москва").rank("рядовой"),
        FixtureCard::new(2, "Б").region("Курская область").rank("рядовой"),
        FixtureCard::new(3, "В").region("Москва").rank("сержант"),
        FixtureCard::new(4, "Г").region("Алтайский край").rank("капитан"),
        FixtureCard::new(5, "Д").rank("рядовой"),
        FixtureCard::new(6, "Е").rank("сержант"),
    ];
    cards.push(FixtureCard::new(7, "Ж"));
    let store = load_store(tmp.path(), &cards).await;
    let service = service(store, 20, 50);

    assert_eq!(
        service.regions().await.unwrap(),
        vec!["Алтайский край", "Курская область", "Москва"]
    );
    assert_eq!(service.top_ranks(30).await.unwrap(), vec!["рядовой", "сержант", "капитан"]);
    assert_eq!(service.top_ranks(1).await.unwrap(), vec!["рядовой"]);
}

#[tokio::test]
async fn test_engine_failure_is_an_error_not_an_empty_page() {
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    // A file without a story column: the text predicate cannot be planned
    let tmp = tempfile::tempdir().unwrap();
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("fio", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec![Some("Иванов"), None])),
    ];
    let file = tmp.path().join("narrow.parquet");
    write_batch(&file, &RecordBatch::try_new(schema, columns).unwrap());

    let files = discover_single(&file).await.unwrap().unwrap();
    let store = std::sync::Arc::new(CardStore::load(StoreKind::Sample, files, LoadMode::Scan).await.unwrap());
    let service = service(store, 20, 50);

    let p = QueryBuilder::new().build(&FilterRequest::default().with_text("Иванов")).unwrap();
    assert!(matches!(service.search(&p, 0).await, Err(QueryError::Engine(_))));
}
