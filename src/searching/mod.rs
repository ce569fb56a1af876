pub mod highlight;
pub mod paginated_search;
pub mod query_builder;
pub mod search_results;

// Store-backed search tests (only compiled during tests)
#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
