//! Memorial card search - Command Line Interface
//!
//! Runs the dashboard's search core from a terminal: paginated substring search
//! with filters, filter facets, and a summary of the backing store.
//!
//! # Commands
//!
//! - **`search`** - Prints one page of matching cards
//! - **`facets`** - Lists the region and rank filter values
//! - **`info`** - Shows which store was selected and what it holds
//!
//! # Data Layout
//!
//! ```text
//! <data-dir>/
//! ├── full/soldiers_fts_part000.parquet ...   (full corpus, preferred)
//! └── sample/soldiers_sample_50k.parquet      (fallback)
//! ```
//!
//! # Usage Examples
//!
//! ```bash
//! # First page of cards mentioning Сталинград
//! cardsearch search --text Сталинград
//!
//! # Third page of sergeants from one region born 1900-1920, with metrics
//! cardsearch --data-dir /srv/data search --region "Тверская область" --rank сержант \
//!     --from 1900 --to 1920 --page 3 --metrics
//!
//! # Bookmark the whole page and write the export document
//! cardsearch search --text полк --bookmark-all --export bookmarks.html
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Load or query error
//! - `2` - No backing store found

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use cardsearch::card_store::cache::StoreCache;
use cardsearch::card_store::{CardStore, StoreKind};
use cardsearch::error::QueryError;
use cardsearch::config::{DashboardConfig, DEFAULT_DATA_DIR, MAX_BIRTH_YEAR, MIN_BIRTH_YEAR};
use cardsearch::rendering::CardView;
use cardsearch::searching::paginated_search::SearchService;
use cardsearch::searching::query_builder::{FilterRequest, QueryBuilder};
use cardsearch::session::SearchSession;

const EXIT_ERROR: i32 = 1;
const EXIT_NO_STORE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "cardsearch", version, about = "Search WWII memorial cards stored as Parquet")]
struct Cli {
    /// Directory holding `sample/` and `full/`
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of cards matching the filters
    Search {
        /// Substring to look for in the name or story
        #[arg(long)]
        text: Option<String>,
        /// Exact region ("all" for any)
        #[arg(long)]
        region: Option<String>,
        /// Exact rank ("all" for any)
        #[arg(long)]
        rank: Option<String>,
        /// Earliest birth year
        #[arg(long, default_value_t = MIN_BIRTH_YEAR)]
        from: i32,
        /// Latest birth year
        #[arg(long, default_value_t = MAX_BIRTH_YEAR)]
        to: i32,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Show the metrics panel for each card
        #[arg(long)]
        metrics: bool,
        /// Bookmark every card of the page
        #[arg(long)]
        bookmark_all: bool,
        /// Write the bookmark export document to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// List the region and rank filter values
    Facets,
    /// Show the selected store
    Info,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::from_data_dir(&cli.data_dir);
    let cache = StoreCache::new();

    let store = match cache.open_best(&config).await {
        Ok(Some(store)) => store,
        Ok(None) => {
            eprintln!("✗ No backing store found under '{}'", config.data_dir.display());
            eprintln!("Run the offline data preparation step to create the sample or the full corpus.");
            process::exit(EXIT_NO_STORE);
        }
        Err(e) => {
            eprintln!("✗ Failed to load store: {}", e);
            process::exit(EXIT_ERROR);
        }
    };

    let outcome = match cli.command {
        Command::Search { text, region, rank, from, to, page, metrics, bookmark_all, export } => {
            let mut request = FilterRequest::default().with_birth_years(from, to);
            request.text = text;
            request.region = region;
            request.rank = rank;
            let options = SearchOptions { page, metrics, bookmark_all, export };
            handle_search(&config, store, request, options).await
        }
        Command::Facets => handle_facets(&config, store).await,
        Command::Info => handle_info(store).await,
    };

    if let Err(e) = outcome {
        eprintln!("\n✗ {}", e);
        process::exit(EXIT_ERROR);
    }
}

struct SearchOptions {
    page: u64,
    metrics: bool,
    bookmark_all: bool,
    export: Option<PathBuf>,
}

/// Page size and ceiling depend on which store is being searched.
fn service_for(config: &DashboardConfig, store: Arc<CardStore>) -> Result<SearchService, QueryError> {
    let paging = match store.kind() {
        StoreKind::FullCorpus => config.full_paging,
        StoreKind::Sample => config.sample_paging,
    };
    SearchService::with_paging(store, paging)
}

async fn handle_search(
    config: &DashboardConfig,
    store: Arc<CardStore>,
    request: FilterRequest,
    options: SearchOptions,
) -> cardsearch::error::Result<()> {
    println!("Searching the {} ({})", store.kind().label(), store.files().root.display());

    let mut session = SearchSession::new(service_for(config, store)?, QueryBuilder::new())?;
    session.submit(request).await?;
    if options.page > 1 {
        session.goto(options.page - 1).await?;
    }

    let Some(page) = session.current_page() else {
        return Ok(());
    };
    if page.is_empty() {
        println!("✗ No cards match these filters");
        return Ok(());
    }

    println!("✓ Found {} cards", page.total);
    print!("  Page {} of {}", page.page_index + 1, page.page_count);
    if page.is_truncated() {
        print!(" (only the first {} of {} pages are reachable)", page.page_count, page.total_pages);
    }
    println!("\n");

    let term = session.filter().term();
    for card in &page.cards {
        let view = CardView::new(card, term, config, options.metrics);
        println!("{}", view.to_plain_text(config.excerpt_chars));
    }

    if options.bookmark_all {
        let added = session.bookmark_page();
        println!("Bookmarked {} cards", added);
    }

    if let Some(path) = options.export {
        if session.bookmarks().is_empty() {
            println!("Nothing to export: no bookmarks (use --bookmark-all)");
        } else {
            tokio::fs::write(&path, session.export_bookmarks()).await?;
            println!("✓ Exported {} bookmarks to {}", session.bookmarks().len(), path.display());
        }
    }

    Ok(())
}

async fn handle_facets(config: &DashboardConfig, store: Arc<CardStore>) -> cardsearch::error::Result<()> {
    let service = service_for(config, store)?;

    let regions = service.regions().await?;
    println!("Regions ({}):", regions.len());
    for region in &regions {
        println!("  {}", region);
    }

    let ranks = service.top_ranks(config.top_ranks).await?;
    println!("\nTop {} ranks:", ranks.len());
    for rank in &ranks {
        println!("  {}", rank);
    }
    Ok(())
}

async fn handle_info(store: Arc<CardStore>) -> cardsearch::error::Result<()> {
    let info = store.info().await?;

    println!("Store Information");
    println!("=================");
    println!("  Kind:   {}", info.kind.label());
    println!("  Table:  {}", info.kind.table_name());
    println!("  Mode:   {:?}", store.mode());
    println!("  Root:   {}", info.root.display());
    println!("  Layout: {}", if info.chunked { "chunked" } else { "single file" });
    println!("  Rows:   {}", info.rows);
    println!("  Size:   {:.1} MB", info.total_bytes as f64 / (1024.0 * 1024.0));
    println!("\nFiles ({}):", info.files.len());
    for file in &info.files {
        println!("  {}", file.display());
    }
    Ok(())
}
