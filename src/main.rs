use clap::Parser;
use news_aggregator::catalog::{CATEGORIES, DateRange, NYTIMES, SOURCES, SortKey};
use news_aggregator::cli::{Cli, Command, PrefsAction, SearchArgs};
use news_aggregator::config::{Config, load_config};
use news_aggregator::models::{ArticlesPage, Filter, PaginationInfo, SectionInfo};
use news_aggregator::outputs::{json, markdown};
use news_aggregator::preferences::{FileStore, PreferenceBridge};
use news_aggregator::providers::{self, GuardianProvider, nyt::NytProvider};
use news_aggregator::{Aggregator, Error, Session};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    let cli = Cli::parse();
    debug!(?cli.command, "Parsed CLI arguments");

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    match cli.command {
        Command::Search(args) => search(&config, args).await?,
        Command::Options => print_options(),
        Command::Sections { source } => sections(&config, &source).await?,
        Command::Tags { query } => tags(&config, query.as_deref()).await?,
        Command::Popular { period, json } => popular(&config, period, json).await?,
        Command::Prefs { action } => prefs(&config, action)?,
    }

    let elapsed = start_time.elapsed();
    debug!(?elapsed, "Execution complete");
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn search(config: &Config, args: SearchArgs) -> Result<(), Error> {
    let bridge = PreferenceBridge::new(FileStore::new(config.storage_file()));
    let prefs = bridge.load();

    let aggregator = Aggregator::new(providers::default_providers(config)?);
    let page_size = args.page_size.unwrap_or(config.page_size);
    let session = Session::from_preferences(aggregator, &prefs, page_size);

    // Flags override the filters seeded from preferences.
    let mut filter = session.state().filter;
    if let Some(category) = args.category {
        filter.category = category;
    }
    if let Some(source) = args.source {
        filter.source = source;
    }
    if let Some(date_range) = args.date_range {
        filter.date_range = date_range;
    }
    if let Some(sort_by) = args.sort_by {
        filter.sort_by = sort_by;
    }
    session.apply_filters(filter);
    session.search(args.query.as_deref().unwrap_or_default());
    session.change_page(args.page);

    let state = session.state();
    let Some(page) = session.fetch().await else {
        warn!("Request was superseded; nothing to show");
        return Ok(());
    };

    if args.json {
        println!("{}", json::page_to_json(&page)?);
    } else {
        print!(
            "{}",
            markdown::page_to_markdown(&page, &state.filter, &state.search_query)
        );
    }

    if let Some(path) = args.output {
        json::write_page(&page, &path).await?;
    }
    Ok(())
}

fn print_options() {
    println!("Categories:");
    for category in CATEGORIES {
        println!("  {category}");
    }
    println!("Sources:");
    for source in SOURCES {
        println!("  {source}");
    }
    println!("Date ranges:");
    for range in DateRange::all() {
        println!("  {range}");
    }
    println!("Sort by:");
    for key in SortKey::all() {
        println!("  {key}");
    }
}

async fn sections(config: &Config, source: &str) -> Result<(), Error> {
    let aggregator = Aggregator::new(providers::default_providers(config)?);
    let provider = aggregator.provider(source).ok_or_else(|| {
        let known: Vec<&str> = aggregator.providers().iter().map(|p| p.name()).collect();
        Error::Api {
            provider: source.to_string(),
            message: format!("no such provider; expected one of: {}", known.join(", ")),
        }
    })?;
    let sections = provider.sections().await?;
    info!(provider = source, count = sections.len(), "Fetched sections");
    let title = format!("{source} sections");
    print!("{}", markdown::sections_to_markdown(&title, &sections));
    Ok(())
}

async fn tags(config: &Config, query: Option<&str>) -> Result<(), Error> {
    let tags = GuardianProvider::new(config)?.tags(query).await?;
    let listing: Vec<SectionInfo> = tags
        .into_iter()
        .map(|tag| SectionInfo {
            id: tag.id,
            name: format!("{} ({})", tag.name, tag.kind),
        })
        .collect();
    print!("{}", markdown::sections_to_markdown("The Guardian tags", &listing));
    Ok(())
}

async fn popular(config: &Config, period: u32, as_json: bool) -> Result<(), Error> {
    let result = NytProvider::new(config)?.most_popular(period).await?;
    let total = result.articles.len();
    let page = ArticlesPage {
        articles: result.articles,
        pagination: PaginationInfo::new(1, total.max(1) as u32, total),
    };
    if as_json {
        println!("{}", json::page_to_json(&page)?);
    } else {
        let filter = Filter {
            source: NYTIMES.to_string(),
            ..Filter::default()
        };
        print!("{}", markdown::page_to_markdown(&page, &filter, ""));
    }
    Ok(())
}

fn prefs(config: &Config, action: PrefsAction) -> Result<(), Error> {
    let bridge = PreferenceBridge::new(FileStore::new(config.storage_file()));
    let mut prefs = bridge.load();

    match action {
        PrefsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&prefs)?);
            return Ok(());
        }
        PrefsAction::ToggleSource { source } => prefs.toggle_source(&source),
        PrefsAction::ToggleCategory { category } => prefs.toggle_category(&category),
        PrefsAction::AddAuthor { author } => {
            if !prefs.add_author(&author) {
                warn!(%author, "Author already preferred or blank; nothing to add");
                return Ok(());
            }
        }
        PrefsAction::RemoveAuthor { author } => {
            if !prefs.remove_author(&author) {
                warn!(%author, "Author not in preferences; nothing to remove");
                return Ok(());
            }
        }
        PrefsAction::Clear => prefs = Default::default(),
    }

    bridge.save(&prefs)?;
    info!(path = %bridge.store().path().display(), "Preferences updated");
    println!("{}", serde_json::to_string_pretty(&prefs)?);
    Ok(())
}
