//! Command-line front end for the stashwise recommenders.
//!
//! Usage:
//!     stashwise --fixture demo.json suggest --name "iPhone 15 手机"
//!     stashwise advise --name 耳机 --category c1 --price 399 --user u1 --feedback rejected
//!     stashwise search --user u1 --query 耳机 --sort price --asc
//!     stashwise health

mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use settings::Settings;
use stashwise_advise::{PurchaseAdvisor, ScaleThresholds};
use stashwise_backend_supabase::{FixtureStore, RecordStore, SupabaseStore};
use stashwise_categorize::{CategorySuggester, ScoringMode};
use stashwise_explain::{advice_feed, category_feed, summarize_advice};
use stashwise_model::{
    AdviceRequest, CategoryRequest, FeedbackContext, FeedbackDecision, PurchaseAdvice,
};
use stashwise_query::{ItemFilter, SortKey, SortOrder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stashwise")]
#[command(about = "Category suggestions and purchase advice for a personal inventory")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve categories and items from a JSON snapshot instead of Supabase
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a category for a new item
    Suggest {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Owner whose items inform the history preference
        #[arg(short, long)]
        user: Option<String>,

        /// Override the configured scoring mode
        #[arg(short, long)]
        mode: Option<ModeArg>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Advise on a planned purchase
    Advise {
        #[arg(short, long)]
        name: String,

        /// Category id of the planned purchase
        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        price: Option<f64>,

        #[arg(short, long)]
        user: Option<String>,

        /// Report feedback on the advice, then advise again
        #[arg(long)]
        feedback: Option<FeedbackArg>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Search a user's items
    Search {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        query: Option<String>,

        /// Category id (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Required tag (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        #[arg(long, requires = "max_price")]
        min_price: Option<f64>,

        #[arg(long, requires = "min_price")]
        max_price: Option<f64>,

        /// Earliest purchase date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Latest purchase date (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        #[arg(short, long, value_enum, default_value_t = SortArg::CreatedAt)]
        sort: SortArg,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Check store health
    Health,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Weighted,
    KeywordHits,
}

impl From<ModeArg> for ScoringMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Weighted => ScoringMode::Weighted,
            ModeArg::KeywordHits => ScoringMode::KeywordHits,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedbackArg {
    Accepted,
    Rejected,
    Ignored,
}

impl From<FeedbackArg> for FeedbackDecision {
    fn from(decision: FeedbackArg) -> Self {
        match decision {
            FeedbackArg::Accepted => FeedbackDecision::Accepted,
            FeedbackArg::Rejected => FeedbackDecision::Rejected,
            FeedbackArg::Ignored => FeedbackDecision::Ignored,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    PurchaseDate,
    Price,
    CreatedAt,
}

impl From<SortArg> for SortKey {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => SortKey::Name,
            SortArg::PurchaseDate => SortKey::PurchaseDate,
            SortArg::Price => SortKey::Price,
            SortArg::CreatedAt => SortKey::CreatedAt,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stashwise=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    if let Some(path) = &cli.fixture {
        let store = FixtureStore::load(path)?;
        return run(&store, cli.command, &settings).await;
    }

    if let Some(url) = cli.supabase_url {
        settings.store.base_url = url;
    }
    if let Some(key) = cli.supabase_key {
        settings.store.api_key = key;
    }
    let store = SupabaseStore::new(settings.store.clone())?;
    run(&store, cli.command, &settings).await
}

async fn run<S: RecordStore>(store: &S, command: Commands, settings: &Settings) -> Result<()> {
    tracing::debug!(store = store.name(), "Using record store");

    match command {
        Commands::Suggest {
            name,
            description,
            user,
            mode,
            format,
        } => {
            let mut request = CategoryRequest::new(name);
            request.description = description;
            request.user_id = user.unwrap_or_default();
            run_suggest(store, settings, request, mode, format).await
        }
        Commands::Advise {
            name,
            category,
            price,
            user,
            feedback,
            format,
        } => {
            let mut request = AdviceRequest::new(name, category);
            request.price = price;
            request.user_id = user.unwrap_or_default();
            run_advise(store, settings, request, feedback, format).await
        }
        Commands::Search {
            user,
            query,
            category,
            tag,
            min_price,
            max_price,
            from,
            to,
            sort,
            asc,
            format,
        } => {
            let mut filter = ItemFilter::new()
                .with_categories(category)
                .with_tags(tag)
                .sorted_by(
                    sort.into(),
                    if asc { SortOrder::Asc } else { SortOrder::Desc },
                );
            if let Some(query) = query {
                filter = filter.with_query(query);
            }
            if let (Some(min), Some(max)) = (min_price, max_price) {
                filter = filter.with_price_range(min, max);
            }
            if let (Some(from), Some(to)) = (from, to) {
                filter = filter.with_date_range(from, to);
            }
            run_search(store, &user, &filter, format).await
        }
        Commands::Health => run_health(store).await,
    }
}

async fn run_suggest<S: RecordStore>(
    store: &S,
    settings: &Settings,
    request: CategoryRequest,
    mode: Option<ModeArg>,
    format: Format,
) -> Result<()> {
    let mut config = settings.category.clone();
    if let Some(mode) = mode {
        config = config.with_mode(mode.into());
    }

    let mut suggester = CategorySuggester::new(config);
    suggester.set_categories(store.list_categories().await?);
    if !request.user_id.is_empty() {
        suggester.set_item_history(store.list_user_items(&request.user_id).await?);
    }

    let suggestion = suggester.suggest_category(&request);

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&category_feed(&suggestion))?);
        return Ok(());
    }

    println!("Item: {}", request.name);
    println!("Strategy: {}", suggester.strategy_name());
    println!("---");
    println!(
        "{} [{}] confidence {:.2}",
        suggestion.category_name, suggestion.category_id, suggestion.confidence
    );
    for reason in &suggestion.reasons {
        println!("   - {}", reason);
    }
    if !suggestion.alternatives.is_empty() {
        println!("Alternatives:");
        for alt in &suggestion.alternatives {
            println!(
                "   {} [{}] {:.2}",
                alt.category_name, alt.category_id, alt.confidence
            );
        }
    }

    Ok(())
}

async fn run_advise<S: RecordStore>(
    store: &S,
    settings: &Settings,
    request: AdviceRequest,
    feedback: Option<FeedbackArg>,
    format: Format,
) -> Result<()> {
    let policy = ScaleThresholds::new(settings.feedback.clone());
    let mut advisor = PurchaseAdvisor::with_policy(settings.advice.clone(), Box::new(policy));
    advisor.set_categories(store.list_categories().await?);
    if !request.user_id.is_empty() {
        advisor.set_user_items(store.list_user_items(&request.user_id).await?);
    }

    let advice = advisor.purchase_advice(&request);

    let revised = feedback.map(|decision| {
        let context = FeedbackContext {
            item_name: request.name.clone(),
            category_id: Some(request.category_id.clone()),
            price: request.price,
            advice_type: Some(advice.advice_type),
        };
        advisor.learn_from_feedback(decision.into(), &context);
        advisor.purchase_advice(&request)
    });

    if format == Format::Json {
        let output = serde_json::json!({
            "advice": advice,
            "feed": advice_feed(&advice, &request),
            "after_feedback": revised,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Item: {} (category {})", request.name, request.category_id);
    println!("---");
    print_advice(&advice);

    if let Some(revised) = revised {
        println!("\n--- after feedback");
        println!(
            "Monthly budget now {:.0}, average item price {:.0}",
            advisor.profile().thresholds.monthly_budget,
            advisor.profile().thresholds.average_item_price
        );
        print_advice(&revised);
    }

    Ok(())
}

fn print_advice(advice: &PurchaseAdvice) {
    println!("{}", summarize_advice(advice));
    println!(
        "   Risk: duplicate {:.2} | budget {:.2} | impulse {:.2} | overuse {:.2}",
        advice.risk.duplicate, advice.risk.budget, advice.risk.impulse, advice.risk.category_overuse
    );

    for similar in &advice.similar_items {
        println!("   Similar: {} ({:.2})", similar.name, similar.similarity_score);
    }
    for alt in &advice.alternatives {
        match alt.price_range {
            Some(range) => println!("   Option: {} ({:.0}-{:.0})", alt.name, range.min, range.max),
            None => println!("   Option: {}", alt.name),
        }
    }
    println!(
        "   Market: avg {:.0}, {}",
        advice.market_analysis.average_price, advice.market_analysis.best_time_to_buy
    );
}

async fn run_search<S: RecordStore>(
    store: &S,
    user: &str,
    filter: &ItemFilter,
    format: Format,
) -> Result<()> {
    let items = store.search_items(user, filter).await?;

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        let price = item
            .purchase_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}. {} [{}] price {} bought {}",
            i + 1,
            item.name,
            item.category_id,
            price,
            item.purchase_date.as_deref().unwrap_or("-")
        );
    }

    println!("---");
    println!("Total: {} items", items.len());

    Ok(())
}

async fn run_health<S: RecordStore>(store: &S) -> Result<()> {
    print!("Checking {} store... ", store.name());

    match store.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
