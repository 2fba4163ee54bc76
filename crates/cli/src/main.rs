use anyhow::{anyhow, Context, Result};
use catalog::{Catalog, Feature, Item, PowerTarget, PreferenceSnapshot};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use engine::{format_price, EngineConfig, Recommendation, RecommendationOrchestrator};
use evaluation::{
    AlgorithmComparison, CrossValidationConfig, CrossValidationHarness, CrossValidationResult,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// CarRecs - content-based car recommendations
#[derive(Parser)]
#[command(name = "car-recs")]
#[command(about = "Content-based car recommendation engine", long_about = None)]
struct Cli {
    /// Catalog file (.json array of cars, or a comma/semicolon separated file with a header row)
    #[arg(short, long, default_value = "data/cars.csv")]
    catalog: PathBuf,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for near-tie shuffling and fold splits
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Gearbox {
    Automatic,
    Manual,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend cars for a set of preferences
    Recommend {
        /// Maximum budget
        #[arg(long)]
        budget: Option<f64>,

        /// Minimum budget
        #[arg(long)]
        min_budget: Option<f64>,

        /// Power target: kW above 100, or a 0..1 desire score
        #[arg(long)]
        power: Option<f64>,

        #[arg(long)]
        fuel: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        body_type: Option<String>,

        #[arg(long, value_enum)]
        gearbox: Option<Gearbox>,

        #[arg(long)]
        min_year: Option<u16>,

        #[arg(long)]
        max_year: Option<u16>,

        /// 0 = sporty, 1 = comfortable
        #[arg(long, default_value = "0.5")]
        comfort: f64,

        /// Feature importance, e.g. --importance brand=1.5 (repeatable)
        #[arg(long, value_parser = parse_importance)]
        importance: Vec<(Feature, f64)>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Rank by Euclidean distance to the ideal car instead
        #[arg(long)]
        knn: bool,

        /// Show the explanation for each recommendation
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Cars similar to a catalog item
    Similar {
        /// Item ID
        #[arg(long)]
        id: u32,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Search the catalog by brand and model
    Search {
        /// Case-insensitive substring of "brand model"
        #[arg(long)]
        query: String,
    },

    /// Grid-search similarity weights on a random train/test split
    Tune {
        /// Share of items used for training
        #[arg(long, default_value = "0.8")]
        train_fraction: f64,
    },

    /// K-fold evaluation of one algorithm
    CrossValidate {
        #[arg(long, default_value = "weighted")]
        algorithm: String,

        #[arg(long, default_value = "5")]
        folds: usize,

        #[arg(long, default_value = "10")]
        top_k: usize,

        /// Test queries per fold
        #[arg(long, default_value = "50")]
        max_queries: usize,

        /// Tune similarity weights on every fold
        #[arg(long)]
        tune: bool,
    },

    /// Evaluate every algorithm on the same folds
    Compare {
        #[arg(long, default_value = "5")]
        folds: usize,

        #[arg(long, default_value = "10")]
        top_k: usize,

        #[arg(long, default_value = "50")]
        max_queries: usize,
    },

    /// List the available algorithms
    Algorithms,
}

fn parse_importance(raw: &str) -> std::result::Result<(Feature, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected feature=weight, got '{}'", raw))?;
    let feature = Feature::from_key(key).ok_or_else(|| format!("unknown feature '{}'", key))?;
    let weight = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight '{}': {}", value, e))?;
    Ok((feature, weight))
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = Arc::new(
        Catalog::load_from_file(&cli.catalog).context("Failed to load car catalog")?,
    );
    println!(
        "{} Loaded {} cars in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.command {
        Commands::Recommend {
            budget,
            min_budget,
            power,
            fuel,
            brand,
            body_type,
            gearbox,
            min_year,
            max_year,
            comfort,
            importance,
            limit,
            knn,
            explain,
            json,
        } => {
            let mut prefs = PreferenceSnapshot::new()
                .with_comfort_vs_sport(comfort)
                .with_year_range(min_year, max_year);
            if let Some(budget) = budget {
                prefs = prefs.with_max_budget(budget);
            }
            if let Some(budget) = min_budget {
                prefs = prefs.with_min_budget(budget);
            }
            if let Some(raw) = power {
                let target = PowerTarget::from_raw(raw)
                    .ok_or_else(|| anyhow!("Power {} is neither a 0..1 score nor a kW figure above 100", raw))?;
                prefs = prefs.with_power(target);
            }
            if let Some(fuel) = fuel {
                prefs = prefs.with_fuel(fuel);
            }
            if let Some(brand) = brand {
                prefs = prefs.with_brand(brand);
            }
            if let Some(body_type) = body_type {
                prefs = prefs.with_body_type(body_type);
            }
            if let Some(gearbox) = gearbox {
                prefs = prefs.with_automatic_transmission(matches!(gearbox, Gearbox::Automatic));
            }
            for (feature, weight) in importance {
                prefs = prefs.with_importance(feature, weight);
            }

            handle_recommend(catalog, config, &prefs, limit, knn, explain, json, &mut rng)?
        }
        Commands::Similar { id, limit } => handle_similar(catalog, config, id, limit)?,
        Commands::Search { query } => handle_search(&catalog, &query),
        Commands::Tune { train_fraction } => handle_tune(catalog, train_fraction, &mut rng)?,
        Commands::CrossValidate {
            algorithm,
            folds,
            top_k,
            max_queries,
            tune,
        } => {
            let harness = CrossValidationHarness::new(catalog).with_config(CrossValidationConfig {
                max_test_queries: max_queries,
                tune_per_fold: tune,
                ..CrossValidationConfig::default()
            });
            let result = harness.cross_validate(&algorithm, folds, top_k, &mut rng)?;
            print_cross_validation(&result);
        }
        Commands::Compare {
            folds,
            top_k,
            max_queries,
        } => {
            let harness = CrossValidationHarness::new(catalog).with_config(CrossValidationConfig {
                max_test_queries: max_queries,
                ..CrossValidationConfig::default()
            });
            let comparison = harness.compare_algorithms(folds, top_k, &mut rng)?;
            print_comparison(&comparison);
        }
        Commands::Algorithms => {
            let harness = CrossValidationHarness::new(catalog);
            println!("{}", "Algorithms:".bold().blue());
            for algorithm in harness.registry().algorithms() {
                println!("  {:<10} {}", algorithm.id().green(), algorithm.description());
            }
        }
    }

    Ok(())
}

/// Handle the 'recommend' command
#[allow(clippy::too_many_arguments)]
fn handle_recommend(
    catalog: Arc<Catalog>,
    config: EngineConfig,
    prefs: &PreferenceSnapshot,
    limit: usize,
    knn: bool,
    explain: bool,
    json: bool,
    rng: &mut StdRng,
) -> Result<()> {
    let orchestrator = RecommendationOrchestrator::new(catalog, config);

    let start = Instant::now();
    let recommendations = if knn {
        orchestrator.recommend_knn_from_preferences(prefs, limit)?
    } else {
        orchestrator.recommend_from_preferences_with_rng(prefs, limit, rng)?
    };
    let elapsed = start.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }
    print_recommendations(&recommendations, explain);
    println!("{}", format!("Ranked in {:?}", elapsed).dimmed());
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(catalog: Arc<Catalog>, config: EngineConfig, id: u32, limit: usize) -> Result<()> {
    let target = catalog
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("Car {} not found", id))?;
    let orchestrator = RecommendationOrchestrator::new(catalog, config);
    let recommendations = orchestrator.recommend_similar(id, limit)?;

    println!(
        "{}",
        format!("Cars similar to {}:", describe(&target)).bold().blue()
    );
    print_recommendations(&recommendations, true);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, query: &str) {
    let matches = catalog.search(query);
    println!(
        "{}",
        format!("Search results for '{}' ({} found):", query, matches.len())
            .bold()
            .blue()
    );
    for item in matches.iter().take(20) {
        println!("{}: {}", item.id.to_string().green(), describe(item));
    }
}

/// Handle the 'tune' command
fn handle_tune(catalog: Arc<Catalog>, train_fraction: f64, rng: &mut StdRng) -> Result<()> {
    if train_fraction <= 0.0 || train_fraction >= 1.0 {
        return Err(anyhow!("--train-fraction must be between 0 and 1, got {}", train_fraction));
    }
    let harness = CrossValidationHarness::new(catalog.clone());
    let mut items = catalog.valid_items();
    items.shuffle(rng);
    let cut = ((items.len() as f64) * train_fraction).round() as usize;
    let (train, test) = items.split_at(cut.min(items.len()));

    let outcome = harness.tune_hyperparameters(train, test);
    let Some(best) = outcome.best else {
        println!("{}", "Not enough valid cars to tune on".yellow());
        return Ok(());
    };

    println!(
        "{}",
        format!("Evaluated {} configurations ({} train / {} test):", outcome.results.len(), train.len(), test.len())
            .bold()
            .blue()
    );
    for (rank, result) in outcome.results.iter().take(5).enumerate() {
        let w = result.weights;
        println!(
            "{}. power {:.2}  budget {:.2}  year {:.2}  fuel {:.2}  -> {:.4}",
            (rank + 1).to_string().green(),
            w.power,
            w.budget,
            w.year,
            w.fuel,
            result.score
        );
    }
    println!("Best score: {}", format!("{:.4}", best.score).green());
    Ok(())
}

fn describe(item: &Item) -> String {
    format!(
        "{} - {}, {} kW, {}, {}",
        item.display_name(),
        format_price(item.price),
        item.power,
        item.fuel,
        item.transmission
    )
}

/// Ranked list, one line per car, explanations underneath when asked
fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    if recommendations.is_empty() {
        println!("{}", "No matching cars".yellow());
        return;
    }
    println!("{}", "Recommendations:".bold().blue());
    for rec in recommendations {
        println!(
            "{}. {} - Score: {:.2}",
            rec.rank.to_string().green(),
            describe(&rec.item),
            rec.score
        );
        if explain {
            println!("   {}", rec.explanation.dimmed());
        }
    }
}

fn print_cross_validation(result: &CrossValidationResult) {
    println!(
        "{}",
        format!("Cross-validation of '{}' (top {}):", result.algorithm, result.top_k)
            .bold()
            .blue()
    );
    for fold in &result.folds {
        println!(
            "  fold {}: train {:>4}  test {:>4}  queries {:>3}  P {:.3}  R {:.3}  F1 {:.3}  MAE {:>9.0}  {:.2} ms",
            fold.fold + 1,
            fold.train_size,
            fold.test_size,
            fold.queries,
            fold.precision,
            fold.recall,
            fold.f1,
            fold.price_mae,
            fold.mean_latency_ms
        );
    }
    println!(
        "  {} precision {:.3} ± {:.3}  recall {:.3}  F1 {:.3}  price RMSE {:.0}",
        "mean".green(),
        result.mean_precision,
        result.precision_std,
        result.mean_recall,
        result.mean_f1,
        result.mean_price_rmse
    );
}

fn print_comparison(comparison: &AlgorithmComparison) {
    println!("{}", "Algorithm comparison:".bold().blue());
    println!(
        "  {:<12} {:>9} {:>9} {:>9} {:>10}",
        "algorithm", "precision", "recall", "f1", "latency"
    );
    for result in &comparison.results {
        println!(
            "  {:<12} {:>9.3} {:>9.3} {:>9.3} {:>8.2}ms",
            result.algorithm,
            result.mean_precision,
            result.mean_recall,
            result.mean_f1,
            result.mean_latency_ms
        );
    }
    let show = |label: &str, winner: &Option<String>| {
        println!(
            "{} {}",
            label,
            winner.as_deref().unwrap_or("-").green()
        );
    };
    show("Best precision:", &comparison.best_precision);
    show("Best recall:   ", &comparison.best_recall);
    show("Fastest:       ", &comparison.fastest);
}
