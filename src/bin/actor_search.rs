use std::sync::Arc;

use actor_aggregator::aggregator::AggregationController;
use actor_aggregator::model::{Actor, Aggregation};
use actor_aggregator::session::SearchSession;
use actor_aggregator::util::{env, logging};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "actor_search", version, about = "Query the actor aggregation pipeline")]
struct Cli {
    /// Print raw JSON instead of a summary.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Popular actors from every provider.
    Popular,
    /// Search by name. Queries under the minimum length filter the popular set.
    Search {
        query: String,
        /// Load the popular set first so short queries have something to filter.
        #[arg(long, default_value_t = false)]
        warm: bool,
    },
    /// Full record for one namespaced id, e.g. `tvmaze-1` or `fallback-zendaya`.
    Show { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env::init_env();
    logging::init_tracing("actor_aggregator=info,actor_search=info")?;
    env::bootstrap_cli("actor_search");

    let cli = Cli::parse();
    let controller = AggregationController::from_env().context("building provider table")?;
    info!(providers = ?controller.provider_names(), "controller ready");
    let session = SearchSession::new(Arc::new(controller));

    match cli.command {
        Commands::Popular => {
            if let Some(result) = session.popular_latest().await {
                print_aggregation(&result, cli.json)?;
            }
        }
        Commands::Search { query, warm } => {
            if warm {
                session.controller().load_popular().await;
            }
            if let Some(result) = session.search_latest(&query).await {
                print_aggregation(&result, cli.json)?;
            }
        }
        Commands::Show { id } => match session.controller().lookup(&id).await {
            Some(actor) if cli.json => println!("{}", serde_json::to_string_pretty(&actor)?),
            Some(actor) => print_actor(&actor),
            None => eprintln!("no actor found for {id}"),
        },
    }
    Ok(())
}

fn print_aggregation(result: &Aggregation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    let status: Vec<String> = result
        .status
        .iter()
        .map(|(provider, state)| format!("{provider}={state}"))
        .collect();
    println!(
        "status: {} ({})",
        result.overall_status(),
        if status.is_empty() { "no providers".to_string() } else { status.join(", ") }
    );
    println!("actors ({}):", result.actors.len());
    for actor in &result.actors {
        println!(
            "  [{}] {} ({}), {} titles, {}",
            actor.id,
            actor.name,
            actor.age,
            actor.filmography.len(),
            actor.net_worth
        );
    }
    Ok(())
}

fn print_actor(actor: &Actor) {
    println!("{} [{}]", actor.name, actor.id);
    println!("  age: {}  born: {}", actor.age, actor.birth_place);
    println!("  net worth: {}", actor.net_worth);
    println!("  image: {}", actor.image);
    let sections: [(&str, &Vec<String>); 7] = [
        ("filmography", &actor.filmography),
        ("awards", &actor.awards),
        ("trivia", &actor.trivia),
        ("fun facts", &actor.fun_facts),
        ("relationships", &actor.relationships),
        ("social media", &actor.social_media),
        ("quotes", &actor.quotes),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("  {title}:");
        for item in items {
            println!("    - {item}");
        }
    }
}
