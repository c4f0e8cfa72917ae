use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use stock_watch::api::finnhub::FinnhubApi;
use stock_watch::services::watchlist_store::InMemoryWatchlistStore;
use stock_watch::utils::display::DisplayFormatter;
use stock_watch::{Config, QuoteService, WatchlistService};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting stock watch");

    let config = Config::from_env()?;
    let api = Arc::new(FinnhubApi::new(&config)?);
    let store = Arc::new(InMemoryWatchlistStore::load(&config.watchlists_file)?);
    let quotes = Arc::new(QuoteService::new(api, config.quote_cache_ttl));
    let watchlists =
        WatchlistService::new(store.clone(), quotes.clone(), config.watchlist_cache_ttl);
    let display = DisplayFormatter::new();

    println!("=== Stock Watch ===");
    println!("Commands:");
    println!("  <symbol>             - Show a quote");
    println!("  lists <user>         - Show a user's watchlists");
    println!("  create <user> <name> - Create a watchlist");
    println!("  show <id>            - Show a watchlist with quotes");
    println!("  add <id> <symbol>    - Add a symbol to a watchlist");
    println!("  remove <id> <symbol> - Remove a symbol from a watchlist");
    println!("  exit                 - Exit the program");

    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        io::stdout().flush()?;
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let words: Vec<&str> = input.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => continue,
            ["exit"] => {
                debug!("Received exit command");
                break;
            }
            ["lists", user] => watchlists
                .list(user)
                .map(|lists| println!("{}", display.format_watchlists(&lists))),
            ["create", user, name @ ..] if !name.is_empty() => watchlists
                .create(user, &name.join(" "))
                .map(|w| println!("Created {} ({})", w.name, w.id)),
            ["show", id] => watchlists
                .get_items(id)
                .await
                .map(|view| println!("{}", display.format_watchlist(&view))),
            ["add", id, symbol] => watchlists.add_symbol(id, symbol).map(|added| {
                if !added {
                    println!("{} is already on that watchlist", symbol.to_uppercase());
                }
            }),
            ["remove", id, symbol] => watchlists.remove_symbol(id, symbol).map(|removed| {
                if !removed {
                    println!("{} is not on that watchlist", symbol.to_uppercase());
                }
            }),
            [symbol] => quotes
                .get_quote(symbol)
                .await
                .map(|quote| println!("{}", display.format_quote(&quote))),
            _ => {
                println!("Unrecognized command");
                continue;
            }
        };

        if let Err(e) = result {
            error!("{}", e);
            println!("Error: {}", e);
            continue;
        }

        if matches!(words[0], "create" | "add" | "remove") {
            store.save(&config.watchlists_file)?;
        }
    }

    info!("Shutting down");
    Ok(())
}
