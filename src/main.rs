// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

// Use library instead of local modules
use team_builder::{
    init_tracing, CatalogClient, Config, PokemonKey, Team, TeamStore, DEFAULT_SEARCH_LIMIT, TEAM_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "team-builder", version, about = "Browse the Pokemon catalog and build a team of six")]
struct Cli {
    /// Catalog base URL (overrides POKEAPI_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Names per page in the browser (0 = no paging)
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every name in the catalog
    Names,
    /// Search names by substring
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Show one Pokemon by name or id
    Show { key: String },
    /// Build a team from up to six names or ids and print its coverage
    Team { keys: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(url) = cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }

    match cli.command {
        None => {
            // Logs would tear the alternate screen
            init_tracing("off", cli.log_json);
            run_ui_mode(config).await
        }
        Some(command) => {
            init_tracing("info", cli.log_json);
            run_command(command, config).await
        }
    }
}

async fn run_command(command: Command, config: Config) -> Result<()> {
    let client = CatalogClient::new(&config);

    match command {
        Command::Names => {
            let names = client.list_all_names().await;
            if names.is_empty() {
                bail!("catalog returned no names");
            }
            for name in names {
                println!("{}", name);
            }
        }
        Command::Search { query, limit } => {
            let found = client.search(&query, limit).await;
            if let Some(error) = client.status().error() {
                bail!(error);
            }
            if found.is_empty() {
                println!("No Pokemon matching {:?}", query);
            }
            for resource in found {
                println!("{:<20} {}", resource.name, resource.url);
            }
        }
        Command::Show { key } => {
            let key: PokemonKey = match key.parse::<u32>() {
                Ok(id) => id.into(),
                Err(_) => key.into(),
            };
            let Some(pokemon) = client.fetch_by_name_or_id(key).await else {
                bail!(client.status().error().unwrap_or_else(|| "Failed to fetch Pokemon".to_string()));
            };
            let types: Vec<_> = pokemon.types.iter().map(|t| t.name.as_str()).collect();
            println!("#{} {}", pokemon.id, pokemon.display_name());
            println!("Types:  {}", types.join(", "));
            println!("Sprite: {}", pokemon.sprite);
        }
        Command::Team { keys } => {
            if keys.len() > TEAM_SIZE {
                bail!("a team holds at most {} Pokemon, got {}", TEAM_SIZE, keys.len());
            }
            let store = TeamStore::new(client, config.type_universe);
            for (position, key) in keys.iter().enumerate() {
                if !store.place(key, position).await? {
                    eprintln!(
                        "Slot {}: {} ({})",
                        position + 1,
                        key,
                        store.status().error().unwrap_or_default()
                    );
                }
            }
            print_team(&store.team(), &store);
        }
    }

    Ok(())
}

fn print_team(team: &Team, store: &TeamStore) {
    let stats = store.stats();

    println!("My Team");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (i, slot) in team.slots().iter().enumerate() {
        match slot {
            Some(p) => {
                let types: Vec<_> = p.types.iter().map(|t| t.name.as_str()).collect();
                println!("  {}. {:<14} {}", i + 1, p.display_name(), types.join("/"));
            }
            None => println!("  {}. -", i + 1),
        }
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Slots:    {}/{}", stats.filled_slots, TEAM_SIZE);
    println!("Types:    {}/{}", stats.total_types, store.type_universe());
    println!("Coverage: {}%", stats.type_coverage);
    if team.covered_types().is_empty() {
        println!("No types covered");
    } else {
        println!("Covered:  {}", team.covered_types().join(", "));
    }
}

#[cfg(feature = "tui")]
async fn run_ui_mode(config: Config) -> Result<()> {
    let client = CatalogClient::new(&config);
    let store = TeamStore::new(client, config.type_universe);

    let mut app = ui::App::new(store, config.page_size);
    ui::run_ui(&mut app).await?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API server: cargo run --bin team-server --features server");
    std::process::exit(1);
}
