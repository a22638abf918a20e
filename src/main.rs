use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use crafting_calculator::render::{format_for_display, to_json, to_yaml};
use crafting_calculator::{
    build_tree, craft_item, discover_games, load_game, search, RecipeDatabase, SearchFilter,
};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Break game crafting recipes down into the items you need to gather.
#[derive(Debug, Parser)]
#[command(name = "crafting-calculator", version, about)]
struct Cli {
    /// Directory with one sub-directory of recipes per game
    #[arg(
        long,
        env = "CRAFTING_RECIPES_DIR",
        default_value = "recipes",
        global = true
    )]
    recipes_dir: Utf8PathBuf,

    /// Log debug output with timestamps
    #[arg(short, long, global = true)]
    debug: bool,

    /// Log progress information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the shopping list for one or more items
    Craft {
        /// Items to craft; naming an item twice crafts it twice
        #[arg(required = true)]
        items: Vec<String>,

        #[arg(short, long)]
        game: String,

        /// How many of each item to craft
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show how an item is crafted, branch by branch
    Tree {
        item: String,

        #[arg(short, long)]
        game: String,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,
    },

    /// List the items of a game
    List {
        #[arg(short, long)]
        game: String,

        /// Only list base items
        #[arg(long, conflicts_with = "craftable")]
        gatherable: bool,

        /// Only list craftable items
        #[arg(long)]
        craftable: bool,

        /// Rank items by how well they match a query
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List the games found in the recipes directory
    Games,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.verbose)?;
    debug!("Reading recipes from {}.", cli.recipes_dir);

    match cli.command {
        Command::Craft {
            items,
            game,
            amount,
            format,
        } => {
            let database = open_game(&cli.recipes_dir, &game)?;
            for item in &items {
                if !database.contains(item) {
                    warn!("{item} is not a known item of {game}, treating it as a base item.");
                }
            }
            let list = craft_item(&database, items, amount)
                .with_context(|| format!("Failed to compute the shopping list for {game}"))?;
            let output = match format {
                OutputFormat::Text => format_for_display(&list),
                OutputFormat::Json => to_json(&list).context("Failed to render JSON")?,
                OutputFormat::Yaml => to_yaml(&list).context("Failed to render YAML")?,
            };
            println!("{}", output.trim_end());
        }
        Command::Tree { item, game, amount } => {
            let database = open_game(&cli.recipes_dir, &game)?;
            let tree = build_tree(&database, &item, amount)
                .with_context(|| format!("Failed to build the crafting tree of {item}"))?;
            print!("{}", tree.render());
        }
        Command::List {
            game,
            gatherable,
            craftable,
            search: query,
        } => {
            let database = open_game(&cli.recipes_dir, &game)?;
            let filter = match (gatherable, craftable) {
                (true, _) => SearchFilter::Gatherable,
                (_, true) => SearchFilter::Craftable,
                _ => SearchFilter::All,
            };
            for name in search(&database, query.as_deref().unwrap_or_default(), filter) {
                println!("{name}");
            }
        }
        Command::Games => {
            let games = discover_games(&cli.recipes_dir).with_context(|| {
                format!("Failed to read the recipes directory {}", cli.recipes_dir)
            })?;
            if games.is_empty() {
                warn!("No games found in {}.", cli.recipes_dir);
            }
            for game in games {
                println!("{game}");
            }
        }
    }

    Ok(())
}

fn open_game(recipes_dir: &Utf8Path, game: &str) -> Result<RecipeDatabase> {
    let (database, _meta) = load_game(recipes_dir, game)
        .with_context(|| format!("Failed to load the recipes of {game} from {recipes_dir}"))?;
    Ok(database)
}

/// Logs go to stderr so that rendered output on stdout stays parseable.
/// `RUST_LOG` takes precedence over the command line flags.
fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    let level = match (debug, verbose) {
        (true, _) => "debug",
        (_, true) => "info",
        _ => "warn",
    };
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives).context("Invalid RUST_LOG")?,
        Err(_) => EnvFilter::new(level),
    };

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if debug {
        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(layer.without_time())
            .with(filter)
            .init();
    }
    Ok(())
}
