//! Recipe loading.
//!
//! Recipes live below a recipes directory, one sub-directory per game:
//!
//! ```text
//! recipes/
//!   yonder/
//!     meta.yml          # title: Yonder
//!     crafting/tools.yml
//!     gathering.yml
//! ```
//!
//! Every `.yml`/`.yaml` file except `meta.yml` holds recipes, either as a
//! list of records with a `name` field or as a mapping of names to records.

use crate::database::RecipeDatabase;
use crate::model::{parse_meta, recipe_name, GameMeta, NormalizeError, Recipe};
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml::Value;
use std::fs;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// File name of the per-game metadata file.
pub const META_FILE: &str = "meta.yml";

/// Errors that can occur when loading recipes.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read recipe file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read directory: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("Failed to create glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Failed to parse {path}: {source}")]
    YamlError {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid recipe in {path}: {source}")]
    RecipeError {
        path: Utf8PathBuf,
        #[source]
        source: NormalizeError,
    },

    #[error("Path contains invalid UTF-8: {0}")]
    InvalidPath(String),

    #[error("Game directory does not exist: {0}")]
    GameNotFound(Utf8PathBuf),

    #[error("No recipes detected for {0}")]
    NoRecipes(String),
}

/// Lists the games below `root` that ship a `meta.yml` with a title.
///
/// Returns the directory names, sorted. A missing `root` yields no games.
pub fn discover_games(root: &Utf8Path) -> Result<Vec<String>, LoadError> {
    let mut games = Vec::new();

    for path in glob_files(root, &[META_FILE])? {
        let content = fs::read_to_string(&path)?;
        let titled = parse_meta(&content).is_some_and(|meta| meta.title().is_some());
        if !titled {
            debug!("Ignoring {path} without a title.");
            continue;
        }
        if let Some(game) = path.parent().and_then(Utf8Path::file_name) {
            games.push(game.to_string());
        }
    }

    games.sort();
    games.dedup();
    Ok(games)
}

/// Loads all recipes and the metadata of one game.
///
/// # Errors
///
/// Returns `LoadError::GameNotFound` if `root/game` is not a directory,
/// `LoadError::NoRecipes` if it contains no recipes, and a parse error naming
/// the file for invalid YAML or malformed recipes.
pub fn load_game(root: &Utf8Path, game: &str) -> Result<(RecipeDatabase, GameMeta), LoadError> {
    let dir = root.join(game);
    if !dir.is_dir() {
        return Err(LoadError::GameNotFound(dir));
    }
    info!("Loading recipes from {dir}.");

    let mut meta = GameMeta::default();
    let mut recipes = Vec::new();

    for path in glob_files(&dir, &["*.yml", "*.yaml"])? {
        let content = fs::read_to_string(&path)?;
        if path.file_name() == Some(META_FILE) {
            if let Some(parsed) = parse_meta(&content) {
                debug!("Game detected as {}.", parsed.display_title());
                meta = parsed;
            }
            continue;
        }

        let parsed = parse_recipes(&content, &path)?;
        debug!("Read {} recipes from {path}.", parsed.len());
        recipes.extend(parsed);
    }

    if recipes.is_empty() {
        error!("No recipes were detected for {}.", meta.display_title());
        return Err(LoadError::NoRecipes(meta.display_title().to_string()));
    }

    let database = RecipeDatabase::from_recipes(recipes);
    info!(
        "Loaded a total of {} recipes for {}.",
        database.len(),
        meta.display_title()
    );
    Ok((database, meta))
}

/// Parses the recipes of one YAML document.
///
/// `source` only names the document in log messages and errors.
pub fn parse_recipes(content: &str, source: &Utf8Path) -> Result<Vec<Recipe>, LoadError> {
    let document: Value = serde_yaml::from_str(content).map_err(|source_error| {
        LoadError::YamlError {
            path: source.to_owned(),
            source: source_error,
        }
    })?;
    let invalid = |source_error| LoadError::RecipeError {
        path: source.to_owned(),
        source: source_error,
    };

    let mut recipes = Vec::new();
    match &document {
        Value::Null => {}
        Value::Sequence(entries) => {
            for entry in entries {
                match recipe_name(entry) {
                    Some(name) => recipes.push(Recipe::from_value(name, entry).map_err(invalid)?),
                    None => warn!("Skipping entry in {source} without a name key."),
                }
            }
        }
        Value::Mapping(entries) => {
            for (key, entry) in entries {
                match key.as_str() {
                    Some(name) => recipes.push(Recipe::from_value(name, entry).map_err(invalid)?),
                    None => warn!("Skipping entry in {source} with a non-string key."),
                }
            }
        }
        _ => warn!("Skipping {source}, expected a list or mapping of recipes."),
    }

    Ok(recipes)
}

/// Parses one YAML document straight into a database.
pub fn parse_database(content: &str, source: &Utf8Path) -> Result<RecipeDatabase, LoadError> {
    Ok(RecipeDatabase::from_recipes(parse_recipes(content, source)?))
}

/// Finds files matching any of `patterns` anywhere below `dir`, sorted.
fn glob_files(dir: &Utf8Path, patterns: &[&str]) -> Result<Vec<Utf8PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for file_pattern in patterns {
        let pattern = dir.join("**").join(file_pattern);
        for entry in glob::glob(pattern.as_str())? {
            let path = Utf8PathBuf::from_path_buf(entry?)
                .map_err(|path| LoadError::InvalidPath(path.display().to_string()))?;
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
