use std::sync::Arc;

use voter_suggest::config::{AppSettings, SETTINGS};
use voter_suggest::{IndexSnapshot, IndexStore, JsonPartitionSource, SuggestionEngine};

fn usage() -> String {
    "Usage: voter-suggest <column> <query> [limit]\n  column: house_name | name | house_no".to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voter-suggest v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (column, query) = match (args.first(), args.get(1)) {
        (Some(column), Some(query)) => (column.as_str(), query.as_str()),
        _ => {
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    let settings: AppSettings = SETTINGS
        .lock()
        .map_err(|e| format!("Failed to lock settings: {}", e))?
        .clone();
    let limit = match args.get(2) {
        Some(raw) => raw.parse::<usize>().map_err(|e| format!("Invalid limit '{}': {}", raw, e))?,
        None => settings.suggestion_limit,
    };

    let source = JsonPartitionSource::new(settings.partitions.clone(), &settings.numeric_column);
    let snapshot = IndexSnapshot::build(&source, &settings.text_columns);
    let engine = SuggestionEngine::new(Arc::new(IndexStore::new(snapshot)), settings.match_config());

    let suggestions = engine.search(query, column, limit)?;
    println!("{}", serde_json::to_string_pretty(&suggestions)?);

    Ok(())
}
