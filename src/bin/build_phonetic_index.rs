use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use voter_suggest::config::SETTINGS;
use voter_suggest::{IndexSnapshot, JsonPartitionSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output = std::env::args().nth(1).unwrap_or_else(|| "phonetic_index.json".to_string());
    let output_path = Path::new(&output);

    let settings = SETTINGS
        .lock()
        .map_err(|e| format!("Failed to lock settings: {}", e))?
        .clone();

    println!("Building phonetic index...");
    for partition in &settings.partitions {
        if !partition.exists() {
            eprintln!("Partition file not found at {:?}, it will contribute no rows", partition);
        }
    }

    let start_time = Instant::now();
    let source = JsonPartitionSource::new(settings.partitions.clone(), &settings.numeric_column);
    let snapshot = IndexSnapshot::build(&source, &settings.text_columns);
    let elapsed = start_time.elapsed();

    // column -> key -> values, sorted for stable output
    let mut dump: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    println!("\nIndex Statistics:");
    for column in &settings.text_columns {
        let index = snapshot.column(column)?;
        println!("  {}: {} keys, {} values", column, index.key_count(), index.value_count());
        let entries = index
            .entries()
            .map(|(key, values)| (key.to_string(), values.iter().cloned().collect()))
            .collect();
        dump.insert(column.clone(), entries);
    }
    println!("  {}: {} identifiers", settings.numeric_column, snapshot.numeric().len());
    println!("  Build time: {} ms", elapsed.as_millis());

    if let Some(dir) = output_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(output_path, serde_json::to_string_pretty(&dump)?)?;

    let metadata = std::fs::metadata(output_path)?;
    println!("\nIndex saved to {:?}", output_path);
    println!("Final size: {} KB", metadata.len() / 1024);

    Ok(())
}
