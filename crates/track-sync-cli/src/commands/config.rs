use super::{config_file_path, log_dir};
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use track_sync_config::{Config, PathManager};

pub fn run_config(cmd: ConfigCommands, config_path: Option<&Path>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(config_path, output),
        ConfigCommands::Init { force } => init_config(config_path, force, output),
        ConfigCommands::Path => {
            let config_file = config_file_path(config_path);
            match output.format() {
                OutputFormat::Human => output.info(config_file.display().to_string()),
                OutputFormat::Json | OutputFormat::JsonPretty => {
                    output.json(&json!({ "config_file": config_file.display().to_string() }));
                }
            }
            Ok(())
        }
    }
}

fn section(title: &str, rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title)
            .fg(comfy_table::Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
        Cell::new(""),
    ]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn flag(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn show_config(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config_file = config_file_path(config_path);

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'tracksync config init' to create one.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let validation = config.validate();

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);

            let services = section(
                "Services",
                vec![
                    ("Source", format!("{} ({})", config.source.name, config.source.snapshot.display())),
                    ("Target", format!("{} ({})", config.target.name, config.target.snapshot.display())),
                ],
            );
            println!("{}", services);

            let m = &config.matching;
            let matching = section(
                "Matching",
                vec![
                    ("Title weight", format!("{:.2}", m.title_weight)),
                    ("Artist weight", format!("{:.2}", m.artist_weight)),
                    ("Duration weight", format!("{:.2}", m.duration_weight)),
                    ("Minimum score", format!("{:.2}", m.min_score)),
                    ("Minimum artist similarity", format!("{:.2}", m.min_artist_similarity)),
                    ("Duration tolerance", format!("{} ms", m.duration_tolerance_ms)),
                    ("Maximum duration delta", format!("{} ms", m.max_duration_delta_ms)),
                ],
            );
            println!("{}", matching);

            let s = &config.sync;
            let sync = section(
                "Sync",
                vec![
                    ("Dry run", flag(s.dry_run)),
                    ("Skip existing favorites", flag(s.skip_existing)),
                    ("Update existing playlists", flag(s.update_existing)),
                    ("Search with album", flag(s.search_with_album)),
                ],
            );
            println!("{}", sync);

            let logging = section(
                "Logging",
                vec![
                    ("Run log files", flag(config.logging.file_logging)),
                    ("Log directory", log_dir(Some(&config)).display().to_string()),
                ],
            );
            println!("{}", logging);

            match validation {
                Ok(()) => output.success("Configuration is valid"),
                Err(e) => output.error(format!("Configuration is invalid: {}", e)),
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "valid": validation.is_ok(),
                "error": validation.err().map(|e| e.to_string()),
                "config": config,
            }));
        }
    }

    Ok(())
}

fn init_config(config_path: Option<&Path>, force: bool, output: &Output) -> Result<()> {
    let config_file = config_file_path(config_path);
    if config_file.exists() && !force {
        return Err(eyre!(
            "Configuration file already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
    }

    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;

    let config = Config::example(paths.data_dir());
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    output.info(format!(
        "Export your libraries as JSON snapshots to {} and {}, then run 'tracksync favorites'.",
        config.source.snapshot.display(),
        config.target.snapshot.display()
    ));
    Ok(())
}
