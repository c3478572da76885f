use anyhow::Result;
use hat_fixture_config::Config;
use hat_fixture_engine::io::{self, FixtureSummary};
use std::{env, path::PathBuf, process};

fn describe(summary: &FixtureSummary) -> String {
    let mut line = format!(
        "ok   {} ({}, {} target{})",
        summary.action,
        summary.language_id,
        summary.target_count,
        if summary.target_count == 1 { "" } else { "s" }
    );
    if summary.marks_to_check > 0 {
        line.push_str(&format!(", {} marks to check", summary.marks_to_check));
    }
    line
}

fn program_name(args: &[String]) -> &str {
    args.first().map_or("hat-fixture", String::as_str)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Determine fixtures path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);
    let config_path = Config::config_path();

    let fixtures_path;
    let from_config;

    if args.len() == 2 {
        fixtures_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                log::info!("Loaded fixtures path from {}", config_path.display());
                fixtures_path = config.fixtures_path;
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No fixtures path provided and no config file found");
                eprintln!("Usage: {} <fixtures-folder-path>", program);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <fixtures-folder-path>", program);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [fixtures-folder-path]", program);
        process::exit(1);
    };

    if let Err(e) = io::validate_fixtures_dir(&fixtures_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Invalid fixtures directory '{}'{source}: {e}",
            fixtures_path.display()
        );
        process::exit(1);
    }

    let files = io::scan_fixture_files(&fixtures_path)?;
    log::info!(
        "Checking {} fixtures in {}",
        files.len(),
        fixtures_path.display()
    );

    let mut failures = 0;
    for file in &files {
        let display = file.strip_prefix(&fixtures_path).unwrap_or(file).display();
        match io::check_fixture(file) {
            Ok(summary) => println!("{display}: {}", describe(&summary)),
            Err(e) => {
                failures += 1;
                println!("{display}: FAIL {e}");
            }
        }
    }

    println!(
        "{} fixtures checked, {} failed",
        files.len(),
        failures
    );
    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}
