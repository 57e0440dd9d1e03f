// src/main.rs
use std::env;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use moviefinder::app::{AppError, LoadOutcome, MovieFinder, SettingsOutcome};
use moviefinder::cli::{parse_command, parse_settings, Command, USAGE};
use moviefinder::config::load_config;

fn print_items(app: &MovieFinder, limit: usize) -> Result<(), AppError> {
    let items = app.browse()?;
    if items.is_empty() {
        println!("No movies or shows match your region and services.");
        return Ok(());
    }
    for item in items.iter().take(limit) {
        let year = item.year.map(|y| format!(" ({y})")).unwrap_or_default();
        let services: Vec<&str> = item.services.iter().map(|s| s.as_str()).collect();
        println!("{:<12} {}{}  [{}]", item.id, item.title, year, services.join(", "));
    }
    if items.len() > limit {
        println!("... {} more", items.len() - limit);
    }
    Ok(())
}

fn run(args: &[String]) -> Result<ExitCode, AppError> {
    let cmd = match parse_command(args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let cfg = load_config();
    let mut app = MovieFinder::from_config(&cfg)?;

    match cmd {
        Command::Settings(flags) => {
            let update = match parse_settings(&flags, app.profile()) {
                Ok(u) => u,
                Err(msg) => {
                    eprintln!("{msg}\n{USAGE}");
                    return Ok(ExitCode::from(2));
                }
            };
            match app.save_settings(update)? {
                SettingsOutcome::Unavailable => {
                    eprintln!("Error: unable to connect to the service.");
                    return Ok(ExitCode::FAILURE);
                }
                SettingsOutcome::Unchanged => println!("Settings saved."),
                SettingsOutcome::Reloaded(n) => {
                    println!("Settings saved; {n} movies and shows available.");
                }
                SettingsOutcome::ReloadedEmpty => {
                    println!("Settings saved; nothing is available for these services in this region.");
                }
            }
        }
        Command::Liked => {
            for entry in app.verdicts().liked()? {
                println!("{}  {}", entry.decided_at.format("%Y-%m-%d %H:%M"), entry.item_id);
            }
        }
        Command::Browse { limit } => {
            if !load_or_report(&mut app)? {
                return Ok(ExitCode::FAILURE);
            }
            print_items(&app, limit.unwrap_or(usize::MAX))?;
        }
        Command::Like(id) => {
            if !load_or_report(&mut app)? {
                return Ok(ExitCode::FAILURE);
            }
            app.like(&id)?;
            println!("Liked {id}.");
        }
        Command::Reject(id) => {
            if !load_or_report(&mut app)? {
                return Ok(ExitCode::FAILURE);
            }
            app.reject(&id)?;
            println!("Rejected {id}.");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// False (after telling the user) when the catalog source is unreachable.
fn load_or_report(app: &mut MovieFinder) -> Result<bool, AppError> {
    if app.load_catalog()? == LoadOutcome::Unavailable {
        eprintln!("Error: unable to connect to the service.");
        return Ok(false);
    }
    Ok(true)
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(code) => code,
        Err(AppError::NoProfile) => {
            eprintln!("No profile yet. Start with `moviefinder settings`.\n{USAGE}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
