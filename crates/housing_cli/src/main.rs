//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `housing_core` linkage without a UI host.
//! - With a database path, open it, seed demo rows once and run one search.

use clap::Parser;
use housing_core::db::open_db;
use housing_core::{
    init_logging, search, Address, CoreConfig, Garage, House, NewAddress, NewGarage, NewHouse,
    Repository, SqliteHousingStore, UnitOfWork,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "housing_cli", version, about = "Housing registry smoke check")]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    db_path: Option<PathBuf>,

    /// Owner substring, matched ignoring ASCII case.
    #[arg(long)]
    owner: Option<String>,

    /// Year built; text that is not a number is ignored.
    #[arg(long)]
    year: Option<String>,

    #[arg(long)]
    floors: Option<i32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    println!("housing_core ping={}", housing_core::ping());
    println!("housing_core version={}", housing_core::core_version());

    let Some(db_path) = cli.db_path else {
        return Ok(());
    };

    let config = CoreConfig {
        db_path,
        ..CoreConfig::from_env()
    };
    config.validate()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&config.db_path)?;
    let store = SqliteHousingStore::try_new(&conn)?;

    if Repository::<House>::fetch_all(&store)?.is_empty() {
        seed_demo(&store)?;
        log::info!("event=demo_seed module=cli status=ok houses=2");
    }

    println!("houses={}", Repository::<House>::fetch_all(&store)?.len());

    let found = search(&store, cli.owner.as_deref(), cli.year.as_deref(), cli.floors)?;
    for house in &found {
        println!(
            "house id={} owner={} year_built={} area={} floors={}",
            house.id, house.owner, house.year_built, house.area, house.floors
        );
    }
    println!("matches={}", found.len());
    Ok(())
}

fn seed_demo(store: &SqliteHousingStore<'_>) -> Result<(), Box<dyn Error>> {
    let alice = Repository::<House>::add(store, &NewHouse::new("Alice", 1995, 140.0, 2))?;
    let bob = Repository::<House>::add(store, &NewHouse::new("Bob", 2010, 95.5, 1))?;

    Repository::<Address>::add(
        store,
        &NewAddress::new(alice.id, "Main St 1", "Springfield", "12345", "US")
            .with_notes("corner lot"),
    )?;
    Repository::<Address>::add(
        store,
        &NewAddress::new(bob.id, "Lake Rd 7", "Shelbyville", "54321", "US"),
    )?;
    Repository::<Garage>::add(store, &NewGarage::new(alice.id, "detached", 36.0))?;

    store.persist()?;
    Ok(())
}
