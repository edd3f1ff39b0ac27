//! Command-line driver for the tabletop core.
//!
//! # Responsibility
//! - Provide a `ping` health check for `tabletop_core` linkage.
//! - Import group/restaurant batches and query them from a database file,
//!   falling back to `TABLETOP_DB_PATH` when no `<db>` argument is given.
//! - Print results as JSON so output stays deterministic.

use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tabletop_core::{
    CommunityServices, CoreConfig, GameRestaurantRepository, ImportBatch,
    SqliteConnectionProvider,
};

const USAGE: &str = "usage: tabletop_cli ping | import [<db>] <batch.json> | restaurants [<db>] | groups [<db>] [key=value ...]\n\
    <db> defaults to TABLETOP_DB_PATH";

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &CoreConfig) -> CliResult {
    if let Some(log_dir) = config.log_dir.as_deref() {
        let log_dir = log_dir
            .to_str()
            .ok_or("TABLETOP_LOG_DIR must be valid UTF-8")?;
        tabletop_core::init_logging(config.log_level, log_dir)?;
    }
    Ok(())
}

fn run(args: &[String], config: &CoreConfig) -> CliResult {
    let Some((cmd, rest)) = args.split_first() else {
        return Err(USAGE.into());
    };
    match (cmd.as_str(), rest) {
        ("ping", []) => {
            println!("tabletop_core ping={}", tabletop_core::ping());
            println!("tabletop_core version={}", tabletop_core::core_version());
            Ok(())
        }
        ("import", [batch]) => import(database(None, config)?, batch),
        ("import", [db, batch]) => import(database(Some(db), config)?, batch),
        ("restaurants", []) => restaurants(database(None, config)?),
        ("restaurants", [db]) => restaurants(database(Some(db), config)?),
        ("groups", [first, pairs @ ..]) if !first.contains('=') => {
            groups(database(Some(first), config)?, pairs)
        }
        ("groups", pairs) => groups(database(None, config)?, pairs),
        _ => Err(USAGE.into()),
    }
}

/// Explicit `<db>` argument first, then `TABLETOP_DB_PATH`.
fn database(
    explicit: Option<&String>,
    config: &CoreConfig,
) -> CliResult<SqliteConnectionProvider> {
    let path = explicit
        .map(PathBuf::from)
        .or_else(|| config.database_path.clone())
        .ok_or("no database given: pass <db> or set TABLETOP_DB_PATH")?;
    Ok(SqliteConnectionProvider::file(path))
}

fn import(provider: SqliteConnectionProvider, batch_path: &str) -> CliResult {
    let raw = std::fs::read_to_string(batch_path)?;
    let batch: ImportBatch = serde_json::from_str(&raw)?;

    let services = CommunityServices::from_provider(&provider)?;
    let summary = services.import().import(&batch)?;
    info!(
        "event=cli_import module=cli status=ok groups={} restaurants={}",
        summary.groups_inserted, summary.game_restaurants_inserted
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn restaurants(provider: SqliteConnectionProvider) -> CliResult {
    let services = CommunityServices::from_provider(&provider)?;
    let restaurants = services.game_restaurants().get_game_restaurants()?;
    let rows: Vec<_> = restaurants.values().collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn groups(provider: SqliteConnectionProvider, pairs: &[String]) -> CliResult {
    let pairs = pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .ok_or_else(|| format!("expected key=value, got `{pair}`"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let services = CommunityServices::from_provider(&provider)?;
    let groups = services.search().get_groups(pairs)?;
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{database, run};
    use std::path::PathBuf;
    use tabletop_core::{CommunityServices, CoreConfig, DbTarget, GroupsRepository};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn config_with_db(path: Option<PathBuf>) -> CoreConfig {
        CoreConfig {
            database_path: path,
            ..CoreConfig::default()
        }
    }

    #[test]
    fn unknown_command_reports_usage() {
        let err = run(&args(&["frobnicate"]), &CoreConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("usage:"));
        assert!(run(&[], &CoreConfig::default()).is_err());
    }

    #[test]
    fn missing_database_is_reported() {
        let err = run(&args(&["restaurants"]), &CoreConfig::default()).unwrap_err();
        assert!(err.to_string().contains("TABLETOP_DB_PATH"));
    }

    #[test]
    fn explicit_database_wins_over_config() {
        let config = config_with_db(Some(PathBuf::from("/tmp/from-env.db")));
        let explicit = "/tmp/explicit.db".to_string();

        let provider = database(Some(&explicit), &config).unwrap();
        assert_eq!(provider.target(), &DbTarget::File(PathBuf::from(&explicit)));

        let provider = database(None, &config).unwrap();
        assert_eq!(
            provider.target(),
            &DbTarget::File(PathBuf::from("/tmp/from-env.db"))
        );
    }

    #[test]
    fn malformed_search_pair_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("groups.db");
        let err = run(
            &args(&["groups", db.to_str().unwrap(), "city"]),
            &CoreConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    #[test]
    fn import_then_search_using_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("groups.db");
        let batch = dir.path().join("batch.json");
        std::fs::write(
            &batch,
            r#"{"groups":[{"name":"Dice Tower","url":"dice-tower","cities":["Denver, CO"]}]}"#,
        )
        .unwrap();
        let config = config_with_db(Some(db.clone()));

        run(&args(&["import", batch.to_str().unwrap()]), &config).unwrap();
        run(&args(&["groups", "city=Denver"]), &config).unwrap();
        run(&args(&["restaurants", db.to_str().unwrap()]), &CoreConfig::default()).unwrap();

        let conn = tabletop_core::open_db(&db).unwrap();
        let services = CommunityServices::from_provider(&conn).unwrap();
        assert!(services
            .groups()
            .get_group_id_by_url("dice-tower")
            .unwrap()
            .is_some());
    }
}
