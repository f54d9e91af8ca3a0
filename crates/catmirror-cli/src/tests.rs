use catmirror_db::SyncRunRow;
use chrono::{TimeZone, Utc};

use super::*;

#[test]
fn sync_defaults_to_all_entities() {
    let cli = Cli::try_parse_from(["catmirror-cli", "sync"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Sync {
            entity: EntityFilter::All
        }
    ));
}

#[test]
fn sync_accepts_single_entity() {
    let cli = Cli::try_parse_from(["catmirror-cli", "sync", "--entity", "variants"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Sync {
            entity: EntityFilter::One(SyncEntity::Variants)
        }
    ));
}

#[test]
fn sync_rejects_unknown_entity() {
    assert!(Cli::try_parse_from(["catmirror-cli", "sync", "--entity", "warehouses"]).is_err());
}

#[test]
fn status_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["catmirror-cli", "status"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Status { limit: 20 }));
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["catmirror-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Migrate));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["catmirror-cli"]).is_err());
}

#[test]
fn format_run_includes_error_message() {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let run = SyncRunRow {
        id: 1,
        public_id: Default::default(),
        entity: "products".to_owned(),
        trigger_source: "schedule".to_owned(),
        status: "aborted".to_owned(),
        fetched: 0,
        upserted: 0,
        unchanged: 0,
        skipped: 0,
        error_message: Some("HTTP error".to_owned()),
        started_at: at,
        completed_at: at,
    };

    let line = status::format_run(&run);
    assert!(line.starts_with("2026-03-01 12:00:00 products"));
    assert!(line.ends_with("error: HTTP error"));
}
