// Property-based tests for planner configuration

use planner::config::Settings;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

/// *For any* valid preview options and schedule list written to a config
/// file, loading reflects them exactly and the result validates cleanly.
#[test]
fn property_configuration_file_round_trip() {
    proptest!(|(
        count in 1usize..100,
        log_level in prop::sample::select(vec!["trace", "debug", "info", "warn", "error"]),
        events in prop::sample::subsequence(
            vec!["*", "*/10", "mon..fri 2:30", "sat..sun 8:00 UTC", "*/12:0 Europe/Berlin"],
            1..=5
        )
    )| {
        let temp_dir = TempDir::new().unwrap();

        let mut body = format!(
            r#"
[preview]
count = {count}
timezone = "UTC"

[observability]
log_level = "{log_level}"
"#
        );
        for (index, event) in events.iter().enumerate() {
            body.push_str(&format!(
                "\n[[schedules]]\nname = \"job-{index}\"\nevent = \"{event}\"\n"
            ));
        }
        fs::write(temp_dir.path().join("default.toml"), body).unwrap();

        let settings = Settings::load_from_path(temp_dir.path()).unwrap();
        prop_assert_eq!(settings.preview.count, count);
        prop_assert_eq!(settings.observability.log_level.as_str(), log_level);
        prop_assert_eq!(settings.schedules.len(), events.len());
        for (entry, event) in settings.schedules.iter().zip(&events) {
            prop_assert_eq!(entry.event.as_str(), *event);
            prop_assert_eq!(entry.timezone.as_deref(), None);
        }
        prop_assert_eq!(settings.validate(), Ok(()));

        // Every configured event must also be accepted by the parser.
        for entry in &settings.schedules {
            prop_assert!(entry.event.parse::<calendar::pattern::TimePattern>().is_ok());
        }
    });
}

/// *For any* local overlay on top of the default file, the local values
/// take precedence (layered configuration).
#[test]
fn property_local_file_overrides_default() {
    proptest!(|(default_count in 1usize..50, local_count in 50usize..100)| {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("default.toml"),
            format!("[preview]\ncount = {default_count}\n"),
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("local.toml"),
            format!("[preview]\ncount = {local_count}\n"),
        )
        .unwrap();

        let settings = Settings::load_from_path(temp_dir.path()).unwrap();
        prop_assert_eq!(settings.preview.count, local_count);
    });
}
