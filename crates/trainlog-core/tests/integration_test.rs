//! Integration tests for the record store, entry sessions and config.

use std::fs;

use tempfile::TempDir;
use trainlog_core::storage::{self, load_records};
use trainlog_core::{compute_summary, Session, SetRecord, TrainlogConfig, TrainlogError, WeekLabel};

fn sample_records() -> Vec<SetRecord> {
    vec![
        SetRecord::new("Sentadilla", "1ª Semana Marzo", 1, 100.0, 5),
        SetRecord::new("Sentadilla", "1ª Semana Marzo", 2, 102.5, 5),
        SetRecord::new("Press banca", "1ª Semana Marzo", 1, 62.5, 8),
        SetRecord::new("Press banca, agarre cerrado", "2ª Semana Marzo", 1, 0.0, 12),
    ]
}

#[test]
fn test_missing_store_loads_empty() {
    let tmp = TempDir::new().unwrap();
    let records = load_records(&tmp.path().join("nothing.csv")).unwrap();
    assert!(records.is_empty());
    assert!(compute_summary(&records).is_empty());
}

#[test]
fn test_store_round_trip_preserves_order_and_fields() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data").join("store.csv");

    storage::append_records(&path, &sample_records()).unwrap();
    let loaded = load_records(&path).unwrap();

    assert_eq!(loaded, sample_records());
}

#[test]
fn test_append_writes_header_once() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    let records = sample_records();

    storage::append_records(&path, &records[..2]).unwrap();
    storage::append_records(&path, &records[2..]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let first_line = content.lines().next().unwrap();
    assert_eq!(first_line, "Ejercicio,Semana,Serie,Peso,Reps");
    assert_eq!(content.matches("Ejercicio,Semana").count(), 1);
    assert_eq!(load_records(&path).unwrap(), records);
}

#[test]
fn test_append_nothing_does_not_create_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    storage::append_records(&path, &[]).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_load_tolerates_import_columns_and_short_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    fs::write(
        &path,
        "Ejercicio,Semana,Serie,Peso,Reps,Peso medio,Reps totales\n\
         Remo,1ª Semana Abril,1,50.0,10,52.5,18\n\
         Remo,1ª Semana Abril,2,55.0,8,52.5,18\n\
         Remo,2ª Semana Abril,1,57.5,8\n",
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2], SetRecord::new("Remo", "2ª Semana Abril", 1, 57.5, 8));
}

#[test]
fn test_load_rejects_garbage_weight() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    fs::write(&path, "Ejercicio,Semana,Serie,Peso,Reps\nRemo,W1,1,heavy,10\n").unwrap();

    let err = load_records(&path).unwrap_err();
    assert!(matches!(err, TrainlogError::Csv(_)));
}

#[test]
fn test_session_save_numbers_sets_and_clears() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");

    let mut session = Session::new();
    session.add("Sentadilla", "W1", 100.0, 5).unwrap();
    session.add("Sentadilla", "W1", 105.0, 3).unwrap();
    session.add("Dominadas", "W1", 0.0, 10).unwrap();

    let saved = session.save(&path).unwrap();
    assert!(session.is_empty());
    assert_eq!(
        saved,
        vec![
            SetRecord::new("Sentadilla", "W1", 1, 100.0, 5),
            SetRecord::new("Sentadilla", "W1", 2, 105.0, 3),
            SetRecord::new("Dominadas", "W1", 1, 0.0, 10),
        ]
    );
    assert_eq!(load_records(&path).unwrap(), saved);
}

#[test]
fn test_session_save_continues_existing_series() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    storage::append_records(
        &path,
        &[
            SetRecord::new("Sentadilla", "W1", 1, 100.0, 5),
            SetRecord::new("Sentadilla", "W1", 2, 100.0, 5),
        ],
    )
    .unwrap();

    let mut session = Session::new();
    session.add("Sentadilla", "W1", 110.0, 2).unwrap();
    session.add("Sentadilla", "W2", 100.0, 5).unwrap();
    let saved = session.save(&path).unwrap();

    assert_eq!(saved[0].series, 3);
    assert_eq!(saved[1].series, 1);
    assert_eq!(load_records(&path).unwrap().len(), 4);
}

#[test]
fn test_session_remove_and_validation() {
    let mut session = Session::new();
    session.add("Remo", "W1", 50.0, 10).unwrap();
    session.add("Remo", "W1", 55.0, 8).unwrap();

    let removed = session.remove(0).unwrap();
    assert_eq!(removed.weight, 50.0);
    assert_eq!(session.len(), 1);
    assert_eq!(session.pending()[0].weight, 55.0);

    assert!(matches!(
        session.remove(5),
        Err(TrainlogError::PendingSetNotFound { index: 5, len: 1 })
    ));
    assert!(matches!(session.add("", "W1", 50.0, 10), Err(TrainlogError::InvalidSet(_))));
    assert!(matches!(session.add("Remo", "W1", -1.0, 10), Err(TrainlogError::InvalidSet(_))));
    assert!(matches!(session.add("Remo", "W1", f64::NAN, 10), Err(TrainlogError::InvalidSet(_))));
    assert!(matches!(session.add("Remo", "W1", 50.0, 0), Err(TrainlogError::InvalidSet(_))));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_empty_session_save_is_noop() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("store.csv");
    let saved = Session::new().save(&path).unwrap();
    assert!(saved.is_empty());
    assert!(!path.exists());
}

#[test]
fn test_config_defaults_and_overrides() {
    let tmp = TempDir::new().unwrap();

    let missing = TrainlogConfig::load(Some(&tmp.path().join("trainlog.yaml"))).unwrap();
    assert_eq!(missing, TrainlogConfig::default());
    assert_eq!(missing.header_marker, "Ejercicio");

    let path = tmp.path().join("trainlog.yaml");
    fs::write(&path, "store_path: /tmp/log.csv\nport: 9100\n").unwrap();
    let config = TrainlogConfig::load(Some(&path)).unwrap();
    assert_eq!(config.store_path, std::path::PathBuf::from("/tmp/log.csv"));
    assert_eq!(config.port, 9100);
    assert_eq!(config.host, "127.0.0.1");

    storage::save_yaml(&path, &config).unwrap();
    assert_eq!(TrainlogConfig::load(Some(&path)).unwrap(), config);
}

#[test]
fn test_week_labels() {
    assert_eq!(WeekLabel::new(1, 1).unwrap().to_string(), "1ª Semana Enero");
    assert_eq!(WeekLabel::new(4, 12).unwrap().to_string(), "4ª Semana Diciembre");
    assert!(WeekLabel::new(0, 3).is_err());
    assert!(WeekLabel::new(5, 3).is_err());
    assert!(WeekLabel::new(2, 13).is_err());

    let date = |d| chrono::NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
    assert_eq!(WeekLabel::for_date(date(1)).to_string(), "1ª Semana Marzo");
    assert_eq!(WeekLabel::for_date(date(8)).to_string(), "2ª Semana Marzo");
    assert_eq!(WeekLabel::for_date(date(31)).to_string(), "4ª Semana Marzo");
}
