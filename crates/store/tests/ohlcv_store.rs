//! Integration tests for OhlcvStore against a temporary directory

use chrono::{DateTime, Duration, Utc};
use hermes_core::Bar;
use hermes_store::{LoadQuery, OhlcvStore, SaveReport};
use tempfile::TempDir;

fn hour(i: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(i)
}

fn bar(i: i64, close: f64) -> Bar {
    Bar {
        time: hour(i),
        open: close,
        high: close + 0.001,
        low: close - 0.001,
        close,
        volume: 10 + i,
    }
}

#[test]
fn test_save_dedups_by_timestamp_newest_wins() {
    let _ = env_logger::try_init();
    let root = TempDir::new().unwrap();
    let store = OhlcvStore::open(root.path(), "OHLCV", "EURUSD", "H1").unwrap();
    assert!(store.path().ends_with("EURUSD/H1/OHLCV.bin"));

    let report = store.save(&[bar(0, 1.10), bar(1, 1.11), bar(2, 1.12)]).unwrap();
    assert_eq!(
        report,
        SaveReport {
            saved: 3,
            updated: 0,
            total: 3
        }
    );

    // Bar 2 was still forming when first saved; bar 3 is new
    let report = store.save(&[bar(2, 1.15), bar(3, 1.13)]).unwrap();
    assert_eq!(
        report,
        SaveReport {
            saved: 1,
            updated: 1,
            total: 4
        }
    );

    let bars = store.load(&LoadQuery::all()).unwrap();
    assert_eq!(bars.len(), 4);
    assert_eq!(bars[2].close, 1.15);
    assert!(bars.windows(2).all(|pair| pair[0].time < pair[1].time));
}

#[test]
fn test_load_range_then_tail_then_head() {
    let _ = env_logger::try_init();
    let root = TempDir::new().unwrap();
    let store = OhlcvStore::open(root.path(), "OHLCV", "XAUUSD", "M15").unwrap();
    // Saved out of order on purpose
    let bars: Vec<Bar> = (0..10).rev().map(|i| bar(i, 1.0 + i as f64 / 100.0)).collect();
    store.save(&bars).unwrap();

    let loaded = store.load(&LoadQuery::tail(3)).unwrap();
    let times: Vec<_> = loaded.iter().map(|b| b.time).collect();
    assert_eq!(times, vec![hour(7), hour(8), hour(9)]);

    let query = LoadQuery {
        start: Some(hour(2)),
        end: Some(hour(6)),
        head: Some(2),
        tail: Some(4),
    };
    let loaded = store.load(&query).unwrap();
    let times: Vec<_> = loaded.iter().map(|b| b.time).collect();
    assert_eq!(times, vec![hour(3), hour(4)]);

    let inverted = LoadQuery {
        start: Some(hour(6)),
        end: Some(hour(2)),
        ..LoadQuery::default()
    };
    assert!(store.load(&inverted).unwrap().is_empty());
}

#[test]
fn test_missing_file_loads_empty_and_compacts_nothing() {
    let _ = env_logger::try_init();
    let root = TempDir::new().unwrap();
    let store = OhlcvStore::open(root.path(), "OHLCV", "GBPUSD", "D1").unwrap();
    assert!(store.load(&LoadQuery::all()).unwrap().is_empty());
    assert_eq!(store.compact().unwrap(), 0);
    assert!(!store.path().exists());
}

#[test]
fn test_compact_preserves_rows() {
    let _ = env_logger::try_init();
    let root = TempDir::new().unwrap();
    let store = OhlcvStore::open(root.path(), "OHLCV", "EURUSD", "H4").unwrap();
    store.save(&[bar(0, 1.0), bar(1, 1.1)]).unwrap();
    store.save(&[bar(1, 1.2)]).unwrap();

    assert_eq!(store.compact().unwrap(), 2);
    let bars = store.load(&LoadQuery::all()).unwrap();
    assert_eq!(bars, vec![bar(0, 1.0), bar(1, 1.2)]);
    assert!(!store.path().with_extension("bin.tmp").exists());
}
