use chrono::{DateTime, Utc};
use hermes_core::Bar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// On-disk row
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Row {
    time_ms: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

impl From<&Bar> for Row {
    fn from(bar: &Bar) -> Self {
        Self {
            time_ms: bar.time.timestamp_millis(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

impl TryFrom<Row> for Bar {
    type Error = StoreError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Bar {
            time: DateTime::<Utc>::from_timestamp_millis(row.time_ms)
                .ok_or(StoreError::InvalidTimestamp(row.time_ms))?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        })
    }
}

/// Outcome of [`OhlcvStore::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveReport {
    /// Rows with a new timestamp
    pub saved: usize,
    /// Incoming rows that replaced a stored timestamp
    pub updated: usize,
    /// Rows stored after the save
    pub total: usize,
}

/// Row selection for [`OhlcvStore::load`]
///
/// The inclusive time range applies first, then `tail` keeps the newest
/// rows, then `head` keeps the oldest of what remains.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub head: Option<usize>,
    pub tail: Option<usize>,
}

impl LoadQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// The newest `n` rows
    pub fn tail(n: usize) -> Self {
        Self {
            tail: Some(n),
            ..Self::default()
        }
    }
}

/// OHLCV history for one symbol and timeframe
#[derive(Debug, Clone)]
pub struct OhlcvStore {
    symbol: String,
    timeframe: String,
    path: PathBuf,
}

impl OhlcvStore {
    /// Open (without reading) the store file, creating its directory
    pub fn open(
        root: impl AsRef<Path>,
        name: &str,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Self, StoreError> {
        let dir = root.as_ref().join(symbol).join(timeframe);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            path: dir.join(format!("{}.bin", name)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<BTreeMap<i64, Row>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let rows: Vec<Row> = bincode::deserialize_from(BufReader::new(file))?;
        Ok(rows.into_iter().map(|row| (row.time_ms, row)).collect())
    }

    /// Write all rows through a temporary file, then rename over the target
    fn write_rows(&self, rows: &BTreeMap<i64, Row>) -> Result<(), StoreError> {
        let temp = self.path.with_extension("bin.tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&temp)?);
            let rows: Vec<&Row> = rows.values().collect();
            bincode::serialize_into(&mut writer, &rows)?;
            writer.flush()?;
        }
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    /// Merge `bars` into the stored history; the newest row wins per timestamp
    pub fn save(&self, bars: &[Bar]) -> Result<SaveReport, StoreError> {
        let mut rows = self.read_rows()?;
        let before = rows.len();
        for bar in bars {
            let row = Row::from(bar);
            rows.insert(row.time_ms, row);
        }
        self.write_rows(&rows)?;

        let saved = rows.len() - before;
        let report = SaveReport {
            saved,
            updated: bars.len() - saved,
            total: rows.len(),
        };
        log::info!(
            "Store {} {}: Saved {}, Updated {}, Total {}",
            self.symbol,
            self.timeframe,
            report.saved,
            report.updated,
            report.total
        );
        Ok(report)
    }

    /// Read stored bars in time order
    pub fn load(&self, query: &LoadQuery) -> Result<Vec<Bar>, StoreError> {
        let rows = self.read_rows()?;
        let start = query.start.map_or(i64::MIN, |t| t.timestamp_millis());
        let end = query.end.map_or(i64::MAX, |t| t.timestamp_millis());

        let mut selected: Vec<Row> = if start <= end {
            rows.range(start..=end).map(|(_, row)| *row).collect()
        } else {
            Vec::new()
        };
        if let Some(tail) = query.tail {
            let skip = selected.len().saturating_sub(tail);
            selected.drain(..skip);
        }
        if let Some(head) = query.head {
            selected.truncate(head);
        }

        log::info!(
            "Store {} {}: Loaded {} of {} rows",
            self.symbol,
            self.timeframe,
            selected.len(),
            rows.len()
        );
        selected.into_iter().map(Bar::try_from).collect()
    }

    /// Rewrite the file in canonical form
    ///
    /// Returns the number of stored rows. A missing file is left missing.
    pub fn compact(&self) -> Result<usize, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let rows = self.read_rows()?;
        self.write_rows(&rows)?;
        log::info!(
            "Store {} {}: Compacted {} rows",
            self.symbol,
            self.timeframe,
            rows.len()
        );
        Ok(rows.len())
    }
}
