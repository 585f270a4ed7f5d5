//! Snapshot persistence behind a narrow interface.
//!
//! The store never touches the filesystem. Callers load a snapshot, build a
//! store from it, and save snapshots back through any [`Persistence`]
//! implementation. [`FileBackend`] is the shipped one: JSON state files plus
//! one price CSV per ticker, each file written to a temporary name and
//! renamed into place so a crash mid-save never leaves a half-written file
//! behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::constants::{store_file, PRICES_CSV_HEADER};
use crate::error::{Result, StoreError};
use crate::models::{BundleMap, Coverage, PricePoint, PriceSeries, SeriesMap, StoreSnapshot};
use crate::utils::normalize_ticker;

/// Whole-snapshot load/save interface.
///
/// Both operations move the complete state; there is no partial update. A
/// backend that cannot guarantee atomicity should fail loudly rather than
/// persist a torn snapshot.
pub trait Persistence {
    /// Load the persisted state; an empty snapshot when nothing was saved yet.
    fn load(&self) -> Result<StoreSnapshot>;

    /// Persist `snapshot`, replacing whatever was stored before.
    fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}

/// Directory-backed snapshot storage.
///
/// Layout under the data directory:
///
/// ```text
/// tickers.json          sorted tracked tickers
/// bundles.json          bundle definitions by name
/// coverage.json         covered ranges per ticker (unix-second pairs)
/// prices/<TICKER>.csv   time,price rows with RFC 3339 timestamps
/// ```
///
/// `tickers.json` is authoritative on load: price files not listed there are
/// ignored, and `save` sweeps them out along with leftover `.tmp` files.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `data_dir`. The directory is created on first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The directory this backend reads and writes.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn prices_dir(&self) -> PathBuf {
        self.data_dir.join(store_file::PRICES_DIR)
    }

    fn price_file(&self, ticker: &str) -> PathBuf {
        self.prices_dir().join(format!("{}.csv", ticker))
    }

    fn read_json_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Parse(format!("{}: {}", file, e)))
    }

    fn write_json_atomic<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.data_dir.join(file);
        let tmp = tmp_path(&path);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn write_series_csv(&self, path: &Path, series: &PriceSeries) -> Result<()> {
        let tmp = tmp_path(path);
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(PRICES_CSV_HEADER)?;
            for point in series.points() {
                writer.write_record(&[
                    point.time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    point.price.to_string(),
                ])?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Delete price CSVs for tickers no longer in the snapshot, plus any
    /// `.tmp` leftovers from an interrupted save.
    fn sweep_prices_dir(&self, series: &SeriesMap) -> Result<()> {
        for entry in fs::read_dir(self.prices_dir())? {
            let path = entry?.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("tmp") => {
                    debug!(file = %path.display(), "removing interrupted write leftover");
                    fs::remove_file(&path)?;
                }
                Some("csv") => {
                    let ticker = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default();
                    if !series.contains_key(ticker) {
                        debug!(file = %path.display(), "removing stale price file");
                        fs::remove_file(&path)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Persistence for FileBackend {
    fn load(&self) -> Result<StoreSnapshot> {
        if !self.data_dir.exists() {
            debug!(dir = %self.data_dir.display(), "no data directory, starting empty");
            return Ok(StoreSnapshot::empty());
        }

        let tickers: Vec<String> = self.read_json_or_default(store_file::TICKERS)?;
        let bundles: BundleMap = self.read_json_or_default(store_file::BUNDLES)?;
        let coverage: BTreeMap<String, Coverage> =
            self.read_json_or_default(store_file::COVERAGE)?;

        let mut series_map = SeriesMap::new();
        for ticker in tickers {
            let ticker = normalize_ticker(&ticker);
            let mut series = PriceSeries::new();
            let path = self.price_file(&ticker);
            if path.exists() {
                series.merge(read_series_csv(&path)?);
            }
            if let Some(covered) = coverage.get(&ticker) {
                for range in covered.ranges() {
                    series.mark_covered(*range);
                }
            }
            series_map.insert(ticker, series);
        }

        info!(
            currencies = series_map.len(),
            bundles = bundles.len(),
            dir = %self.data_dir.display(),
            "snapshot loaded"
        );
        Ok(StoreSnapshot {
            series: series_map,
            bundles,
        })
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        fs::create_dir_all(self.prices_dir())?;

        let tickers: Vec<&String> = snapshot.series.keys().collect();
        self.write_json_atomic(store_file::TICKERS, &tickers)?;
        self.write_json_atomic(store_file::BUNDLES, &snapshot.bundles)?;

        let coverage: BTreeMap<&String, &Coverage> = snapshot
            .series
            .iter()
            .map(|(ticker, series)| (ticker, series.coverage()))
            .collect();
        self.write_json_atomic(store_file::COVERAGE, &coverage)?;

        for (ticker, series) in &snapshot.series {
            self.write_series_csv(&self.price_file(ticker), series)?;
        }
        self.sweep_prices_dir(&snapshot.series)?;

        info!(
            currencies = snapshot.series.len(),
            bundles = snapshot.bundles.len(),
            dir = %self.data_dir.display(),
            "snapshot saved"
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(store_file::TMP_SUFFIX);
    PathBuf::from(tmp)
}

fn read_series_csv(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let time_field = record
            .get(0)
            .ok_or_else(|| StoreError::Parse("price row missing time column".to_string()))?;
        let price_field = record
            .get(1)
            .ok_or_else(|| StoreError::Parse("price row missing price column".to_string()))?;

        let time = DateTime::parse_from_rfc3339(time_field)
            .map_err(|e| StoreError::Parse(format!("bad timestamp {:?}: {}", time_field, e)))?
            .with_timezone(&Utc);
        let price: Decimal = price_field
            .trim()
            .parse()
            .map_err(|e| StoreError::Parse(format!("bad price {:?}: {}", price_field, e)))?;
        points.push(PricePoint::new(time, price));
    }
    Ok(points)
}
