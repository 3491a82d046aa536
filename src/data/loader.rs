use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use super::model::{Observation, StormDataset, StormTrack};
use crate::layout::projection::normalize_lon;

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

// IBTrACS and JTWC-style exports disagree on header names; match the usual
// suspects case-insensitively.
const LAT_ALIASES: &[&str] = &["lat", "latitude", "lat_deg", "lat_dd"];
const LON_ALIASES: &[&str] = &["lon", "longitude", "lon_deg", "lon_dd"];
const TIME_ALIASES: &[&str] = &["datetime", "iso_time", "time"];
const NAME_ALIASES: &[&str] = &["name"];
const ID_ALIASES: &[&str] = &["id", "sid"];
const WIND_ALIASES: &[&str] = &[
    "wind_knots",
    "wmo_wind",
    "usa_wind",
    "tokyo_wind",
    "cma_wind",
    "hko_wind",
    "bom_wind",
    "reunion_wind",
    "nadi_wind",
    "wellington_wind",
];

/// When more than this fraction of non-missing winds are exactly zero the
/// column is really encoding "no report" and zeros become missing.
const ZERO_WIND_HEURISTIC: f64 = 0.6;

/// Rows at exactly (0, 0) above this fraction of the file are treated as
/// placeholder coordinates and dropped.
const PLACEHOLDER_DROP_FRACTION: f64 = 0.005;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural problems with the input file. Malformed individual rows are
/// never an error, they are skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV has no recognizable {0} column")]
    MissingColumn(&'static str),
    #[error("no valid storm observations found in the CSV")]
    Empty,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a storm dataset from an IBTrACS-like CSV file.
pub fn load_csv(path: &Path, zero_is_nan: bool) -> Result<StormDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_storms(file, zero_is_nan).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// One parsed data row before grouping into storms.
struct RawRow {
    row_no: usize,
    id: Option<String>,
    name: Option<String>,
    time: Option<DateTime<Utc>>,
    lat: f64,
    lon: f64,
    wind: Option<f64>,
}

fn read_storms<R: Read>(reader: R, zero_is_nan: bool) -> Result<StormDataset> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let find = |aliases: &[&str]| -> Option<usize> {
        aliases
            .iter()
            .find_map(|a| headers.iter().position(|h| h == a))
    };

    let lat_idx = find(LAT_ALIASES).ok_or(LoadError::MissingColumn("latitude"))?;
    let lon_idx = find(LON_ALIASES).ok_or(LoadError::MissingColumn("longitude"))?;
    let time_idx = find(TIME_ALIASES);
    let name_idx = find(NAME_ALIASES);
    let id_idx = find(ID_ALIASES);
    // All agency wind columns participate in coalescing.
    let wind_idxs: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| WIND_ALIASES.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut rows: Vec<RawRow> = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping unreadable CSV row {row_no}: {e}");
                skipped += 1;
                continue;
            }
        };

        let lat = parse_f64(record.get(lat_idx));
        let lon = parse_f64(record.get(lon_idx));
        let (Some(lat), Some(lon)) = (lat, lon) else {
            // IBTrACS ships a units row ("degrees_north", "kts", ...) right
            // under the header; it fails the numeric parse like any other
            // malformed row.
            if row_no == 0 {
                log::debug!("skipping non-numeric first row (units row?)");
            }
            skipped += 1;
            continue;
        };

        let wind = wind_idxs
            .iter()
            .filter_map(|&i| parse_f64(record.get(i)))
            .fold(None, |acc: Option<f64>, w| {
                Some(acc.map_or(w, |a| a.max(w)))
            });

        rows.push(RawRow {
            row_no,
            id: non_empty(id_idx.and_then(|i| record.get(i))),
            name: non_empty(name_idx.and_then(|i| record.get(i))),
            time: time_idx
                .and_then(|i| record.get(i))
                .and_then(parse_datetime),
            lat,
            lon: normalize_lon(lon),
            wind,
        });
    }

    if skipped > 0 {
        log::info!("skipped {skipped} malformed rows");
    }

    apply_zero_wind_rule(&mut rows, zero_is_nan);
    drop_placeholder_rows(&mut rows);

    let dataset = group_storms(rows);
    if dataset.is_empty() {
        return Err(LoadError::Empty.into());
    }
    log::info!(
        "loaded {} storms ({} observations)",
        dataset.len(),
        dataset.point_count()
    );
    Ok(dataset)
}

/// Force or auto-detect "wind==0 means no report".
fn apply_zero_wind_rule(rows: &mut [RawRow], zero_is_nan: bool) {
    let non_missing = rows.iter().filter(|r| r.wind.is_some()).count();
    let zeros = rows.iter().filter(|r| r.wind == Some(0.0)).count();
    if zeros == 0 {
        return;
    }
    let convert = if zero_is_nan {
        log::info!("converting {zeros} zero wind values to missing (forced)");
        true
    } else if non_missing > 0 && zeros as f64 / non_missing as f64 > ZERO_WIND_HEURISTIC {
        log::info!("auto-converted {zeros} zero wind values to missing (heuristic)");
        true
    } else {
        false
    };
    if convert {
        for r in rows.iter_mut() {
            if r.wind == Some(0.0) {
                r.wind = None;
            }
        }
    }
}

/// Best-track files sometimes park unknown positions at exactly (0, 0).
fn drop_placeholder_rows(rows: &mut Vec<RawRow>) {
    let total = rows.len();
    let at_origin = rows.iter().filter(|r| r.lat == 0.0 && r.lon == 0.0).count();
    if at_origin == 0 || total == 0 {
        return;
    }
    if at_origin as f64 / total as f64 > PLACEHOLDER_DROP_FRACTION {
        rows.retain(|r| !(r.lat == 0.0 && r.lon == 0.0));
        log::info!("dropped {at_origin} placeholder (0,0) rows");
    } else {
        log::warn!("{at_origin} rows at exactly (0,0) kept in place");
    }
}

/// Group rows into storms by id, preserving first-appearance order. Rows
/// without an id become single-row storms keyed by name and row number.
fn group_storms(rows: Vec<RawRow>) -> StormDataset {
    let mut storms: Vec<StormTrack> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let id = match &row.id {
            Some(id) => id.clone(),
            None => format!("{}_{}", row.name.as_deref().unwrap_or("storm"), row.row_no),
        };
        let slot = *index.entry(id.clone()).or_insert_with(|| {
            let name = row.name.clone().unwrap_or_else(|| id.clone());
            storms.push(StormTrack::new(id, name));
            storms.len() - 1
        });
        storms[slot].points.push(Observation {
            time: row.time,
            lat: row.lat,
            lon: row.lon,
            wind: row.wind,
        });
    }

    StormDataset::from_storms(storms)
}

// ---------------------------------------------------------------------------
// Field parsing helpers
// ---------------------------------------------------------------------------

fn parse_f64(field: Option<&str>) -> Option<f64> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse the datetime formats seen in best-track exports; anything else is
/// treated as missing, like `pandas.to_datetime(errors="coerce")`.
fn parse_datetime(field: &str) -> Option<DateTime<Utc>> {
    let s = field.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn load(csv_text: &str) -> Result<StormDataset> {
        read_storms(csv_text.as_bytes(), false)
    }

    #[test]
    fn detects_ibtracs_aliases_and_groups_by_sid() {
        let ds = load(
            "SID,NAME,ISO_TIME,LAT,LON,WMO_WIND\n\
             2019216N12130,KROSA,2019-08-05 00:00:00,12.0,130.0,35\n\
             2019216N12130,KROSA,2019-08-05 06:00:00,12.5,129.5,40\n\
             2019218N15140,LEKIMA,2019-08-06 00:00:00,15.0,140.0,55\n",
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.storms[0].name, "KROSA");
        assert_eq!(ds.storms[0].points.len(), 2);
        assert_eq!(ds.storms[1].points[0].wind, Some(55.0));
        let (start, end) = ds.time_span.unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2019, 8, 5, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2019, 8, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn units_row_is_skipped() {
        let ds = load(
            "SID,NAME,ISO_TIME,LAT,LON,WMO_WIND\n\
             ,,,degrees_north,degrees_east,kts\n\
             x1,ALPHA,2019-08-05 00:00:00,10.0,130.0,35\n",
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.point_count(), 1);
    }

    #[test]
    fn agency_wind_columns_coalesce_to_max() {
        let ds = load(
            "sid,lat,lon,wmo_wind,usa_wind,tokyo_wind\n\
             a,10.0,130.0,35,45,40\n\
             a,11.0,131.0,,50,\n\
             a,12.0,132.0,,,\n",
        )
        .unwrap();
        let winds: Vec<Option<f64>> = ds.storms[0].points.iter().map(|p| p.wind).collect();
        assert_eq!(winds, vec![Some(45.0), Some(50.0), None]);
    }

    #[test]
    fn zero_is_nan_flag_forces_conversion() {
        let ds = read_storms(
            "sid,lat,lon,wind_knots\na,10.0,130.0,0\na,11.0,131.0,60\n".as_bytes(),
            true,
        )
        .unwrap();
        let winds: Vec<Option<f64>> = ds.storms[0].points.iter().map(|p| p.wind).collect();
        assert_eq!(winds, vec![None, Some(60.0)]);
    }

    #[test]
    fn mostly_zero_wind_column_auto_converts() {
        let ds = load(
            "sid,lat,lon,wind_knots\n\
             a,10.0,130.0,0\n\
             a,11.0,131.0,0\n\
             a,12.0,132.0,0\n\
             a,13.0,133.0,50\n",
        )
        .unwrap();
        let winds: Vec<Option<f64>> = ds.storms[0].points.iter().map(|p| p.wind).collect();
        assert_eq!(winds, vec![None, None, None, Some(50.0)]);
    }

    #[test]
    fn minority_zero_wind_is_kept() {
        let ds = load(
            "sid,lat,lon,wind_knots\n\
             a,10.0,130.0,0\n\
             a,11.0,131.0,50\n\
             a,12.0,132.0,60\n",
        )
        .unwrap();
        assert_eq!(ds.storms[0].points[0].wind, Some(0.0));
    }

    #[test]
    fn longitudes_normalize_into_standard_range() {
        let ds = load(
            "sid,lat,lon\n\
             a,10.0,359.5\n\
             a,11.0,190.0\n\
             a,12.0,-180.0\n\
             a,13.0,180.0\n",
        )
        .unwrap();
        let lons: Vec<f64> = ds.storms[0].points.iter().map(|p| p.lon).collect();
        assert_eq!(lons, vec![-0.5, -170.0, -180.0, -180.0]);
    }

    #[test]
    fn frequent_origin_rows_are_dropped() {
        let ds = load(
            "sid,lat,lon\n\
             a,10.0,130.0\n\
             a,0.0,0.0\n\
             a,11.0,131.0\n",
        )
        .unwrap();
        assert_eq!(ds.point_count(), 2);
        assert!(ds.storms[0].points.iter().all(|p| p.lat != 0.0));
    }

    #[test]
    fn rare_origin_rows_are_kept() {
        let mut text = String::from("sid,lat,lon\n");
        for i in 0..200 {
            text.push_str(&format!("a,{}.0,130.0\n", 10 + i % 5));
        }
        text.push_str("a,0.0,0.0\n");
        let ds = load(&text).unwrap();
        assert_eq!(ds.point_count(), 201);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let ds = load(
            "sid,lat,lon\n\
             a,not-a-number,130.0\n\
             a,11.0,131.0\n",
        )
        .unwrap();
        assert_eq!(ds.point_count(), 1);
    }

    #[test]
    fn rows_without_id_become_single_row_storms() {
        let ds = load("name,lat,lon\nHAIYAN,10.0,130.0\nHAIYAN,11.0,131.0\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.storms[0].id, "HAIYAN_0");
        assert_eq!(ds.storms[1].id, "HAIYAN_1");
    }

    #[test]
    fn missing_position_column_is_an_error() {
        let err = load("sid,name,wind_knots\na,ALPHA,30\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::MissingColumn("latitude"))
        ));
    }

    #[test]
    fn dataset_with_no_valid_rows_is_an_error() {
        let err = load("sid,lat,lon\na,bad,bad\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Empty)
        ));
    }

    #[test]
    fn datetime_formats_coerce_or_go_missing() {
        assert!(parse_datetime("2019-08-05 06:00:00").is_some());
        assert!(parse_datetime("2019-08-05T06:00:00").is_some());
        assert!(parse_datetime("2019-08-05T06:00:00Z").is_some());
        assert!(parse_datetime("2019-08-05").is_some());
        assert!(parse_datetime("soon").is_none());
        assert!(parse_datetime("").is_none());
    }
}
