use crate::error::{LoadError, Result};
use crate::types::*;
use calamine::{open_workbook_auto, Data, ExcelDateTime, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// One spreadsheet cell before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Unparsable and non-finite values are absent, never zero.
    fn coordinate(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => Cell::Text(format_datetime(dt)),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Date-formatted cells read as clock times (`09:00:00`), durations
/// (`1:30:00`) or full timestamps, never as the raw serial number.
fn format_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            let secs = duration.num_seconds();
            let sign = if secs < 0 { "-" } else { "" };
            let secs = secs.abs();
            return format!("{}{}:{:02}:{:02}", sign, secs / 3600, secs % 3600 / 60, secs % 60);
        }
    }
    match dt.as_datetime() {
        Some(datetime) if dt.as_f64() < 1.0 => datetime.format("%H:%M:%S").to_string(),
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

/// Header row plus data rows, as read from the source.
#[derive(Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn load_points(path: &Path, sheet: Option<&str>) -> Result<Table> {
    info!("Loading points from {:?}", path);

    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path, sheet)?,
        "" => return Err(LoadError::UnsupportedFormat(format!("{:?} has no extension", path))),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let points = normalize(raw);
    info!("Loaded {} points", points.len());
    Ok(points)
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    // non-UTF-8 bytes (Latin-1 exports) become U+FFFD
    let headers = rdr.byte_headers()?.iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        rows.push(record.iter().map(|v| {
            if v.is_empty() { Cell::Empty } else { Cell::Text(String::from_utf8_lossy(v).into_owned()) }
        }).collect());
    }

    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    if !path.exists() {
        return Err(LoadError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(LoadError::MissingSheet(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook.worksheet_range_at(0)
            .ok_or_else(|| LoadError::NoWorksheet(path.to_path_buf()))??,
    };

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows.map(|row| row.iter().map(Cell::from).collect()).collect();

    Ok(RawTable { headers, rows })
}

static EMPTY_CELL: Cell = Cell::Empty;

fn lookup<'a>(index: &HashMap<&str, usize>, row: &'a [Cell], column: &str) -> &'a Cell {
    index.get(column).and_then(|&i| row.get(i)).unwrap_or(&EMPTY_CELL)
}

/// Trim header names, synthesize missing columns, coerce coordinates.
pub fn normalize(raw: RawTable) -> Table {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, header) in raw.headers.iter().enumerate() {
        index.entry(header.trim()).or_insert(i);
    }

    for column in REQUIRED_COLUMNS {
        if !index.contains_key(column) {
            debug!("Column '{}' missing, filling with empty values", column);
        }
    }

    raw.rows.iter().map(|row| {
        let cell = |column: &str| lookup(&index, row, column);
        Point {
            name: cell(COL_NAME).text(),
            address: cell(COL_ADDRESS).text(),
            materials: cell(COL_MATERIALS).text(),
            hours: cell(COL_HOURS).text(),
            latitude: cell(COL_LATITUDE).coordinate(),
            longitude: cell(COL_LONGITUDE).coordinate(),
            municipality: cell(COL_MUNICIPALITY).text(),
            kind: cell(COL_KIND).text(),
        }
    }).collect()
}
