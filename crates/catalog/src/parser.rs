//! Parsers for catalog files.
//!
//! - `.json`: an array of `Item` objects
//! - anything else: delimited text with a header row, read with `csv`;
//!   the delimiter (`,` or `;`) is taken from the header line
//!
//! Columns are located by name so exports with extra or reordered columns
//! load without a mapping step.

use crate::error::{CatalogError, Result};
use crate::types::{Item, ItemId};
use csv::{ReaderBuilder, StringRecord, Trim};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const ID_COLUMNS: &[&str] = &["id", "itemid", "carid"];
const BRAND_COLUMNS: &[&str] = &["brand", "make", "merk"];
const MODEL_COLUMNS: &[&str] = &["model"];
const POWER_COLUMNS: &[&str] = &["power", "powerkw", "kw", "vermogen"];
const FUEL_COLUMNS: &[&str] = &["fuel", "fueltype", "brandstof"];
const PRICE_COLUMNS: &[&str] = &["price", "budget", "prijs"];
const YEAR_COLUMNS: &[&str] = &["year", "buildyear", "bouwjaar"];
const TRANSMISSION_COLUMNS: &[&str] = &["transmission", "gearbox", "transmissie"];
const BODY_TYPE_COLUMNS: &[&str] = &["bodytype", "body", "carrosserie"];

/// Positions of the known columns within a header row.
#[derive(Debug, Clone)]
struct ColumnMap {
    id: Option<usize>,
    brand: usize,
    model: usize,
    power: usize,
    fuel: usize,
    price: usize,
    year: usize,
    transmission: Option<usize>,
    body_type: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String], file: &str) -> Result<Self> {
        let find = |aliases: &[&str]| {
            header.iter().position(|name| {
                let key: String = name
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                aliases.contains(&key.as_str())
            })
        };
        let require = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| CatalogError::MissingColumn {
                file: file.to_string(),
                column: aliases[0].to_string(),
            })
        };

        Ok(Self {
            id: find(ID_COLUMNS),
            brand: require(BRAND_COLUMNS)?,
            model: require(MODEL_COLUMNS)?,
            power: require(POWER_COLUMNS)?,
            fuel: require(FUEL_COLUMNS)?,
            price: require(PRICE_COLUMNS)?,
            year: require(YEAR_COLUMNS)?,
            transmission: find(TRANSMISSION_COLUMNS),
            body_type: find(BODY_TYPE_COLUMNS),
        })
    }
}

/// Parse a catalog file, choosing the format from the extension
pub fn parse_catalog_file(path: &Path) -> Result<Vec<Item>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    let file = path.display().to_string();

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json(&content)
    } else {
        parse_delimited(&content, &file)
    }
}

/// Parse a JSON array of items
pub fn parse_json(content: &str) -> Result<Vec<Item>> {
    let items: Vec<Item> = serde_json::from_str(content)?;
    Ok(items)
}

/// Parse delimited text with a header row.
///
/// Rows that fail to parse are logged and skipped; a missing required
/// column fails the whole file.
pub fn parse_delimited(content: &str, file: &str) -> Result<Vec<Item>> {
    let Some(header_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return Err(CatalogError::Empty(file.to_string()));
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::from_header(&header, file)?;

    let mut skipped = 0usize;
    let mut rows: Vec<(usize, StringRecord)> = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let line = record.position().map_or(0, |pos| pos.line() as usize);
                rows.push((line, record));
            }
            Err(err) => {
                skipped += 1;
                warn!("Skipping unreadable record in {}: {}", file, err);
            }
        }
    }

    let parsed: Vec<Result<Item>> = rows
        .par_iter()
        .map(|(line, record)| parse_row(record, &columns, *line, file))
        .collect();

    let mut items = Vec::with_capacity(parsed.len());
    for result in parsed {
        match result {
            Ok(item) => items.push(item),
            Err(err) => {
                skipped += 1;
                warn!("Skipping row: {}", err);
            }
        }
    }
    debug!("Parsed {} rows from {} ({} skipped)", items.len(), file, skipped);
    Ok(items)
}

fn detect_delimiter(header: &str) -> u8 {
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

fn parse_row(record: &StringRecord, columns: &ColumnMap, line: usize, file: &str) -> Result<Item> {
    let field = |pos: usize| record.get(pos).unwrap_or("");
    let parse_error = |reason: String| CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason,
    };

    let id: ItemId = match columns.id {
        Some(pos) => field(pos)
            .parse()
            .map_err(|_| parse_error(format!("invalid id '{}'", field(pos))))?,
        None => u32::try_from(line).map_err(|_| parse_error("row index overflow".to_string()))?,
    };

    let brand = field(columns.brand).to_string();
    if brand.is_empty() {
        return Err(parse_error("empty brand".to_string()));
    }

    let price = parse_number(field(columns.price))
        .ok_or_else(|| parse_error(format!("invalid price '{}'", field(columns.price))))?;
    let power = parse_number(field(columns.power))
        .filter(|p| *p >= 0.0)
        .ok_or_else(|| parse_error(format!("invalid power '{}'", field(columns.power))))?;
    let year = field(columns.year)
        .parse::<u16>()
        .map_err(|_| parse_error(format!("invalid year '{}'", field(columns.year))))?;

    Ok(Item {
        id,
        brand,
        model: field(columns.model).to_string(),
        power: power.round() as u32,
        fuel: field(columns.fuel).to_string(),
        price,
        year,
        transmission: columns.transmission.map(field).unwrap_or("").to_string(),
        body_type: columns.body_type.map(field).unwrap_or("").to_string(),
    })
}

/// Accepts "23500", "23500.00", "€ 23500"
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
