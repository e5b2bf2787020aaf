use std::sync::LazyLock;

use error_stack::Report;
use scraper::{ElementRef, Html, Selector};
use strum::{EnumCount, IntoEnumIterator};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::domain::crypto::{parse_rank, CryptoRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    #[error("Invalid table selector")]
    InvalidSelector,
}

/// Fields read from a table row, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::EnumCount, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Rank,
    Name,
    Price,
    OneHourChange,
    TwentyFourHourChange,
    SevenDayChange,
    MarketCap,
    Volume24h,
    CirculatingSupply,
}

/// Cell offset of every field, indexed by `Field`. The first cell holds the watchlist
/// star and is ignored.
pub const COLUMN_LAYOUT: [(Field, usize); Field::COUNT] = [
    (Field::Rank, 1),
    (Field::Name, 2),
    (Field::Price, 3),
    (Field::OneHourChange, 4),
    (Field::TwentyFourHourChange, 5),
    (Field::SevenDayChange, 6),
    (Field::MarketCap, 7),
    (Field::Volume24h, 8),
    (Field::CirculatingSupply, 9),
];

/// Rows with fewer cells than this are not data rows.
pub const MIN_CELLS: usize = 10;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("'tr' is a valid selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("'td' is a valid selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SkipReason {
    TooFewCells(usize),
    MissingName,
    MissingPrice,
}

/// Result of one extraction: the records in page order plus how many rows were dropped.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<CryptoRecord>,
    pub skipped: usize,
    pub table_found: bool,
}

#[derive(Debug, Clone)]
pub struct TableExtractor {
    table_selector: Selector,
}

impl TableExtractor {
    pub fn new(table_selector: &str) -> error_stack::Result<Self, ExtractorError> {
        let table_selector = Selector::parse(table_selector).map_err(|error| {
            Report::new(ExtractorError::InvalidSelector)
                .attach_printable(format!("'{}': {}", table_selector, error))
        })?;
        Ok(Self { table_selector })
    }

    /// Extracts every data row of the first matching table. A missing table gives an
    /// empty extraction; malformed rows are skipped and counted.
    #[instrument(skip_all)]
    pub fn extract(&self, document: &str) -> Extraction {
        let html = Html::parse_document(document);

        let Some(table) = html.select(&self.table_selector).next() else {
            tracing::error!("Could not find the cryptocurrency table");
            return Extraction::default();
        };

        let mut extraction = Extraction {
            table_found: true,
            ..Extraction::default()
        };

        // The first row is the header.
        for (index, row) in table.select(&ROW_SELECTOR).enumerate().skip(1) {
            match parse_row(row) {
                Ok(record) => extraction.records.push(record),
                Err(reason) => {
                    warn!(row = index, %reason, "Skipping malformed row");
                    extraction.skipped += 1;
                }
            }
        }

        tracing::info!(
            records = extraction.records.len(),
            skipped = extraction.skipped,
            "Extracted cryptocurrency rows"
        );
        extraction
    }
}

fn parse_row(row: ElementRef<'_>) -> Result<CryptoRecord, SkipReason> {
    let cells = row
        .select(&CELL_SELECTOR)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect::<Vec<_>>();

    if cells.len() < MIN_CELLS {
        return Err(SkipReason::TooFewCells(cells.len()));
    }

    let mut values: [String; Field::COUNT] = Default::default();
    for field in Field::iter() {
        let offset = column_offset(field);
        values[field as usize] = cells
            .get(offset)
            .cloned()
            .ok_or(SkipReason::TooFewCells(cells.len()))?;
    }
    let [rank, name, price, one_hour_change, twenty_four_hour_change, seven_day_change, market_cap, volume_24h, circulating_supply] =
        values;

    if name.is_empty() {
        return Err(SkipReason::MissingName);
    }
    if price.is_empty() {
        return Err(SkipReason::MissingPrice);
    }

    Ok(CryptoRecord {
        rank: parse_rank(&rank),
        name,
        price,
        one_hour_change,
        twenty_four_hour_change,
        seven_day_change,
        market_cap,
        volume_24h,
        circulating_supply,
    })
}

fn column_offset(field: Field) -> usize {
    COLUMN_LAYOUT[field as usize].1
}
