use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Text layout used for every persisted timestamp. Fixed width, so lexical order in
/// the store is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One row of the ranked market table as it was rendered.
///
/// Every market value is kept as the page formatted it (currency and percentage
/// symbols included); nothing is parsed into numbers at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CryptoRecord {
    pub rank: Option<u32>,
    pub name: String,
    pub price: String,
    pub one_hour_change: String,
    pub twenty_four_hour_change: String,
    pub seven_day_change: String,
    pub market_cap: String,
    pub volume_24h: String,
    pub circulating_supply: String,
}

/// Rank text is only a rank when it is made purely of ASCII digits ("—", "12a" and the
/// empty string are not).
pub fn parse_rank(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// All records of one scrape, sharing a single timestamp. Never empty.
#[derive(Debug, Clone)]
pub struct Batch {
    records: Vec<CryptoRecord>,
    scraped_at: DateTime<Utc>,
}

impl Batch {
    /// Returns `None` for an empty record list: an empty scrape is not a batch.
    pub fn new(records: Vec<CryptoRecord>, scraped_at: DateTime<Utc>) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        Some(Self {
            records,
            scraped_at,
        })
    }

    pub fn records(&self) -> &[CryptoRecord] {
        &self.records
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record as it lives in the store: identity key plus the scrape timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSnapshot {
    pub id: i64,
    pub rank: Option<u32>,
    pub name: String,
    pub price: String,
    #[serde(rename = "1h_change")]
    pub one_hour_change: String,
    #[serde(rename = "24h_change")]
    pub twenty_four_hour_change: String,
    #[serde(rename = "7d_change")]
    pub seven_day_change: String,
    pub market_cap: String,
    pub volume_24h: String,
    pub circulating_supply: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub scraped_at: DateTime<Utc>,
}

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_timestamp(*value))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryStatistics {
    pub total_records: i64,
    pub unique_cryptos: i64,
    pub total_scrape_days: i64,
    pub first_scrape: Option<DateTime<Utc>>,
    pub last_scrape: Option<DateTime<Utc>>,
}

/// Gainers and losers of the most recent scrape, ordered by the size of the move.
#[derive(Debug, Clone, Default)]
pub struct TopMovers {
    pub gainers: Vec<StoredSnapshot>,
    pub losers: Vec<StoredSnapshot>,
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str) -> CryptoRecord {
        CryptoRecord {
            rank: Some(1),
            name: name.to_string(),
            price: "$1.00".to_string(),
            one_hour_change: "0.01%".to_string(),
            twenty_four_hour_change: "0.02%".to_string(),
            seven_day_change: "0.03%".to_string(),
            market_cap: "$1B".to_string(),
            volume_24h: "$2M".to_string(),
            circulating_supply: "1B USDT".to_string(),
        }
    }

    #[test]
    fn test_parse_rank_numeric() {
        assert_eq!(parse_rank("42"), Some(42));
        assert_eq!(parse_rank(" 7 "), Some(7));
    }

    #[test]
    fn test_parse_rank_non_numeric() {
        assert_eq!(parse_rank("—"), None);
        assert_eq!(parse_rank(""), None);
        assert_eq!(parse_rank("-1"), None);
        assert_eq!(parse_rank("1.5"), None);
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert!(Batch::new(vec![], Utc::now()).is_none());
    }

    #[test]
    fn test_batch_keeps_order_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let batch = Batch::new(vec![record("Bitcoin"), record("Tether")], at).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[1].name, "Tether");
        assert_eq!(batch.scraped_at(), at);
    }

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
        assert_eq!(parse_timestamp(&format_timestamp(late)), Some(late));
    }

    #[test]
    fn test_parse_timestamp_without_millis() {
        let parsed = parse_timestamp("2024-05-06 07:08:09").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap());
    }
}
