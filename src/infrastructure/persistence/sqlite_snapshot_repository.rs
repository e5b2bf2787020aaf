use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use regex::Regex;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, QueryBuilder, Row, Sqlite};
use tracing::{event, instrument, Level};

use crate::domain::crypto::{
    format_timestamp, parse_timestamp, CryptoRecord, StoredSnapshot, SummaryStatistics,
    TopMovers,
};
use crate::domain::snapshot_repository::{PersistenceError, SnapshotRepository};

pub const TABLE_NAME: &str = "crypto_currency";

/// SQLite caps bound parameters per statement; ten per row keeps a chunk well below it.
const INSERT_CHUNK_ROWS: usize = 500;

const SCHEMA_STATEMENTS: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS crypto_currency (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rank INTEGER,
        name TEXT NOT NULL,
        price TEXT NOT NULL,
        one_hour_change TEXT,
        twenty_four_hour_change TEXT,
        seven_day_change TEXT,
        market_cap TEXT,
        volume_24h TEXT,
        circulating_supply TEXT,
        scraped_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_crypto_currency_name ON crypto_currency(name);",
    "CREATE INDEX IF NOT EXISTS idx_crypto_currency_rank ON crypto_currency(rank);",
    "CREATE INDEX IF NOT EXISTS idx_crypto_currency_scraped_at ON crypto_currency(scraped_at);",
];

const SNAPSHOT_COLUMNS: &str = "id, rank, name, price, one_hour_change, twenty_four_hour_change, \
     seven_day_change, market_cap, volume_24h, circulating_supply, scraped_at";

static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").expect("valid percentage regex"));

/// Snapshot store on SQLite.
///
/// Holds connection options only: every operation opens its own connection and closes
/// it before returning. On early return the connection is dropped, which closes it, and
/// any open transaction is rolled back.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotRepository {
    options: SqliteConnectOptions,
}

impl SqliteSnapshotRepository {
    pub fn new(database_url: &str) -> error_stack::Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .change_context(PersistenceError::FailedToConnect)
            .attach_printable_lazy(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);
        Ok(Self { options })
    }

    async fn connect(&self) -> error_stack::Result<SqliteConnection, PersistenceError> {
        self.options
            .connect()
            .await
            .change_context(PersistenceError::FailedToConnect)
    }

    async fn close(connection: SqliteConnection) {
        if let Err(error) = connection.close().await {
            tracing::warn!("Failed to close database connection: {}", error);
        }
    }

    async fn create_schema(
        connection: &mut SqliteConnection,
    ) -> error_stack::Result<(), PersistenceError> {
        let mut tx = connection
            .begin()
            .await
            .change_context(PersistenceError::SchemaCreationFailed)?;
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .change_context(PersistenceError::SchemaCreationFailed)?;
        }
        tx.commit()
            .await
            .change_context(PersistenceError::SchemaCreationFailed)
    }

    async fn insert_records(
        connection: &mut SqliteConnection,
        records: &[CryptoRecord],
        scraped_at: &str,
    ) -> error_stack::Result<u64, PersistenceError> {
        let mut tx = connection
            .begin()
            .await
            .change_context(PersistenceError::InsertFailed)?;

        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO crypto_currency (rank, name, price, one_hour_change, \
                 twenty_four_hour_change, seven_day_change, market_cap, volume_24h, \
                 circulating_supply, scraped_at) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.rank.map(i64::from))
                    .push_bind(record.name.clone())
                    .push_bind(record.price.clone())
                    .push_bind(record.one_hour_change.clone())
                    .push_bind(record.twenty_four_hour_change.clone())
                    .push_bind(record.seven_day_change.clone())
                    .push_bind(record.market_cap.clone())
                    .push_bind(record.volume_24h.clone())
                    .push_bind(record.circulating_supply.clone())
                    .push_bind(scraped_at.to_string());
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .change_context(PersistenceError::InsertFailed)
                .attach_printable_lazy(|| {
                    format!("Chunk of {} rows after {} inserted", chunk.len(), inserted)
                })?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .change_context(PersistenceError::InsertFailed)?;
        Ok(inserted)
    }

    async fn delete_before(
        connection: &mut SqliteConnection,
        cutoff: &str,
    ) -> error_stack::Result<u64, PersistenceError> {
        let mut tx = connection
            .begin()
            .await
            .change_context(PersistenceError::PruneFailed)?;
        let result = sqlx::query("DELETE FROM crypto_currency WHERE scraped_at < ?")
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .change_context(PersistenceError::PruneFailed)?;
        tx.commit()
            .await
            .change_context(PersistenceError::PruneFailed)?;
        Ok(result.rows_affected())
    }

    /// Runs a read-only snapshot query, binding `parameter` when given.
    async fn fetch_snapshots(
        &self,
        query: &str,
        parameter: Option<&str>,
    ) -> error_stack::Result<Vec<StoredSnapshot>, PersistenceError> {
        let mut connection = self.connect().await?;
        let mut statement = sqlx::query(query);
        if let Some(parameter) = parameter {
            statement = statement.bind(parameter);
        }
        let rows = statement
            .fetch_all(&mut connection)
            .await
            .change_context(PersistenceError::ReadFailed)
            .attach_printable_lazy(|| query.to_string())?;
        Self::close(connection).await;

        rows.iter()
            .map(snapshot_from_row)
            .collect::<Result<Vec<_>, _>>()
            .change_context(PersistenceError::ReadFailed)
    }

    async fn fetch_statistics(&self) -> error_stack::Result<SummaryStatistics, PersistenceError> {
        let mut connection = self.connect().await?;
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_records,
                COUNT(DISTINCT name) AS unique_cryptos,
                COUNT(DISTINCT date(scraped_at)) AS total_scrape_days,
                MIN(scraped_at) AS first_scrape,
                MAX(scraped_at) AS last_scrape
            FROM crypto_currency
            "#,
        )
        .fetch_one(&mut connection)
        .await
        .change_context(PersistenceError::ReadFailed)?;
        Self::close(connection).await;

        statistics_from_row(&row).change_context(PersistenceError::ReadFailed)
    }
}

fn snapshot_from_row(row: &SqliteRow) -> Result<StoredSnapshot, sqlx::Error> {
    let text = |column: &str| -> Result<String, sqlx::Error> {
        Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
    };
    let scraped_at: String = row.try_get("scraped_at")?;

    Ok(StoredSnapshot {
        id: row.try_get("id")?,
        rank: row
            .try_get::<Option<i64>, _>("rank")?
            .and_then(|rank| u32::try_from(rank).ok()),
        name: text("name")?,
        price: text("price")?,
        one_hour_change: text("one_hour_change")?,
        twenty_four_hour_change: text("twenty_four_hour_change")?,
        seven_day_change: text("seven_day_change")?,
        market_cap: text("market_cap")?,
        volume_24h: text("volume_24h")?,
        circulating_supply: text("circulating_supply")?,
        scraped_at: parse_timestamp(&scraped_at).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "scraped_at".to_string(),
            source: format!("unrecognised timestamp '{}'", scraped_at).into(),
        })?,
    })
}

fn statistics_from_row(row: &SqliteRow) -> Result<SummaryStatistics, sqlx::Error> {
    let first_scrape: Option<String> = row.try_get("first_scrape")?;
    let last_scrape: Option<String> = row.try_get("last_scrape")?;
    Ok(SummaryStatistics {
        total_records: row.try_get("total_records")?,
        unique_cryptos: row.try_get("unique_cryptos")?,
        total_scrape_days: row.try_get("total_scrape_days")?,
        first_scrape: first_scrape.as_deref().and_then(parse_timestamp),
        last_scrape: last_scrape.as_deref().and_then(parse_timestamp),
    })
}

/// Signed percentage in a formatted change cell, e.g. "-1,234.5%" → -1234.5.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    PERCENTAGE
        .find(&cleaned)
        .and_then(|found| found.as_str().parse().ok())
}

fn split_movers(snapshots: Vec<StoredSnapshot>, limit: usize) -> TopMovers {
    let mut gainers = Vec::new();
    let mut losers = Vec::new();
    for snapshot in snapshots {
        match parse_percentage(&snapshot.twenty_four_hour_change) {
            Some(change) if change < 0.0 => losers.push((change, snapshot)),
            Some(change) => gainers.push((change, snapshot)),
            None => {}
        }
    }
    gainers.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    losers.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    TopMovers {
        gainers: gainers.into_iter().take(limit).map(|(_, s)| s).collect(),
        losers: losers.into_iter().take(limit).map(|(_, s)| s).collect(),
    }
}

#[async_trait::async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> error_stack::Result<(), PersistenceError> {
        let mut connection = self.connect().await?;
        Self::create_schema(&mut connection).await?;
        Self::close(connection).await;

        event!(Level::DEBUG, table = TABLE_NAME, "Schema ready");
        Ok(())
    }

    #[instrument(skip(self, records), fields(rows = records.len()))]
    async fn insert_batch(
        &self,
        records: &[CryptoRecord],
        scraped_at: DateTime<Utc>,
    ) -> error_stack::Result<u64, PersistenceError> {
        if records.is_empty() {
            return Err(Report::new(PersistenceError::EmptyBatch));
        }
        let stamp = format_timestamp(scraped_at);

        let mut connection = self.connect().await?;
        let inserted = Self::insert_records(&mut connection, records, &stamp).await?;
        Self::close(connection).await;

        tracing::info!(inserted, scraped_at = %stamp, "💾 Batch committed");
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn prune_older_than(
        &self,
        retention_days: u32,
    ) -> error_stack::Result<u64, PersistenceError> {
        let Some(cutoff) = chrono::Duration::try_days(retention_days.into())
            .and_then(|retention| Utc::now().checked_sub_signed(retention))
            .map(format_timestamp)
        else {
            tracing::info!(retention_days, "Retention reaches past the calendar, nothing to prune");
            return Ok(0);
        };

        let mut connection = self.connect().await?;
        let deleted = Self::delete_before(&mut connection, &cutoff).await?;
        Self::close(connection).await;

        tracing::info!(deleted, cutoff = %cutoff, "Pruned old snapshots");
        Ok(deleted)
    }

    async fn read_latest(&self, limit: u32) -> Vec<StoredSnapshot> {
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM crypto_currency \
             ORDER BY scraped_at DESC, rank IS NULL, rank, id LIMIT {limit}"
        );
        self.fetch_snapshots(&query, None)
            .await
            .unwrap_or_else(|report| {
                tracing::error!("Failed to read latest snapshots: {:?}", report);
                Vec::new()
            })
    }

    async fn summary_statistics(&self) -> SummaryStatistics {
        self.fetch_statistics().await.unwrap_or_else(|report| {
            tracing::error!("Failed to compute statistics: {:?}", report);
            SummaryStatistics::default()
        })
    }

    async fn search_by_name(&self, fragment: &str) -> Vec<StoredSnapshot> {
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM crypto_currency \
             WHERE instr(lower(name), lower(?)) > 0 \
             ORDER BY scraped_at DESC, rank IS NULL, rank, id"
        );
        self.fetch_snapshots(&query, Some(fragment))
            .await
            .unwrap_or_else(|report| {
                tracing::error!("Failed to search snapshots for '{}': {:?}", fragment, report);
                Vec::new()
            })
    }

    async fn top_movers(&self, limit: u32) -> TopMovers {
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM crypto_currency \
             WHERE scraped_at = (SELECT MAX(scraped_at) FROM crypto_currency) \
             ORDER BY rank IS NULL, rank, id"
        );
        match self.fetch_snapshots(&query, None).await {
            Ok(latest) => split_movers(latest, limit as usize),
            Err(report) => {
                tracing::error!("Failed to compute top movers: {:?}", report);
                TopMovers::default()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;

    /// Throw-away database file, removed on drop.
    pub(crate) struct TempDatabase {
        pub path: PathBuf,
    }

    impl TempDatabase {
        pub fn new() -> Self {
            let path = std::env::temp_dir().join(format!(
                "crypto-market-scraper-{}.db",
                rand::random::<u64>()
            ));
            Self { path }
        }

        pub fn url(&self) -> String {
            format!("sqlite://{}", self.path.display())
        }

        pub fn repository(&self) -> SqliteSnapshotRepository {
            SqliteSnapshotRepository::new(&self.url()).unwrap()
        }
    }

    impl Drop for TempDatabase {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm", "-journal"] {
                let mut path = self.path.clone().into_os_string();
                path.push(suffix);
                std::fs::remove_file(path).ok();
            }
        }
    }

    pub(crate) fn record(rank: Option<u32>, name: &str, change_24h: &str) -> CryptoRecord {
        CryptoRecord {
            rank,
            name: name.to_string(),
            price: "$1.00".to_string(),
            one_hour_change: "0.10%".to_string(),
            twenty_four_hour_change: change_24h.to_string(),
            seven_day_change: "1.00%".to_string(),
            market_cap: "$1,000,000".to_string(),
            volume_24h: "$10,000".to_string(),
            circulating_supply: "1,000,000 XYZ".to_string(),
        }
    }

    async fn count_schema_objects(repository: &SqliteSnapshotRepository, kind: &str) -> i64 {
        let mut connection = repository.connect().await.unwrap();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND tbl_name = 'crypto_currency' \
             AND name NOT LIKE 'sqlite_%'",
        )
        .bind(kind)
        .fetch_one(&mut connection)
        .await
        .unwrap();
        count
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = TempDatabase::new();
        let repository = db.repository();

        repository.ensure_schema().await.unwrap();
        repository.ensure_schema().await.unwrap();

        assert_eq!(count_schema_objects(&repository, "table").await, 1);
        assert_eq!(count_schema_objects(&repository, "index").await, 3);
    }

    #[tokio::test]
    async fn test_insert_batch_shares_timestamp_and_keeps_null_rank() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();

        let inserted = repository
            .insert_batch(
                &[
                    record(Some(1), "Bitcoin", "1.5%"),
                    record(None, "Mystery", "0.2%"),
                ],
                at,
            )
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        let latest = repository.read_latest(10).await;
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|s| s.scraped_at == at));
        assert_eq!(latest[0].name, "Bitcoin");
        assert_eq!(latest[1].rank, None);
    }

    async fn fail_inserts_named_poison(repository: &SqliteSnapshotRepository) {
        let mut connection = repository.connect().await.unwrap();
        sqlx::query(
            "CREATE TRIGGER fail_on_poison BEFORE INSERT ON crypto_currency \
             WHEN NEW.name = 'Poison' BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .execute(&mut connection)
        .await
        .unwrap();
        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_batch_is_all_or_nothing() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        repository
            .insert_batch(&[record(Some(1), "Bitcoin", "1%")], Utc::now())
            .await
            .unwrap();

        fail_inserts_named_poison(&repository).await;

        let report = repository
            .insert_batch(
                &[
                    record(Some(1), "Bitcoin", "1%"),
                    record(Some(2), "Ethereum", "2%"),
                    record(Some(3), "Poison", "3%"),
                ],
                Utc::now(),
            )
            .await
            .unwrap_err();

        assert_eq!(report.current_context(), &PersistenceError::InsertFailed);
        assert_eq!(repository.summary_statistics().await.total_records, 1);
    }

    #[tokio::test]
    async fn test_failure_in_a_later_chunk_rolls_back_earlier_chunks() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        repository
            .insert_batch(&[record(Some(1), "Bitcoin", "1%")], Utc::now())
            .await
            .unwrap();
        fail_inserts_named_poison(&repository).await;
        let mut records = (1..=INSERT_CHUNK_ROWS as u32 * 2)
            .map(|rank| record(Some(rank), &format!("Coin {rank}"), "0%"))
            .collect::<Vec<_>>();
        records.push(record(None, "Poison", "0%"));

        let report = repository
            .insert_batch(&records, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(report.current_context(), &PersistenceError::InsertFailed);
        assert_eq!(repository.summary_statistics().await.total_records, 1);
    }

    #[tokio::test]
    async fn test_large_batch_spans_several_statements() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let records = (1..=1234)
            .map(|rank| record(Some(rank), &format!("Coin {rank}"), "0%"))
            .collect::<Vec<_>>();

        let inserted = repository.insert_batch(&records, Utc::now()).await.unwrap();

        assert_eq!(inserted, 1234);
        assert_eq!(repository.summary_statistics().await.unique_cryptos, 1234);
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();

        let report = repository.insert_batch(&[], Utc::now()).await.unwrap_err();

        assert_eq!(report.current_context(), &PersistenceError::EmptyBatch);
    }

    #[tokio::test]
    async fn test_prune_removes_only_expired_rows() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let now = Utc::now();
        repository
            .insert_batch(
                &[record(Some(1), "Old", "1%")],
                now - chrono::Duration::days(31),
            )
            .await
            .unwrap();
        repository
            .insert_batch(
                &[record(Some(1), "Recent", "1%")],
                now - chrono::Duration::days(5),
            )
            .await
            .unwrap();

        let deleted = repository.prune_older_than(30).await.unwrap();

        assert_eq!(deleted, 1);
        let remaining = repository.read_latest(10).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Recent");
    }

    #[tokio::test]
    async fn test_prune_with_unbounded_retention_deletes_nothing() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        repository
            .insert_batch(
                &[record(Some(1), "Ancient", "1%")],
                Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        let deleted = repository.prune_older_than(u32::MAX).await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(repository.summary_statistics().await.total_records, 1);
    }

    #[tokio::test]
    async fn test_summary_statistics() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let third = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        for at in [first, second, third] {
            repository
                .insert_batch(
                    &[record(Some(1), "Bitcoin", "1%"), record(Some(2), "Ether", "1%")],
                    at,
                )
                .await
                .unwrap();
        }

        let stats = repository.summary_statistics().await;

        assert_eq!(stats.total_records, 6);
        assert_eq!(stats.unique_cryptos, 2);
        assert_eq!(stats.total_scrape_days, 2);
        assert_eq!(stats.first_scrape, Some(first));
        assert_eq!(stats.last_scrape, Some(third));
    }

    #[tokio::test]
    async fn test_reads_fail_soft_without_schema() {
        let db = TempDatabase::new();
        let repository = db.repository();

        assert_eq!(
            repository.summary_statistics().await,
            SummaryStatistics::default()
        );
        assert!(repository.read_latest(5).await.is_empty());
        assert!(repository.search_by_name("bit").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        repository
            .insert_batch(
                &[
                    record(Some(1), "Bitcoin", "1%"),
                    record(Some(2), "Ethereum", "1%"),
                    record(Some(3), "Bitcoin Cash", "1%"),
                ],
                Utc::now(),
            )
            .await
            .unwrap();

        let found = repository.search_by_name("BITCOIN").await;

        let names = found.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Bitcoin", "Bitcoin Cash"]);
    }

    #[tokio::test]
    async fn test_top_movers_uses_latest_scrape_only() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        repository
            .insert_batch(&[record(Some(1), "Stale", "99.00%")], earlier)
            .await
            .unwrap();
        repository
            .insert_batch(
                &[
                    record(Some(1), "Up", "2.50%"),
                    record(Some(2), "Rocket", "12.00%"),
                    record(Some(3), "Down", "-3.00%"),
                    record(Some(4), "Crash", "-20.10%"),
                    record(Some(5), "Unknown", "--"),
                ],
                later,
            )
            .await
            .unwrap();

        let movers = repository.top_movers(1).await;

        assert_eq!(movers.gainers.len(), 1);
        assert_eq!(movers.gainers[0].name, "Rocket");
        assert_eq!(movers.losers.len(), 1);
        assert_eq!(movers.losers[0].name, "Crash");
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("1.25%"), Some(1.25));
        assert_eq!(parse_percentage("-0.5%"), Some(-0.5));
        assert_eq!(parse_percentage("+1,234.5%"), Some(1234.5));
        assert_eq!(parse_percentage("--"), None);
    }
}
