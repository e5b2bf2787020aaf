pub mod csv_export;
pub mod export;
pub mod sqlite_snapshot_repository;
pub mod xlsx_export;
