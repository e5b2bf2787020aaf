pub mod crypto;
pub mod page;
pub mod routine;
pub mod snapshot_repository;
