pub mod browser;
pub mod coinmarketcap;
pub mod config;
pub mod persistence;
