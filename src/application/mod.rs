pub mod routines;
pub mod scrape_and_store;
