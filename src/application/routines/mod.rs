pub mod export_routine;
pub mod prune_routine;
pub mod report_routines;
pub mod scrape_routine;
