pub mod content_loader;
pub mod table_extractor;
