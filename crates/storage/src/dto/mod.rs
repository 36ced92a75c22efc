pub mod ingest;
pub mod rating;
