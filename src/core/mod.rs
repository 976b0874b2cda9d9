pub mod calculator;
pub mod ingest;
pub mod log;
pub mod logic;
