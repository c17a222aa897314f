// Adapters layer: concrete implementations for external systems (http, sqlite, filesystem, csv).

pub mod csv_import;
pub mod http;
pub mod sqlite;
pub mod storage;
