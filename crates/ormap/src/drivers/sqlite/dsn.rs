//! SQLite connection strings: a file path or `:memory:`, optionally with a
//! `file:` prefix and `?key=value` options.

use crate::core::uri::{DbType, Uri};
use crate::error::{MapError, Result};

pub fn parse_dsn(conn: &str) -> Result<Uri> {
    let conn = conn.trim();
    let path = conn.strip_prefix("file:").unwrap_or(conn);
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };

    if path.is_empty() {
        return Err(MapError::connection("sqlite", "database path is empty"));
    }

    let mut uri = Uri::new(DbType::Sqlite);
    uri.protocol = "file".to_string();
    uri.database = path.to_string();

    for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        uri.params.insert(key.to_string(), value.to_string());
    }
    Ok(uri)
}
