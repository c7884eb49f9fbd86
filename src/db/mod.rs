use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub async fn get_db_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cleans a facility list before it is stored: blank names are dropped and
/// duplicates collapse to one row.
pub(crate) fn normalize_facilities(facilities: &[String]) -> Vec<String> {
    let mut names: Vec<String> = facilities
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facilities_are_trimmed_and_deduplicated() {
        let input = vec![
            " wifi".to_string(),
            "pool".to_string(),
            "".to_string(),
            "wifi ".to_string(),
        ];
        assert_eq!(normalize_facilities(&input), vec!["pool", "wifi"]);
    }
}
