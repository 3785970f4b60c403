//! Locations repository
//!
//! A location is created the first time a workbook sheet with its name is
//! imported; the sheet name doubles as the initial address.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A coffee-shop location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Location with its report statistics (for listing)
#[derive(Debug, Clone)]
pub struct LocationSummary {
    pub location: Location,
    pub report_count: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

/// Find a location by name
pub async fn find_location(pool: &SqlitePool, name: &str) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, address FROM locations WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to look up location")?;

    match row {
        Some(row) => Ok(Some(Location {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
        })),
        None => Ok(None),
    }
}

/// Find a location by name, creating it when it does not exist yet
pub async fn find_or_create_location(pool: &SqlitePool, name: &str) -> Result<Location> {
    if let Some(location) = find_location(pool, name).await? {
        log::info!("Found location: {} ({})", location.name, location.id);
        return Ok(location);
    }

    let result = sqlx::query("INSERT INTO locations (name, address) VALUES (?, ?)")
        .bind(name)
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create location '{}'", name))?;

    let location = Location {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        address: name.to_string(),
    };
    log::info!("Created location: {} ({})", location.name, location.id);

    Ok(location)
}

/// List all locations with report counts and date span
pub async fn list_locations(pool: &SqlitePool) -> Result<Vec<LocationSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT
            l.id,
            l.name,
            l.address,
            COUNT(r.id) AS report_count,
            MIN(r.date) AS first_date,
            MAX(r.date) AS last_date
        FROM locations l
        LEFT JOIN daily_reports r ON r.location_id = l.id
        GROUP BY l.id
        ORDER BY l.id
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list locations")?;

    let mut locations = Vec::new();
    for row in rows {
        locations.push(LocationSummary {
            location: Location {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                address: row.try_get("address")?,
            },
            report_count: row.try_get("report_count")?,
            first_date: row.try_get("first_date")?,
            last_date: row.try_get("last_date")?,
        });
    }

    Ok(locations)
}
