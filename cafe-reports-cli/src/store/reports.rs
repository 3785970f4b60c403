//! Daily reports repository

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::workbook::ParsedRow;

/// Insert or replace the report for (location, date)
pub async fn upsert_daily_report(
    pool: &SqlitePool,
    location_id: i64,
    batch_id: Option<&str>,
    row: &ParsedRow,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_reports (
            location_id, date,
            sales_plan, sales_fact, discounts, sales_with_discounts, discount_percent,
            yandex_food, sales_deviation, month_sales_plan, month_sales_fact,
            month_sales_deviation, month_sales_deviation_rub,
            orders_plan, orders_fact, orders_deviation,
            loyalty_plan, loyalty_fact, loyalty_penetration, loyalty_deviation,
            avg_check_plan, avg_check_fact, avg_check_deviation,
            fill_rate_plan, fill_rate_fact, avg_dishes, avg_drinks, portions,
            productivity_plan, hours_worked, productivity_fact,
            order_delivery_time, import_batch_id
        ) VALUES (
            ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?, ?,
            ?, ?,
            ?, ?, ?,
            ?, ?, ?, ?,
            ?, ?, ?,
            ?, ?, ?, ?, ?,
            ?, ?, ?,
            ?, ?
        )
        ON CONFLICT(location_id, date) DO UPDATE SET
            sales_plan = excluded.sales_plan,
            sales_fact = excluded.sales_fact,
            discounts = excluded.discounts,
            sales_with_discounts = excluded.sales_with_discounts,
            discount_percent = excluded.discount_percent,
            yandex_food = excluded.yandex_food,
            sales_deviation = excluded.sales_deviation,
            month_sales_plan = excluded.month_sales_plan,
            month_sales_fact = excluded.month_sales_fact,
            month_sales_deviation = excluded.month_sales_deviation,
            month_sales_deviation_rub = excluded.month_sales_deviation_rub,
            orders_plan = excluded.orders_plan,
            orders_fact = excluded.orders_fact,
            orders_deviation = excluded.orders_deviation,
            loyalty_plan = excluded.loyalty_plan,
            loyalty_fact = excluded.loyalty_fact,
            loyalty_penetration = excluded.loyalty_penetration,
            loyalty_deviation = excluded.loyalty_deviation,
            avg_check_plan = excluded.avg_check_plan,
            avg_check_fact = excluded.avg_check_fact,
            avg_check_deviation = excluded.avg_check_deviation,
            fill_rate_plan = excluded.fill_rate_plan,
            fill_rate_fact = excluded.fill_rate_fact,
            avg_dishes = excluded.avg_dishes,
            avg_drinks = excluded.avg_drinks,
            portions = excluded.portions,
            productivity_plan = excluded.productivity_plan,
            hours_worked = excluded.hours_worked,
            productivity_fact = excluded.productivity_fact,
            order_delivery_time = excluded.order_delivery_time,
            import_batch_id = excluded.import_batch_id,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(location_id)
    .bind(row.date)
    .bind(row.sales_plan)
    .bind(row.sales_fact)
    .bind(row.discounts)
    .bind(row.sales_with_discounts)
    .bind(row.discount_percent)
    .bind(row.yandex_food)
    .bind(row.sales_deviation)
    .bind(row.month_sales_plan)
    .bind(row.month_sales_fact)
    .bind(row.month_sales_deviation)
    .bind(row.month_sales_deviation_rub)
    .bind(row.orders_plan)
    .bind(row.orders_fact)
    .bind(row.orders_deviation)
    .bind(row.loyalty_plan)
    .bind(row.loyalty_fact)
    .bind(row.loyalty_penetration)
    .bind(row.loyalty_deviation)
    .bind(row.avg_check_plan)
    .bind(row.avg_check_fact)
    .bind(row.avg_check_deviation)
    .bind(row.fill_rate_plan)
    .bind(row.fill_rate_fact)
    .bind(row.avg_dishes)
    .bind(row.avg_drinks)
    .bind(row.portions)
    .bind(row.productivity_plan)
    .bind(row.hours_worked)
    .bind(row.productivity_fact)
    .bind(row.order_delivery_time)
    .bind(batch_id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to upsert report for {}", row.date))?;

    Ok(())
}

/// Load the stored report for (location, date)
pub async fn get_daily_report(
    pool: &SqlitePool,
    location_id: i64,
    date: NaiveDate,
) -> Result<Option<ParsedRow>> {
    let row = sqlx::query("SELECT * FROM daily_reports WHERE location_id = ? AND date = ?")
        .bind(location_id)
        .bind(date)
        .fetch_optional(pool)
        .await
        .context("Failed to get daily report")?;

    row.as_ref().map(row_to_report).transpose()
}

/// Count stored reports, optionally for a single location
pub async fn count_reports(pool: &SqlitePool, location_id: Option<i64>) -> Result<i64> {
    let count: (i64,) = match location_id {
        Some(id) => {
            sqlx::query_as("SELECT COUNT(*) FROM daily_reports WHERE location_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await
        }
        None => {
            sqlx::query_as("SELECT COUNT(*) FROM daily_reports")
                .fetch_one(pool)
                .await
        }
    }
    .context("Failed to count daily reports")?;

    Ok(count.0)
}

fn row_to_report(row: &SqliteRow) -> Result<ParsedRow> {
    Ok(ParsedRow {
        date: row.try_get("date")?,
        sales_plan: row.try_get("sales_plan")?,
        sales_fact: row.try_get("sales_fact")?,
        discounts: row.try_get("discounts")?,
        sales_with_discounts: row.try_get("sales_with_discounts")?,
        discount_percent: row.try_get("discount_percent")?,
        yandex_food: row.try_get("yandex_food")?,
        sales_deviation: row.try_get("sales_deviation")?,
        month_sales_plan: row.try_get("month_sales_plan")?,
        month_sales_fact: row.try_get("month_sales_fact")?,
        month_sales_deviation: row.try_get("month_sales_deviation")?,
        month_sales_deviation_rub: row.try_get("month_sales_deviation_rub")?,
        orders_plan: row.try_get("orders_plan")?,
        orders_fact: row.try_get("orders_fact")?,
        orders_deviation: row.try_get("orders_deviation")?,
        loyalty_plan: row.try_get("loyalty_plan")?,
        loyalty_fact: row.try_get("loyalty_fact")?,
        loyalty_penetration: row.try_get("loyalty_penetration")?,
        loyalty_deviation: row.try_get("loyalty_deviation")?,
        avg_check_plan: row.try_get("avg_check_plan")?,
        avg_check_fact: row.try_get("avg_check_fact")?,
        avg_check_deviation: row.try_get("avg_check_deviation")?,
        fill_rate_plan: row.try_get("fill_rate_plan")?,
        fill_rate_fact: row.try_get("fill_rate_fact")?,
        avg_dishes: row.try_get("avg_dishes")?,
        avg_drinks: row.try_get("avg_drinks")?,
        portions: row.try_get("portions")?,
        productivity_plan: row.try_get("productivity_plan")?,
        hours_worked: row.try_get("hours_worked")?,
        productivity_fact: row.try_get("productivity_fact")?,
        order_delivery_time: row.try_get("order_delivery_time")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connect_in_memory;
    use crate::store::locations::find_or_create_location;

    fn sample_row(date: NaiveDate, sales_fact: f64) -> ParsedRow {
        ParsedRow {
            date,
            sales_plan: 50000.0,
            sales_fact,
            discounts: 1200.5,
            sales_with_discounts: sales_fact - 1200.5,
            discount_percent: 0.024,
            yandex_food: 3100.0,
            sales_deviation: sales_fact / 50000.0 - 1.0,
            month_sales_plan: 1_500_000.0,
            month_sales_fact: 420_000.0,
            month_sales_deviation: -0.72,
            month_sales_deviation_rub: -1_080_000.0,
            orders_plan: 150.0,
            orders_fact: 143,
            orders_deviation: -0.05,
            loyalty_plan: 40.0,
            loyalty_fact: 38,
            loyalty_penetration: 0.27,
            loyalty_deviation: -0.05,
            avg_check_plan: 333.0,
            avg_check_fact: 349.6,
            avg_check_deviation: 0.05,
            fill_rate_plan: 1.8,
            fill_rate_fact: 1.65,
            avg_dishes: 0.9,
            avg_drinks: 1.1,
            portions: 236.0,
            productivity_plan: 2500.0,
            hours_worked: 22.0,
            productivity_fact: 2272.7,
            order_delivery_time: 191,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let pool = connect_in_memory().await.unwrap();
        let location = find_or_create_location(&pool, "Center").await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        upsert_daily_report(&pool, location.id, None, &sample_row(date, 48000.0))
            .await
            .unwrap();
        upsert_daily_report(&pool, location.id, None, &sample_row(date, 51000.0))
            .await
            .unwrap();

        assert_eq!(count_reports(&pool, Some(location.id)).await.unwrap(), 1);
        let stored = get_daily_report(&pool, location.id, date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, sample_row(date, 51000.0));
    }

    #[tokio::test]
    async fn test_same_date_different_locations() {
        let pool = connect_in_memory().await.unwrap();
        let center = find_or_create_location(&pool, "Center").await.unwrap();
        let north = find_or_create_location(&pool, "North").await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        upsert_daily_report(&pool, center.id, None, &sample_row(date, 1.0))
            .await
            .unwrap();
        upsert_daily_report(&pool, north.id, None, &sample_row(date, 2.0))
            .await
            .unwrap();

        assert_eq!(count_reports(&pool, None).await.unwrap(), 2);
        assert_eq!(count_reports(&pool, Some(north.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_location_is_rejected() {
        let pool = connect_in_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let result = upsert_daily_report(&pool, 999, None, &sample_row(date, 1.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_report() {
        let pool = connect_in_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert!(get_daily_report(&pool, 1, date).await.unwrap().is_none());
    }
}
