//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Provides a `FromRow` trait that models implement to define how they are
//! constructed from database rows, plus helper functions for the two common
//! query shapes (optional single row, all rows).

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupt data.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str = "id, email, name, role, active, created_at, updated_at";

pub const ALERT_CONFIG_COLS: &str = "email_enabled, email_recipients, teams_enabled, teams_webhook_url, frequency_critical, frequency_warning, frequency_upcoming, updated_by, updated_at";

pub const CLIENT_COLS: &str = "id, name, email, phone, address, primary_contact, description, system_information_url, created_by, created_at, updated_at";

/// Client columns prefixed for the creator join, plus the creator's name.
pub const CLIENT_WITH_CREATOR_COLS: &str = "c.id, c.name, c.email, c.phone, c.address, c.primary_contact, c.description, c.system_information_url, c.created_by, c.created_at, c.updated_at, u.name";

pub const PRODUCT_COLS: &str =
    "id, name, description, product_type, active, created_at, updated_at";

pub const CLIENT_PRODUCT_COLS: &str =
    "id, client_id, product_id, license_quantity, acquired_at, notes, created_at";

pub const VIGENCIA_COLS: &str = "id, client_product_id, starts_at, expires_at, period, threshold_green, threshold_yellow, threshold_red, status, notifications_enabled, notes, created_by, updated_by, created_at, updated_at";

/// Vigencia columns prefixed for the listing join, followed by client,
/// product and audit-name columns (see `VIGENCIA_DETAIL_FROM`).
pub const VIGENCIA_DETAIL_COLS: &str = "v.id, v.client_product_id, v.starts_at, v.expires_at, v.period, v.threshold_green, v.threshold_yellow, v.threshold_red, v.status, v.notifications_enabled, v.notes, v.created_by, v.updated_by, v.created_at, v.updated_at, c.id, c.name, p.id, p.name, uc.name, uu.name";

/// Shared FROM/JOIN clause for the derived listing view.
pub const VIGENCIA_DETAIL_FROM: &str = "FROM vigencias v \
     INNER JOIN client_products cp ON v.client_product_id = cp.id \
     INNER JOIN clients c ON cp.client_id = c.id \
     INNER JOIN products p ON cp.product_id = p.id \
     LEFT JOIN users uc ON v.created_by = uc.id \
     LEFT JOIN users uu ON v.updated_by = uu.id";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: parse_enum(row, 3, "role")?,
            active: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for AlertConfig {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let recipients: String = row.get(1)?;
        Ok(AlertConfig {
            email_enabled: row.get(0)?,
            email_recipients: serde_json::from_str(&recipients).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    1,
                    "email_recipients".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?,
            teams_enabled: row.get(2)?,
            teams_webhook_url: row.get(3)?,
            frequency_critical: parse_enum(row, 4, "frequency_critical")?,
            frequency_warning: parse_enum(row, 5, "frequency_warning")?,
            frequency_upcoming: parse_enum(row, 6, "frequency_upcoming")?,
            updated_by: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl FromRow for Client {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Client {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            address: row.get(4)?,
            primary_contact: row.get(5)?,
            description: row.get(6)?,
            system_information_url: row.get(7)?,
            created_by: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl FromRow for ClientWithCreator {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ClientWithCreator {
            client: Client::from_row(row)?,
            created_by_name: row.get(11)?,
        })
    }
}

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            product_type: row.get(3)?,
            active: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for ClientProduct {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ClientProduct {
            id: row.get(0)?,
            client_id: row.get(1)?,
            product_id: row.get(2)?,
            license_quantity: row.get(3)?,
            acquired_at: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for ClientProductWithProduct {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ClientProductWithProduct {
            link: ClientProduct::from_row(row)?,
            product_name: row.get(7)?,
            product_description: row.get(8)?,
        })
    }
}

impl FromRow for Vigencia {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Vigencia {
            id: row.get(0)?,
            client_product_id: row.get(1)?,
            starts_at: row.get(2)?,
            expires_at: row.get(3)?,
            period: row.get(4)?,
            threshold_green: row.get(5)?,
            threshold_yellow: row.get(6)?,
            threshold_red: row.get(7)?,
            status: parse_enum(row, 8, "status")?,
            notifications_enabled: row.get(9)?,
            notes: row.get(10)?,
            created_by: row.get(11)?,
            updated_by: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }
}

impl FromRow for VigenciaDetail {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(VigenciaDetail {
            vigencia: Vigencia::from_row(row)?,
            client_id: row.get(15)?,
            client_name: row.get(16)?,
            product_id: row.get(17)?,
            product_name: row.get(18)?,
            created_by_name: row.get(19)?,
            updated_by_name: row.get(20)?,
        })
    }
}
