use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter, types::Value};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;
use crate::semaforo::Thresholds;

use super::from_row::{
    ALERT_CONFIG_COLS, CLIENT_COLS, CLIENT_PRODUCT_COLS, CLIENT_WITH_CREATOR_COLS, FromRow,
    PRODUCT_COLS, USER_COLS, VIGENCIA_COLS, VIGENCIA_DETAIL_COLS, VIGENCIA_DETAIL_FROM, query_all,
    query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Builder for dynamic UPDATE statements with optional fields.
///
/// Partial updates arrive as optional-field structs; this is the single
/// place they are translated into SQL, always parameter-bound.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
    track_updated_at: bool,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
            track_updated_at: false,
        }
    }

    fn with_updated_at(mut self) -> Self {
        self.track_updated_at = true;
        self
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a column to an explicit value (including NULL).
    /// Use this for Option<T> where Some(v) = set to v, None = set to NULL.
    fn set_nullable<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.fields.push((column, v.into())),
            None => self.fields.push((column, Value::Null)),
        }
        self
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Execute the update and return the updated entity using RETURNING.
    /// Returns None if no row matched.
    fn execute_returning<T: FromRow>(
        mut self,
        conn: &Connection,
        returning_cols: &str,
    ) -> Result<Option<T>> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        if self.track_updated_at {
            self.fields.push(("updated_at", now().into()));
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            self.table,
            sets.join(", "),
            returning_cols
        );
        conn.query_row(&sql, params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser, password_hash: &str) -> Result<User> {
    let id = EntityType::User.gen_id();
    let ts = now();
    conn.execute(
        "INSERT INTO users (id, email, name, password_hash, role, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
        params![id, input.email.trim(), input.name, password_hash, input.role.as_str(), ts],
    )?;
    Ok(User {
        id,
        email: input.email.trim().to_string(),
        name: input.name.clone(),
        role: input.role,
        active: true,
        created_at: ts,
        updated_at: ts,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

/// Fetch a user together with their password hash, for login only.
pub fn get_user_auth_by_email(conn: &Connection, email: &str) -> Result<Option<(User, String)>> {
    conn.query_row(
        &format!(
            "SELECT {}, password_hash FROM users WHERE email = ?1",
            USER_COLS
        ),
        params![email],
        |row| Ok((User::from_row(row)?, row.get::<_, String>(7)?)),
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY name", USER_COLS),
        &[],
    )
}

pub fn update_user(
    conn: &Connection,
    id: &str,
    input: &UpdateUser,
    password_hash: Option<String>,
) -> Result<Option<User>> {
    UpdateBuilder::new("users", id)
        .with_updated_at()
        .set_opt("email", input.email.as_ref().map(|e| e.trim().to_string()))
        .set_opt("name", input.name.clone())
        .set_opt("role", input.role.map(|r| r.as_str().to_string()))
        .set_opt("active", input.active)
        .set_opt("password_hash", password_hash)
        .execute_returning(conn, USER_COLS)
}

pub fn delete_user(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

/// Flip the active flag and return the updated user.
pub fn toggle_user_active(conn: &Connection, id: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!(
            "UPDATE users SET active = NOT active, updated_at = ?2 WHERE id = ?1 RETURNING {}",
            USER_COLS
        ),
        params![id, now()],
        User::from_row,
    )
    .optional()
    .map_err(Into::into)
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Sessions ============

pub fn create_session(
    conn: &Connection,
    user_id: &str,
    token_hash: &str,
    ttl_secs: i64,
) -> Result<Session> {
    let id = EntityType::Session.gen_id();
    let ts = now();
    let expires_at = ts + ttl_secs;
    conn.execute(
        "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, user_id, token_hash, ts, expires_at],
    )?;
    Ok(Session {
        id,
        user_id: user_id.to_string(),
        token_hash: token_hash.to_string(),
        created_at: ts,
        expires_at,
    })
}

/// Resolve a (hashed) bearer token to its user, ignoring expired sessions.
pub fn get_session_user(conn: &Connection, token_hash: &str, at: i64) -> Result<Option<User>> {
    query_one(
        conn,
        "SELECT u.id, u.email, u.name, u.role, u.active, u.created_at, u.updated_at
         FROM sessions s
         INNER JOIN users u ON s.user_id = u.id
         WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        &[&token_hash, &at],
    )
}

pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(affected > 0)
}

pub fn purge_expired_sessions(conn: &Connection, at: i64) -> Result<usize> {
    conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![at])
        .map_err(Into::into)
}

// ============ Clients ============

pub fn create_client(
    conn: &Connection,
    input: &CreateClient,
    created_by: Option<&str>,
) -> Result<Client> {
    let id = EntityType::Client.gen_id();
    let ts = now();
    conn.execute(
        "INSERT INTO clients (id, name, email, phone, address, primary_contact, description,
                              system_information_url, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            id,
            input.name,
            input.email,
            input.phone,
            input.address,
            input.primary_contact,
            input.description,
            input.system_information_url,
            created_by,
            ts
        ],
    )?;
    Ok(Client {
        id,
        name: input.name.clone(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        address: input.address.clone(),
        primary_contact: input.primary_contact.clone(),
        description: input.description.clone(),
        system_information_url: input.system_information_url.clone(),
        created_by: created_by.map(String::from),
        created_at: ts,
        updated_at: ts,
    })
}

pub fn get_client_by_id(conn: &Connection, id: &str) -> Result<Option<Client>> {
    query_one(
        conn,
        &format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLS),
        &[&id],
    )
}

/// List clients with optional name/email search, paginated, with creator
/// names joined in. Returns (page, total).
pub fn list_clients_paginated(
    conn: &Connection,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ClientWithCreator>, i64)> {
    let base_from = "FROM clients c LEFT JOIN users u ON c.created_by = u.id";

    let (clients, total) = if let Some(search) = search {
        let pattern = format!("%{}%", search);
        let clients = query_all(
            conn,
            &format!(
                "SELECT {} {} WHERE c.name LIKE ?1 OR c.email LIKE ?1
                 ORDER BY c.name LIMIT ?2 OFFSET ?3",
                CLIENT_WITH_CREATOR_COLS, base_from
            ),
            &[&pattern, &limit, &offset],
        )?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM clients c WHERE c.name LIKE ?1 OR c.email LIKE ?1",
            params![pattern],
            |row| row.get(0),
        )?;
        (clients, total)
    } else {
        let clients = query_all(
            conn,
            &format!(
                "SELECT {} {} ORDER BY c.name LIMIT ?1 OFFSET ?2",
                CLIENT_WITH_CREATOR_COLS, base_from
            ),
            &[&limit, &offset],
        )?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?;
        (clients, total)
    };

    Ok((clients, total))
}

pub fn update_client(
    conn: &Connection,
    id: &str,
    input: &UpdateClient,
) -> Result<Option<Client>> {
    UpdateBuilder::new("clients", id)
        .with_updated_at()
        .set_opt("name", input.name.clone())
        .set_opt("email", input.email.clone())
        .set_opt("phone", input.phone.clone())
        .set_opt("address", input.address.clone())
        .set_opt("primary_contact", input.primary_contact.clone())
        .set_opt("description", input.description.clone())
        .set_opt(
            "system_information_url",
            input.system_information_url.clone(),
        )
        .execute_returning(conn, CLIENT_COLS)
}

pub fn delete_client(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM clients WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

pub fn count_clients(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Products ============

pub fn create_product(conn: &Connection, input: &CreateProduct) -> Result<Product> {
    let id = EntityType::Product.gen_id();
    let ts = now();
    conn.execute(
        "INSERT INTO products (id, name, description, product_type, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
        params![id, input.name, input.description, input.product_type, ts],
    )?;
    Ok(Product {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        product_type: input.product_type.clone(),
        active: true,
        created_at: ts,
        updated_at: ts,
    })
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        &[&id],
    )
}

pub fn get_product_by_name(conn: &Connection, name: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE name = ?1", PRODUCT_COLS),
        &[&name],
    )
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLS),
        &[],
    )
}

pub fn update_product(
    conn: &Connection,
    id: &str,
    input: &UpdateProduct,
) -> Result<Option<Product>> {
    UpdateBuilder::new("products", id)
        .with_updated_at()
        .set_opt("name", input.name.clone())
        .set_opt("description", input.description.clone())
        .set_opt("product_type", input.product_type.clone())
        .set_opt("active", input.active)
        .execute_returning(conn, PRODUCT_COLS)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

pub fn count_links_for_product(conn: &Connection, product_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM client_products WHERE product_id = ?1",
        params![product_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn count_active_products(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM products WHERE active = 1",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Client-product links ============

pub fn create_client_product(
    conn: &Connection,
    client_id: &str,
    input: &CreateClientProduct,
) -> Result<ClientProduct> {
    let id = EntityType::ClientProduct.gen_id();
    let ts = now();
    conn.execute(
        "INSERT INTO client_products (id, client_id, product_id, license_quantity, acquired_at, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            client_id,
            input.product_id,
            input.license_quantity,
            input.acquired_at,
            input.notes,
            ts
        ],
    )?;
    Ok(ClientProduct {
        id,
        client_id: client_id.to_string(),
        product_id: input.product_id.clone(),
        license_quantity: input.license_quantity,
        acquired_at: input.acquired_at,
        notes: input.notes.clone(),
        created_at: ts,
    })
}

pub fn get_link_by_id(conn: &Connection, id: &str) -> Result<Option<ClientProduct>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM client_products WHERE id = ?1",
            CLIENT_PRODUCT_COLS
        ),
        &[&id],
    )
}

pub fn get_link(
    conn: &Connection,
    client_id: &str,
    product_id: &str,
) -> Result<Option<ClientProduct>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM client_products WHERE client_id = ?1 AND product_id = ?2",
            CLIENT_PRODUCT_COLS
        ),
        &[&client_id, &product_id],
    )
}

pub fn list_products_for_client(
    conn: &Connection,
    client_id: &str,
) -> Result<Vec<ClientProductWithProduct>> {
    query_all(
        conn,
        "SELECT cp.id, cp.client_id, cp.product_id, cp.license_quantity, cp.acquired_at,
                cp.notes, cp.created_at, p.name, p.description
         FROM client_products cp
         INNER JOIN products p ON cp.product_id = p.id
         WHERE cp.client_id = ?1
         ORDER BY p.name",
        &[&client_id],
    )
}

pub fn delete_link(conn: &Connection, client_id: &str, product_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM client_products WHERE client_id = ?1 AND product_id = ?2",
        params![client_id, product_id],
    )?;
    Ok(affected > 0)
}

// ============ Vigencias ============

/// Create a validity period. `thresholds` must come from the input's
/// `validate()` so defaults and ordering are already resolved.
pub fn create_vigencia(
    conn: &Connection,
    input: &CreateVigencia,
    thresholds: Thresholds,
    created_by: &str,
) -> Result<Vigencia> {
    let id = EntityType::Vigencia.gen_id();
    let ts = now();
    let status = input.status.unwrap_or(VigenciaStatus::Active);
    let notifications_enabled = input.notifications_enabled.unwrap_or(true);
    conn.execute(
        "INSERT INTO vigencias (id, client_product_id, starts_at, expires_at, period,
                                threshold_green, threshold_yellow, threshold_red, status,
                                notifications_enabled, notes, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
        params![
            id,
            input.client_product_id,
            input.starts_at,
            input.expires_at,
            input.period,
            thresholds.green(),
            thresholds.yellow(),
            thresholds.red(),
            status.as_str(),
            notifications_enabled,
            input.notes,
            created_by,
            ts
        ],
    )?;
    Ok(Vigencia {
        id,
        client_product_id: input.client_product_id.clone(),
        starts_at: input.starts_at,
        expires_at: input.expires_at,
        period: input.period.clone(),
        threshold_green: thresholds.green(),
        threshold_yellow: thresholds.yellow(),
        threshold_red: thresholds.red(),
        status,
        notifications_enabled,
        notes: input.notes.clone(),
        created_by: Some(created_by.to_string()),
        updated_by: None,
        created_at: ts,
        updated_at: ts,
    })
}

pub fn get_vigencia_by_id(conn: &Connection, id: &str) -> Result<Option<Vigencia>> {
    query_one(
        conn,
        &format!("SELECT {} FROM vigencias WHERE id = ?1", VIGENCIA_COLS),
        &[&id],
    )
}

pub fn get_vigencia_detail_by_id(conn: &Connection, id: &str) -> Result<Option<VigenciaDetail>> {
    query_one(
        conn,
        &format!(
            "SELECT {} {} WHERE v.id = ?1",
            VIGENCIA_DETAIL_COLS, VIGENCIA_DETAIL_FROM
        ),
        &[&id],
    )
}

/// Apply a partial update. Handlers must have validated the merged record
/// (dates, thresholds) before calling this.
pub fn update_vigencia(
    conn: &Connection,
    id: &str,
    input: &UpdateVigencia,
    updated_by: &str,
) -> Result<Option<Vigencia>> {
    let mut builder = UpdateBuilder::new("vigencias", id)
        .with_updated_at()
        .set_opt("starts_at", input.starts_at)
        .set_opt("expires_at", input.expires_at)
        .set_opt("threshold_green", input.threshold_green)
        .set_opt("threshold_yellow", input.threshold_yellow)
        .set_opt("threshold_red", input.threshold_red)
        .set_opt("status", input.status.map(|s| s.as_str().to_string()))
        .set_opt("notifications_enabled", input.notifications_enabled);
    if let Some(ref period) = input.period {
        builder = builder.set_nullable("period", period.clone());
    }
    if let Some(ref notes) = input.notes {
        builder = builder.set_nullable("notes", notes.clone());
    }
    if builder.is_empty() {
        return Ok(None);
    }
    builder
        .set("updated_by", updated_by.to_string())
        .execute_returning(conn, VIGENCIA_COLS)
}

pub fn delete_vigencia(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM vigencias WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

/// Filters for the vigencia listing endpoint.
#[derive(Debug, Default)]
pub struct VigenciaFilter {
    pub status: Option<VigenciaStatus>,
    pub client_id: Option<String>,
    pub product_id: Option<String>,
}

/// List vigencias joined with client/product names, filtered and paginated,
/// ordered by expiration ascending (soonest first). Returns (page, total).
///
/// Rows come back unclassified; callers annotate them through the engine so
/// the urgency rule lives in exactly one place.
pub fn list_vigencia_details(
    conn: &Connection,
    filter: &VigenciaFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<VigenciaDetail>, i64)> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut bind: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("v.status = ?");
        bind.push(status.as_str().to_string().into());
    }
    if let Some(ref client_id) = filter.client_id {
        clauses.push("cp.client_id = ?");
        bind.push(client_id.clone().into());
    }
    if let Some(ref product_id) = filter.product_id {
        clauses.push("cp.product_id = ?");
        bind.push(product_id.clone().into());
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {}{}", VIGENCIA_DETAIL_FROM, where_sql),
        params_from_iter(bind.iter()),
        |row| row.get(0),
    )?;

    bind.push(limit.into());
    bind.push(offset.into());
    let sql = format!(
        "SELECT {} {}{} ORDER BY v.expires_at ASC LIMIT ? OFFSET ?",
        VIGENCIA_DETAIL_COLS, VIGENCIA_DETAIL_FROM, where_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bind), VigenciaDetail::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

/// All active vigencias with names joined, for dashboard aggregation.
pub fn list_active_vigencia_details(conn: &Connection) -> Result<Vec<VigenciaDetail>> {
    query_all(
        conn,
        &format!(
            "SELECT {} {} WHERE v.status = 'active' ORDER BY v.expires_at ASC",
            VIGENCIA_DETAIL_COLS, VIGENCIA_DETAIL_FROM
        ),
        &[],
    )
}

pub fn count_active_vigencias(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM vigencias WHERE status = 'active'",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Alert configuration ============

/// Fetch the notification settings. None until someone has saved them.
pub fn get_alert_config(conn: &Connection) -> Result<Option<AlertConfig>> {
    query_one(
        conn,
        &format!("SELECT {} FROM alert_config WHERE id = 1", ALERT_CONFIG_COLS),
        &[],
    )
}

/// Replace the singleton settings row, creating it on first save.
pub fn upsert_alert_config(
    conn: &Connection,
    input: &PutAlertConfig,
    updated_by: &str,
) -> Result<AlertConfig> {
    let recipients = serde_json::to_string(&input.email_recipients)?;
    conn.query_row(
        &format!(
            "INSERT INTO alert_config (id, email_enabled, email_recipients, teams_enabled,
                                       teams_webhook_url, frequency_critical, frequency_warning,
                                       frequency_upcoming, updated_by, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                 email_enabled = excluded.email_enabled,
                 email_recipients = excluded.email_recipients,
                 teams_enabled = excluded.teams_enabled,
                 teams_webhook_url = excluded.teams_webhook_url,
                 frequency_critical = excluded.frequency_critical,
                 frequency_warning = excluded.frequency_warning,
                 frequency_upcoming = excluded.frequency_upcoming,
                 updated_by = excluded.updated_by,
                 updated_at = excluded.updated_at
             RETURNING {}",
            ALERT_CONFIG_COLS
        ),
        params![
            input.email_enabled,
            recipients,
            input.teams_enabled,
            input.teams_webhook_url,
            input.frequency_critical.as_str(),
            input.frequency_warning.as_str(),
            input.frequency_upcoming.as_str(),
            updated_by,
            now()
        ],
        AlertConfig::from_row,
    )
    .map_err(Into::into)
}
