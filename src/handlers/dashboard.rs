//! Dashboard aggregates, computed over active vigencias at request time.

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Query;
use crate::models::ClassifiedVigencia;
use crate::response::ApiResponse;
use crate::semaforo::TrafficColor;

/// Per-color record counts, keyed by the wire names of the colors.
#[derive(Debug, Default, Serialize)]
pub struct ColorCounts {
    pub expired: i64,
    pub critical: i64,
    pub warning: i64,
    pub ok: i64,
    pub far: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_products: i64,
    /// Active vigencias only; inactive and cancelled records are invisible
    /// to the dashboard.
    pub total_vigencias: i64,
    /// Active records expiring within 30 days (expired ones excluded).
    pub expiring_soon: i64,
    pub by_color: ColorCounts,
}

pub async fn stats(State(state): State<AppState>) -> Result<ApiResponse<DashboardStats>> {
    let conn = state.db.get()?;
    let details = queries::list_active_vigencia_details(&conn)?;
    let now = Utc::now().timestamp();

    let mut by_color = ColorCounts::default();
    let mut expiring_soon = 0;
    let total_vigencias = details.len() as i64;

    for detail in &details {
        let c = detail.vigencia.classify(now)?;
        match c.color {
            TrafficColor::Expired => by_color.expired += 1,
            TrafficColor::Critical => by_color.critical += 1,
            TrafficColor::Warning => by_color.warning += 1,
            TrafficColor::Ok => by_color.ok += 1,
            TrafficColor::Far => by_color.far += 1,
        }
        if (0..=30).contains(&c.days_remaining) {
            expiring_soon += 1;
        }
    }

    Ok(ApiResponse::ok(DashboardStats {
        total_clients: queries::count_clients(&conn)?,
        total_products: queries::count_active_products(&conn)?,
        total_vigencias,
        expiring_soon,
        by_color,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    /// Maximum rows to return (default: 10, max: 100).
    pub limit: Option<i64>,
}

/// Active vigencias at or past their own warning threshold, most urgent
/// first. Already-expired records are included so nothing urgent ever
/// drops off the list.
pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<ApiResponse<Vec<ClassifiedVigencia>>> {
    let conn = state.db.get()?;
    let details = queries::list_active_vigencia_details(&conn)?;
    let now = Utc::now().timestamp();
    let limit = query.limit.unwrap_or(10).clamp(1, 100) as usize;

    let mut rows = details
        .into_iter()
        .map(|detail| ClassifiedVigencia::new(detail, now))
        .collect::<Result<Vec<_>>>()?;

    rows.retain(|row| row.days_remaining <= row.detail.vigencia.threshold_yellow);
    rows.sort_by_key(|row| row.days_remaining);
    rows.truncate(limit);

    Ok(ApiResponse::ok(rows))
}
