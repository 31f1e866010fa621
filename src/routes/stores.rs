use crate::core::{Matcher, MAX_RESULTS};
use crate::models::{
    CompetitiveRatesRequest, CompetitiveRatesResponse, ErrorResponse, HealthResponse, MatchQuery,
    RateRecord, ReconcileRequest, ReconcileResponse, RecordLinkRequest, RecordLinkResponse,
};
use crate::services::{export, CacheKey, CacheManager, CrmClient, PostgresClient, RatesClient};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RatesClient>,
    pub crm: Arc<CrmClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub candidate_fetch_limit: usize,
}

/// Configure all store and rate routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/stores/reconcile", web::post().to(reconcile))
        .route("/stores/link", web::post().to(record_link))
        .route("/stores/link", web::delete().to(remove_link))
        .route("/stores/links", web::get().to(get_links))
        .route("/stores/stats", web::get().to(link_stats))
        .route("/rates/competitive", web::post().to(competitive_rates))
        .route("/rates/history", web::get().to(rate_history))
        .route("/export/csv", web::get().to(export_csv))
        .route("/export/rates/csv", web::get().to(export_rates_csv));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Reconcile a subject store against the CRM extract
///
/// POST /api/v1/stores/reconcile
///
/// Request body:
/// ```json
/// {
///   "targetStoreName": "Acme Storage",
///   "targetStreet": "456 Oak Avenue",
///   "city": "Metro",
///   "state": "CA",
///   "limit": 10
/// }
/// ```
async fn reconcile(
    state: web::Data<AppState>,
    req: web::Json<ReconcileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for reconcile request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let limit = (req.limit as usize).min(MAX_RESULTS);

    // Search the CRM by name when we have one, else by the street itself
    let search_term = req
        .target_store_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&req.target_street);

    tracing::info!(
        "Reconciling {:?} / {:?} (limit: {})",
        req.target_store_name,
        req.target_street,
        limit
    );

    let candidates = match state
        .crm
        .fetch_candidates(
            search_term,
            req.city.as_deref(),
            req.state.as_deref(),
            state.candidate_fetch_limit,
        )
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to fetch CRM candidates: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch CRM candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!("Fetched {} CRM candidates", candidates.len());

    let query = MatchQuery {
        target_store_name: req.target_store_name.clone(),
        target_street: req.target_street.clone(),
        city: req.city.clone(),
        state: req.state.clone(),
        postal_code: req.postal_code.clone(),
    };

    let result = state.matcher.rank(&query, candidates, limit);

    tracing::info!(
        "Returning {} matches (from {} candidates)",
        result.matches.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(ReconcileResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    })
}

/// Record an accepted reconciliation
///
/// POST /api/v1/stores/link
async fn record_link(
    state: web::Data<AppState>,
    req: web::Json<RecordLinkRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state
        .postgres
        .record_link(
            &req.subject_store_id,
            &req.crm_record_id,
            &req.brand_name,
            &req.extracted_street,
            req.combined_score,
        )
        .await
    {
        Ok(()) => HttpResponse::Ok().json(RecordLinkResponse {
            success: true,
            link_id: uuid::Uuid::new_v4().to_string(),
        }),
        Err(e) => {
            tracing::error!("Failed to record store link: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to record link".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// List confirmed links for a subject store
///
/// GET /api/v1/stores/links?subjectStoreId={id}
async fn get_links(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let subject_store_id = match query.get("subjectStoreId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing subjectStoreId parameter".to_string(),
                message: "subjectStoreId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.postgres.get_links(subject_store_id).await {
        Ok(links) => HttpResponse::Ok().json(serde_json::json!({
            "subjectStoreId": subject_store_id,
            "links": links,
            "count": links.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch links for {}: {}", subject_store_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch links".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Remove a link recorded in error
///
/// DELETE /api/v1/stores/link?subjectStoreId={id}&crmRecordId={id}
async fn remove_link(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let (subject_store_id, crm_record_id) =
        match (query.get("subjectStoreId"), query.get("crmRecordId")) {
            (Some(subject), Some(crm)) => (subject, crm),
            _ => {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Missing parameters".to_string(),
                    message: "subjectStoreId and crmRecordId query parameters are required"
                        .to_string(),
                    status_code: 400,
                });
            }
        };

    match state
        .postgres
        .remove_link(subject_store_id, crm_record_id)
        .await
    {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(e) => {
            tracing::error!("Failed to remove store link: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to remove link".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Aggregate link statistics for a subject store
///
/// GET /api/v1/stores/stats?subjectStoreId={id}
async fn link_stats(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let subject_store_id = match query.get("subjectStoreId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing subjectStoreId parameter".to_string(),
                message: "subjectStoreId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.postgres.get_link_stats(subject_store_id).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            tracing::error!("Failed to fetch link stats for {}: {}", subject_store_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch link stats".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Fetch competitive rates, cache-aside
///
/// POST /api/v1/rates/competitive
async fn competitive_rates(
    state: web::Data<AppState>,
    req: web::Json<CompetitiveRatesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let cache_key = CacheKey::rates(&req.postal_code, req.radius_miles, req.unit_size.as_deref());

    if req.refresh {
        if let Err(e) = state.cache.delete(&cache_key).await {
            tracing::warn!("Failed to drop cached rates for {}: {}", req.postal_code, e);
        }
    }

    // Cache problems degrade to a direct fetch, never an error
    if let Ok(Some(rates)) = state.cache.get::<Vec<RateRecord>>(&cache_key).await {
        tracing::debug!("Serving rates for {} from cache", req.postal_code);
        let total_results = rates.len();
        return HttpResponse::Ok().json(CompetitiveRatesResponse {
            rates,
            total_results,
            cached: true,
        });
    }

    let rates = match state
        .rates
        .query_rates(&req.postal_code, req.radius_miles, req.unit_size.as_deref())
        .await
    {
        Ok(rates) => rates,
        Err(e) => {
            tracing::error!("Failed to query rates for {}: {}", req.postal_code, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query competitive rates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if let Err(e) = state.cache.set(&cache_key, &rates).await {
        tracing::warn!("Failed to cache rates for {}: {}", req.postal_code, e);
    }

    let total_results = rates.len();
    HttpResponse::Ok().json(CompetitiveRatesResponse {
        rates,
        total_results,
        cached: false,
    })
}

/// Historical rates from the SQL-backed data service
///
/// GET /api/v1/rates/history?postalCode={zip}&unitSize={size}
async fn rate_history(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let postal_code = match query.get("postalCode") {
        Some(zip) => zip,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing postalCode parameter".to_string(),
                message: "postalCode query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };
    let unit_size = query.get("unitSize").map(String::as_str);

    match state
        .postgres
        .get_rate_history(postal_code, unit_size, 100)
        .await
    {
        Ok(snapshots) => HttpResponse::Ok().json(serde_json::json!({
            "postalCode": postal_code,
            "snapshots": snapshots,
            "count": snapshots.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch rate history for {}: {}", postal_code, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch rate history".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// CSV export of a reconciliation run
///
/// GET /api/v1/export/csv?targetStreet={street}&targetStoreName={name}
///
/// Recomputes the ranking from the query parameters; the core holds no
/// state between calls, so the export matches what a fresh reconcile
/// returns for the same inputs.
async fn export_csv(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let target_street = match query.get("targetStreet") {
        Some(street) if !street.trim().is_empty() => street.clone(),
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing targetStreet parameter".to_string(),
                message: "targetStreet query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };
    let target_store_name = query.get("targetStoreName").cloned();
    let city = query.get("city").cloned();
    let state_param = query.get("state").cloned();

    let search_term = target_store_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&target_street);

    let candidates = match state
        .crm
        .fetch_candidates(
            search_term,
            city.as_deref(),
            state_param.as_deref(),
            state.candidate_fetch_limit,
        )
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to fetch CRM candidates for export: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch CRM candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let match_query = MatchQuery {
        target_store_name,
        target_street,
        city,
        state: state_param,
        postal_code: query.get("postalCode").cloned(),
    };

    let result = state.matcher.rank(&match_query, candidates, MAX_RESULTS);

    match export::matches_to_csv(&match_query, &result.matches) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"reconciliation.csv\"",
            ))
            .body(csv),
        Err(e) => {
            tracing::error!("Failed to render CSV export: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to render CSV".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// CSV export of competitive rates
///
/// GET /api/v1/export/rates/csv?postalCode={zip}&radiusMiles={miles}
async fn export_rates_csv(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let postal_code = match query.get("postalCode") {
        Some(zip) if !zip.trim().is_empty() => zip.clone(),
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing postalCode parameter".to_string(),
                message: "postalCode query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };
    let radius_miles = query
        .get("radiusMiles")
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(5.0);
    let unit_size = query.get("unitSize").map(String::as_str);

    let rates = match state
        .rates
        .query_rates(&postal_code, radius_miles, unit_size)
        .await
    {
        Ok(rates) => rates,
        Err(e) => {
            tracing::error!("Failed to query rates for export: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query competitive rates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    match export::rates_to_csv(&rates) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"rates.csv\""))
            .body(csv),
        Err(e) => {
            tracing::error!("Failed to render rates CSV: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to render CSV".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
