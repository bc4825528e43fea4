use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use comps_core::{Error, Listing};
use comps_engine::{
    Estimate, EstimatorConfig, MarketStatsAggregator, NeighborSelector, PriceEstimator,
    PriceModel, PriceRange, SelectorConfig, SimilarityEngine, Valuator,
};
use comps_store::StoreManager;

/// Below this many qualifying comparables the KNN estimate is considered
/// thin evidence and the baseline model is consulted instead.
const MIN_COMPARABLES_FOR_KNN: usize = 3;

/// Price range attached to baseline predictions, as a fraction of the
/// predicted price.
const BASELINE_RANGE_SPREAD: f64 = 0.15;

#[derive(Deserialize)]
struct UpsertListingsRequest {
    listings: Vec<Listing>,
}

#[derive(Deserialize)]
struct StatsQuery {
    city: Option<String>,
    district: Option<String>,
}

/// Error shape for failed valuations; `estimated_price` is an explicit
/// null so clients can branch without probing for field presence.
#[derive(Serialize)]
struct ValuationFailure {
    error: String,
    estimated_price: Option<i64>,
    confidence: f64,
    similar_properties_count: usize,
}

impl ValuationFailure {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            estimated_price: None,
            confidence: 0.0,
            similar_properties_count: 0,
        }
    }
}

/// Shared application state: the store plus the engine components built
/// once at startup.
pub struct ApiState {
    store: Arc<StoreManager>,
    valuator: Valuator,
    stats: MarketStatsAggregator,
    fallback: Box<dyn PriceModel>,
}

impl ApiState {
    pub fn new(
        store: Arc<StoreManager>,
        engine: SimilarityEngine,
        selector_config: SelectorConfig,
        estimator_config: EstimatorConfig,
        fallback: Box<dyn PriceModel>,
    ) -> Self {
        let corpus = store.corpus();
        let selector = NeighborSelector::with_config(engine, corpus.clone(), selector_config);
        let valuator = Valuator::new(selector, PriceEstimator::new(estimator_config));
        let stats = MarketStatsAggregator::new(corpus);
        Self {
            store,
            valuator,
            stats,
            fallback,
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: ApiState, port: u16) -> std::io::Result<()> {
        let state = web::Data::new(state);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .route("/health", web::get().to(health))
                .route("/listings", web::put().to(upsert_listings))
                .route("/listings/{id}", web::get().to(get_listing))
                .route("/listings/{id}", web::delete().to(delete_listing))
                .route("/listings/{id}/valuation", web::get().to(value_stored_listing))
                .route("/valuations", web::post().to(create_valuation))
                .route("/market/stats", web::get().to(market_stats))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

async fn health(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "listings": state.store.count()
    })))
}

async fn upsert_listings(
    state: web::Data<ApiState>,
    req: web::Json<UpsertListingsRequest>,
) -> ActixResult<HttpResponse> {
    match state.store.corpus().batch_upsert(req.into_inner().listings) {
        Ok(stored) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "result": true,
            "upserted": stored
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        }))),
    }
}

async fn get_listing(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match state.store.corpus().get_by_str(&id) {
        Some(listing) => Ok(HttpResponse::Ok().json(listing)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("listing not found: {id}")
        }))),
    }
}

async fn delete_listing(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    if state.store.corpus().delete(&id) {
        Ok(HttpResponse::Ok().json(serde_json::json!({ "result": true })))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("listing not found: {id}")
        })))
    }
}

async fn value_stored_listing(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let target = match state.store.corpus().get_by_str(&id) {
        Some(listing) => listing,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("listing not found: {id}")
            })));
        }
    };
    Ok(run_valuation(&state, &target))
}

async fn create_valuation(
    state: web::Data<ApiState>,
    req: web::Json<Listing>,
) -> ActixResult<HttpResponse> {
    let target = req.into_inner();
    if let Err(e) = target.validate() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })));
    }
    Ok(run_valuation(&state, &target))
}

async fn market_stats(
    state: web::Data<ApiState>,
    query: web::Query<StatsQuery>,
) -> ActixResult<HttpResponse> {
    match state
        .stats
        .aggregate(query.city.as_deref(), query.district.as_deref())
    {
        Ok(Some(stats)) => Ok(HttpResponse::Ok().json(stats)),
        Ok(None) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "no listings matched the filter"
        }))),
        Err(e) => {
            error!("market stats failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

/// KNN first; on thin evidence or a structured insufficiency error, consult
/// the baseline model. Only when both paths come up empty does the caller
/// see a failure shape.
fn run_valuation(state: &ApiState, target: &Listing) -> HttpResponse {
    match state.valuator.value(target) {
        Ok(estimate) if estimate.similar_properties_count >= MIN_COMPARABLES_FOR_KNN => {
            HttpResponse::Ok().json(estimate)
        }
        Ok(estimate) => match state.fallback.predict(target) {
            Ok(prediction) => {
                info!(
                    "thin evidence ({} comparables), using {} model",
                    estimate.similar_properties_count, prediction.model_name
                );
                HttpResponse::Ok().json(baseline_estimate(prediction))
            }
            // The sparse KNN estimate is still better than nothing.
            Err(_) => HttpResponse::Ok().json(estimate),
        },
        Err(err @ (Error::NoComparables | Error::InsufficientEvidence { .. })) => {
            match state.fallback.predict(target) {
                Ok(prediction) => {
                    info!("no usable comparables, using {} model", prediction.model_name);
                    HttpResponse::Ok().json(baseline_estimate(prediction))
                }
                Err(_) => HttpResponse::Ok().json(ValuationFailure::new(err.to_string())),
            }
        }
        Err(err) => {
            error!("valuation failed: {}", err);
            HttpResponse::InternalServerError().json(ValuationFailure::new(err.to_string()))
        }
    }
}

/// Wrap a baseline prediction in the standard estimate shape with a flat
/// ±15% price range and no comparables.
fn baseline_estimate(prediction: comps_engine::Prediction) -> Estimate {
    let price = prediction.price;
    Estimate {
        estimated_price: price,
        confidence: prediction.confidence,
        price_range: PriceRange {
            min: (price as f64 * (1.0 - BASELINE_RANGE_SPREAD)) as i64,
            max: (price as f64 * (1.0 + BASELINE_RANGE_SPREAD)) as i64,
        },
        similar_properties_count: 0,
        avg_similarity: 0.0,
        similar_properties: Vec::new(),
        method: prediction.model_name,
    }
}
