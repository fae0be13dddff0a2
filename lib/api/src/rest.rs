use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use reelmatch_core::Error;
use reelmatch_similarity::{CatalogStats, EngineHandle, Recommendations};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_K: usize = 10;

#[derive(Deserialize)]
struct TitleQuery {
    q: String,
    k: Option<usize>,
}

#[derive(Deserialize)]
struct TagQuery {
    tag: String,
    k: Option<usize>,
}

#[derive(Deserialize)]
struct TagsRequest {
    #[serde(default)]
    tags: Vec<String>,
    k: Option<usize>,
}

#[derive(Deserialize)]
struct StatsQuery {
    top: Option<usize>,
}

#[derive(Deserialize, Default)]
struct ReloadRequest {
    path: Option<PathBuf>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    items: usize,
    vocabulary_size: usize,
    degenerate: bool,
}

#[derive(Serialize)]
struct ReloadResponse {
    rebuilt: bool,
    items: usize,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(handle: Arc<EngineHandle>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(handle.clone()))
                .configure(routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every endpoint; expects `web::Data<Arc<EngineHandle>>` in app data
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/tags", web::get().to(list_tags))
        .route("/stats", web::get().to(catalog_stats))
        .route("/recommend/title", web::get().to(recommend_by_title))
        .route("/recommend/tag", web::get().to(recommend_by_tag))
        .route("/recommend/tags", web::post().to(recommend_by_tags))
        .route("/catalog/reload", web::post().to(reload_catalog));
}

fn error_response(err: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        Error::ItemNotFound(_) | Error::NoMatch(_) | Error::DatasetNotFound { .. } => {
            HttpResponse::NotFound().json(body)
        }
        Error::NoTags | Error::InvalidConfig(_) => HttpResponse::BadRequest().json(body),
        _ => {
            warn!(error = %err, "Request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond(result: reelmatch_core::Result<Recommendations>) -> HttpResponse {
    match result {
        Ok(recs) => HttpResponse::Ok().json(serde_json::json!({
            "seeds": recs.seeds,
            "result": recs.results,
        })),
        Err(e) => error_response(&e),
    }
}

async fn health(handle: web::Data<Arc<EngineHandle>>) -> ActixResult<HttpResponse> {
    let stats = handle.current().stats();
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        items: stats.items,
        vocabulary_size: stats.vocabulary_size,
        degenerate: stats.degenerate,
    }))
}

async fn list_tags(handle: web::Data<Arc<EngineHandle>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(handle.current().all_tags()))
}

async fn catalog_stats(
    handle: web::Data<Arc<EngineHandle>>,
    query: web::Query<StatsQuery>,
) -> ActixResult<HttpResponse> {
    let engine = handle.current();
    let stats = CatalogStats::compute(engine.items(), query.top.unwrap_or(12));
    Ok(HttpResponse::Ok().json(stats))
}

async fn recommend_by_title(
    handle: web::Data<Arc<EngineHandle>>,
    query: web::Query<TitleQuery>,
) -> ActixResult<HttpResponse> {
    let k = query.k.unwrap_or(DEFAULT_K);
    Ok(respond(handle.current().recommend_by_title(&query.q, k)))
}

async fn recommend_by_tag(
    handle: web::Data<Arc<EngineHandle>>,
    query: web::Query<TagQuery>,
) -> ActixResult<HttpResponse> {
    let k = query.k.unwrap_or(DEFAULT_K);
    Ok(respond(handle.current().recommend_by_tag(&query.tag, k)))
}

async fn recommend_by_tags(
    handle: web::Data<Arc<EngineHandle>>,
    req: web::Json<TagsRequest>,
) -> ActixResult<HttpResponse> {
    let k = req.k.unwrap_or(DEFAULT_K);
    Ok(respond(handle.current().recommend_by_tags(req.tags.as_slice(), k)))
}

async fn reload_catalog(
    handle: web::Data<Arc<EngineHandle>>,
    req: Option<web::Json<ReloadRequest>>,
) -> ActixResult<HttpResponse> {
    let req = req.map(web::Json::into_inner).unwrap_or_default();
    let handle = handle.get_ref().clone();

    // building is CPU bound, keep it off the worker threads
    let result = web::block(move || {
        let rebuilt = handle.reload_from(req.path.as_deref())?;
        Ok::<_, Error>((rebuilt, handle.current().len()))
    })
    .await?;

    match result {
        Ok((rebuilt, items)) => {
            info!(rebuilt, items, "Catalog reload requested");
            Ok(HttpResponse::Ok().json(ReloadResponse { rebuilt, items }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
