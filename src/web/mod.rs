pub mod render;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{report, scan};

/// Build the application router.
pub fn app() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scan", post(scan_upload))
        .route("/api/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable()),
        )
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn index() -> Html<String> {
    Html(render::idle_page())
}

/// One upload triggers one parse-scan-render pass; the request owns the
/// parsed table and everything derived from it.
async fn scan_upload(mut multipart: Multipart) -> Html<String> {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!("reading upload failed: {err:#}");
            return Html(render::parse_error_page(&format!("{err:#}")));
        }
    };

    let Some((file_name, data)) = upload else {
        // No file in the form; same prompt as the idle state.
        return Html(render::idle_page());
    };

    info!(name = %file_name, bytes = data.len(), "upload received");

    let table = match report::parse_report(&data) {
        Ok(table) => table,
        Err(err) => {
            warn!(name = %file_name, "parse failed: {err:#}");
            return Html(render::parse_error_page(&format!("{err:#}")));
        }
    };

    let rendered = scan::scan_report(&table)
        .and_then(|outcome| render::results_page(&table, &outcome));
    match rendered {
        Ok(html) => Html(html),
        Err(err) => {
            warn!(name = %file_name, "scan failed: {err:#}");
            Html(render::parse_error_page(&format!("{err:#}")))
        }
    }
}

/// Pull the `report` file field out of the multipart form, if any.
async fn read_upload(multipart: &mut Multipart) -> anyhow::Result<Option<(String, Vec<u8>)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("report") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("report.csv").to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            return Ok(None);
        }
        return Ok(Some((file_name, data.to_vec())));
    }
    Ok(None)
}
