use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app::state::AppState;
use crate::catalog::add::{NewPlayable, screenshot_preview};
use crate::catalog::page::SectionView;
use crate::error::InputError;
use crate::formats::PlayableRecord;
use crate::mraid::frame::RecordingFrame;
use crate::mraid::harness::{Harness, LoadResult};

const SIMULATOR_PAGE: &str = include_str!("../../assets/simulator.html");

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/", get(dashboard))
        .route("/api/catalog", get(get_catalog))
        .route("/api/catalog/rendered", get(get_rendered_catalog))
        .route("/api/catalog/:category", post(add_playable))
        .route("/api/sections/:name/toggle", post(toggle_section))
        .route("/api/screenshot-preview", post(preview_screenshot))
        .route("/simulator", get(|| async { Html(SIMULATOR_PAGE) }))
        .route("/simulator/frame", get(simulator_frame))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    if let Some(dir) = state.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let catalog = state.catalog.lock().await;
    Html(catalog.render_page())
}

async fn get_catalog(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.lock().await;
    Json(catalog.state().clone()).into_response()
}

async fn get_rendered_catalog(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.lock().await;
    Json(catalog.render()).into_response()
}

#[derive(Debug, Serialize)]
struct AddPlayableResponse {
    category: String,
    record: PlayableRecord,
    notice: String,
}

async fn add_playable(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(fields): Json<NewPlayable>,
) -> Result<(StatusCode, Json<AddPlayableResponse>), (StatusCode, String)> {
    let mut catalog = state.catalog.lock().await;
    let added = catalog
        .add_record(&category, &fields)
        .await
        .map_err(|err| match err.downcast_ref::<InputError>() {
            Some(input) => (StatusCode::BAD_REQUEST, input.to_string()),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("add playable: {err:#}"),
            ),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AddPlayableResponse {
            category: added.category,
            record: added.record,
            notice: added.notice,
        }),
    ))
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    section: String,
    view: SectionView,
}

async fn toggle_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToggleResponse>, (StatusCode, String)> {
    let mut catalog = state.catalog.lock().await;
    if catalog.profile().category(&name).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("unknown section: {name}")));
    }
    let view = catalog.toggle_section(&name);
    Ok(Json(ToggleResponse {
        section: name,
        view,
    }))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    #[serde(default)]
    name: String,
}

async fn preview_screenshot(
    Query(q): Query<PreviewQuery>,
    body: Bytes,
) -> Result<String, (StatusCode, String)> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "screenshot body is empty".to_string()));
    }
    Ok(screenshot_preview(&body, &q.name))
}

#[derive(Debug, Deserialize)]
struct FrameQuery {
    #[serde(default)]
    url: String,
}

/// Fresh harness per request: every frame load is a new execution context.
async fn simulator_frame(State(state): State<AppState>, Query(q): Query<FrameQuery>) -> Response {
    let mut harness = Harness::new(Arc::clone(&state.fetcher), RecordingFrame::new());
    let result = match harness.load_playable(&q.url).await {
        Ok(result) => result,
        Err(err) => {
            let status = if err.downcast_ref::<InputError>().is_some() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return (status, format!("{err:#}")).into_response();
        }
    };

    let status = match result {
        LoadResult::Loaded(mode) => {
            tracing::info!(url = %q.url, ?mode, "served injected playable");
            StatusCode::OK
        }
        LoadResult::Failed => StatusCode::BAD_GATEWAY,
    };
    let document = harness.frame().document().unwrap_or_default().to_string();
    (status, Html(document)).into_response()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt as _;

    use super::*;
    use crate::catalog::Catalog;
    use crate::catalog::source::DirCatalogSource;
    use crate::catalog::store::MemoryOverrideStore;
    use crate::config::Profile;
    use crate::mraid::harness::CreativeFetcher;

    struct StaticFetcher;

    #[async_trait]
    impl CreativeFetcher for StaticFetcher {
        async fn fetch_html(&self, url: &str) -> anyhow::Result<String> {
            match url {
                "http://local/pl.html" => Ok(
                    r#"<html><head><script src="mraid.js"></script></head><body></body></html>"#
                        .to_string(),
                ),
                "http://127.0.0.1:8080/playables/west/Duel.html" => Ok(concat!(
                    r#"<html><head><script src="mraid.js"></script>"#,
                    r#"<script src="game.js"></script></head></html>"#,
                )
                .to_string()),
                _ => anyhow::bail!("HTTP error! status: 404"),
            }
        }
    }

    async fn test_app() -> (Router, tempfile::TempDir) {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        std::fs::write(
            temp.path().join("data/west-playables.json"),
            r#"[{"title":"Duel","playUrl":"playables/west/Duel.html","asanaUrl":"https://app.asana.com/0/1"}]"#,
        )
        .unwrap();
        std::fs::write(temp.path().join("data/mega-playables.json"), "[]").unwrap();

        let mut catalog = Catalog::new(
            Profile::extended(),
            Arc::new(DirCatalogSource::new(temp.path())),
            Arc::new(MemoryOverrideStore::new()),
        );
        catalog.load().await;

        let state = AppState::new(catalog, Arc::new(StaticFetcher));
        (router(state), temp)
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn dashboard_renders_loaded_catalog() {
        let (app, _temp) = test_app().await;
        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(">Duel<"));
        assert!(html.contains("1 плейбл"));
        assert!(html.contains("0 плейблов"));
    }

    #[tokio::test]
    async fn add_playable_prepends_and_rejects_bad_input() {
        let (app, _temp) = test_app().await;

        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/catalog/west")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"Raid","asanaUrl":"https://app.asana.com/0/2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(body_text(resp).await.contains("playables/west/screens/Raid.png"));

        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/catalog/west")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title":"NoTicket"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(Request::get("/api/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let state: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        let titles: Vec<&str> = state["west"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["title"].as_str())
            .collect();
        assert_eq!(titles, ["Raid", "Duel"]);
    }

    #[tokio::test]
    async fn toggle_section_reports_view() {
        let (app, _temp) = test_app().await;
        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/sections/mega/toggle")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("\"collapsed\""));

        let resp = app
            .oneshot(
                Request::post("/api/sections/farm/toggle")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn simulator_frame_serves_injected_document() {
        let (app, _temp) = test_app().await;
        let resp = app
            .clone()
            .oneshot(
                Request::get("/simulator/frame?url=http%3A%2F%2Flocal%2Fpl.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("mraid_event_from_simulator"));
        assert!(!html.contains("src=\"mraid.js\""));

        let resp = app
            .clone()
            .oneshot(
                Request::get("/simulator/frame?url=http%3A%2F%2Flocal%2Fmissing.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(resp).await.contains("<h1>Error</h1>"));

        let resp = app
            .oneshot(Request::get("/simulator/frame").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn simulator_frame_resolves_relative_assets_against_creative() {
        let (app, _temp) = test_app().await;
        let resp = app
            .oneshot(
                Request::get(format!(
                    "/simulator/frame?url={}",
                    "http%3A%2F%2F127.0.0.1%3A8080%2Fplayables%2Fwest%2FDuel.html"
                ))
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;

        let base_start = html.find("<base href=\"").unwrap() + "<base href=\"".len();
        let base_len = html[base_start..].find('"').unwrap();
        let base = url::Url::parse(&html[base_start..base_start + base_len]).unwrap();
        assert_eq!(
            base.join("game.js").unwrap().as_str(),
            "http://127.0.0.1:8080/playables/west/game.js"
        );
        assert!(html.find("<base href=") < html.find("src=\"game.js\""));
    }

    #[tokio::test]
    async fn screenshot_preview_returns_data_uri() {
        let (app, _temp) = test_app().await;
        let resp = app
            .oneshot(
                Request::post("/api/screenshot-preview?name=shot.png")
                    .body(Body::from("abc"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "data:image/png;base64,YWJj");
    }
}
