//! HTTP API
//!
//! ```text
//! GET     /songs   filtered, paginated listing
//! POST    /songs   batch create
//! PUT     /songs   partial update
//! DELETE  /songs   delete by id
//! GET     /info    details by group and song title
//! GET     /text    paginated verses
//! GET     /health  liveness
//! ```

pub mod handlers;
pub mod params;
pub mod response;

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use crate::error::Result;
use crate::services::SongCatalog;
use handlers::*;
use response::{cors, fallback, log_request, preflight};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<SongCatalog>,
}

impl AppState {
    pub fn new(catalog: SongCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/songs",
            get(list_songs)
                .post(create_songs)
                .put(update_song)
                .delete(delete_song)
                .options(preflight),
        )
        .route("/info", get(song_details).options(preflight))
        .route("/text", get(song_text).options(preflight))
        .route("/health", get(health))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves; in-flight requests are allowed to
/// finish.
pub async fn serve<S>(listener: TcpListener, app: Router, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::{SongDetails, SongPayload};
    use crate::api::response::Message;
    use crate::core::models::{Song, SongId};
    use crate::services::database::memory::MemorySongStore;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    struct TestServer {
        base: String,
        store: Arc<MemorySongStore>,
        client: reqwest::Client,
    }

    impl TestServer {
        async fn start() -> Self {
            Self::start_with(Arc::new(MemorySongStore::new()), Duration::from_secs(10)).await
        }

        async fn start_with(store: Arc<MemorySongStore>, timeout: Duration) -> Self {
            let catalog = SongCatalog::new(store.clone(), timeout);
            let app = router(AppState::new(catalog), 1024 * 1024);
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                base: format!("http://{addr}"),
                store,
                client: reqwest::Client::new(),
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        fn seed(&self, group: &str, title: &str, release_date: Option<NaiveDate>, text: Option<&str>) -> Song {
            self.store.seed(Song {
                id: SongId::new(1).unwrap(),
                group: group.into(),
                title: title.into(),
                release_date,
                text: text.map(str::to_string),
                link: None,
            })
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_details() {
        let server = TestServer::start().await;

        let response = server
            .client
            .post(server.url("/songs"))
            .json(&json!([{ "group": "G", "song": "S" }]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created: Vec<SongPayload> = response.json().await.unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].id > 0);
        assert_eq!(created[0].release_date, "");

        let response = server
            .client
            .get(server.url("/info"))
            .query(&[("group", "G"), ("song", "S")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let details: SongDetails = response.json().await.unwrap();
        assert_eq!(details, SongDetails { release_date: String::new(), text: String::new(), link: String::new() });
    }

    #[tokio::test]
    async fn test_unknown_details_are_not_found() {
        let server = TestServer::start().await;
        let response = server
            .client
            .get(server.url("/info"))
            .query(&[("group", "Nobody"), ("song", "Nothing")])
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let message: Message = response.json().await.unwrap();
        assert_eq!(message.code, 404);
    }

    #[tokio::test]
    async fn test_list_with_filters_and_pagination() {
        let server = TestServer::start().await;
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        server.seed("Muse", "Supermassive Black Hole", day(2006, 7, 16), None);
        server.seed("Muse", "Hysteria", day(2003, 12, 1), None);
        server.seed("Radiohead", "Creep", day(1992, 9, 21), None);

        let songs: Vec<SongPayload> = server
            .client
            .get(server.url("/songs?group=muse&startDate=01.01.2004"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song, "Supermassive Black Hole");
        assert_eq!(songs[0].release_date, "16.07.2006");

        let legacy_names: Vec<SongPayload> = server
            .client
            .get(server.url("/songs?endTime=01.01.2004"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(legacy_names.len(), 2);

        let page: Vec<SongPayload> = server
            .client
            .get(server.url("/songs?offset=1&limit=1"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].song, "Hysteria");
    }

    #[tokio::test]
    async fn test_malformed_date_is_rejected_before_storage() {
        let server = TestServer::start().await;
        let response = server
            .client
            .get(server.url("/songs?startDate=2024-01-01"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_limit_is_bad_request() {
        let server = TestServer::start().await;
        let response = server.client.get(server.url("/songs?limit=ten")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message: Message = response.json().await.unwrap();
        assert_eq!(message.code, 400);
    }

    #[tokio::test]
    async fn test_text_pages() {
        let server = TestServer::start().await;
        let song = server.seed("Band", "Song", None, Some("A\n\nB\n\nC"));
        let id = song.id.to_string();

        let verses: Vec<String> = server
            .client
            .get(server.url("/text"))
            .query(&[("id", id.as_str()), ("offset", "2"), ("limit", "2")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(verses, vec!["C"]);

        let response = server.client.get(server.url("/text?id=0")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_update_echoes_submission() {
        let server = TestServer::start().await;
        let song = server.seed("Muse", "Hysteria", None, None);

        let submitted = json!({
            "id": song.id.get(),
            "releaseDate": "01.12.2003",
            "link": "https://example.com/hysteria"
        });
        let response = server.client.put(server.url("/songs")).json(&submitted).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let echoed: SongPayload = response.json().await.unwrap();
        assert_eq!(echoed.group, "");
        assert_eq!(echoed.release_date, "01.12.2003");

        let stored = &server.store.songs()[0];
        assert_eq!(stored.group, "Muse");
        assert_eq!(stored.link.as_deref(), Some("https://example.com/hysteria"));

        let bad_date = json!({ "id": song.id.get(), "releaseDate": "2003-12-01" });
        let response = server.client.put(server.url("/songs")).json(&bad_date).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = TestServer::start().await;
        let response = server
            .client
            .post(server.url("/songs"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message: Message = response.json().await.unwrap();
        assert!(message.message.starts_with("unmarshal:"));
    }

    #[tokio::test]
    async fn test_wrong_typed_or_untyped_body_is_bad_request() {
        let server = TestServer::start().await;

        let response = server
            .client
            .post(server.url("/songs"))
            .json(&json!([{ "group": 5 }]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message: Message = response.json().await.unwrap();
        assert_eq!(message.code, 400);
        assert!(message.message.starts_with("unmarshal:"));

        let response = server
            .client
            .put(server.url("/songs"))
            .body(r#"{"id": 1}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_id_filter_is_bad_request() {
        let server = TestServer::start().await;
        server.seed("Muse", "Hysteria", None, None);

        let response = server
            .client
            .get(server.url("/songs?id=9223372036854775808"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_signed_year_is_bad_request() {
        let server = TestServer::start().await;
        let response = server
            .client
            .get(server.url("/songs?startDate=01.01.%2B10000"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = TestServer::start().await;
        let song = server.seed("Muse", "Hysteria", None, None);
        let url = server.url(&format!("/songs?id={}", song.id));

        for _ in 0..2 {
            let response = server.client.delete(&url).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let id: i64 = response.json().await.unwrap();
            assert_eq!(id, song.id.get());
        }

        let response = server.client.delete(server.url("/songs?id=0")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeout_is_generic_failure() {
        let store = Arc::new(MemorySongStore::with_delay(Duration::from_millis(200)));
        let server = TestServer::start_with(store, Duration::from_millis(20)).await;

        let response = server.client.get(server.url("/songs")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message: Message = response.json().await.unwrap();
        assert_eq!(message.message, "Something went wrong");
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let server = TestServer::start().await;

        let response = server
            .client
            .request(reqwest::Method::OPTIONS, server.url("/songs"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-allow-headers"], "*");

        let response = server.client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(response.headers()["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(response.headers()["access-control-allow-headers"], "Authorization");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = TestServer::start().await;
        let response = server.client.get(server.url("/lyrics")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
