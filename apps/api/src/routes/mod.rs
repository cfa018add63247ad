pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::editor::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/documents/normalize",
            post(handlers::handle_normalize),
        )
        // Editor sessions
        .route(
            "/api/v1/resumes/:id/session",
            post(handlers::handle_open_session).delete(handlers::handle_close_session),
        )
        .route(
            "/api/v1/resumes/:id/document",
            get(handlers::handle_get_document),
        )
        .route("/api/v1/resumes/:id/edits", post(handlers::handle_edit))
        .route(
            "/api/v1/resumes/:id/notifications",
            get(handlers::handle_list_failures),
        )
        .route(
            "/api/v1/resumes/:id/notifications/:nid",
            delete(handlers::handle_dismiss_failure),
        )
        .route(
            "/api/v1/resumes/:id/notifications/:nid/retry",
            post(handlers::handle_retry_failure),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::editor::memory_store::MemoryStore;
    use crate::editor::session::SessionRegistry;
    use crate::models::record::{Experience, ResumeRecord};

    fn app_with(store: Arc<MemoryStore>) -> Router {
        build_router(AppState {
            store,
            sessions: SessionRegistry::new(),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_normalize_endpoint() {
        let app = app_with(Arc::new(MemoryStore::new()));
        let body = json!({
            "record": {
                "id": Uuid::new_v4(),
                "userId": Uuid::new_v4(),
                "title": "r",
                "templateId": null,
                "status": "draft",
                "experiences": [{
                    "jobTitle": "Engineer",
                    "company": "Acme",
                    "startDate": "2020-01-01",
                    "isCurrent": true
                }],
                "educations": [{"degree": "BSc", "startDate": 1_673_740_800_000_i64}]
            },
            "structure": {"layout": "creative"}
        });
        let (status, body) = send(&app, "POST", "/api/v1/documents/normalize", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["experience"][0]["startDate"], "Jan 2020");
        assert_eq!(body["document"]["experience"][0]["endDate"], "");
        assert_eq!(body["document"]["education"][0]["startDate"], "2023");
        assert_eq!(body["usedDefault"], true);
        assert_eq!(body["renderer"], "standard");
    }

    #[tokio::test]
    async fn test_editor_session_endpoints() {
        let store = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();
        let mut record = ResumeRecord::empty(id, Uuid::new_v4(), "r");
        record.experiences = Some(vec![Experience::default()]);
        store.insert_record(record);
        let app = app_with(store.clone());

        let (status, _) = send(&app, "GET", &format!("/api/v1/resumes/{id}/document"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, "POST", &format!("/api/v1/resumes/{id}/session"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["renderer"], "standard");

        let edit = json!({"section": "experience", "index": 0, "field": "title", "value": "SRE"});
        let (status, body) =
            send(&app, "POST", &format!("/api/v1/resumes/{id}/edits"), Some(edit)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["experience"][0]["title"], "SRE");
        assert_eq!(body["delta"]["field"], "jobTitle");
        assert_eq!(body["delta"]["section"], "experiences");

        let bad = json!({"section": "hobbies", "index": 0, "field": "x", "value": "y"});
        let (status, body) =
            send(&app, "POST", &format!("/api/v1/resumes/{id}/edits"), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) =
            send(&app, "GET", &format!("/api/v1/resumes/{id}/notifications"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().is_some());

        let missing = Uuid::new_v4();
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/v1/resumes/{id}/notifications/{missing}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, "DELETE", &format!("/api/v1/resumes/{id}/session"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/v1/resumes/{id}/document"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            send(&app, "DELETE", &format!("/api/v1/resumes/{id}/session"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
