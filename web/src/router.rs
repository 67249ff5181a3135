use crate::{params, sse::handler::sse_handler, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::controller::{health_check_controller, notification_controller, session_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Flash Stack API"
        ),
        paths(
            health_check_controller::health_check,
            session_controller::create,
            session_controller::delete,
            notification_controller::create,
            notification_controller::index,
            notification_controller::close,
            notification_controller::remove,
        ),
        components(
            schemas(
                params::notification::PushParams,
                params::notification::RenderParams,
                params::notification::OptionsParams,
                session_controller::SessionCreated,
                notification_controller::Pushed,
            )
        ),
        tags(
            (name = "flash_stack", description = "Stacked flash notifications over SSE")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(session_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(sse_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(session_controller::create))
        .route("/sessions/{id}", delete(session_controller::delete))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/sessions/{id}/notifications",
            post(notification_controller::create).get(notification_controller::index),
        )
        .route(
            "/sessions/{id}/notifications/{key}/close",
            post(notification_controller::close),
        )
        .route(
            "/sessions/{id}/notifications/{key}/remove",
            post(notification_controller::remove),
        )
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sessions/{id}/stream", get(sse_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use axum::response::Response;
    use clap::Parser;
    use notification::{renderers, Dispatcher};
    use serde_json::{json, Value};
    use service::config::Config;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::parse_from(["flash_stack", "--disconnected-renderer", "flash.disconnected"]);
        let mut dispatcher = Dispatcher::new();
        renderers::register_defaults(&mut dispatcher);
        let container = service::init_container(&config, dispatcher).unwrap();
        define_routes(AppState::new(config, container))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = app.clone().oneshot(request("POST", "/sessions")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["data"]["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn stack(app: &Router, session_id: &str) -> Value {
        let response = app
            .clone()
            .oneshot(request("GET", &format!("/sessions/{session_id}/notifications")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["data"].clone()
    }

    fn flash(message: &str) -> Value {
        json!({
            "render": { "target": "flash", "function": "flash" },
            "payload": { "kind": "info", "message": message }
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app().oneshot(request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_push_and_list_in_order() {
        let app = app();
        let session_id = create_session(&app).await;
        let uri = format!("/sessions/{session_id}/notifications");

        let mut keys = Vec::new();
        for message in ["first", "second"] {
            let response = app.clone().oneshot(post_json(&uri, flash(message))).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            keys.push(json_body(response).await["data"]["key"].clone());
        }

        assert_eq!(stack(&app, &session_id).await, Value::Array(keys));
    }

    #[tokio::test]
    async fn test_push_without_render_capability_is_unprocessable() {
        let app = app();
        let session_id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/sessions/{session_id}/notifications"),
                json!({ "payload": { "message": "?" } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(stack(&app, &session_id).await, json!([]));
    }

    #[tokio::test]
    async fn test_push_with_unregistered_renderer_is_unprocessable() {
        let app = app();
        let session_id = create_session(&app).await;

        let response = app
            .oneshot(post_json(
                &format!("/sessions/{session_id}/notifications"),
                json!({ "render": { "target": "app", "function": "toast" }, "payload": {} }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app();

        let push = app
            .clone()
            .oneshot(post_json("/sessions/nope/notifications", flash("a")))
            .await
            .unwrap();
        let stream = app
            .clone()
            .oneshot(request("GET", "/sessions/nope/stream"))
            .await
            .unwrap();
        let end = app.oneshot(request("DELETE", "/sessions/nope")).await.unwrap();

        assert_eq!(push.status(), StatusCode::NOT_FOUND);
        assert_eq!(stream.status(), StatusCode::NOT_FOUND);
        assert_eq!(end.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_close_then_exit_ack_removes_notification() {
        let app = app();
        let session_id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/sessions/{session_id}/notifications"),
                flash("bye"),
            ))
            .await
            .unwrap();
        let key = json_body(response).await["data"]["key"]
            .as_str()
            .unwrap()
            .to_string();

        let close = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/notifications/{key}/close"),
            ))
            .await
            .unwrap();
        assert_eq!(close.status(), StatusCode::NO_CONTENT);
        assert_eq!(stack(&app, &session_id).await, json!([key]), "waits for the exit ack");

        let remove = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/notifications/{key}/remove"),
            ))
            .await
            .unwrap();
        assert_eq!(remove.status(), StatusCode::NO_CONTENT);
        assert_eq!(stack(&app, &session_id).await, json!([]));
    }

    #[tokio::test]
    async fn test_exit_ack_without_close_keeps_notification() {
        let app = app();
        let session_id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/sessions/{session_id}/notifications"),
                flash("still here"),
            ))
            .await
            .unwrap();
        let key = json_body(response).await["data"]["key"]
            .as_str()
            .unwrap()
            .to_string();

        let remove = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/sessions/{session_id}/notifications/{key}/remove"),
            ))
            .await
            .unwrap();
        assert_eq!(remove.status(), StatusCode::NO_CONTENT);
        assert_eq!(stack(&app, &session_id).await, json!([key]));
    }

    #[tokio::test]
    async fn test_stream_of_existing_session_is_event_stream() {
        let app = app();
        let session_id = create_session(&app).await;

        let response = app
            .oneshot(request("GET", &format!("/sessions/{session_id}/stream")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
    }

    #[tokio::test]
    async fn test_delete_session_ends_it() {
        let app = app();
        let session_id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(request("DELETE", &format!("/sessions/{session_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request("GET", &format!("/sessions/{session_id}/notifications")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = app()
            .oneshot(request("GET", "/api-docs/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
