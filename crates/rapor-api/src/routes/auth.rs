//! Authentication routes

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rapor_auth::DirectoryAuthenticator;
use rapor_store::PortalRepository;
use serde::Deserialize;
use tracing::debug;

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Always answers with a JSON [`rapor_auth::AuthResult`]; the status code
/// mirrors its `success` flag. Credentials never appear in logs.
pub async fn login<D, R>(
    State(state): State<AppState<D, R>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse
where
    D: DirectoryAuthenticator + 'static,
    R: PortalRepository + 'static,
{
    debug!("Login attempt for {}", request.username);

    let result = state
        .auth
        .authenticate(&request.username, &request.password)
        .await;

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    (status, Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::response::Response;
    use rapor_auth::{AuthService, DirectoryIdentity};
    use rapor_core::config::{DirectoryConfig, RaporConfig};
    use rapor_store::PortalStore;
    use std::sync::Arc;
    use std::time::Instant;

    struct FakeDirectory;

    #[async_trait]
    impl DirectoryAuthenticator for FakeDirectory {
        async fn authenticate(&self, username: &str, password: &str) -> Option<DirectoryIdentity> {
            if username == "jdoe" && password == "secret" {
                Some(DirectoryIdentity::minimal("jdoe", "cashmgmt.net", "General Users"))
            } else {
                None
            }
        }
    }

    async fn test_state() -> AppState<FakeDirectory, PortalStore> {
        let store = Arc::new(
            PortalStore::with_pool_size("sqlite::memory:", 1)
                .await
                .unwrap(),
        );
        let auth = Arc::new(AuthService::new(
            FakeDirectory,
            store,
            &DirectoryConfig::default(),
        ));
        AppState {
            config: Arc::new(RaporConfig::default()),
            auth,
            start_time: Instant::now(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn valid_login_answers_200_with_the_account() {
        let state = test_state().await;
        let response = login(
            State(state),
            Json(LoginRequest {
                username: "jdoe".to_string(),
                password: "secret".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["email"], "jdoe@cashmgmt.net");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn invalid_login_answers_401_with_a_generic_message() {
        let state = test_state().await;
        let response = login(
            State(state),
            Json(LoginRequest {
                username: "jdoe".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid username or password");
        assert!(body.get("user").is_none());
    }
}
