use axum::{Json, extract::State, http::StatusCode, response::{IntoResponse, Response}};
use std::sync::Arc;

use crate::{
    deploy::{self, DeploymentError, SiteDeployer},
    groq::GroqClient,
    models::{DeployRequest, DeployResponse, ErrorResponse, GenerateResponse, GenerationRequest},
};

#[derive(Clone)]
pub struct AppState {
    pub groq: Arc<GroqClient>,
}

pub async fn generate_site(State(state): State<AppState>, Json(body): Json<GenerationRequest>) -> Response {
    let who = if body.business_name.is_empty() { &body.name } else { &body.business_name };
    tracing::info!("🚀 Generating website for: {}", who);

    match state.groq.generate_site(&body).await {
        Ok(code) => {
            tracing::info!("✅ Website generated ({} chars)", code.len());
            Json(GenerateResponse { code }).into_response()
        }
        Err(e) => {
            tracing::error!("❌ Website generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to generate website".to_string(),
                    details: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

pub async fn deploy_site(Json(body): Json<DeployRequest>) -> Response {
    // Parameter checks run before the S3 client is built, so a bad request
    // never reaches the network.
    let result = async {
        deploy::validate_markup(&body.code)?;
        let deployer = SiteDeployer::from_env().await?;
        deployer.deploy(&body.code, body.folder_name.as_deref()).await
    }
    .await;

    match result {
        Ok(url) => Json(DeployResponse { url }).into_response(),
        Err(e) => {
            tracing::error!("❌ Deployment failed: {}", e);
            let status = match &e {
                DeploymentError::MissingParameter(_) => StatusCode::BAD_REQUEST,
                DeploymentError::BucketAccess(..) => StatusCode::BAD_GATEWAY,
                DeploymentError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse { error: e.to_string(), details: None })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn upstream_failure_maps_to_500_json_error() {
        let state = AppState {
            groq: Arc::new(GroqClient::with_base_url("test-key".into(), "http://127.0.0.1:9".into())),
        };

        let response = generate_site(State(state), Json(GenerationRequest::default())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Failed to generate website");
        assert!(body["details"].is_string());
    }
}
