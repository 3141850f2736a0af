use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use tracing::debug;

use super::attributes::is_fillable;
use super::model::User;

/// JSON object body reduced to the fillable attributes.
#[derive(Debug)]
pub struct FillableJson(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for FillableJson
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;

        let Value::Object(map) = body else {
            return Err((StatusCode::BAD_REQUEST, "Expected a JSON object".into()));
        };

        let (kept, dropped): (Map<String, Value>, Map<String, Value>) =
            map.into_iter().partition(|(k, _)| is_fillable(k));
        if !dropped.is_empty() {
            let keys: Vec<&String> = dropped.keys().collect();
            debug!(dropped = ?keys, "non-fillable keys stripped from request body");
        }

        Ok(FillableJson(kept))
    }
}

impl IntoResponse for User {
    fn into_response(self) -> Response {
        Json(self.attributes()).into_response()
    }
}
