use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Success body wrapped as `{"success": true, "data": ...}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
        }
    }

    /// 201, for endpoints that create a row
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::CREATED,
        }
    }

    pub fn envelope(&self) -> Result<Value, serde_json::Error> {
        Ok(json!({
            "success": true,
            "data": serde_json::to_value(&self.data)?,
        }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.envelope() {
            Ok(body) => (self.status_code, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_wraps_data() {
        let response = ApiResponse::created(json!({ "booking_id": 4 }));
        assert_eq!(response.status_code, StatusCode::CREATED);

        let body = response.envelope().unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["booking_id"], 4);
    }

    #[test]
    fn success_is_200() {
        let response = ApiResponse::success(vec![1, 2]).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
