use std::sync::Arc;

use axum::extract::State;

use super::dto::{OptimizeRequest, OptimizeResponse};
use crate::application::OptimizerService;
use crate::interfaces::http::common::{ok, ApiResponse, ApiResult, ValidatedJson};

#[utoipa::path(
    post,
    path = "/api/ai/optimize",
    tag = "AI",
    request_body = OptimizeRequest,
    responses(
        (status = 200, description = "Optimization report", body = ApiResponse<OptimizeResponse>),
        (status = 500, description = "Server AI API key not configured"),
        (status = 502, description = "AI service error or empty answer")
    )
)]
pub async fn optimize(
    State(optimizer): State<Arc<OptimizerService>>,
    ValidatedJson(request): ValidatedJson<OptimizeRequest>,
) -> ApiResult<OptimizeResponse> {
    let text = optimizer.optimize(&request.into()).await?;
    ok(OptimizeResponse { text })
}
