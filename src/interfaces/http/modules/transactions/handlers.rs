//! Transaction and wallet handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension,
};

use super::dto::{
    BalanceDto, PaymentSummaryDto, ProcessPaymentRequest, TopupDto, TopupRequest, TransactionDto,
};
use crate::application::PaymentService;
use crate::domain::UserRole;
use crate::interfaces::http::common::{
    created, ok, ApiResponse, ApiResult, Created, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

const ANY_ROLE: [UserRole; 3] = [UserRole::User, UserRole::Operator, UserRole::Admin];
const DRIVER_OR_ADMIN: [UserRole; 2] = [UserRole::User, UserRole::Admin];

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Transactions visible to the caller, newest first", body = ApiResponse<Vec<TransactionDto>>))
)]
pub async fn list_transactions(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<TransactionDto>> {
    let actor = user.require(&ANY_ROLE)?;
    let txs = payments.list(&actor).await?;
    ok(txs.into_iter().map(TransactionDto::from).collect())
}

/// Same listing as `GET /api/transactions`; the path id is not consulted.
#[utoipa::path(
    get,
    path = "/api/transactions/user/{user_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Transactions visible to the caller", body = ApiResponse<Vec<TransactionDto>>))
)]
pub async fn list_user_transactions(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(_user_id): Path<String>,
) -> ApiResult<Vec<TransactionDto>> {
    list_transactions(State(payments), Extension(user)).await
}

#[utoipa::path(
    post,
    path = "/api/transactions/process",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    request_body = ProcessPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<TransactionDto>),
        (status = 400, description = "Invalid amount, type or session")
    )
)]
pub async fn process_payment(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<ProcessPaymentRequest>,
) -> Created<TransactionDto> {
    let actor = user.require(&[UserRole::User])?;
    created(payments.process(&actor, request.into()).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/transactions/wallet/balance/{user_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Wallet balance", body = ApiResponse<BalanceDto>),
        (status = 403, description = "Another user's wallet")
    )
)]
pub async fn wallet_balance(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<BalanceDto> {
    let actor = user.require(&DRIVER_OR_ADMIN)?;
    let balance = payments.balance(&actor, &user_id).await?;
    ok(BalanceDto { balance })
}

#[utoipa::path(
    post,
    path = "/api/transactions/wallet/topup",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    request_body = TopupRequest,
    responses(
        (status = 201, description = "Wallet topped up", body = ApiResponse<TopupDto>),
        (status = 400, description = "Amount must be positive")
    )
)]
pub async fn wallet_topup(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<TopupRequest>,
) -> Created<TopupDto> {
    let actor = user.require(&[UserRole::User])?;
    let result = payments.topup(&actor, request.into()).await?;
    created(result.into())
}

#[utoipa::path(
    get,
    path = "/api/transactions/summary/{user_id}",
    tag = "Transactions",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Spending summary", body = ApiResponse<PaymentSummaryDto>))
)]
pub async fn payment_summary(
    State(payments): State<Arc<PaymentService>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> ApiResult<PaymentSummaryDto> {
    let actor = user.require(&DRIVER_OR_ADMIN)?;
    ok(payments.summary(&actor, &user_id).await?.into())
}
