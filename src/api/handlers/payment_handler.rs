//! Hostel fee payments.
//!
//! Admins raise dues; students settle or retry their own. Refunds and
//! failures are recorded by admins.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{Payment, PaymentStatus};
use crate::errors::AppResult;
use crate::services::{NewPayment, PaymentAction};
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    pub user_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than zero"))]
    #[schema(example = 6000.0)]
    pub amount: f64,
    #[validate(length(max = 200))]
    #[schema(example = "November rent")]
    pub description: Option<String>,
    #[schema(example = "2026-11-10")]
    pub due_date: NaiveDate,
}

/// Optional gateway reference recorded with a settlement
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SettlePaymentRequest {
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    /// paid, pending, failed or refunded
    pub status: Option<String>,
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment).get(list_payments))
        .route("/mine", get(my_payments))
        .route("/:id/pay", post(pay))
        .route("/:id/fail", post(fail))
        .route("/:id/refund", post(refund))
        .route("/:id/retry", post(retry))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment due created", body = Payment),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> AppResult<Created<Payment>> {
    require_admin(&user)?;
    let payment = state
        .payment_service
        .create(NewPayment {
            user_id: payload.user_id,
            amount: payload.amount,
            description: payload.description,
            due_date: payload.due_date,
        })
        .await?;
    Ok(Created(payment))
}

#[utoipa::path(
    get,
    path = "/api/payments/mine",
    tag = "Payments",
    responses((status = 200, description = "Caller's payments", body = [Payment])),
    security(("bearer_auth" = []))
)]
pub async fn my_payments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(state.payment_service.my_payments(user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    params(PaymentQuery),
    responses((status = 200, description = "All payments", body = [Payment])),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    require_admin(&user)?;
    let status = parse_param::<PaymentStatus>(query.status)?;
    Ok(Json(state.payment_service.list(status).await?))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/pay",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = SettlePaymentRequest,
    responses(
        (status = 200, description = "Marked paid", body = Payment),
        (status = 409, description = "Payment is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pay(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<SettlePaymentRequest>>,
) -> AppResult<Json<Payment>> {
    let reference = payload.and_then(|Json(body)| body.reference);
    settle(state, user, id, PaymentAction::Pay, reference).await
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/fail",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses((status = 200, description = "Marked failed", body = Payment)),
    security(("bearer_auth" = []))
)]
pub async fn fail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    settle(state, user, id, PaymentAction::Fail, None).await
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Refunded", body = Payment),
        (status = 409, description = "Only paid payments can be refunded")
    ),
    security(("bearer_auth" = []))
)]
pub async fn refund(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    settle(state, user, id, PaymentAction::Refund, None).await
}

/// Put a failed payment back to pending
#[utoipa::path(
    post,
    path = "/api/payments/{id}/retry",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Pending again", body = Payment),
        (status = 409, description = "Payment has not failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn retry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    settle(state, user, id, PaymentAction::Retry, None).await
}

async fn settle(
    state: AppState,
    user: CurrentUser,
    id: Uuid,
    action: PaymentAction,
    reference: Option<String>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .payment_service
        .apply(user.actor(), id, action, reference)
        .await?;
    Ok(Json(payment))
}
