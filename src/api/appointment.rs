use crate::{
    model::appointment::{Appointment, AppointmentStatus},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

// status changes go through the dedicated status endpoint
const UPDATABLE_COLUMNS: &[&str] = &[
    "title",
    "date",
    "start_time",
    "estimated_end_time",
    "final_price",
    "employee_id",
    "service_id",
    "branch_id",
    "voucher_id",
    "feedback_id",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateAppointment {
    #[schema(example = "Combo 5xx")]
    pub title: String,
    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "08:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "09:00:00", value_type = String)]
    pub estimated_end_time: NaiveTime,
    #[schema(example = "pending")]
    pub status: Option<AppointmentStatus>,
    #[schema(example = 99000)]
    pub final_price: i64,
    #[schema(example = 1)]
    pub employee_id: u64,
    /// Customer's user id
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub service_id: u64,
    #[schema(example = 1)]
    pub branch_id: u64,
    #[schema(example = 2, nullable = true)]
    pub voucher_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct AppointmentStatusDto {
    #[schema(example = "confirmed")]
    pub status: AppointmentStatus,
    #[schema(example = 99000, nullable = true)]
    pub final_price: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppointmentQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    pub customer_id: Option<u64>,
    pub branch_id: Option<u64>,
    #[schema(value_type = String)]
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentListResponse {
    pub data: Vec<Appointment>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

const SELECT_COLUMNS: &str = "id, title, date, start_time, estimated_end_time, status, \
     final_price, customer_id, employee_id, service_id, branch_id, voucher_id, feedback_id, \
     created_at, updated_at";

/// Create Appointment. The booking customer is resolved from the
/// caller-supplied user id.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment created"),
        (status = 400, description = "No customer profile for the given user"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn create_appointment(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAppointment>,
) -> actix_web::Result<impl Responder> {
    let customer_id =
        sqlx::query_scalar::<_, u64>("SELECT id FROM customers WHERE user_id = ?")
            .bind(payload.user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = payload.user_id, "Failed to resolve customer");
                ErrorInternalServerError("Internal Server Error")
            })?;

    let customer_id = match customer_id {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "No customer profile for the given user"
            })));
        }
    };

    let status = payload.status.unwrap_or(AppointmentStatus::Pending);

    let result = sqlx::query(
        r#"
        INSERT INTO appointments
        (title, date, start_time, estimated_end_time, status, final_price,
         customer_id, employee_id, service_id, branch_id, voucher_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.title)
    .bind(payload.date)
    .bind(payload.start_time)
    .bind(payload.estimated_end_time)
    .bind(status.as_str())
    .bind(payload.final_price)
    .bind(customer_id)
    .bind(payload.employee_id)
    .bind(payload.service_id)
    .bind(payload.branch_id)
    .bind(payload.voucher_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create appointment");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Appointment created successfully"
    })))
}

/// List appointments with pagination and filters
#[utoipa::path(
    get,
    path = "/api/appointments",
    params(
        ("page",  Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("employee_id", Query, description = "Filter by employee"),
        ("customer_id", Query, description = "Filter by customer"),
        ("branch_id", Query, description = "Filter by branch"),
        ("date", Query, description = "Filter by date"),
        ("status", Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Paginated appointment list", body = AppointmentListResponse)
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    pool: web::Data<MySqlPool>,
    query: web::Query<AppointmentQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.into());
    }
    if let Some(customer_id) = query.customer_id {
        conditions.push("customer_id = ?");
        bindings.push(customer_id.into());
    }
    if let Some(branch_id) = query.branch_id {
        conditions.push("branch_id = ?");
        bindings.push(branch_id.into());
    }
    if let Some(date) = query.date {
        conditions.push("date = ?");
        bindings.push(date.to_string().into());
    }
    if let Some(status) = query.status {
        conditions.push("status = ?");
        bindings.push(status.as_str().into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) as total FROM appointments {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting appointments");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count appointments");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM appointments {} ORDER BY date DESC, start_time DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS, where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching appointments");

    let mut data_query = sqlx::query_as::<_, Appointment>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let appointments = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch appointments");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(AppointmentListResponse {
        data: appointments,
        page,
        per_page,
        total,
    }))
}

/// Get Appointment by ID
#[utoipa::path(
    get,
    path = "/api/appointments/{appointment_id}",
    params(
        ("appointment_id", Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment found", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn get_appointment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let appointment_id = path.into_inner();

    let sql = format!("SELECT {} FROM appointments WHERE id = ?", SELECT_COLUMNS);
    let appointment = sqlx::query_as::<_, Appointment>(&sql)
        .bind(appointment_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, appointment_id, "Failed to fetch appointment");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match appointment {
        Some(a) => Ok(HttpResponse::Ok().json(a)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Appointment not found"
        }))),
    }
}

/// Update Appointment
#[utoipa::path(
    put,
    path = "/api/appointments/{appointment_id}",
    params(
        ("appointment_id", Path, description = "Appointment ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Appointment updated successfully"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn update_appointment(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let appointment_id = path.into_inner();

    let update = build_update_sql(
        "appointments",
        UPDATABLE_COLUMNS,
        &body,
        "id",
        appointment_id,
    )?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Appointment not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Appointment updated successfully"
    })))
}

/// Set the appointment status (pending/confirmed/completed/cancelled),
/// optionally with the final price.
#[utoipa::path(
    put,
    path = "/api/appointments/{appointment_id}/status",
    params(
        ("appointment_id", Path, description = "Appointment ID")
    ),
    request_body = AppointmentStatusDto,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<AppointmentStatusDto>,
) -> actix_web::Result<impl Responder> {
    let appointment_id = path.into_inner();

    let result = match body.final_price {
        Some(price) => {
            sqlx::query("UPDATE appointments SET status = ?, final_price = ? WHERE id = ?")
                .bind(body.status.as_str())
                .bind(price)
                .bind(appointment_id)
                .execute(pool.get_ref())
                .await
        }
        None => {
            sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
                .bind(body.status.as_str())
                .bind(appointment_id)
                .execute(pool.get_ref())
                .await
        }
    }
    .map_err(|e| {
        error!(error = %e, appointment_id, "Failed to update appointment status");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Appointment not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Status updated"
    })))
}

/// Delete Appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{appointment_id}",
    params(
        ("appointment_id", Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Appointment",
    security(("bearer_auth" = []))
)]
pub async fn delete_appointment(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let appointment_id = path.into_inner();

    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(appointment_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Appointment not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }
        Err(e) => {
            error!(error = %e, appointment_id, "Failed to delete appointment");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}
