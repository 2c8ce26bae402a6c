use crate::{
    auth::auth::AuthUser,
    model::schedule::{SpecificOffDay, WorkingScheduleTemplate},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct WeeklyScheduleDto {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateOffDay {
    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub date: NaiveDate,
}

async fn employee_exists(employee_id: u64, pool: &MySqlPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(employee_id)
        .fetch_one(pool)
        .await
}

/// Get the weekly schedule template of an employee
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/schedule",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Weekly template", body = WorkingScheduleTemplate),
        (status = 404, description = "No template stored"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule",
    security(("bearer_auth" = []))
)]
pub async fn get_schedule(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let template = sqlx::query_as::<_, WorkingScheduleTemplate>(
        r#"
        SELECT employee_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday
        FROM working_schedule_templates
        WHERE employee_id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch schedule template");
        ErrorInternalServerError("Internal Server Error")
    })?;

    match template {
        Some(t) => Ok(HttpResponse::Ok().json(t)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No schedule template for this employee"
        }))),
    }
}

/// Replace the weekly schedule template of an employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}/schedule",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = WeeklyScheduleDto,
    responses(
        (status = 200, description = "Template stored"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule",
    security(("bearer_auth" = []))
)]
pub async fn put_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<WeeklyScheduleDto>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_manager()?;

    let employee_id = path.into_inner();

    let exists = employee_exists(employee_id, pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to check employee");
            ErrorInternalServerError("Internal Server Error")
        })?;
    if !exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO working_schedule_templates
        (employee_id, monday, tuesday, wednesday, thursday, friday, saturday, sunday)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            monday = VALUES(monday),
            tuesday = VALUES(tuesday),
            wednesday = VALUES(wednesday),
            thursday = VALUES(thursday),
            friday = VALUES(friday),
            saturday = VALUES(saturday),
            sunday = VALUES(sunday)
        "#,
    )
    .bind(employee_id)
    .bind(body.monday)
    .bind(body.tuesday)
    .bind(body.wednesday)
    .bind(body.thursday)
    .bind(body.friday)
    .bind(body.saturday)
    .bind(body.sunday)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to upsert schedule template");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Schedule template stored"
    })))
}

/// List the off-day exceptions of an employee
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/off-days",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Off-day list", body = [SpecificOffDay]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule",
    security(("bearer_auth" = []))
)]
pub async fn list_off_days(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let off_days = sqlx::query_as::<_, SpecificOffDay>(
        r#"
        SELECT id, employee_id, date
        FROM specific_off_days
        WHERE employee_id = ?
        ORDER BY date
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch off-days");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(off_days))
}

/// Add an off-day exception for an employee
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/off-days",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = CreateOffDay,
    responses(
        (status = 201, description = "Off-day added"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Off-day already recorded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule",
    security(("bearer_auth" = []))
)]
pub async fn add_off_day(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<CreateOffDay>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_manager()?;

    let employee_id = path.into_inner();

    let exists = employee_exists(employee_id, pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to check employee");
            ErrorInternalServerError("Internal Server Error")
        })?;
    if !exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let result = sqlx::query("INSERT INTO specific_off_days (employee_id, date) VALUES (?, ?)")
        .bind(employee_id)
        .bind(body.date)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "id": res.last_insert_id(),
            "message": "Off-day added"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Off-day already recorded for this date"
                    })));
                }
            }
            error!(error = %e, employee_id, "Failed to add off-day");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Remove an off-day exception
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}/off-days/{off_day_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("off_day_id", Path, description = "Off-day ID")
    ),
    responses(
        (status = 200, description = "Off-day removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Off-day not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedule",
    security(("bearer_auth" = []))
)]
pub async fn delete_off_day(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, u64)>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_manager()?;

    let (employee_id, off_day_id) = path.into_inner();

    let result = sqlx::query("DELETE FROM specific_off_days WHERE id = ? AND employee_id = ?")
        .bind(off_day_id)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, off_day_id, "Failed to delete off-day");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Off-day not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Off-day removed"
    })))
}
