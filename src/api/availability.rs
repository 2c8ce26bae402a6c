use crate::config::Config;
use crate::model::schedule::WorkingScheduleTemplate;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Target date (YYYY-MM-DD)
    #[param(example = "2024-06-10", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Slot {
    #[schema(example = "09:00:00", value_type = String)]
    pub start: NaiveTime,
    #[schema(example = "09:30:00", value_type = String)]
    pub end: NaiveTime,
}

/// Outcome of an availability lookup. A day off is a regular answer,
/// not an error; "no template at all" is reported as a client error by
/// the handler instead.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayAvailability {
    DayOff,
    Open { free_slots: Vec<Slot> },
}

#[derive(Debug, PartialEq)]
pub enum DayOutcome {
    NotAvailable,
    DayOff,
    Working,
}

/// Template + exception resolution for one employee/date.
pub fn resolve_day(
    template: Option<&WorkingScheduleTemplate>,
    date: NaiveDate,
    has_off_day: bool,
) -> DayOutcome {
    let template = match template {
        Some(t) => t,
        None => return DayOutcome::NotAvailable,
    };

    if has_off_day || !template.works_on(date.weekday()) {
        return DayOutcome::DayOff;
    }

    DayOutcome::Working
}

/// Candidate slots of `slot_minutes` inside `[open, close)`, minus any
/// slot overlapping a busy interval.
pub fn free_slots(
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
    busy: &[(NaiveTime, NaiveTime)],
) -> Vec<Slot> {
    if slot_minutes == 0 || open >= close {
        return Vec::new();
    }

    let step = Duration::minutes(slot_minutes as i64);
    let mut slots = Vec::new();
    let mut cursor = open;

    loop {
        // NaiveTime arithmetic wraps at midnight; a wrap means we ran
        // past the end of the day
        let (end, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 || end > close {
            break;
        }

        let overlaps = busy.iter().any(|&(b_start, b_end)| cursor < b_end && b_start < end);
        if !overlaps {
            slots.push(Slot { start: cursor, end });
        }

        cursor = end;
    }

    slots
}

/// Employee availability for one date: schedule template, off-day
/// exceptions, then free slots computed against existing appointments.
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/availability",
    params(
        ("employee_id", Path, description = "Employee ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Day off or open with free slots", body = DayAvailability),
        (status = 400, description = "Employee has no schedule template"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_availability(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<AvailabilityQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let date = query.date;

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
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let has_off_day = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM specific_off_days WHERE employee_id = ? AND date = ?)",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch off-days");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match resolve_day(template.as_ref(), date, has_off_day) {
        DayOutcome::NotAvailable => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Employee not available"
        }))),
        DayOutcome::DayOff => Ok(HttpResponse::Ok().json(DayAvailability::DayOff)),
        DayOutcome::Working => {
            let busy = sqlx::query_as::<_, (NaiveTime, NaiveTime)>(
                r#"
                SELECT start_time, estimated_end_time
                FROM appointments
                WHERE employee_id = ? AND date = ? AND status <> 'cancelled'
                "#,
            )
            .bind(employee_id)
            .bind(date)
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Failed to fetch appointments");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            let open = parse_window(&config.booking_day_start)?;
            let close = parse_window(&config.booking_day_end)?;

            let slots = free_slots(open, close, config.slot_minutes, &busy);
            Ok(HttpResponse::Ok().json(DayAvailability::Open { free_slots: slots }))
        }
    }
}

fn parse_window(value: &str) -> actix_web::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        error!(error = %e, value, "Invalid booking window configuration");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_days(working: bool) -> WorkingScheduleTemplate {
        WorkingScheduleTemplate {
            employee_id: 1,
            monday: working,
            tuesday: working,
            wednesday: working,
            thursday: working,
            friday: working,
            saturday: working,
            sunday: working,
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn missing_template_means_not_available() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(resolve_day(None, date, false), DayOutcome::NotAvailable);
        // the off-day exception does not change the outcome
        assert_eq!(resolve_day(None, date, true), DayOutcome::NotAvailable);
    }

    #[test]
    fn off_day_overrides_a_working_flag() {
        let template = all_days(true);
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(resolve_day(Some(&template), date, true), DayOutcome::DayOff);
    }

    #[test]
    fn non_working_flag_means_day_off() {
        let template = all_days(false);
        // one date per weekday: 2024-06-10 (Mon) .. 2024-06-16 (Sun)
        for day in 10..=16 {
            let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
            assert_eq!(
                resolve_day(Some(&template), date, false),
                DayOutcome::DayOff
            );
        }
    }

    #[test]
    fn monday_flag_opens_a_monday() {
        // 2024-06-10 is a Monday; only the monday flag is set
        let mut template = all_days(false);
        template.monday = true;

        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(
            resolve_day(Some(&template), monday, false),
            DayOutcome::Working
        );

        // the other six days of that week stay off
        for day in 11..=16 {
            let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
            assert_eq!(
                resolve_day(Some(&template), date, false),
                DayOutcome::DayOff
            );
        }
    }

    #[test]
    fn free_slots_fill_an_empty_day() {
        let slots = free_slots(t(9, 0), t(11, 0), 30, &[]);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start, t(9, 0));
        assert_eq!(slots[3].end, t(11, 0));
    }

    #[test]
    fn overlapping_appointments_remove_slots() {
        let busy = vec![(t(9, 30), t(10, 30))];
        let slots = free_slots(t(9, 0), t(11, 0), 30, &busy);

        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t(9, 0), t(10, 30)]);
    }

    #[test]
    fn appointment_touching_a_slot_boundary_does_not_block_it() {
        let busy = vec![(t(10, 0), t(10, 30))];
        let slots = free_slots(t(9, 0), t(11, 0), 30, &busy);

        let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![t(9, 0), t(9, 30), t(10, 30)]);
    }

    #[test]
    fn degenerate_windows_yield_no_slots() {
        assert!(free_slots(t(9, 0), t(9, 0), 30, &[]).is_empty());
        assert!(free_slots(t(11, 0), t(9, 0), 30, &[]).is_empty());
        assert!(free_slots(t(9, 0), t(11, 0), 0, &[]).is_empty());
    }

    #[test]
    fn day_off_serializes_as_tagged_status() {
        let json = serde_json::to_value(DayAvailability::DayOff).unwrap();
        assert_eq!(json["status"], "day_off");

        let open = DayAvailability::Open {
            free_slots: free_slots(t(9, 0), t(10, 0), 30, &[]),
        };
        let json = serde_json::to_value(open).unwrap();
        assert_eq!(json["status"], "open");
        assert_eq!(json["free_slots"].as_array().unwrap().len(), 2);
    }
}
