use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "title": "Combo 5xx",
        "date": "2024-06-10",
        "start_time": "08:00:00",
        "estimated_end_time": "09:00:00",
        "status": "pending",
        "final_price": 99000,
        "customer_id": 1,
        "employee_id": 1,
        "service_id": 1,
        "branch_id": 1,
        "voucher_id": null,
        "feedback_id": null
    })
)]
pub struct Appointment {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Combo 5xx")]
    pub title: String,

    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[schema(example = "08:00:00", value_type = String)]
    pub start_time: NaiveTime,

    #[schema(example = "09:00:00", value_type = String)]
    pub estimated_end_time: NaiveTime,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = 99000)]
    pub final_price: i64,

    #[schema(example = 1)]
    pub customer_id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 1)]
    pub service_id: u64,

    #[schema(example = 1)]
    pub branch_id: u64,

    #[schema(example = 2, nullable = true)]
    pub voucher_id: Option<u64>,

    #[schema(example = 3, nullable = true)]
    pub feedback_id: Option<u64>,

    #[schema(example = "2024-06-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(example = "2024-06-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");

        let parsed: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Cancelled);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<AppointmentStatus>("\"archived\"");
        assert!(parsed.is_err());
    }
}
