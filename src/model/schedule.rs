use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Recurring weekly default of working days for one employee.
/// Created all-false when the employee is created.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": 1,
        "monday": true,
        "tuesday": true,
        "wednesday": true,
        "thursday": true,
        "friday": true,
        "saturday": false,
        "sunday": false
    })
)]
pub struct WorkingScheduleTemplate {
    pub employee_id: u64,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WorkingScheduleTemplate {
    pub fn works_on(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

/// One-off exception date overriding the weekly template.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SpecificOffDay {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn template_with(day: Weekday) -> WorkingScheduleTemplate {
        WorkingScheduleTemplate {
            employee_id: 1,
            monday: day == Weekday::Mon,
            tuesday: day == Weekday::Tue,
            wednesday: day == Weekday::Wed,
            thursday: day == Weekday::Thu,
            friday: day == Weekday::Fri,
            saturday: day == Weekday::Sat,
            sunday: day == Weekday::Sun,
        }
    }

    #[test]
    fn each_weekday_maps_to_its_own_flag() {
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];

        for &working_day in &days {
            let template = template_with(working_day);
            for &day in &days {
                assert_eq!(template.works_on(day), day == working_day);
            }
        }
    }

    #[test]
    fn calendar_dates_hit_the_expected_flag() {
        // 2024-06-09 is a Sunday; the following week covers all seven flags
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);

        let template = template_with(Weekday::Mon);
        assert!(!template.works_on(sunday.weekday()));
        assert!(template.works_on(sunday.succ_opt().unwrap().weekday()));
    }
}
