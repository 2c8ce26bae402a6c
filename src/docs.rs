use crate::api::appointment::{
    AppointmentListResponse, AppointmentQuery, AppointmentStatusDto, CreateAppointment,
};
use crate::api::availability::{DayAvailability, Slot};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::schedule::{CreateOffDay, WeeklyScheduleDto};
use crate::auth::handlers::{
    ChangePasswordReqDto, ForgotPasswordReqDto, GoogleLoginReqDto, GoogleRegisterReqDto,
    LoginResponse, ManagerLoginResponse, RegisterReqDto, ResetPasswordReqDto,
};
use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::model::branch::Branch;
use crate::model::customer::Customer;
use crate::model::employee::Employee;
use crate::model::schedule::{SpecificOffDay, WorkingScheduleTemplate};
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booking API",
        version = "1.0.0",
        description = r#"
## Booking & Scheduling Backend

Appointments, employees, customers and auth for a multi-branch service
business.

### Key Features
- **Auth**: local and Google registration, customer login, admin/manager
  login with branch resolution, password change/reset
- **Employees**: CRUD, weekly schedule templates, off-day exceptions
- **Availability**: free-slot lookup per employee and date
- **Appointments**: CRUD with a status lifecycle

Most endpoints are protected with **JWT Bearer authentication**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::register_google,
        crate::auth::handlers::login,
        crate::auth::handlers::login_google,
        crate::auth::handlers::admin_login,
        crate::auth::handlers::change_password,
        crate::auth::handlers::forgot_password,
        crate::auth::handlers::reset_password,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::availability::get_availability,

        crate::api::schedule::get_schedule,
        crate::api::schedule::put_schedule,
        crate::api::schedule::list_off_days,
        crate::api::schedule::add_off_day,
        crate::api::schedule::delete_off_day,

        crate::api::appointment::create_appointment,
        crate::api::appointment::list_appointments,
        crate::api::appointment::get_appointment,
        crate::api::appointment::update_appointment,
        crate::api::appointment::update_status,
        crate::api::appointment::delete_appointment
    ),
    components(
        schemas(
            LoginReqDto,
            RegisterReqDto,
            GoogleRegisterReqDto,
            GoogleLoginReqDto,
            ChangePasswordReqDto,
            ForgotPasswordReqDto,
            ResetPasswordReqDto,
            LoginResponse,
            ManagerLoginResponse,
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Customer,
            Branch,
            WorkingScheduleTemplate,
            WeeklyScheduleDto,
            SpecificOffDay,
            CreateOffDay,
            DayAvailability,
            Slot,
            Appointment,
            AppointmentStatus,
            CreateAppointment,
            AppointmentQuery,
            AppointmentStatusDto,
            AppointmentListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication and account APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Schedule", description = "Schedule template and off-day APIs"),
        (name = "Appointment", description = "Appointment management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
