use crate::{
    api::{appointment, availability, employee, schedule},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/login/google")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login_google)),
            )
            .service(
                web::resource("/admin/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::admin_login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/register/google")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register_google)),
            )
            .service(
                web::resource("/forgot-password")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::forgot_password)),
            )
            .service(
                web::resource("/reset-password")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::reset_password)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(
                web::resource("/auth/change-password")
                    .route(web::post().to(handlers::change_password)),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{id}/availability
                    .service(
                        web::resource("/{id}/availability")
                            .route(web::get().to(availability::get_availability)),
                    )
                    // /employees/{id}/schedule
                    .service(
                        web::resource("/{id}/schedule")
                            .route(web::get().to(schedule::get_schedule))
                            .route(web::put().to(schedule::put_schedule)),
                    )
                    // /employees/{id}/off-days
                    .service(
                        web::resource("/{id}/off-days")
                            .route(web::get().to(schedule::list_off_days))
                            .route(web::post().to(schedule::add_off_day)),
                    )
                    // /employees/{id}/off-days/{off_day_id}
                    .service(
                        web::resource("/{id}/off-days/{off_day_id}")
                            .route(web::delete().to(schedule::delete_off_day)),
                    ),
            )
            .service(
                web::scope("/appointments")
                    // /appointments
                    .service(
                        web::resource("")
                            .route(web::post().to(appointment::create_appointment))
                            .route(web::get().to(appointment::list_appointments)),
                    )
                    // /appointments/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(appointment::get_appointment))
                            .route(web::put().to(appointment::update_appointment))
                            .route(web::delete().to(appointment::delete_appointment)),
                    )
                    // /appointments/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(appointment::update_status)),
                    ),
            ),
    );
}
