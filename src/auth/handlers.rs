use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, user::User},
    models::LoginReqDto,
    utils::email_cache,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// auth end points

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterReqDto {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@mail.com")]
    pub email: String,
    #[schema(example = "+14155550123")]
    pub phone: Option<String>,
    #[schema(example = "s3cret")]
    pub password: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GoogleRegisterReqDto {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@mail.com")]
    pub email: String,
    #[schema(example = "+14155550123")]
    pub phone: Option<String>,
    #[schema(example = "109876543210987654321")]
    pub google_id: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GoogleLoginReqDto {
    #[schema(example = "109876543210987654321")]
    pub google_id: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ManagerLoginResponse {
    pub access_token: String,
    pub branch_id: u64,
}

struct NewAccount {
    name: String,
    email: String,
    phone: Option<String>,
    password: Option<String>,
    google_id: Option<String>,
}

/// Creates the user row and its linked customer row in one transaction.
/// A failure on either insert rolls back both, so a partial registration
/// can never leave an orphaned user behind.
async fn create_customer_account(
    account: NewAccount,
    pool: &MySqlPool,
) -> Result<u64, HttpResponse> {
    let hashed = match &account.password {
        Some(p) => Some(hash_password(p).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }))
        })?),
        None => None,
    };

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to start registration transaction");
        HttpResponse::InternalServerError().json(json!({
            "error": "Failed to register user"
        }))
    })?;

    let result = sqlx::query(
        r#"INSERT INTO users (email, password, google_id, role_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(&account.email)
    .bind(&hashed)
    .bind(&account.google_id)
    .bind(Role::Customer.id())
    .execute(&mut *tx)
    .await;

    let user_id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Err(HttpResponse::Conflict().json(json!({
                        "error": "Email already exists"
                    })));
                }
            }
            error!(error = %e, "Failed to insert user");
            return Err(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })));
        }
    };

    if let Err(e) =
        sqlx::query(r#"INSERT INTO customers (name, email, phone, user_id) VALUES (?, ?, ?, ?)"#)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.phone)
            .bind(user_id)
            .execute(&mut *tx)
            .await
    {
        error!(error = %e, user_id, "Failed to insert customer, rolling back user");
        return Err(HttpResponse::InternalServerError().json(json!({
            "error": "Failed to register user"
        })));
    }

    if let Err(e) = tx.commit().await {
        error!(error = %e, "Failed to commit registration");
        return Err(HttpResponse::InternalServerError().json(json!({
            "error": "Failed to register user"
        })));
    }

    email_cache::mark_taken(&account.email).await;
    Ok(user_id)
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.to_lowercase();

    // Fast positive from the in-memory cache
    if email_cache::is_taken(&email).await {
        return false;
    }

    // Database fallback
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)")
            .bind(&email)
            .fetch_one(pool)
            .await
            .unwrap_or(true); // fail-safe

    !exists
}

/// Local registration: creates the login user plus its customer profile
/// and returns a signed access token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    body: web::Json<RegisterReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Name, email and password must not be empty"
        }));
    }
    if !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({
            "error": "Invalid email"
        }));
    }

    // Fail fast before any write
    if !is_email_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Email already exists"
        }));
    }

    let account = NewAccount {
        name: name.to_string(),
        email: email.clone(),
        phone: body.phone.clone(),
        password: Some(body.password.clone()),
        google_id: None,
    };

    match create_customer_account(account, pool.get_ref()).await {
        Ok(user_id) => {
            info!(user_id, "Customer registered");
            let access_token = generate_access_token(
                user_id,
                email,
                Role::Customer.id(),
                &config.jwt_secret,
                config.access_token_ttl,
            );
            HttpResponse::Created().json(LoginResponse { access_token })
        }
        Err(err_resp) => err_resp,
    }
}

/// OAuth registration: same flow as local registration but stores the
/// Google subject id instead of a password hash.
#[utoipa::path(
    post,
    path = "/auth/register/google",
    request_body = GoogleRegisterReqDto,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register_google(
    body: web::Json<GoogleRegisterReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || body.google_id.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Name, email and google id must not be empty"
        }));
    }

    if !is_email_available(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Email already exists"
        }));
    }

    let account = NewAccount {
        name: name.to_string(),
        email: email.clone(),
        phone: body.phone.clone(),
        password: None,
        google_id: Some(body.google_id.clone()),
    };

    match create_customer_account(account, pool.get_ref()).await {
        Ok(user_id) => {
            info!(user_id, "Customer registered via Google");
            let access_token = generate_access_token(
                user_id,
                email,
                Role::Customer.id(),
                &config.jwt_secret,
                config.access_token_ttl,
            );
            HttpResponse::Created().json(LoginResponse { access_token })
        }
        Err(err_resp) => err_resp,
    }
}

async fn fetch_user_by_email(email: &str, pool: &MySqlPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, google_id, role_id
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Customer login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password are required"
        }));
    }

    debug!("Fetching user from database");

    let db_user = match fetch_user_by_email(user.email.trim(), pool.get_ref()).await {
        Ok(Some(u)) => {
            debug!(user_id = u.id, "User found");
            u
        }
        Ok(None) => {
            info!("User not found");
            return HttpResponse::Unauthorized().json(json!({"error": "User not found"}));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // OAuth-only accounts carry no hash and cannot log in with a password
    let hashed = match &db_user.password {
        Some(h) => h,
        None => {
            info!("Password login attempted on OAuth-only account");
            return HttpResponse::Unauthorized().json(json!({"error": "Invalid password"}));
        }
    };

    if let Err(e) = verify_password(&user.password, hashed) {
        info!(error = %e, "Password mismatch");
        return HttpResponse::Unauthorized().json(json!({"error": "Invalid password"}));
    }

    debug!("Password verified");

    let access_token = generate_access_token(
        db_user.id,
        db_user.email,
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse { access_token })
}

/// Login with a verified Google profile
#[utoipa::path(
    post,
    path = "/auth/login/google",
    request_body = GoogleLoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Unknown Google account"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login_google(
    body: web::Json<GoogleLoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    if body.google_id.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Google id is required"}));
    }

    let db_user = match sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, google_id, role_id
        FROM users
        WHERE google_id = ?
        "#,
    )
    .bind(&body.google_id)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(json!({"error": "Unauthenticated"}));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user by google id");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let access_token = generate_access_token(
        db_user.id,
        db_user.email,
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(LoginResponse { access_token })
}

/// Admin/manager login. Managers additionally get the id of the branch
/// they are assigned to.
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = ManagerLoginResponse),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 403, description = "Not an admin or manager"),
        (status = 404, description = "Manager has no branch assigned"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn admin_login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    if user.email.trim().is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Email and password are required"
        }));
    }

    let db_user = match fetch_user_by_email(user.email.trim(), pool.get_ref()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(json!({"error": "User not found"}));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let hashed = match &db_user.password {
        Some(h) => h,
        None => return HttpResponse::Unauthorized().json(json!({"error": "Invalid password"})),
    };
    if verify_password(&user.password, hashed).is_err() {
        return HttpResponse::Unauthorized().json(json!({"error": "Invalid password"}));
    }

    let role = match Role::from_id(db_user.role_id) {
        Some(r) => r,
        None => return HttpResponse::Unauthorized().json(json!({"error": "Invalid role"})),
    };

    match role {
        Role::Admin => {
            let access_token = generate_access_token(
                db_user.id,
                db_user.email,
                db_user.role_id,
                &config.jwt_secret,
                config.access_token_ttl,
            );
            HttpResponse::Ok().json(LoginResponse { access_token })
        }
        Role::Manager => {
            let branch_id = match sqlx::query_scalar::<_, u64>(
                "SELECT id FROM branches WHERE manager_id = ?",
            )
            .bind(db_user.id)
            .fetch_optional(pool.get_ref())
            .await
            {
                Ok(Some(id)) => id,
                Ok(None) => {
                    info!(user_id = db_user.id, "Manager without assigned branch");
                    return HttpResponse::NotFound().json(json!({
                        "error": "No branch assigned to this manager"
                    }));
                }
                Err(e) => {
                    error!(error = %e, "Database error while resolving branch");
                    return HttpResponse::InternalServerError().finish();
                }
            };

            let access_token = generate_access_token(
                db_user.id,
                db_user.email,
                db_user.role_id,
                &config.jwt_secret,
                config.access_token_ttl,
            );
            HttpResponse::Ok().json(ManagerLoginResponse {
                access_token,
                branch_id,
            })
        }
        _ => HttpResponse::Forbidden().json(json!({"error": "Admin/Manager only"})),
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordReqDto {
    pub current_password: String,
    pub new_password: String,
}

/// Change the authenticated user's password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordReqDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is wrong"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    auth: AuthUser,
    body: web::Json<ChangePasswordReqDto>,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    if body.new_password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "New password must not be empty"
        })));
    }

    let current_hash = sqlx::query_scalar::<_, Option<String>>(
        "SELECT password FROM users WHERE id = ?",
    )
    .bind(auth.user_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch password hash");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current_hash = match current_hash {
        Some(h) => h,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Account has no password set"
            })));
        }
    };

    if verify_password(&body.current_password, &current_hash).is_err() {
        return Ok(HttpResponse::Unauthorized().json(json!({
            "error": "Invalid password"
        })));
    }

    let new_hash = hash_password(&body.new_password).map_err(|e| {
        error!(error = %e, "Failed to hash new password");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to update password");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    info!(user_id = auth.user_id, "Password changed");
    Ok(HttpResponse::Ok().json(json!({"message": "Password changed"})))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ForgotPasswordReqDto {
    #[schema(example = "jane.doe@mail.com")]
    pub email: String,
}

/// Start a password reset. The response is the same whether or not the
/// email exists; mail delivery is handled out of process.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordReqDto,
    responses(
        (status = 200, description = "Reset requested"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    body: web::Json<ForgotPasswordReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let generic = HttpResponse::Ok().json(json!({
        "message": "If the account exists, a reset link has been sent"
    }));

    let user = match fetch_user_by_email(body.email.trim(), pool.get_ref()).await {
        Ok(Some(u)) => u,
        Ok(None) => return generic,
        Err(e) => {
            error!(error = %e, "Database error during forgot-password");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let token = Uuid::new_v4().to_string();

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO password_resets (user_id, token, expires_at)
        VALUES (?, ?, DATE_ADD(NOW(), INTERVAL ? SECOND))
        "#,
    )
    .bind(user.id)
    .bind(&token)
    .bind(config.reset_token_ttl as u64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, user_id = user.id, "Failed to store reset token");
        return HttpResponse::InternalServerError().finish();
    }

    info!(user_id = user.id, %token, "Password reset token issued");
    generic
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordReqDto {
    pub token: String,
    pub new_password: String,
}

/// Complete a password reset with a previously issued token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordReqDto,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    body: web::Json<ResetPasswordReqDto>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    if body.new_password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "New password must not be empty"
        }));
    }

    let record = match sqlx::query_as::<_, (u64, u64)>(
        r#"
        SELECT id, user_id
        FROM password_resets
        WHERE token = ? AND used = 0 AND expires_at > NOW()
        "#,
    )
    .bind(&body.token)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(r)) => r,
        Ok(None) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Invalid or expired token"
            }));
        }
        Err(e) => {
            error!(error = %e, "Database error during reset-password");
            return HttpResponse::InternalServerError().finish();
        }
    };
    let (reset_id, user_id) = record;

    let new_hash = match hash_password(&body.new_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash new password");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            error!(error = %e, "Failed to start reset transaction");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let updated = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await;
    let marked = sqlx::query("UPDATE password_resets SET used = 1 WHERE id = ?")
        .bind(reset_id)
        .execute(&mut *tx)
        .await;

    if updated.is_err() || marked.is_err() || tx.commit().await.is_err() {
        error!(user_id, "Failed to apply password reset");
        return HttpResponse::InternalServerError().finish();
    }

    info!(user_id, "Password reset completed");
    HttpResponse::Ok().json(json!({"message": "Password reset"}))
}
