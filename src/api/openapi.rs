use utoipa::OpenApi;

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::register::register,
        handlers::passkey::verify_passkey,
        handlers::login::login,
        handlers::session::session,
        handlers::session::logout,
        handlers::teams::teams,
        handlers::checkin::checkin,
    ),
    components(schemas(
        handlers::register::TeamRegister,
        handlers::register::RegisterResponse,
        handlers::passkey::PasskeyVerify,
        handlers::login::AdminLogin,
        handlers::session::SessionResponse,
        handlers::teams::Team,
        handlers::checkin::CheckinRequest,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "register", description = "Team registration"),
        (name = "admin", description = "Admin console: passkey gate, login, teams, check-in"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
