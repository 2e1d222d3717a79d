use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Used by the hosting platform's liveness probe. Returns 200 with an empty
/// body; the mailing-list provider is not contacted.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
