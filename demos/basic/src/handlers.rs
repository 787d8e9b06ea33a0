use actix_web::HttpResponse;

/// Liveness probe.
pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().finish()
}
