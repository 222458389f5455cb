pub mod status;
pub mod webhook;

#[cfg(test)]
mod webhook_http_tests;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook", web::post().to(webhook::receive_webhook))
        .route("/health", web::get().to(status::health))
        .route("/status", web::get().to(status::status));
}
