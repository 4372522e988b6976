//! Web app manifest route handler.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Serve the web app manifest.
pub async fn webmanifest() -> Response {
    let manifest = serde_json::json!({
        "name": "LiteShop",
        "short_name": "LiteShop",
        "start_url": "/",
        "display": "standalone",
        "theme_color": "#0f172a",
        "background_color": "#0b1220",
        "icons": []
    });

    (
        [(header::CONTENT_TYPE, "application/manifest+json")],
        manifest.to_string(),
    )
        .into_response()
}
