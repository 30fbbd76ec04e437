use axum::{
    http::header,
    response::{Html, IntoResponse},
};

//-- HELPER FUNCS
// Previews and the result are served from /blobs on the same origin
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; style-src 'self'; img-src 'self' blob: data:; connect-src 'self'; object-src 'none'; base-uri 'none'; frame-ancestors 'none'";

fn hardening_headers() -> [(header::HeaderName, &'static str); 4] {
    [
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::REFERRER_POLICY, "no-referrer"),
    ]
}

fn typed_hardening_headers(content_type: &'static str) -> [(header::HeaderName, &'static str); 5] {
    [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::REFERRER_POLICY, "no-referrer"),
    ]
}

//-- UPLOAD PAGE
pub fn serve_upload_page() -> impl IntoResponse {
    (hardening_headers(), Html(include_str!("upload.html")))
}

pub fn serve_upload_js() -> impl IntoResponse {
    (
        typed_hardening_headers("application/javascript;charset=utf-8"),
        include_str!("upload.js"),
    )
}

pub fn serve_styles_css() -> impl IntoResponse {
    (
        typed_hardening_headers("text/css; charset=utf-8"),
        include_str!("styles.css"),
    )
}
