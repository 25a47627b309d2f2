use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::Response,
};
use rust_embed::RustEmbed;
use std::borrow::Cow;

// Embarque le client statique (carte interactive) dans le binaire.
#[derive(RustEmbed)]
#[folder = "client"]
struct ClientAssets;

fn build_response(content: Cow<'static, [u8]>, path: &str) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content.into_owned()))
        .unwrap_or_default()
}

// Fallback du routeur : sert les fichiers du répertoire `client`
// embarqué, `index.html` à la racine.
pub async fn serve_embedded(uri: Uri) -> Response {
    let mut path = uri.path().trim_start_matches('/').to_string();
    if path.is_empty() {
        path = "index.html".to_string();
    }

    if let Some(content) = <ClientAssets as RustEmbed>::get(&path) {
        return build_response(content.data, &path);
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("404 Not Found"))
        .unwrap_or_default()
}
