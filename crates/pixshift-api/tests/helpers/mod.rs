//! Test helpers: build the router and a test server around it.
//!
//! Run from workspace root: `cargo test -p pixshift-api`.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use pixshift_api::setup::routes;
use pixshift_api::state::AppState;
use pixshift_core::Config;
use std::sync::Arc;

/// Config used by most tests: defaults with small limits
pub fn create_test_config() -> Config {
    Config {
        max_file_size_bytes: 2 * 1024 * 1024,
        max_request_size_bytes: 8 * 1024 * 1024,
        max_files_per_request: 5,
        ..Config::default()
    }
}

pub fn setup_test_server_with(config: Config) -> TestServer {
    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to start test server")
}

pub fn setup_test_server() -> TestServer {
    setup_test_server_with(create_test_config())
}

/// File part with a filename and content type
pub fn file_part(data: Vec<u8>, filename: &str, mime: &str) -> Part {
    Part::bytes(data).file_name(filename.to_string()).mime_type(mime.to_string())
}

/// Form with every image under the `files` field
pub fn form_with_files(files: Vec<(Vec<u8>, &str)>) -> MultipartForm {
    files
        .into_iter()
        .fold(MultipartForm::new(), |form, (data, name)| {
            form.add_part("files", file_part(data, name, "application/octet-stream"))
        })
}
