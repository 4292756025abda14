//! Conversion endpoint integration tests.
//!
//! Run with: `cargo test -p pixshift-api --test convert_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::fixtures::{
    create_corrupt_image, create_jpeg_with_orientation, create_test_png, decoded_dimensions,
    zip_entries,
};
use helpers::{create_test_config, file_part, form_with_files, setup_test_server, setup_test_server_with};
use serde_json::Value;

const CONVERT: &str = "/api/convert";

#[tokio::test]
async fn test_single_png_to_jpeg() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "JPEG")
        .add_text("quality", "85")
        .add_part("file", file_part(create_test_png(40, 20), "photo.png", "image/png"));

    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"photo.jpg\""
    );
    let body = response.as_bytes();
    assert_eq!(image::guess_format(body).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(decoded_dimensions(body), (40, 20));
}

#[tokio::test]
async fn test_format_is_case_insensitive_and_defaults_to_png() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "webp")
        .add_part("file", file_part(create_test_png(8, 8), "a.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/webp");

    let form = MultipartForm::new().add_part("file", file_part(create_test_png(8, 8), "b.bmp", "image/bmp"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"b.png\""
    );
}

#[tokio::test]
async fn test_every_target_format() {
    let server = setup_test_server();
    let cases = [
        ("PNG", "image/png", "png"),
        ("JPEG", "image/jpeg", "jpg"),
        ("WEBP", "image/webp", "webp"),
        ("GIF", "image/gif", "gif"),
        ("BMP", "image/bmp", "bmp"),
        ("TIFF", "image/tiff", "tiff"),
    ];

    for (format, mime, ext) in cases {
        let form = MultipartForm::new()
            .add_text("format", format)
            .add_part("file", file_part(create_test_png(16, 12), "pic.png", "image/png"));
        let response = server.post(CONVERT).multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), mime, "format {}", format);
        assert_eq!(
            response.header("content-disposition"),
            format!("attachment; filename=\"pic.{}\"", ext).as_str()
        );
        assert_eq!(decoded_dimensions(response.as_bytes()), (16, 12), "format {}", format);
    }
}

#[tokio::test]
async fn test_no_files_provided() {
    let server = setup_test_server();

    let form = MultipartForm::new().add_text("format", "PNG");
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_bad_request();
    assert!(response
        .header("content-type")
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: Value = response.json();
    assert_eq!(body["error"], "no files provided");
    assert_eq!(body["code"], "NO_FILES_PROVIDED");
}

#[tokio::test]
async fn test_unsupported_format_is_rejected_before_processing() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "ICO")
        .add_part("file", file_part(create_corrupt_image(), "x.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
    assert!(body["error"].as_str().unwrap().contains("ICO"));
}

#[tokio::test]
async fn test_invalid_resize_parameters() {
    let server = setup_test_server();
    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![("resize_mode", "percentage")],
        vec![("resize_mode", "percentage"), ("percentage", "-10")],
        vec![("resize_mode", "dimensions"), ("width", "100")],
        vec![("resize_mode", "dimensions"), ("width", "0"), ("height", "10")],
        vec![("resize_mode", "stretch")],
    ];

    for fields in cases {
        let form = fields
            .iter()
            .fold(MultipartForm::new(), |form, (name, value)| form.add_text(*name, *value))
            .add_part("file", file_part(create_test_png(10, 10), "a.png", "image/png"));
        let response = server.post(CONVERT).multipart(form).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_RESIZE_PARAMETER", "fields {:?}", fields);
    }
}

#[tokio::test]
async fn test_quality_out_of_range_is_clamped() {
    let server = setup_test_server();

    for quality in ["0", "150", "abc"] {
        let form = MultipartForm::new()
            .add_text("format", "JPEG")
            .add_text("quality", quality)
            .add_part("file", file_part(create_test_png(10, 10), "a.png", "image/png"));
        let response = server.post(CONVERT).multipart(form).await;
        response.assert_status_ok();
    }
}

#[tokio::test]
async fn test_percentage_resize() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "PNG")
        .add_text("resize_mode", "percentage")
        .add_text("percentage", "50")
        .add_part("file", file_part(create_test_png(200, 100), "wide.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    assert_eq!(decoded_dimensions(response.as_bytes()), (100, 50));
}

#[tokio::test]
async fn test_dimensions_resize_stretches_or_fits() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("resize_mode", "dimensions")
        .add_text("width", "50")
        .add_text("height", "50")
        .add_part("file", file_part(create_test_png(200, 100), "wide.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(decoded_dimensions(response.as_bytes()), (50, 50));

    // Field aliases sent by the upload page
    let form = MultipartForm::new()
        .add_text("mode", "exact")
        .add_text("width", "50")
        .add_text("height", "50")
        .add_text("preserve_aspect", "true")
        .add_part("file", file_part(create_test_png(200, 100), "wide.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(decoded_dimensions(response.as_bytes()), (50, 25));
}

#[tokio::test]
async fn test_manual_rotation() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("rotate", "90")
        .add_text("flip_horizontal", "true")
        .add_part("file", file_part(create_test_png(40, 20), "a.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    assert_eq!(decoded_dimensions(response.as_bytes()), (20, 40));
}

#[tokio::test]
async fn test_exif_orientation_is_applied() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "PNG")
        .add_part(
            "file",
            file_part(create_jpeg_with_orientation(64, 32, 6), "camera.jpg", "image/jpeg"),
        );
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (32, 64));
    // The red left half ends up on top
    let top = img.get_pixel(15, 8);
    assert!(top[0] > 180 && top[2] < 90, "top pixel {:?}", top);
}

#[tokio::test]
async fn test_multiple_files_return_zip_in_upload_order() {
    let server = setup_test_server();

    let form = form_with_files(vec![
        (create_test_png(10, 10), "zebra.png"),
        (create_test_png(12, 12), "apple.png"),
    ])
    .add_text("format", "GIF");
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/zip");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"converted_images.zip\""
    );
    assert_eq!(response.header("x-converted-count"), "2");
    assert_eq!(response.header("x-failed-count"), "0");

    let entries = zip_entries(response.as_bytes());
    let names: Vec<_> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["zebra.gif", "apple.gif"]);
    assert_eq!(decoded_dimensions(&entries[1].1), (12, 12));
}

#[tokio::test]
async fn test_partial_failure_is_omitted_from_zip() {
    let server = setup_test_server();

    let form = form_with_files(vec![
        (create_corrupt_image(), "broken.png"),
        (create_test_png(10, 10), "good.png"),
    ]);
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/zip");
    assert_eq!(response.header("x-converted-count"), "1");
    assert_eq!(response.header("x-failed-count"), "1");

    let entries = zip_entries(response.as_bytes());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "good.png");
}

#[tokio::test]
async fn test_duplicate_output_names_are_unique_in_zip() {
    let server = setup_test_server();

    let form = form_with_files(vec![
        (create_test_png(10, 10), "photo.png"),
        (create_test_png(10, 10), "photo.jpg"),
    ])
    .add_text("format", "BMP");
    let response = server.post(CONVERT).multipart(form).await;

    response.assert_status_ok();
    let names: Vec<_> = zip_entries(response.as_bytes())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["photo.bmp", "photo_1.bmp"]);
}

#[tokio::test]
async fn test_all_files_failing_is_an_error() {
    let server = setup_test_server();

    let form = form_with_files(vec![
        (create_corrupt_image(), "a.png"),
        (create_corrupt_image(), "b.png"),
    ]);
    let response = server.post(CONVERT).multipart(form).await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["code"], "NO_IMAGES_CONVERTED");
    assert_eq!(body["error"], "none of the 2 uploaded images could be converted");
}

#[tokio::test]
async fn test_single_corrupt_file_is_an_error() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_part("file", file_part(create_corrupt_image(), "a.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;

    assert_eq!(response.status_code(), 422);
}

#[tokio::test]
async fn test_too_many_files() {
    let server = setup_test_server();
    let limit = create_test_config().max_files_per_request;

    let files = (0..=limit)
        .map(|_| (create_test_png(4, 4), "a.png"))
        .collect();
    let response = server.post(CONVERT).multipart(form_with_files(files)).await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_file_over_size_limit() {
    let config = pixshift_core::Config {
        max_file_size_bytes: 1024,
        ..create_test_config()
    };
    let server = setup_test_server_with(config);

    let form = MultipartForm::new()
        .add_part("file", file_part(vec![0u8; 4096], "big.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_filenames_keep_spaces_and_unicode() {
    let server = setup_test_server();

    let form = MultipartForm::new()
        .add_text("format", "JPEG")
        .add_part("file", file_part(create_test_png(8, 8), "holiday photo.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"holiday photo.jpg\""
    );

    let form = MultipartForm::new()
        .add_text("format", "JPEG")
        .add_part("file", file_part(create_test_png(8, 8), "café.png", "image/png"));
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"caf_.jpg\"; filename*=UTF-8''caf%C3%A9.jpg"
    );

    let form = form_with_files(vec![
        (create_test_png(8, 8), "rapport (1).png"),
        (create_test_png(8, 8), "café.png"),
    ])
    .add_text("format", "WEBP");
    let response = server.post(CONVERT).multipart(form).await;
    response.assert_status_ok();
    let names: Vec<_> = zip_entries(response.as_bytes())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["rapport (1).webp", "café.webp"]);
}
