//! Request bodies shared by the integration tests.

use axum_test::multipart::{MultipartForm, Part};

/// Minimal valid 1x1 PNG bytes.
pub fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Upload form with a `title` and a `file` part of the given type.
pub fn upload_form(title: &str, data: Vec<u8>, content_type: &str) -> MultipartForm {
    MultipartForm::new().add_text("title", title.to_string()).add_part(
        "file",
        Part::bytes(data)
            .file_name("upload.bin")
            .mime_type(content_type.to_string()),
    )
}

pub const RAW_BOUNDARY: &str = "mediagraph-boundary";

/// Upload body assembled by hand, for part headers the form builder refuses
/// to emit. Send it with `multipart/form-data; boundary=RAW_BOUNDARY`.
pub fn raw_upload_body(title: &str, data: &[u8], file_content_type: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.bin\"\r\n\
             Content-Type: {file_content_type}\r\n\r\n",
            b = RAW_BOUNDARY,
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", RAW_BOUNDARY).as_bytes());
    body
}
