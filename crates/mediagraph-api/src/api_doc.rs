//! OpenAPI documentation, served at `/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use mediagraph_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediagraph API",
        version = "0.1.0",
        description = "Media upload and deletion over an object store and a graph metadata store. Uploads are rolled back when any step fails; deletes cascade from a record to its variants and blobs."
    ),
    paths(
        handlers::media_upload::upload_media,
        handlers::media_get::get_media,
        handlers::media_delete::delete_media,
        handlers::health::liveness,
    ),
    components(schemas(
        handlers::media_upload::UploadResponse,
        models::MediaRecord,
        models::MediaVariant,
        models::BlobLocation,
        models::NodeId,
        error::ErrorResponse,
    )),
    tags(
        (name = "media", description = "Upload, lookup and cascading delete of media records"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
