//! Outbound calls to the background-removal service.

mod upload;

pub use upload::{
    disposition_filename, ProcessedImage, RemovalClient, DEFAULT_DOWNLOAD_NAME, FILE_FIELD,
    REMOVE_BACKGROUND_PATH,
};
