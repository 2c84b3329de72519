//! Shared fixture for viewer integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use analyzer::codec;
use analyzer::http_server::{self, Config};
use analyzer::ServiceState;
use common::prelude::*;

pub const TEXT_CONTENT: &[u8] = b"Hello blobview!";
pub const IMAGE_CONTENT: &[u8] = &[1, 2, 3, 4, 5, 6, 7];
pub const LARGE_FILE_SIZE: usize = 12345;
pub const LINKED_CONTENT: &[u8] = b"behind a dynamic link";
/// 2000-01-02T03:04:05Z
pub const NOT_VALID_BEFORE: i64 = 946_782_245_000_000;

pub const ROOT_NAMES: [&str; 5] = ["testTextFile", "testImage", "largeFile", "missingFile", "link"];

/// A small tree stored in a local datastore:
///
/// ```text
/// root/
///   testTextFile   text/plain with a validity window
///   testImage      image/png
///   largeFile      12345 zero bytes
///   missingFile    reference to a blob stored elsewhere
///   link           dynamic link to a text file
/// ```
///
/// plus a link whose payload is not an entrypoint and a directory whose
/// content is not a directory listing, both outside the tree.
pub struct Fixture {
    pub state: ServiceState,
    pub root: Reference,
    pub text_file: Reference,
    pub image: Reference,
    pub large_file: Reference,
    pub missing_file: Reference,
    pub link: Reference,
    pub link_target: Reference,
    pub broken_link: Reference,
    pub broken_dir: Reference,
    _temp: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let datastore = Datastore::local(temp.path()).unwrap();
        let blobs = EncryptedBlobs::new(datastore.clone());
        let mut builder = TreeBuilder::new(blobs.clone());

        let text_file = builder
            .add_file(&["testTextFile"], TEXT_CONTENT, "text/plain")
            .await
            .unwrap()
            .with_validity(NOT_VALID_BEFORE, 0);
        builder
            .set_entry(&["testTextFile"], text_file.clone())
            .unwrap();

        let image = builder
            .add_file(&["testImage"], IMAGE_CONTENT, "image/png")
            .await
            .unwrap();
        let large_file = builder
            .add_file(
                &["largeFile"],
                &vec![0u8; LARGE_FILE_SIZE],
                "application/octet-stream",
            )
            .await
            .unwrap();

        let elsewhere = EncryptedBlobs::new(Datastore::memory());
        let (name, key) = elsewhere.create_static(b"not here").await.unwrap();
        let missing_file = Reference::new(&name, &key).with_mime_type("text/plain");
        builder
            .set_entry(&["missingFile"], missing_file.clone())
            .unwrap();

        builder
            .add_file(&["link"], LINKED_CONTENT, "text/plain")
            .await
            .unwrap();
        let (link_target, writer) = builder.inject_link(&["link"]).await.unwrap();
        let link = Reference::new(&writer.blob_name(), writer.key()).with_mime_type("text/plain");

        let root = builder.flush().await.unwrap();

        let (name, key, _) = blobs.create_link(b"zzzzzzzzzzzz").await.unwrap();
        let broken_link = Reference::new(&name, &key).with_mime_type("application/broken");

        let (name, key) = blobs.create_static(b"zzzzzzzzzzzz").await.unwrap();
        let broken_dir = Reference::new(&name, &key).with_mime_type(DIR_MIME_TYPE);

        let state = ServiceState::new(datastore, &codec::encode(&root));

        Self {
            state,
            root,
            text_file,
            image,
            large_file,
            missing_file,
            link,
            link_target,
            broken_link,
            broken_dir,
            _temp: temp,
        }
    }

    pub fn router(&self) -> Router {
        let config = Config::from_port(0).unwrap();
        http_server::router(config, self.state.clone())
    }

    pub async fn get(&self, uri: &str) -> Response {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Response {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    /// JSON view of `reference` from the API
    pub async fn json(&self, reference: &Reference) -> serde_json::Value {
        self.json_at(&format!("/api/ep/{}", codec::encode(reference)))
            .await
    }

    /// Details fragment of `reference`
    pub async fn details(&self, reference: &Reference) -> String {
        let response = self
            .get(&format!("/api/html/details/{}", codec::encode(reference)))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body
    }

    pub async fn json_at(&self, uri: &str) -> serde_json::Value {
        let response = self.get(uri).await;
        assert_eq!(response.status, StatusCode::OK);
        serde_json::from_str(&response.body).unwrap()
    }
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}
