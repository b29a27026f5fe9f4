//! Cloudinary backend: signed uploads and a streaming delivery proxy.

use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use pixdrop_shared::CloudinaryConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url, header::CONTENT_TYPE};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::StorageError;
use super::service::{ImageUpload, StoredAsset};

/// Content type used when the delivery host does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Successful upload reply. Only the fields we use.
#[derive(Debug, Deserialize)]
struct UploadReply {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// An image being streamed from the delivery host.
pub struct RemoteImage {
    /// Content type reported upstream, or [`DEFAULT_CONTENT_TYPE`].
    pub content_type: String,
    /// Body length, when the delivery host announced one.
    pub content_length: Option<u64>,
    /// Response body, chunk by chunk.
    pub body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
}

impl std::fmt::Debug for RemoteImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteImage")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Client for the Cloudinary upload API and delivery host.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    /// Create a store with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CloudinaryConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a store sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(config: CloudinaryConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    /// Upload endpoint: `{api_base}/{cloud_name}/image/upload`.
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Public delivery URL for `filename`.
    ///
    /// `filename` becomes a single percent-encoded path segment, so `#`, `?`
    /// and `%` are sent literally instead of ending the path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the delivery base URL is
    /// not a valid base URL.
    pub fn delivery_url(&self, filename: &str) -> Result<Url, StorageError> {
        let base = &self.config.delivery_base_url;
        let mut url = Url::parse(base)
            .map_err(|e| StorageError::configuration(format!("invalid delivery url {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StorageError::configuration(format!("invalid delivery url {base}")))?
            .pop_if_empty()
            .extend([self.config.cloud_name.as_str(), "image", "upload", filename]);
        Ok(url)
    }

    /// Forward the upload and return the provider's secure URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Upload`] on transport failure and
    /// [`StorageError::Provider`] when Cloudinary rejects the request.
    pub async fn upload(&self, upload: ImageUpload) -> Result<StoredAsset, StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.as_str())], &self.config.api_secret);
        let size = upload.size();

        let file = Part::stream_with_length(upload.bytes, size).file_name(upload.filename);
        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature)
            .part("file", file);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorReply>().await {
                Ok(reply) => reply.error.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(StorageError::provider(status.as_u16(), message));
        }

        let reply: UploadReply = response
            .json()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(StoredAsset {
            key: reply.public_id,
            link: reply.secure_url,
            size,
        })
    }

    /// Start streaming `filename` from the delivery host.
    ///
    /// The body is not buffered; callers forward chunks as they arrive.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for names that are not a single
    /// path segment, [`StorageError::Fetch`] on transport failure and
    /// [`StorageError::UpstreamStatus`] for any non-200 reply.
    pub async fn fetch(&self, filename: &str) -> Result<RemoteImage, StorageError> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(StorageError::invalid_key(filename));
        }

        let url = self.delivery_url(filename)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StorageError::Fetch(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StorageError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let content_length = response.content_length();

        debug!(%url, %content_type, ?content_length, "Proxying image");

        Ok(RemoteImage {
            content_type,
            content_length,
            body: response.bytes_stream().boxed(),
        })
    }
}

/// Cloudinary request signature.
///
/// Parameters are sorted by name, joined as `k=v&k=v`, suffixed with the API
/// secret and hashed with SHA-256 (hex encoded).
#[must_use]
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_uri: &str) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "123456".into(),
            api_secret: "abcd".into(),
            api_base_url: server_uri.to_string(),
            delivery_base_url: server_uri.to_string(),
        }
    }

    async fn collect(image: RemoteImage) -> Vec<u8> {
        let chunks: Vec<Bytes> = image.body.try_collect().await.expect("stream should finish");
        chunks.concat()
    }

    #[test]
    fn test_sign_params_known_vector() {
        assert_eq!(
            sign_params(&[("timestamp", "1315060510")], "abcd"),
            "5652e549a70bdc03f73a633a23b7d3f3b067d72fff26dd15b25997f46fdf6439"
        );
    }

    #[test]
    fn test_sign_params_sorts_keys() {
        let expected = "0d4fe14b2b4a3f68a97ccc5097c43908b623d24293c296826a9390c14d891509";
        assert_eq!(
            sign_params(&[("timestamp", "1315060510"), ("public_id", "sample")], "abcd"),
            expected
        );
        assert_eq!(
            sign_params(&[("public_id", "sample"), ("timestamp", "1315060510")], "abcd"),
            expected
        );
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let store = CloudinaryStore::new(config_for("https://api.example.com/v1_1/"))
            .expect("should create store");
        assert_eq!(store.upload_url(), "https://api.example.com/v1_1/demo/image/upload");
        assert_eq!(
            store.delivery_url("cat.png").expect("valid url").as_str(),
            "https://api.example.com/v1_1/demo/image/upload/cat.png"
        );
    }

    #[test]
    fn test_delivery_url_encodes_filename() {
        let store =
            CloudinaryStore::new(config_for("https://res.example.com")).expect("should create store");
        assert_eq!(
            store.delivery_url("secret.jpg#x").expect("valid url").as_str(),
            "https://res.example.com/demo/image/upload/secret.jpg%23x"
        );
        assert_eq!(
            store.delivery_url("a?b 1.png").expect("valid url").as_str(),
            "https://res.example.com/demo/image/upload/a%3Fb%201.png"
        );
    }

    #[tokio::test]
    async fn test_fetch_bad_delivery_base_is_configuration_error() {
        let store = CloudinaryStore::new(config_for("not a url")).expect("store");
        let err = store.fetch("cat.png").await.expect_err("should fail");
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .and(body_string_contains("name=\"api_key\""))
            .and(body_string_contains("name=\"signature\""))
            .and(body_string_contains("filename=\"photo.jpg\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "public_id": "x1y2z3",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/x1y2z3.jpg",
                "format": "jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let asset = store
            .upload(ImageUpload::new("photo.jpg", Bytes::from_static(b"jpeg-bytes")))
            .await
            .expect("upload should succeed");

        assert_eq!(asset.key, "x1y2z3");
        assert_eq!(
            asset.link,
            "https://res.cloudinary.com/demo/image/upload/v1/x1y2z3.jpg"
        );
        assert_eq!(asset.size, 10);
    }

    #[tokio::test]
    async fn test_upload_surfaces_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let err = store
            .upload(ImageUpload::new("photo.jpg", Bytes::from_static(b"x")))
            .await
            .expect_err("upload should fail");

        match err {
            StorageError::Provider { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_transport_failure() {
        let store = CloudinaryStore::new(config_for("http://127.0.0.1:9")).expect("store");
        let err = store
            .upload(ImageUpload::new("photo.jpg", Bytes::from_static(b"x")))
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, StorageError::Upload(_)));
    }

    #[tokio::test]
    async fn test_fetch_streams_body_and_content_type() {
        let server = MockServer::start().await;
        let body = vec![7u8; 64 * 1024];
        Mock::given(method("GET"))
            .and(path("/demo/image/upload/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "image/png"))
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let image = store.fetch("cat.png").await.expect("fetch should succeed");

        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.content_length, Some(64 * 1024));
        assert_eq!(collect(image).await, body);
    }

    #[tokio::test]
    async fn test_fetch_keeps_reserved_characters_in_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo/image/upload/secret.jpg%23x"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"hash".to_vec(), "image/jpeg"))
            .expect(1)
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let image = store.fetch("secret.jpg#x").await.expect("fetch should succeed");
        assert_eq!(collect(image).await, b"hash");
    }

    #[tokio::test]
    async fn test_fetch_defaults_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/demo/image/upload/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let image = store.fetch("raw").await.expect("fetch should succeed");

        assert_eq!(image.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(collect(image).await, b"abc");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = CloudinaryStore::new(config_for(&server.uri())).expect("store");
        let err = store.fetch("missing.jpg").await.expect_err("should fail");
        assert!(matches!(err, StorageError::UpstreamStatus(404)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_path_segments() {
        let store = CloudinaryStore::new(config_for("http://127.0.0.1:9")).expect("store");
        for name in ["", ".", "..", "a/b.jpg", "..\\secret"] {
            let err = store.fetch(name).await.expect_err("should reject");
            assert!(matches!(err, StorageError::InvalidKey(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let store = CloudinaryStore::new(config_for("http://127.0.0.1:9")).expect("store");
        let err = store.fetch("cat.png").await.expect_err("should fail");
        assert!(matches!(err, StorageError::Fetch(_)));
    }
}
