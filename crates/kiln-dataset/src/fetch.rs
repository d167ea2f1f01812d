//! Dataset download and caching.
//!
//! Fetches the gzipped IDX files from a public mirror into a local cache
//! directory, decompressing on first download. Subsequent loads read the
//! cached files.

use crate::error::DatasetResult;
use crate::example::Example;
use crate::idx;
use flate2::read::GzDecoder;
use kiln_core::error::BackendError;
use kiln_core::http::ensure_success;
use reqwest::Client;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Public mirror of the handwritten-digit dataset.
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/cvdf-datasets/mnist/";

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Named partition of the dataset.
///
/// The validation partition is the final sixth of the training file
/// (10,000 of the 60,000 training examples), mirroring the canonical
/// 50k/10k/10k split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Train,
    Validation,
    Test,
}

impl Partition {
    /// Name used in storage keys and CLI output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validation => "validation",
            Self::Test => "test",
        }
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "validation" => Ok(Self::Validation),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown partition '{other}' (expected train, validation, or test)")),
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Downloads and caches the dataset files.
#[derive(Debug, Clone)]
pub struct DatasetFetcher {
    base_url: String,
    cache_dir: PathBuf,
    client: Client,
}

impl DatasetFetcher {
    /// Create a fetcher using the default mirror and the user cache
    /// directory.
    pub fn new() -> DatasetResult<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no cache directory available")
            })?
            .join("kiln")
            .join("digits");
        Ok(Self { base_url: DEFAULT_BASE_URL.to_string(), cache_dir, client: Client::new() })
    }

    /// Create a fetcher with an explicit mirror and cache directory.
    #[must_use]
    pub fn with_settings(base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self { base_url: base_url.into(), cache_dir: cache_dir.into(), client: Client::new() }
    }

    /// Load a partition into memory as labeled examples.
    pub async fn load_partition(&self, partition: Partition) -> DatasetResult<Vec<Example>> {
        match partition {
            Partition::Test => {
                let images = idx::parse_images(&self.fetch_file(TEST_IMAGES).await?)?;
                let labels = idx::parse_labels(&self.fetch_file(TEST_LABELS).await?)?;
                idx::zip_examples(images, labels)
            }
            Partition::Train | Partition::Validation => {
                let images = idx::parse_images(&self.fetch_file(TRAIN_IMAGES).await?)?;
                let labels = idx::parse_labels(&self.fetch_file(TRAIN_LABELS).await?)?;
                let mut examples = idx::zip_examples(images, labels)?;

                let validation_len = examples.len() / 6;
                let split = examples.len() - validation_len;
                match partition {
                    Partition::Train => {
                        examples.truncate(split);
                        Ok(examples)
                    }
                    _ => Ok(examples.split_off(split)),
                }
            }
        }
    }

    /// Fetch one dataset file, preferring the decompressed cache copy.
    async fn fetch_file(&self, name: &str) -> DatasetResult<Vec<u8>> {
        let cached = self.cache_dir.join(name);
        if cached.exists() {
            debug!(file = name, "using cached dataset file");
            return Ok(std::fs::read(&cached)?);
        }

        let url = format!("{}{}.gz", self.base_url, name);
        info!(url, "downloading dataset file");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let response = ensure_success(response).await?;
        let compressed = response.bytes().await.map_err(|e| BackendError::from_transport(&e))?;

        let mut bytes = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut bytes)?;

        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::write(&cached, &bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::FEATURE_DIM;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn image_file(count: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0000_0803u32.to_be_bytes());
        bytes.extend_from_slice(&(count as u32).to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        bytes.extend(std::iter::repeat(0u8).take(count * FEATURE_DIM));
        bytes
    }

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0000_0801u32.to_be_bytes());
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[tokio::test]
    async fn test_load_test_partition_and_cache() {
        let mut server = mockito::Server::new_async().await;
        let temp = tempfile::TempDir::new().unwrap();

        let images_mock = server
            .mock("GET", "/t10k-images-idx3-ubyte.gz")
            .with_body(gzip(&image_file(3)))
            .expect(1)
            .create_async()
            .await;
        let labels_mock = server
            .mock("GET", "/t10k-labels-idx1-ubyte.gz")
            .with_body(gzip(&label_file(&[7, 0, 9])))
            .expect(1)
            .create_async()
            .await;

        let fetcher =
            DatasetFetcher::with_settings(format!("{}/", server.url()), temp.path());

        let examples = fetcher.load_partition(Partition::Test).await.unwrap();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0].label, 7);
        assert_eq!(examples[2].label, 9);

        // Second load hits the cache, not the server.
        let again = fetcher.load_partition(Partition::Test).await.unwrap();
        assert_eq!(again.len(), 3);

        images_mock.assert_async().await;
        labels_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_train_validation_split() {
        let mut server = mockito::Server::new_async().await;
        let temp = tempfile::TempDir::new().unwrap();

        let labels: Vec<u8> = (0..12).map(|i| i % 10).collect();
        let _images = server
            .mock("GET", "/train-images-idx3-ubyte.gz")
            .with_body(gzip(&image_file(12)))
            .create_async()
            .await;
        let _labels = server
            .mock("GET", "/train-labels-idx1-ubyte.gz")
            .with_body(gzip(&label_file(&labels)))
            .create_async()
            .await;

        let fetcher =
            DatasetFetcher::with_settings(format!("{}/", server.url()), temp.path());

        let train = fetcher.load_partition(Partition::Train).await.unwrap();
        let validation = fetcher.load_partition(Partition::Validation).await.unwrap();
        assert_eq!(train.len(), 10);
        assert_eq!(validation.len(), 2);
        // The validation partition is the tail of the training file.
        assert_eq!(validation[0].label, labels[10]);
    }

    #[tokio::test]
    async fn test_missing_file_surfaces_backend_error() {
        let mut server = mockito::Server::new_async().await;
        let temp = tempfile::TempDir::new().unwrap();

        let _mock = server
            .mock("GET", "/t10k-images-idx3-ubyte.gz")
            .with_status(403)
            .with_body("denied")
            .create_async()
            .await;

        let fetcher =
            DatasetFetcher::with_settings(format!("{}/", server.url()), temp.path());

        let err = fetcher.load_partition(Partition::Test).await.unwrap_err();
        assert!(matches!(err, DatasetError::Backend(_)));
    }
}
