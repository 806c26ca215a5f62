use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, error};

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("missing required parameter: {0}")] MissingParameter(&'static str),
    #[error("cannot access bucket '{0}': {1}. Check if it exists and you have proper permissions.")] BucketAccess(String, String),
    #[error("upload failed: {0}")] Upload(String),
}

/// Collapses a raw site name into a storage-key-safe slug: lowercase, runs
/// of non-alphanumeric characters become a single hyphen, leading and
/// trailing separators dropped. May be empty for names with no usable
/// characters.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Key prefix the site is written under: the sanitized folder name when one
/// survives slugification, otherwise a timestamp-qualified default.
pub fn site_key(folder_name: Option<&str>, now_millis: i64) -> String {
    match folder_name.map(slugify).filter(|s| !s.is_empty()) {
        Some(slug) => slug,
        None => format!("portfolio-{}", now_millis),
    }
}

/// Virtual-hosted-style static-website URL for a key prefix. The bucket's
/// website endpoint serves `<prefix>/index.html` at this path.
pub fn website_url(bucket: &str, region: &str, prefix: &str) -> String {
    format!("http://{}.s3-website.{}.amazonaws.com/{}", bucket, region, prefix)
}

pub fn validate_markup(code: &str) -> Result<(), DeploymentError> {
    if code.trim().is_empty() {
        return Err(DeploymentError::MissingParameter("code"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub bucket: String,
    pub region: String,
}

impl DeployConfig {
    pub fn from_env() -> Result<Self, DeploymentError> {
        let bucket = std::env::var("AWS_S3_BUCKET")
            .ok()
            .filter(|b| !b.is_empty())
            .ok_or(DeploymentError::MissingParameter("AWS_S3_BUCKET"))?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        Ok(Self { bucket, region })
    }
}

pub struct SiteDeployer {
    client: aws_sdk_s3::Client,
    config: DeployConfig,
}

impl SiteDeployer {
    /// Builds a fresh client per request; the client is stateless after
    /// construction, so nothing is shared between deployments.
    pub async fn from_env() -> Result<Self, DeploymentError> {
        let config = DeployConfig::from_env()?;
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&shared);
        Ok(Self { client, config })
    }

    /// Writes the markup as a single object at `<prefix>/index.html` and
    /// returns the website URL for that prefix. Public visibility comes
    /// from the bucket policy; no per-object ACL is sent (buckets with
    /// ACLs disabled reject them).
    pub async fn deploy(&self, code: &str, folder_name: Option<&str>) -> Result<String, DeploymentError> {
        validate_markup(code)?;

        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Bucket access error: {}", e);
                DeploymentError::BucketAccess(self.config.bucket.clone(), e.to_string())
            })?;

        let prefix = site_key(folder_name, Utc::now().timestamp_millis());
        let key = format!("{}/index.html", prefix);
        info!("🚀 Deploying {} bytes to s3://{}/{}", code.len(), self.config.bucket, key);

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(code.as_bytes().to_vec()))
            .content_type("text/html")
            .send()
            .await
            .map_err(|e| {
                error!("❌ Upload error: {}", e);
                DeploymentError::Upload(e.to_string())
            })?;

        let url = website_url(&self.config.bucket, &self.config.region, &prefix);
        info!("✅ Deployed: {}", url);
        Ok(url)
    }
}
