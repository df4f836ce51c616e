//! [`S3Store`]: the [`ObjectStore`] backed by Amazon S3.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use bucketview_core::config::BucketViewConfig;
use bucketview_core::conditional::ConditionalRequest;
use bucketview_core::entry::ListPage;
use bucketview_core::error::StoreError;
use bucketview_core::metadata::ObjectMetadata;
use bucketview_core::store::{ObjectBody, ObjectStore};
use futures::StreamExt;
use tracing::debug;

use crate::convert::{RawMetadata, store_error, summary_from_object, to_smithy};

/// A single S3 bucket.
///
/// The SDK client is internally reference counted and safe to share across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the SDK default chain plus configuration
    /// overrides (region, endpoint, path-style addressing).
    pub async fn from_config(config: &BucketViewConfig) -> Self {
        let region = RegionProviderChain::first_try(
            config.effective_region().map(|r| Region::new(r.to_owned())),
        )
        .or_default_provider();

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style);
        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        debug!(
            bucket = %config.bucket,
            region = ?sdk_config.region(),
            endpoint = ?config.endpoint_url,
            "created S3 client"
        );

        Self::new(Client::from_conf(builder.build()), config.bucket.clone())
    }

    /// The bucket served.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(Some(prefix.to_owned()).filter(|p| !p.is_empty()))
            .delimiter(delimiter)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        let next_token = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(ToOwned::to_owned)
        } else {
            None
        };

        Ok(ListPage {
            common_prefixes: output
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix().map(ToOwned::to_owned))
                .collect(),
            objects: output
                .contents()
                .iter()
                .filter_map(summary_from_object)
                .collect(),
            next_token,
        })
    }

    async fn head(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> Result<ObjectMetadata, StoreError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .set_if_match(cond.if_match().map(ToOwned::to_owned))
            .set_if_none_match(cond.if_none_match().map(ToOwned::to_owned))
            .set_if_modified_since(cond.if_modified_since().map(to_smithy))
            .set_if_unmodified_since(cond.if_unmodified_since().map(to_smithy))
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        Ok(RawMetadata {
            content_type: output.content_type(),
            content_length: output.content_length(),
            etag: output.e_tag(),
            expires: output.expires_string(),
            last_modified: output.last_modified(),
            user_metadata: output.metadata(),
            version_id: output.version_id(),
        }
        .into_metadata())
    }

    async fn get(
        &self,
        key: &str,
        cond: &ConditionalRequest,
    ) -> Result<(ObjectMetadata, ObjectBody), StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_if_match(cond.if_match().map(ToOwned::to_owned))
            .set_if_none_match(cond.if_none_match().map(ToOwned::to_owned))
            .set_if_modified_since(cond.if_modified_since().map(to_smithy))
            .set_if_unmodified_since(cond.if_unmodified_since().map(to_smithy))
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        let meta = RawMetadata {
            content_type: output.content_type(),
            content_length: output.content_length(),
            etag: output.e_tag(),
            expires: output.expires_string(),
            last_modified: output.last_modified(),
            user_metadata: output.metadata(),
            version_id: output.version_id(),
        }
        .into_metadata();

        Ok((meta, body_stream(output.body)))
    }
}

/// Adapt an SDK byte stream. Dropping the returned stream drops the
/// `ByteStream`, which closes the connection instead of draining it.
/// The stream ends after the first read error.
fn body_stream(body: ByteStream) -> ObjectBody {
    futures::stream::unfold(Some(body), |state| async move {
        let mut body = state?;
        match body.next().await? {
            Ok(chunk) => Some((Ok(chunk), Some(body))),
            Err(e) => Some((
                Err(StoreError::dispatch(format!("failed to read object body: {e}"))),
                None,
            )),
        }
    })
    .boxed()
}
