use std::sync::Arc;

use claimflow_core::ClaimflowError;
use object_store::aws::{AmazonS3Builder, AmazonS3ConfigKey};
use object_store::ObjectStore;

const SERVER_SIDE_ENCRYPTION: &str = "AES256";

// `S3EncryptionConfigKey` is not re-exported by object_store; this key parses to
// `AmazonS3ConfigKey::Encryption(S3EncryptionConfigKey::ServerSideEncryption)`.
fn server_side_encryption_key() -> AmazonS3ConfigKey {
    "aws_server_side_encryption"
        .parse()
        .expect("object_store recognises aws_server_side_encryption")
}

fn s3_builder(bucket: &str, region: &str) -> AmazonS3Builder {
    AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region(region)
        .with_config(
            server_side_encryption_key(),
            SERVER_SIDE_ENCRYPTION,
        )
}

/// S3 store bound to one bucket, with credentials taken from the environment.
/// Objects written through it are encrypted at rest with S3-managed keys.
pub fn s3_store(bucket: &str, region: &str) -> Result<Arc<dyn ObjectStore>, ClaimflowError> {
    if bucket.trim().is_empty() {
        return Err(ClaimflowError::InvalidConfig(
            "bucket name cannot be empty".to_string(),
        ));
    }

    let store = s3_builder(bucket, region)
        .build()
        .map_err(|e| ClaimflowError::InvalidConfig(format!("failed to build S3 store for {bucket}: {e}")))?;
    Ok(Arc::new(store))
}
