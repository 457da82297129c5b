// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Remote object storage provider (§4.A, §6 persisted layout) over
//! `aws-sdk-s3`. Key layout: `<keyPrefix><first two chars of sanitized
//! chunk id>/<sanitized chunk id>.chunk`. Object metadata carries
//! `ChunkId`, `CorrelationId`, and `UploadTimestamp` (ISO-8601) — the
//! engine never relies on these for integrity, only for operational
//! traceability (§4.A: providers MUST NOT be relied on for the engine's
//! own end-to-end verification).

use chunkvault_domain::error::ChunkVaultError;
use chunkvault_domain::repositories::StorageProvider;
use chunkvault_domain::value_objects::{ChunkId, CorrelationId};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;

pub struct RemoteObjectProvider {
    provider_id: String,
    client: Client,
    bucket: String,
    key_prefix: String,
    server_side_encryption: bool,
}

impl RemoteObjectProvider {
    pub fn new(
        provider_id: impl Into<String>,
        client: Client,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
        server_side_encryption: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            client,
            bucket: bucket.into(),
            key_prefix: normalize_key_prefix(key_prefix),
            server_side_encryption,
        }
    }

    fn object_key(&self, chunk_id: &ChunkId) -> String {
        object_key_for(&self.key_prefix, chunk_id)
    }
}

/// Pure key-layout function, factored out so the layout rule can be tested
/// without constructing an SDK `Client`.
fn object_key_for(key_prefix: &str, chunk_id: &ChunkId) -> String {
    let sanitized = chunk_id.sanitized();
    let prefix_len = sanitized.len().min(2);
    format!("{key_prefix}{}/{sanitized}.chunk", &sanitized[..prefix_len])
}

fn normalize_key_prefix(key_prefix: impl Into<String>) -> String {
    let mut key_prefix = key_prefix.into();
    if !key_prefix.is_empty() && !key_prefix.ends_with('/') {
        key_prefix.push('/');
    }
    key_prefix
}

#[async_trait]
impl StorageProvider for RemoteObjectProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn put(&self, chunk_id: &ChunkId, bytes: &[u8], correlation_id: CorrelationId) -> Result<String, ChunkVaultError> {
        let key = self.object_key(chunk_id);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .metadata("ChunkId", chunk_id.as_str())
            .metadata("CorrelationId", correlation_id.to_string())
            .metadata("UploadTimestamp", Utc::now().to_rfc3339());

        if self.server_side_encryption {
            request = request.server_side_encryption(aws_sdk_s3::types::ServerSideEncryption::Aes256);
        }

        request
            .send()
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("s3 put failed: {e}")))?;

        Ok(key)
    }

    async fn get(&self, _chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<Vec<u8>, ChunkVaultError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .send()
            .await
            .map_err(|e| map_s3_error(&e.to_string(), storage_path))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("s3 body read failed: {e}")))?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn exists(&self, _chunk_id: &ChunkId, storage_path: &str, _correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        match self.client.head_object().bucket(&self.bucket).key(storage_path).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") {
                    Ok(false)
                } else {
                    Err(ChunkVaultError::transient_io(format!("s3 head failed: {e}")))
                }
            }
        }
    }

    async fn delete(&self, _chunk_id: &ChunkId, storage_path: &str, correlation_id: CorrelationId) -> Result<bool, ChunkVaultError> {
        let existed = self
            .exists(_chunk_id, storage_path, correlation_id)
            .await?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_path)
            .send()
            .await
            .map_err(|e| ChunkVaultError::transient_io(format!("s3 delete failed: {e}")))?;
        Ok(existed)
    }
}

fn map_s3_error(message: &str, storage_path: &str) -> ChunkVaultError {
    if message.contains("NoSuchKey") || message.contains("NotFound") {
        ChunkVaultError::not_found(format!("no object at {storage_path}"))
    } else {
        ChunkVaultError::transient_io(message.to_string())
    }
}
