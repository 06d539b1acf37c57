//! Concurrent encode/decode.
//!
//! Key derivation dominates the cost of every seal and open, and no field
//! depends on another, so each field runs as its own task on tokio's
//! blocking pool. Results are joined back in file order; the first failing
//! field fails the whole document.
//!
//! ```text
//!            ┌── spawn_blocking(seal code a) ───────┐
//!  file a ───┤                                      ├──► EncryptedSolutionFile a
//!            └── spawn_blocking(seal annotations a) ┘
//!            ┌── spawn_blocking(seal code b) ───────┐
//!  file b ───┤                                      ├──► EncryptedSolutionFile b
//!            └── spawn_blocking(seal annotations b) ┘
//!                                 │
//!                          try_join_all (ordered)
//! ```
//!
//! At most one blocking task per available CPU runs at a time; the rest
//! wait on a semaphore before they are handed to the blocking pool.
//!
//! There is no cancellation: dropping the returned future abandons the
//! join, but blocking tasks already started run to completion and their
//! output is discarded.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Semaphore;
use zeroize::Zeroizing;

use super::codec::{ensure_version, open_annotations, seal_annotations, upgrade_legacy, Codec};
use super::decrypted::{PlainDocument, PlainFile};
use super::encrypted::{
    EncodedDocument, EncryptedSolution, EncryptedSolutionFile, FileVersion, LegacySolution,
};
use crate::config::KdfParams;
use crate::crypto::envelope::{open_with_params, seal_with_params};
use crate::error::{Error, Result};

type SharedPassword = Arc<Zeroizing<String>>;

/// Number of blocking tasks allowed to run at once
fn blocking_limit() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

impl Codec {
    /// Encrypt a document, sealing every field concurrently
    ///
    /// Falls back to [`Codec::encode`] when the configuration disables
    /// concurrency.
    pub async fn encode_concurrent(
        &self,
        password: &str,
        document: &PlainDocument,
    ) -> Result<EncryptedSolution> {
        if !self.config().concurrent {
            return self.encode(password, document);
        }

        tracing::debug!(files = document.files.len(), "Encoding solution concurrently");

        let password: SharedPassword = Arc::new(Zeroizing::new(password.to_owned()));
        let params = *self.kdf();
        let limit = Arc::new(Semaphore::new(blocking_limit()));

        let tasks = document.files.iter().map(|file| {
            encode_file_task(Arc::clone(&password), file.clone(), params, Arc::clone(&limit))
        });

        let files = try_join_all(tasks).await?;
        Ok(EncryptedSolution::new(document.title.clone(), files))
    }

    /// Decrypt a document of any known version, opening every field concurrently
    pub async fn decode_concurrent(
        &self,
        password: &str,
        document: &EncodedDocument,
    ) -> Result<PlainDocument> {
        if !self.config().concurrent {
            return self.decode(password, document);
        }

        let password: SharedPassword = Arc::new(Zeroizing::new(password.to_owned()));
        let params = *self.kdf();
        let limit = Arc::new(Semaphore::new(blocking_limit()));

        let result = match document {
            EncodedDocument::Current(solution) => {
                decode_current_task(password, solution, params, limit).await
            }
            EncodedDocument::Legacy(solution) => {
                decode_legacy_task(password, solution, params, limit).await
            }
        };

        if let Err(ref err) = result {
            tracing::warn!(code = err.code(), "Failed to decode solution: {}", err);
        }

        result
    }
}

async fn decode_current_task(
    password: SharedPassword,
    solution: &EncryptedSolution,
    params: KdfParams,
    limit: Arc<Semaphore>,
) -> Result<PlainDocument> {
    ensure_version(solution.version, &[FileVersion::V2])?;
    tracing::debug!(files = solution.files.len(), "Decoding solution concurrently");

    let tasks = solution
        .files
        .iter()
        .map(|file| {
            decode_file_task(Arc::clone(&password), file.clone(), params, Arc::clone(&limit))
        });

    Ok(PlainDocument {
        title: solution.title.clone(),
        files: try_join_all(tasks).await?,
    })
}

async fn decode_legacy_task(
    password: SharedPassword,
    solution: &LegacySolution,
    params: KdfParams,
    limit: Arc<Semaphore>,
) -> Result<PlainDocument> {
    if let Some(version) = solution.version {
        ensure_version(version, &[FileVersion::V1])?;
    }
    tracing::debug!("Decoding legacy solution concurrently");

    let code = run_blocking(&limit, {
        let password = Arc::clone(&password);
        let token = solution.code.clone();
        move || open_with_params(&password, &token, &params)
    });
    let annotations = run_blocking(&limit, {
        let token = solution.annotations.clone();
        move || open_annotations(&password, &token, &params)
    });

    let (code, annotations) = tokio::try_join!(code, annotations)?;
    Ok(upgrade_legacy(&solution.language, code, annotations))
}

async fn encode_file_task(
    password: SharedPassword,
    file: PlainFile,
    params: KdfParams,
    limit: Arc<Semaphore>,
) -> Result<EncryptedSolutionFile> {
    let PlainFile {
        name,
        language,
        code,
        annotations,
    } = file;

    let sealed_code = run_blocking(&limit, {
        let password = Arc::clone(&password);
        move || seal_with_params(&password, &code, &params)
    });
    let sealed_annotations = run_blocking(&limit, move || {
        seal_annotations(&password, &annotations, &params)
    });

    let (code, annotations) = tokio::try_join!(sealed_code, sealed_annotations)?;

    Ok(EncryptedSolutionFile {
        name,
        language,
        code,
        annotations,
    })
}

async fn decode_file_task(
    password: SharedPassword,
    file: EncryptedSolutionFile,
    params: KdfParams,
    limit: Arc<Semaphore>,
) -> Result<PlainFile> {
    let EncryptedSolutionFile {
        name,
        language,
        code,
        annotations,
    } = file;

    let opened_code = run_blocking(&limit, {
        let password = Arc::clone(&password);
        move || open_with_params(&password, &code, &params)
    });
    let opened_annotations = run_blocking(&limit, move || {
        open_annotations(&password, &annotations, &params)
    });

    let (code, annotations) = tokio::try_join!(opened_code, opened_annotations)?;

    Ok(PlainFile {
        name,
        language,
        code,
        annotations,
    })
}

/// Run CPU-bound work on the blocking pool once `limit` grants a permit
///
/// The permit is held until the work finishes, even if the caller stops
/// waiting for it.
async fn run_blocking<T, F>(limit: &Arc<Semaphore>, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let permit = Arc::clone(limit)
        .acquire_owned()
        .await
        .map_err(|e| Error::Internal(format!("Task limiter closed: {}", e)))?;

    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await?
}

// ============================================================================
// DEFAULT-CONFIGURATION SHORTHANDS
// ============================================================================

/// Encrypt a document concurrently with the default configuration
pub async fn encode_concurrent(password: &str, document: &PlainDocument) -> Result<EncryptedSolution> {
    Codec::default().encode_concurrent(password, document).await
}

/// Decrypt a document concurrently with the default configuration
pub async fn decode_concurrent(password: &str, document: &EncodedDocument) -> Result<PlainDocument> {
    Codec::default().decode_concurrent(password, document).await
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::crypto::envelope::seal;
    use crate::error::Error;
    use crate::solution::codec::{decode, encode};
    use crate::solution::decrypted::{Annotation, NumberRange};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PASSWORD: &str = "fan-out";

    fn sample_document(files: usize) -> PlainDocument {
        let files = (0..files)
            .map(|i| {
                PlainFile::new(format!("file{}.ts", i), "typescript", format!("export const n = {};", i))
                    .with_annotations(vec![Annotation::new(
                        format!("note {}", i),
                        NumberRange::new(1, 1),
                        NumberRange::new(0, 6),
                    )])
            })
            .collect();
        PlainDocument::new("Concurrent", files)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_round_trip_preserves_order() {
        let doc = sample_document(5);

        let encoded = encode_concurrent(PASSWORD, &doc).await.unwrap();
        assert_eq!(encoded.version, FileVersion::CURRENT);

        let decoded = decode_concurrent(PASSWORD, &encoded.into()).await.unwrap();
        assert_eq!(decoded, doc);
    }

    #[tokio::test]
    async fn test_concurrent_and_sequential_are_interchangeable() {
        let doc = sample_document(2);

        let sequential = encode(PASSWORD, &doc).unwrap();
        let decoded = decode_concurrent(PASSWORD, &sequential.into()).await.unwrap();
        assert_eq!(decoded, doc);

        let concurrent = encode_concurrent(PASSWORD, &doc).await.unwrap();
        assert_eq!(decode(PASSWORD, &concurrent.into()).unwrap(), doc);
    }

    #[tokio::test]
    async fn test_concurrent_legacy_decode() {
        let legacy = EncodedDocument::from_value(json!({
            "language": "py",
            "code": seal(PASSWORD, "print(1)").unwrap(),
            "annotations": seal(PASSWORD, "[]").unwrap(),
        }))
        .unwrap();

        let decoded = decode_concurrent(PASSWORD, &legacy).await.unwrap();
        assert_eq!(decoded.title, "Untitled");
        assert_eq!(decoded.files.len(), 1);
        assert_eq!(decoded.files[0].name, "unnamed");
        assert_eq!(decoded.files[0].code, "print(1)");
    }

    #[tokio::test]
    async fn test_concurrent_wrong_password_fails() {
        let encoded = encode_concurrent(PASSWORD, &sample_document(2)).await.unwrap();
        let result = decode_concurrent("wrong", &encoded.into()).await;
        assert_eq!(result, Err(Error::AuthenticationFailed));
    }

    #[tokio::test]
    async fn test_concurrent_rejects_mismatched_version() {
        let mut encoded = EncryptedSolution::new("T", vec![]);
        encoded.version = FileVersion::V1;
        let result = decode_concurrent(PASSWORD, &encoded.into()).await;
        assert_eq!(result, Err(Error::UnsupportedVersion("1.0".into())));
    }

    #[tokio::test]
    async fn test_disabled_concurrency_uses_sequential_path() {
        let codec = Codec::new(CodecConfig {
            concurrent: false,
            ..CodecConfig::default()
        });
        let doc = sample_document(1);

        let encoded = codec.encode_concurrent(PASSWORD, &doc).await.unwrap();
        let decoded = codec.decode_concurrent(PASSWORD, &encoded.into()).await.unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_blocking_limit_is_positive() {
        assert!(blocking_limit() >= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_blocking_work_respects_limit() {
        let limit = Arc::new(Semaphore::new(2));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|i| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            run_blocking(&limit, move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            })
        });

        let results = try_join_all(tasks).await.unwrap();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(limit.available_permits(), 2);
    }
}
