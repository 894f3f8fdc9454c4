//! Trait abstractions for the external collaborators to enable mocking in tests

use crate::state::AttachedFile;
use crate::submission::FormSubmission;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Object storage that turns a local file into a public URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileUploader: Send + Sync {
    /// Upload `file` under `folder`, returning its public URL
    async fn upload(&self, file: &AttachedFile, folder: &str) -> Result<String>;
}

/// Forms submission endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormsApi: Send + Sync {
    /// Post one submission; any non-2xx answer is an error
    async fn submit(&self, submission: &FormSubmission, idempotency_key: Uuid) -> Result<()>;
}

/// Proof-of-humanity capability
///
/// The engine only asks whether a token is present and asks for it to be
/// cleared; it never inspects the token.
#[cfg_attr(test, mockall::automock)]
pub trait HumanVerifier: Send + Sync {
    fn token(&self) -> Option<String>;

    fn is_verified(&self) -> bool {
        self.token().is_some()
    }

    fn reset(&self);
}
