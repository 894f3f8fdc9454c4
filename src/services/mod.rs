//! External collaborators of the wizard
//!
//! The object-storage upload, the forms submission endpoint and the human
//! verification token, each behind a trait so the engine and pipeline can be
//! tested without a network.

mod client;
mod traits;
mod verifier;

pub use client::{CloudinaryUploader, FormsApiError, FormsClient};
pub use traits::{FileUploader, FormsApi, HumanVerifier};
pub use verifier::TokenSlot;

#[cfg(test)]
pub use traits::{MockFileUploader, MockFormsApi, MockHumanVerifier};
