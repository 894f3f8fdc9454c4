//! Submission pipeline
//!
//! Turns a `SubmissionRequest` into one POST against the forms API:
//! 1. upload the attachment, if any, to object storage
//! 2. build the provider payload, keyed by the flow's wire field ids
//! 3. post it with the verification token
//!
//! Each remote call is bounded by a timeout. A failure at any stage aborts
//! the rest, so a failed upload never reaches the forms API. Nothing is
//! retried here; the user resubmits.

use crate::services::{FileUploader, FormsApi, FormsApiError};
use crate::state::{FormAnswers, FormType, SubmissionRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// One entry of the payload's field map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadField {
    pub id: u32,
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body posted to the forms API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub form_id: u32,
    pub fields: BTreeMap<u32, PayloadField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
}

/// Remote call a timeout applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Upload => write!(f, "file upload"),
            Stage::Submit => write!(f, "submission"),
        }
    }
}

/// Why a submission did not go through
///
/// The messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("No form selected")]
    NoFormType,
    #[error("Could not upload your file: {0}")]
    Upload(String),
    #[error("The {stage} timed out, please try again")]
    Timeout { stage: Stage },
    #[error("The server rejected the submission ({status}), please try again")]
    Rejected { status: u16, body: String },
    #[error("Could not reach the server, please try again ({0})")]
    Transport(String),
}

/// Proof of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub form_id: u32,
    pub attachment_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Assemble the provider payload for `form_type` from the answers
///
/// Every wire field of the flow is present. Unanswered keys are sent empty.
/// The attachment key carries `attachment_url` instead of the local file.
pub fn build_submission(
    form_type: FormType,
    answers: &FormAnswers,
    attachment_url: Option<&str>,
    verification_token: Option<&str>,
) -> Result<FormSubmission, SubmissionError> {
    let form_id = form_type.form_id().ok_or(SubmissionError::NoFormType)?;
    let attachment_key = answers.attachment().map(|(key, _)| key);

    let fields = form_type
        .wire_fields()
        .iter()
        .map(|wire| {
            let value = match (attachment_key, attachment_url) {
                (Some(key), Some(url)) if key == wire.key => url.to_string(),
                _ => answers
                    .get(wire.key)
                    .filter(|v| v.as_file().is_none())
                    .map(|v| v.to_wire_string())
                    .unwrap_or_default(),
            };
            let field = PayloadField {
                id: wire.id,
                name: wire.key.to_string(),
                value,
                kind: wire.kind.to_string(),
            };
            (wire.id, field)
        })
        .collect();

    Ok(FormSubmission {
        form_id,
        fields,
        recaptcha_token: verification_token.map(str::to_string),
    })
}

fn classify_forms_error(err: anyhow::Error) -> SubmissionError {
    match err.downcast_ref::<FormsApiError>() {
        Some(FormsApiError::Rejected { status, body }) => SubmissionError::Rejected {
            status: *status,
            body: body.clone(),
        },
        None => SubmissionError::Transport(err.to_string()),
    }
}

/// Upload-then-post pipeline over the injected collaborators
#[derive(Clone)]
pub struct SubmissionPipeline {
    uploader: Arc<dyn FileUploader>,
    forms: Arc<dyn FormsApi>,
    timeout: Duration,
    upload_root: String,
}

impl SubmissionPipeline {
    pub fn new(
        uploader: Arc<dyn FileUploader>,
        forms: Arc<dyn FormsApi>,
        timeout: Duration,
        upload_root: &str,
    ) -> Self {
        Self {
            uploader,
            forms,
            timeout,
            upload_root: upload_root.trim_end_matches('/').to_string(),
        }
    }

    fn upload_folder(&self, form_type: FormType) -> String {
        if self.upload_root.is_empty() {
            form_type.upload_folder().to_string()
        } else {
            format!("{}/{}", self.upload_root, form_type.upload_folder())
        }
    }

    /// Run every stage for one request
    pub async fn run(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, SubmissionError> {
        let form_id = request
            .form_type
            .form_id()
            .ok_or(SubmissionError::NoFormType)?;

        let attachment_url = match request.answers.attachment() {
            Some((_, file)) => {
                let folder = self.upload_folder(request.form_type);
                let url = timeout(self.timeout, self.uploader.upload(file, &folder))
                    .await
                    .map_err(|_| {
                        warn!(file = %file.file_name, "Upload timed out");
                        SubmissionError::Timeout {
                            stage: Stage::Upload,
                        }
                    })?
                    .map_err(|e| {
                        warn!(error = %e, "Upload failed");
                        SubmissionError::Upload(e.to_string())
                    })?;
                Some(url)
            }
            None => None,
        };

        let submission = build_submission(
            request.form_type,
            &request.answers,
            attachment_url.as_deref(),
            Some(request.verification_token.as_str()),
        )?;

        timeout(
            self.timeout,
            self.forms.submit(&submission, request.idempotency_key),
        )
        .await
        .map_err(|_| {
            warn!(form_id, "Submission timed out");
            SubmissionError::Timeout {
                stage: Stage::Submit,
            }
        })?
        .map_err(|e| {
            warn!(form_id, error = %e, "Submission failed");
            classify_forms_error(e)
        })?;

        info!(form_id, "Submission delivered");
        Ok(SubmissionReceipt {
            form_id,
            attachment_url,
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockFileUploader, MockFormsApi};
    use crate::state::{AnswerValue, AttachedFile};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn drop_line_answers() -> FormAnswers {
        let mut answers = FormAnswers::new();
        answers.set_text("fullName", "Jane Doe");
        answers.set_text("email", "jane@example.com");
        answers.set_text("phone", "1234567890");
        answers.set_text("enquiryType", "General Question");
        answers.set_text("message", "Hello");
        answers
    }

    fn request(form_type: FormType, answers: FormAnswers) -> SubmissionRequest {
        SubmissionRequest {
            form_type,
            answers,
            verification_token: "token".to_string(),
            idempotency_key: Uuid::new_v4(),
        }
    }

    fn brief() -> AttachedFile {
        AttachedFile {
            path: PathBuf::from("/tmp/brief.pdf"),
            file_name: "brief.pdf".to_string(),
            size_bytes: 42,
        }
    }

    fn pipeline(uploader: MockFileUploader, forms: MockFormsApi) -> SubmissionPipeline {
        SubmissionPipeline::new(
            Arc::new(uploader),
            Arc::new(forms),
            Duration::from_secs(10),
            "website-forms",
        )
    }

    mod payload {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_drop_line_payload_has_all_answers() {
            let submission =
                build_submission(FormType::DropLine, &drop_line_answers(), None, Some("token"))
                    .unwrap();
            assert_eq!(submission.form_id, 3);
            assert_eq!(submission.fields.len(), 5);
            assert_eq!(
                submission.fields[&2],
                PayloadField {
                    id: 2,
                    name: "email".to_string(),
                    value: "jane@example.com".to_string(),
                    kind: "email".to_string(),
                }
            );
            assert_eq!(submission.recaptcha_token.as_deref(), Some("token"));
        }

        #[test]
        fn test_multiselect_joined_with_comma() {
            let mut answers = FormAnswers::new();
            answers.set(
                "projectType",
                AnswerValue::Choices(vec!["Branding".to_string(), "Other".to_string()]),
            );
            answers.set_text("projectTypeOther", "Blockchain");
            let submission =
                build_submission(FormType::StartProject, &answers, None, None).unwrap();
            assert_eq!(submission.fields[&5].value, "Branding, Other");
            assert_eq!(submission.fields[&12].value, "Blockchain");
            assert_eq!(submission.fields[&1].value, "");
        }

        #[test]
        fn test_attachment_value_is_uploaded_url() {
            let mut answers = FormAnswers::new();
            answers.set("attachment", AnswerValue::File(brief()));
            let submission = build_submission(
                FormType::StartProject,
                &answers,
                Some("https://cdn.example.com/brief.pdf"),
                None,
            )
            .unwrap();
            assert_eq!(submission.fields[&10].value, "https://cdn.example.com/brief.pdf");
            assert_eq!(submission.fields[&10].kind, "fileupload");
        }

        #[test]
        fn test_attachment_never_sent_as_local_name() {
            let mut answers = FormAnswers::new();
            answers.set("attachment", AnswerValue::File(brief()));
            let submission =
                build_submission(FormType::StartProject, &answers, None, None).unwrap();
            assert_eq!(submission.fields[&10].value, "");
        }

        #[test]
        fn test_none_form_type_rejected() {
            let err = build_submission(FormType::None, &FormAnswers::new(), None, None);
            assert_eq!(err, Err(SubmissionError::NoFormType));
        }

        #[test]
        fn test_serialized_shape() {
            let submission =
                build_submission(FormType::DropLine, &drop_line_answers(), None, Some("t"))
                    .unwrap();
            let json = serde_json::to_value(&submission).unwrap();
            assert_eq!(json["form_id"], 3);
            assert_eq!(json["recaptcha_token"], "t");
            assert_eq!(json["fields"]["1"]["name"], "fullName");
            assert_eq!(json["fields"]["1"]["type"], "text");
            assert_eq!(json["fields"]["5"]["value"], "Hello");

            let anonymous = build_submission(FormType::DropLine, &FormAnswers::new(), None, None)
                .unwrap();
            let json = serde_json::to_value(&anonymous).unwrap();
            assert!(json.get("recaptcha_token").is_none());
        }
    }

    mod pipeline_run {
        use super::*;
        use pretty_assertions::assert_eq;

        #[tokio::test]
        async fn test_drop_line_posts_exactly_once() {
            let mut uploader = MockFileUploader::new();
            uploader.expect_upload().never();
            let mut forms = MockFormsApi::new();
            forms
                .expect_submit()
                .withf(|submission, _| {
                    let values: Vec<&str> =
                        submission.fields.values().map(|f| f.value.as_str()).collect();
                    submission.form_id == 3
                        && values
                            == [
                                "Jane Doe",
                                "jane@example.com",
                                "1234567890",
                                "General Question",
                                "Hello",
                            ]
                        && submission.recaptcha_token.as_deref() == Some("token")
                })
                .times(1)
                .returning(|_, _| Ok(()));

            let receipt = pipeline(uploader, forms)
                .run(&request(FormType::DropLine, drop_line_answers()))
                .await
                .unwrap();
            assert_eq!(receipt.form_id, 3);
            assert!(receipt.attachment_url.is_none());
        }

        #[tokio::test]
        async fn test_upload_happens_before_post() {
            let mut uploader = MockFileUploader::new();
            uploader
                .expect_upload()
                .withf(|file, folder| file.file_name == "brief.pdf" && folder == "website-forms/project-briefs")
                .times(1)
                .returning(|_, _| Ok("https://cdn.example.com/brief.pdf".to_string()));
            let mut forms = MockFormsApi::new();
            forms
                .expect_submit()
                .withf(|submission, _| {
                    submission.fields[&10].value == "https://cdn.example.com/brief.pdf"
                })
                .times(1)
                .returning(|_, _| Ok(()));

            let mut answers = FormAnswers::new();
            answers.set("attachment", AnswerValue::File(brief()));
            let receipt = pipeline(uploader, forms)
                .run(&request(FormType::StartProject, answers))
                .await
                .unwrap();
            assert_eq!(
                receipt.attachment_url.as_deref(),
                Some("https://cdn.example.com/brief.pdf")
            );
        }

        #[tokio::test]
        async fn test_upload_failure_never_posts() {
            let mut uploader = MockFileUploader::new();
            uploader
                .expect_upload()
                .times(1)
                .returning(|_, _| Err(anyhow!("storage unavailable")));
            let mut forms = MockFormsApi::new();
            forms.expect_submit().never();

            let mut answers = FormAnswers::new();
            answers.set("resume", AnswerValue::File(brief()));
            let err = pipeline(uploader, forms)
                .run(&request(FormType::JoinTeam, answers))
                .await
                .unwrap_err();
            assert_eq!(
                err,
                SubmissionError::Upload("storage unavailable".to_string())
            );
        }

        #[tokio::test]
        async fn test_http_rejection_is_classified() {
            let uploader = MockFileUploader::new();
            let mut forms = MockFormsApi::new();
            forms.expect_submit().times(1).returning(|_, _| {
                Err(FormsApiError::Rejected {
                    status: 500,
                    body: "Internal Server Error".to_string(),
                }
                .into())
            });

            let err = pipeline(uploader, forms)
                .run(&request(FormType::DropLine, drop_line_answers()))
                .await
                .unwrap_err();
            assert!(matches!(err, SubmissionError::Rejected { status: 500, .. }));
            assert!(err.to_string().contains("500"));
        }

        #[tokio::test]
        async fn test_transport_error_is_classified() {
            let uploader = MockFileUploader::new();
            let mut forms = MockFormsApi::new();
            forms
                .expect_submit()
                .returning(|_, _| Err(anyhow!("connection refused")));

            let err = pipeline(uploader, forms)
                .run(&request(FormType::DropLine, drop_line_answers()))
                .await
                .unwrap_err();
            assert_eq!(
                err,
                SubmissionError::Transport("connection refused".to_string())
            );
        }

        #[test]
        fn test_idempotency_key_forwarded() {
            let req = request(FormType::DropLine, drop_line_answers());
            let expected = req.idempotency_key;
            let uploader = MockFileUploader::new();
            let mut forms = MockFormsApi::new();
            forms
                .expect_submit()
                .withf(move |_, key| *key == expected)
                .times(1)
                .returning(|_, _| Ok(()));

            let result = tokio_test::block_on(pipeline(uploader, forms).run(&req));
            assert!(result.is_ok());
        }

        struct SlowForms;

        #[async_trait]
        impl FormsApi for SlowForms {
            async fn submit(&self, _: &FormSubmission, _: Uuid) -> anyhow::Result<()> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_slow_endpoint_times_out() {
            let pipeline = SubmissionPipeline::new(
                Arc::new(MockFileUploader::new()),
                Arc::new(SlowForms),
                Duration::from_millis(20),
                "",
            );
            let err = pipeline
                .run(&request(FormType::DropLine, drop_line_answers()))
                .await
                .unwrap_err();
            assert_eq!(
                err,
                SubmissionError::Timeout {
                    stage: Stage::Submit
                }
            );
            assert_eq!(err.to_string(), "The submission timed out, please try again");
        }

        #[tokio::test]
        async fn test_none_form_type_never_calls_collaborators() {
            let mut uploader = MockFileUploader::new();
            uploader.expect_upload().never();
            let mut forms = MockFormsApi::new();
            forms.expect_submit().never();
            let err = pipeline(uploader, forms)
                .run(&request(FormType::None, FormAnswers::new()))
                .await
                .unwrap_err();
            assert_eq!(err, SubmissionError::NoFormType);
        }
    }
}
