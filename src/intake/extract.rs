//! Multipart boundary: turns a form-data body into an [`ApplicationSubmission`].

use super::{ApplicationSubmission, FileUpload, MAX_FILE_BYTES};
use axum::extract::multipart::{Multipart, MultipartError};

/// Rejections raised while reading the form, before any composition or
/// provider traffic.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("file in slot '{field}' exceeds the 5 MiB limit")]
    FileTooLarge { field: String },
    #[error("unexpected file field '{field}'")]
    UnexpectedFile { field: String },
    #[error("more than one file supplied for slot '{field}'")]
    DuplicateFile { field: String },
}

/// Reads every part of the form. Known text fields are captured (absent
/// ones stay empty), unknown text fields are ignored, and file parts must
/// land in one of the five named slots, one file each, 5 MiB ceiling
/// enforced while streaming.
pub async fn submission_from_multipart(
    multipart: &mut Multipart,
) -> Result<ApplicationSubmission, ExtractError> {
    let mut submission = ApplicationSubmission::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if let Some(filename) = field.file_name().map(str::to_string) {
            let slot = submission
                .uploads
                .slot_mut(&name)
                .ok_or_else(|| ExtractError::UnexpectedFile {
                    field: name.clone(),
                })?;
            if slot.is_some() {
                return Err(ExtractError::DuplicateFile { field: name });
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if bytes.len() + chunk.len() > MAX_FILE_BYTES {
                    return Err(ExtractError::FileTooLarge { field: name });
                }
                bytes.extend_from_slice(&chunk);
            }

            *slot = Some(FileUpload { filename, bytes });
            continue;
        }

        let value = field.text().await?;
        let fields = &mut submission.fields;
        match name.as_str() {
            "fullName" => fields.full_name = value,
            "mobile" => fields.mobile = value,
            "email" => fields.email = value,
            "city" => fields.city = value,
            "state" => fields.state = value,
            "businessName" => fields.business_name = value,
            "businessType" => fields.business_type = value,
            "businessVintage" => fields.business_vintage = value,
            "annualTurnover" => fields.annual_turnover = value,
            "loanType" => fields.loan_type = value,
            "loanAmount" => fields.loan_amount = value,
            "loanPurpose" => fields.loan_purpose = value,
            "message" => fields.message = value,
            _ => {}
        }
    }

    Ok(submission)
}
