//! Submission domain model and email composition.

pub mod extract;

use crate::mailer::{Attachment, OutgoingEmail};
use base64::Engine;

/// Fixed document slots, in the order attachments are emitted.
pub const FILE_SLOTS: [&str; 5] = ["pan", "aadhaar", "gst", "udyam", "other"];

/// Per-file upload ceiling (5 MiB).
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// One uploaded document, held in memory for the life of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Applicant text fields. Absent form fields stay empty strings; no
/// format validation is applied (permissive intake, preserved from the
/// original product behavior).
#[derive(Debug, Clone, Default)]
pub struct ApplicantFields {
    pub full_name: String,
    pub mobile: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub business_name: String,
    pub business_type: String,
    pub business_vintage: String,
    pub annual_turnover: String,
    pub loan_type: String,
    pub loan_amount: String,
    pub loan_purpose: String,
    pub message: String,
}

impl ApplicantFields {
    /// Form field names carrying a non-empty value, for diagnostics.
    pub fn present_names(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("mobile", &self.mobile),
            ("email", &self.email),
            ("city", &self.city),
            ("state", &self.state),
            ("businessName", &self.business_name),
            ("businessType", &self.business_type),
            ("businessVintage", &self.business_vintage),
            ("annualTurnover", &self.annual_turnover),
            ("loanType", &self.loan_type),
            ("loanAmount", &self.loan_amount),
            ("loanPurpose", &self.loan_purpose),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// The five document slots. At most one file per slot.
#[derive(Debug, Clone, Default)]
pub struct UploadSet {
    pub pan: Option<FileUpload>,
    pub aadhaar: Option<FileUpload>,
    pub gst: Option<FileUpload>,
    pub udyam: Option<FileUpload>,
    pub other: Option<FileUpload>,
}

impl UploadSet {
    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Option<FileUpload>> {
        match name {
            "pan" => Some(&mut self.pan),
            "aadhaar" => Some(&mut self.aadhaar),
            "gst" => Some(&mut self.gst),
            "udyam" => Some(&mut self.udyam),
            "other" => Some(&mut self.other),
            _ => None,
        }
    }

    fn in_slot_order(&self) -> [(&'static str, &Option<FileUpload>); 5] {
        [
            ("pan", &self.pan),
            ("aadhaar", &self.aadhaar),
            ("gst", &self.gst),
            ("udyam", &self.udyam),
            ("other", &self.other),
        ]
    }

    /// Slot names that received a file, for diagnostics.
    pub fn present_slots(&self) -> Vec<&'static str> {
        self.in_slot_order()
            .into_iter()
            .filter(|(_, upload)| upload.is_some())
            .map(|(name, _)| name)
            .collect()
    }

    /// Base64-encoded attachments in fixed slot order, regardless of the
    /// order the parts arrived in.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.in_slot_order()
            .into_iter()
            .filter_map(|(_, upload)| upload.as_ref())
            .map(|upload| Attachment {
                filename: upload.filename.clone(),
                content: base64::engine::general_purpose::STANDARD.encode(&upload.bytes),
            })
            .collect()
    }
}

/// One parsed form submission, scoped to a single request.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSubmission {
    pub fields: ApplicantFields,
    pub uploads: UploadSet,
}

impl ApplicationSubmission {
    pub fn subject(&self) -> String {
        let name = non_empty(&self.fields.full_name).unwrap_or("Unknown");
        let mobile = non_empty(&self.fields.mobile).unwrap_or("No Mobile");
        format!("New Application - {name} ({mobile})")
    }

    /// A non-blank free-text message wins verbatim (trimmed); otherwise
    /// the fixed template is rendered with every structured field.
    pub fn body_text(&self) -> String {
        let message = self.fields.message.trim();
        if !message.is_empty() {
            return message.to_string();
        }

        let f = &self.fields;
        let rendered = format!(
            "NEW MUDRA LOAN APPLICATION\n\
             --------------------------\n\
             Full Name: {}\n\
             Mobile: {}\n\
             Email: {}\n\
             City: {}\n\
             State: {}\n\
             \n\
             Business Name: {}\n\
             Business Type: {}\n\
             Business Vintage: {}\n\
             Annual Turnover: {}\n\
             \n\
             Loan Type: {}\n\
             Loan Amount: {}\n\
             Loan Purpose: {}",
            f.full_name,
            f.mobile,
            f.email,
            f.city,
            f.state,
            f.business_name,
            f.business_type,
            f.business_vintage,
            f.annual_turnover,
            f.loan_type,
            f.loan_amount,
            f.loan_purpose,
        );
        // Whole-template trim: a blank trailing field leaves no dangling space.
        rendered.trim().to_string()
    }

    /// Composes the outbound message. An empty attachment sequence is
    /// omitted from the wire rather than sent as an empty list.
    pub fn to_email(&self, from_address: &str, to_address: &str) -> OutgoingEmail {
        let attachments = self.uploads.attachments();
        OutgoingEmail {
            from: from_address.to_string(),
            to: vec![to_address.to_string()],
            subject: self.subject(),
            text: self.body_text(),
            attachments: if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            },
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> ApplicationSubmission {
        ApplicationSubmission {
            fields: ApplicantFields {
                full_name: "Jane Doe".to_string(),
                mobile: "9999999999".to_string(),
                ..ApplicantFields::default()
            },
            uploads: UploadSet::default(),
        }
    }

    fn upload(filename: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn subject_interpolates_name_and_mobile() {
        assert_eq!(jane().subject(), "New Application - Jane Doe (9999999999)");
    }

    #[test]
    fn subject_defaults_for_empty_submission() {
        let submission = ApplicationSubmission::default();
        assert_eq!(submission.subject(), "New Application - Unknown (No Mobile)");
    }

    #[test]
    fn non_blank_message_is_used_verbatim_after_trimming() {
        let mut submission = jane();
        submission.fields.message = "  Please call me after 5pm.  ".to_string();
        assert_eq!(submission.body_text(), "Please call me after 5pm.");
    }

    #[test]
    fn whitespace_only_message_falls_back_to_template() {
        let mut submission = jane();
        submission.fields.message = "   \n\t".to_string();
        let body = submission.body_text();
        assert!(body.starts_with("NEW MUDRA LOAN APPLICATION"));
        assert!(body.contains("Full Name: Jane Doe"));
        assert!(body.contains("Mobile: 9999999999"));
    }

    #[test]
    fn template_renders_missing_fields_as_empty_strings() {
        let body = ApplicationSubmission::default().body_text();
        assert!(body.contains("Full Name: \n"));
        assert!(body.contains("Loan Type: \n"));
        assert!(body.ends_with("Loan Purpose:"));
        assert!(!body.ends_with(' '), "rendered template is trimmed");
    }

    #[test]
    fn template_carries_every_structured_field_value() {
        let submission = ApplicationSubmission {
            fields: ApplicantFields {
                full_name: "A".into(),
                mobile: "B".into(),
                email: "C".into(),
                city: "D".into(),
                state: "E".into(),
                business_name: "F".into(),
                business_type: "G".into(),
                business_vintage: "H".into(),
                annual_turnover: "I".into(),
                loan_type: "J".into(),
                loan_amount: "K".into(),
                loan_purpose: "L".into(),
                message: String::new(),
            },
            uploads: UploadSet::default(),
        };
        let body = submission.body_text();
        for line in [
            "Full Name: A",
            "Mobile: B",
            "Email: C",
            "City: D",
            "State: E",
            "Business Name: F",
            "Business Type: G",
            "Business Vintage: H",
            "Annual Turnover: I",
            "Loan Type: J",
            "Loan Amount: K",
            "Loan Purpose: L",
        ] {
            assert!(body.contains(line), "template missing line: {line}");
        }
    }

    #[test]
    fn attachments_follow_slot_order_not_upload_order() {
        let uploads = UploadSet {
            other: Some(upload("notes.txt", b"misc")),
            pan: Some(upload("pan.pdf", b"pan-bytes")),
            ..UploadSet::default()
        };
        let attachments = uploads.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].filename, "pan.pdf");
        assert_eq!(attachments[1].filename, "notes.txt");
    }

    #[test]
    fn attachments_are_standard_base64() {
        let uploads = UploadSet {
            gst: Some(upload("gst.pdf", b"hello")),
            ..UploadSet::default()
        };
        assert_eq!(uploads.attachments()[0].content, "aGVsbG8=");
    }

    #[test]
    fn email_omits_empty_attachment_list() {
        let email = jane().to_email("intake@example.com", "loans@example.com");
        assert!(email.attachments.is_none());
        assert_eq!(email.to, vec!["loans@example.com".to_string()]);
    }

    #[test]
    fn present_names_and_slots_track_populated_parts() {
        let mut submission = jane();
        submission.uploads.udyam = Some(upload("udyam.pdf", b"u"));
        assert_eq!(submission.fields.present_names(), vec!["fullName", "mobile"]);
        assert_eq!(submission.uploads.present_slots(), vec!["udyam"]);
    }
}
