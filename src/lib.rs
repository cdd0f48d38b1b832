//! Loan application intake relay.
//!
//! Accepts a multipart form submission (applicant fields plus up to five
//! document uploads), composes an email, and relays it through the Resend
//! transactional email API.

pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod mailer;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
