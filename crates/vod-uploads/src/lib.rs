//! Client for the external file-upload provider plus webhook
//! signature verification.

pub mod client;
pub mod error;
pub mod signature;

pub use client::{PresignedUpload, UploadsClient, UploadsConfig};
pub use error::{UploadError, UploadResult};
pub use signature::{verify_signature, WebhookSignature, MAX_SIGNATURE_AGE_SECS};
