pub mod form_submission;

pub use form_submission::Entity as FormSubmissionEntity;
