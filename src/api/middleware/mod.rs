pub mod auth;
pub mod capture;

pub use auth::AdminAuth;
pub use capture::AttributionCapture;
