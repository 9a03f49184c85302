pub mod admin;
pub mod forms;

pub use forms::{FormsService, forms_routes};
