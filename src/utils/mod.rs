pub mod csv_handler;

pub use csv_handler::{export_report_to_file, report_to_csv_bytes, write_report_csv};
