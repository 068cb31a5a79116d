// Domain value objects
pub mod report_kind;
pub mod report_window;

pub use report_kind::*;
pub use report_window::*;
