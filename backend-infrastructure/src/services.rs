pub mod chart_service;
pub mod format;
pub mod health_service;
pub mod mail_service;
pub mod report_service;
pub mod scheduler;

pub use health_service::*;
pub use mail_service::*;
pub use report_service::*;
pub use scheduler::*;
