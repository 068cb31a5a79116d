// Domain entities
pub mod model;
pub mod report_email;
pub mod sale;
pub mod summary;

pub use model::*;
pub use report_email::*;
pub use sale::*;
pub use summary::*;
