pub mod config;
pub mod proposal;
pub mod rfp;
pub mod vendor;

pub use config::{Config, SmtpConfig};
pub use proposal::{Proposal, UnitPrice};
pub use rfp::{DispatchStatus, Rfp, RfpItem, RfpStatus, RfpVendor};
pub use vendor::Vendor;
