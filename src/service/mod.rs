pub mod comparison;
pub mod dispatch;
pub mod events;
pub mod inbound;
pub mod intake;
pub mod llm;
pub mod mailer;

pub use comparison::ComparisonService;
pub use dispatch::DispatchService;
pub use events::EventBroadcaster;
pub use inbound::InboundService;
pub use intake::IntakeService;
pub use llm::{LlmClient, StructuredExtractor};
pub use mailer::{Mailer, SmtpMailer};
