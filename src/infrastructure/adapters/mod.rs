pub mod notifications;
pub mod output;
