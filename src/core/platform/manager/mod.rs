pub mod message_formatter;
