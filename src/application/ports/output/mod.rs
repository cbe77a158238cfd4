pub mod geolocation_port;
pub mod ledger_port;
pub mod notification_port;
