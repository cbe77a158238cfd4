pub mod ip_api_geolocation_adapter;
pub mod mirror_node_ledger_adapter;
