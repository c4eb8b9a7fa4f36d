pub mod alert_sink;
