//! Logging macros with the gateway's standard fields.
//!
//! Every gateway log line names the subsystem it comes from. Transaction
//! lines add `tx_id`, node lines add `node`.

/// Log an event tagged with its subsystem.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction-related event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $subsystem:expr, $msg:expr, $tx_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            tx_id = %$tx_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a node-related event with standard fields.
#[macro_export]
macro_rules! log_node_event {
    ($level:ident, $subsystem:expr, $msg:expr, $node:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            node = %$node,
            $($($field)*,)?
            $msg
        )
    };
}
