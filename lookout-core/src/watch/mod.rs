pub mod watcher;

pub use watcher::{
    open, open_with_wakeup, watch_latest_values, watch_service_metrics, watch_services,
    WatchHandle,
};
