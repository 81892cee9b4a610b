pub mod action_executor;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod runtime;
pub mod ssh_config;
pub mod transport;

#[cfg(test)]
mod tests {
    mod match_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/match_latency_test.rs"
        ));
    }
}
