//! Log shipper example.
//!
//! This example sends a few GELF-style records to a collector and reports
//! the delivery outcome for each.
//!
//! Run the collector first: cargo run --example collector
//! Then run: cargo run --example shipper

use logship_rs::{ConnectionConfig, Endpoint, RetryPolicy, SenderConfig, TcpSender};
use std::time::Duration;

const COLLECTOR_HOST: &str = "127.0.0.1";
const COLLECTOR_PORT: u16 = 12201;

fn main() {
    let config = SenderConfig::default()
        .with_connection(
            ConnectionConfig::default().with_connect_timeout(Duration::from_secs(5)),
        )
        .with_retry(RetryPolicy::fixed(2, Duration::from_millis(500)));

    let sender = TcpSender::new(Endpoint::new(COLLECTOR_HOST, COLLECTOR_PORT), config);

    for i in 1..=5 {
        let record = format!(
            "{{\"version\":\"1.1\",\"host\":\"shipper\",\"short_message\":\"record #{i}\"}}"
        );
        let delivery = sender.send(record.as_bytes());
        println!("record #{i}: {delivery:?}");
    }

    sender.close();
}
