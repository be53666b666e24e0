//! Collector example.
//!
//! This example accepts shipper connections and prints each received frame.
//!
//! Run: cargo run --example collector

use logship_rs::FrameDecoder;
use std::io::Read;
use std::net::TcpListener;

const LISTEN_ADDR: &str = "127.0.0.1:12201";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(LISTEN_ADDR)?;
    println!("Collecting on {LISTEN_ADDR}...");

    for incoming in listener.incoming() {
        let mut stream = incoming?;
        println!("shipper connected: {}", stream.peer_addr()?);

        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf)?;
            if n == 0 {
                break;
            }
            decoder.feed(&buf[..n]);
            for frame in decoder.parse_all() {
                println!(
                    "frame ({} bytes): {}",
                    frame.len(),
                    String::from_utf8_lossy(&frame)
                );
            }
        }
        println!("shipper disconnected");
    }
    Ok(())
}
