//! Demonstration of a device feeding the relay server.
//!
//! This example shows how to:
//! 1. Generate plausible vitals with the simulator
//! 2. POST each reading to the relay's ingest endpoint
//! 3. Read the relay-stamped reading back from /api/latest
//!
//! Run the relay first (`vital-monitor serve`), then:
//! cargo run --example simulate_device

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vital_monitor::source::{Reading, ReadingSource, SimulatedSource};

const RELAY_URL: &str = "http://127.0.0.1:5000";

fn main() {
    println!("Vital Monitor - Device Simulator");
    println!("================================");
    println!();
    println!("Relay: {RELAY_URL}");
    println!("Posting one simulated reading per second.");
    println!("Press Ctrl+C to stop");
    println!();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error creating runtime: {e}");
            return;
        }
    };

    // Set up stop flag and Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let client = reqwest::Client::new();
    let mut source = SimulatedSource::new();
    let mut posted = 0u64;

    while running.load(Ordering::SeqCst) {
        let reading = match source.fetch() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Simulator error: {e}");
                break;
            }
        };

        let result = runtime.block_on(async {
            client
                .post(format!("{RELAY_URL}/api/data"))
                .json(&reading)
                .send()
                .await?
                .error_for_status()?;

            let latest: Reading = client
                .get(format!("{RELAY_URL}/api/latest"))
                .send()
                .await?
                .json()
                .await?;
            Ok::<Reading, reqwest::Error>(latest)
        });

        match result {
            Ok(latest) => {
                posted += 1;
                println!(
                    "  [{posted}] temp={:.1}C bpm={} avg={} spo2={}% (relay ts {:.3})",
                    latest.temperature, latest.bpm, latest.avg_bpm, latest.spo2, latest.timestamp
                );
            }
            Err(e) => {
                eprintln!("  Relay unreachable: {e}");
            }
        }

        std::thread::sleep(Duration::from_secs(1));
    }

    println!();
    println!("Stopped after {posted} readings.");
}
