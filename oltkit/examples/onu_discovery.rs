//! List the ONUs on one PON port over SNMP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example onu_discovery -- 10.0.0.1 public 1 1
//! cargo run --example onu_discovery -- 10.0.0.1 public 1 1 7   # one ONU
//! ```

use std::env;

use oltkit::{EngineConfig, SnmpEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        eprintln!("usage: onu_discovery <host> <community> <board> <pon> [onu]");
        std::process::exit(2);
    }

    let engine = SnmpEngine::new(EngineConfig::default());
    let request = engine.request(&args[0], &args[1], args[2].parse()?, args[3].parse()?);

    if let Some(onu) = args.get(4) {
        let info = engine.onu_details(&request, onu.parse()?).await?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let result = engine.discover(&request).await?;
    println!(
        "{} ONUs on board {} PON {} ({:?})",
        result.total, result.board, result.pon, result.elapsed
    );
    println!(
        "{:>4}  {:<20} {:<16} {:<10} {:>8} {:>8}",
        "ID", "NAME", "SERIAL", "STATUS", "RX", "TX"
    );
    for onu in &result.onus {
        println!(
            "{:>4}  {:<20} {:<16} {:<10} {:>8} {:>8}",
            onu.id, onu.name, onu.serial_number, onu.status, onu.rx_power, onu.tx_power
        );
    }

    let empty = oltkit::snmp::empty_slots_from(&result);
    println!("{} free ONU ids", empty.len());
    Ok(())
}
