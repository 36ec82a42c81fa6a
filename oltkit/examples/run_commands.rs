//! Run a command script on an OLT over telnet.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example run_commands -- --host 10.0.0.1 --user admin --password secret \
//!     "show gpon onu state gpon-olt_1/1/1" "show pon onu uncfg"
//! ```
//!
//! Add `--long` for administrative commands such as `write` that may take
//! minutes on a busy device.

use std::env;
use std::time::Duration;

use oltkit::parse::parse_unconfigured;
use oltkit::{CommandRequest, CommandRunner, EngineConfig};

#[tokio::main]
async fn main() {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = EngineConfig::new().command_timeout(Duration::from_secs(args.timeout));
    let runner = CommandRunner::new(config);
    let address = runner
        .address(&args.host, &args.user, &args.password)
        .with_port(args.port);
    let request = CommandRequest::new(address, args.commands.iter().map(String::as_str));

    let result = if args.long {
        runner.run_long(&request, None).await
    } else {
        runner.run(&request).await
    };

    println!("{}", result.output);
    println!("{}", "-".repeat(50));
    if result.success {
        println!("Completed in {:?}", result.elapsed);
    } else {
        eprintln!("Failed after {:?}: {}", result.elapsed, result.error);
    }

    for outcome in &result.commands {
        if let Some(error) = &outcome.error {
            eprintln!("  {} -> {}", outcome.command, error);
        }
        if outcome.command.contains("uncfg") {
            let list = parse_unconfigured(&args.host, &outcome.output);
            println!(
                "{} unconfigured ONUs ({})",
                list.total_count,
                list.status().description()
            );
        }
    }
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
    long: bool,
    commands: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "127.0.0.1".to_string();
        let mut port = 23u16;
        let mut user = "admin".to_string();
        let mut password = String::new();
        let mut timeout = 8u64;
        let mut long = false;
        let mut commands = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(23);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = args[i].clone();
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(8);
                    }
                }
                "--long" => long = true,
                other => commands.push(other.to_string()),
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            timeout,
            long,
            commands,
        }
    }
}
