//! VG Gripper Demo
//!
//! Runs the pump on/off demonstration once: all-channel vacuum, then each
//! channel individually, releasing in between.
//!
//! Usage: cargo run --bin demo -- --ip 192.168.1.1 --port 502
//!        cargo run --bin demo -- --device /dev/ttyUSB0
//!
//! When both `--ip` and `--device` are given, the IP address wins.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use onrobot_vg::{ChannelId, ChannelSelect, Vg};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Compute box IP address
    #[clap(long)]
    ip: Option<String>,

    /// Modbus TCP port
    #[clap(long, default_value_t = onrobot_vg::DEFAULT_TCP_PORT)]
    port: u16,

    /// Serial device path, e.g. /dev/ttyUSB0
    #[clap(long)]
    device: Option<String>,

    /// Seconds to hold each vacuum-on phase
    #[clap(long, default_value_t = 5.0)]
    hold: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("{}", onrobot_vg::info());

    let mut vg = Vg::connect(args.ip.as_deref(), Some(args.port), args.device.as_deref()).await?;

    let limit = vg.read_vacuum_limit().await?;
    println!("Vacuum current limit: {limit} mA");

    let hold = Duration::from_secs_f64(args.hold);

    println!("\nTurn on all vacuums.");
    vg.vacuum_on(ChannelSelect::All, hold).await?;
    println!("\nRelease all vacuums.");
    vg.release(ChannelSelect::All).await?;

    println!("\nTurn on the vacuum of channel A.");
    vg.vacuum_on(ChannelId::A, hold).await?;
    println!("\nRelease the vacuum of channel A.");
    vg.release(ChannelId::A).await?;

    println!("\nTurn on the vacuum of channel B.");
    vg.vacuum_on(ChannelId::B, hold).await?;
    println!("\nRelease the vacuum of channel B.");
    vg.release(ChannelId::B).await?;

    vg.close().await?;
    println!("\nDemo completed.");

    Ok(())
}
