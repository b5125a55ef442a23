use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hid_layers_host::types::protocol::{LayerSnapshot, RAW_HID_USAGE, RAW_HID_USAGE_PAGE};
use hid_layers_host::{Client, DeviceFilter, UsbTransport, candidates, open_first, watch};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "hid-layers", version, about = "Layer and caps word state of hid-layers keyboards")]
struct Cli {
    /// Only use devices with this vendor id
    #[arg(long, value_parser = parse_u16, global = true)]
    vid: Option<u16>,

    /// Only use devices with this product id
    #[arg(long, value_parser = parse_u16, global = true)]
    pid: Option<u16>,

    /// Usage page of the raw HID interface
    #[arg(long, value_parser = parse_u16, default_value_t = RAW_HID_USAGE_PAGE, global = true)]
    usage_page: u16,

    /// Usage of the raw HID interface
    #[arg(long, value_parser = parse_u16, default_value_t = RAW_HID_USAGE, global = true)]
    usage: u16,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = 500, global = true)]
    timeout: u64,

    /// More logs, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List raw HID interfaces matching the usage page and usage
    List,
    /// Print the current layer state
    State,
    /// Enable layer reporting
    Enable,
    /// Disable layer reporting
    Disable,
    /// Flip a layer on or off
    Invert {
        /// Layer index
        layer: u8,
    },
    /// Print every layer and caps word change, reconnecting when the keyboard is unplugged
    Watch,
}

fn parse_u16(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number `{}`: {}", s, e))
}

fn print_snapshot(snapshot: LayerSnapshot) {
    println!(
        "layer: {}, caps word: {}, reporting: {}",
        snapshot.layer,
        if snapshot.caps_word { "on" } else { "off" },
        if snapshot.reporting { "on" } else { "off" },
    );
}

async fn connect(filter: &DeviceFilter, timeout: Duration) -> Result<Client<UsbTransport>> {
    let (candidate, transport) = open_first(filter).await.context("failed to open keyboard")?;
    log::info!("Using {}", candidate);
    Ok(Client::new(transport).with_timeout(timeout))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let filter = DeviceFilter {
        vendor_id: cli.vid,
        product_id: cli.pid,
        usage_page: cli.usage_page,
        usage: cli.usage,
    };
    let timeout = Duration::from_millis(cli.timeout);

    match cli.command {
        Command::List => {
            let candidates = candidates(&filter).await?;
            if candidates.is_empty() {
                bail!("no raw HID interface found");
            }
            for candidate in candidates {
                println!("{}", candidate);
            }
        }
        Command::State => {
            let mut client = connect(&filter, timeout).await?;
            print_snapshot(client.get_state().await?);
        }
        Command::Enable => {
            let mut client = connect(&filter, timeout).await?;
            print_snapshot(client.set_reporting(true).await?);
        }
        Command::Disable => {
            let mut client = connect(&filter, timeout).await?;
            print_snapshot(client.set_reporting(false).await?);
        }
        Command::Invert { layer } => {
            let mut client = connect(&filter, timeout).await?;
            let snapshot = client
                .invert_layer(layer)
                .await
                .with_context(|| format!("failed to invert layer {}", layer))?;
            print_snapshot(snapshot);
        }
        Command::Watch => {
            watch(&filter, timeout, print_snapshot).await?;
        }
    }
    Ok(())
}
