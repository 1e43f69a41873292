//! Bring-up against an in-memory appliance
//!
//! Run with `RUST_LOG=petkit=debug cargo run --example bring_up`.

use std::sync::Arc;

use petkit::{Command, Device, DeviceRecord, HandshakeConfig};
use petkit_core::PetkitFrameCodec;
use petkit_transport::{LinkEvent, MemoryLink, QueuedTransport};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

/// Answer frames by writing replies straight into the record
async fn appliance(mut events: UnboundedReceiver<LinkEvent>, record: DeviceRecord) {
    let mut authenticated = false;

    while let Some(event) = events.recv().await {
        let bytes = match event {
            LinkEvent::Frame(bytes) => bytes,
            other => {
                println!("  link: {:?}", other);
                continue;
            }
        };

        let Ok(frame) = PetkitFrameCodec.decode(bytes) else {
            continue;
        };

        match frame.command() {
            Ok(Command::GetDeviceDetails) => {
                record.set_device_id(vec![0x00, 0x00, 0x5A, 0x3C, 0x19, 0x07]);
                if authenticated {
                    record.set_serial("W5C-100234");
                }
            }
            Ok(Command::InitDevice) => {
                authenticated = true;
                record.set_initialized(true);
            }
            _ => {}
        }

        println!("  <- {:>3} seq={}", frame.command_id, frame.sequence);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let address = std::env::var("DEVICE_ADDRESS").unwrap_or_else(|_| "A4:C1:38:00:00:01".to_string());

    let (link, events) = MemoryLink::connected();
    let transport = Arc::new(QueuedTransport::new(link));

    let device = Device::new(address, transport)
        .with_config(HandshakeConfig::new().with_max_restarts(3));
    tokio::spawn(appliance(events, device.record().clone()));

    println!("Running handshake...");
    let report = device.connect().await?;
    println!("✓ Ready ({} restarts)", report.restarts);

    device.set_light(1).await?;
    println!("✓ Dirty fields: {:?}", device.record().dirty().fields());

    device.disconnect().await?;
    println!("✓ Disconnected");

    Ok(())
}
