use std::time::Duration;

use hid_layers_types::protocol::LayerSnapshot;
use log::{info, warn};

use crate::client::Client;
use crate::device::{DeviceFilter, Transport, open_first};
use crate::error::{HostError, Result};

/// Delay between two scans while no keyboard is connected
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Enable reporting, then pass the initial state and every change to `on_change`.
///
/// Returns when the transport fails, usually because the keyboard was unplugged.
pub async fn follow<T: Transport>(client: &mut Client<T>, on_change: &mut impl FnMut(LayerSnapshot)) -> Result<()> {
    on_change(client.enable_reporting_and_get_state().await?);
    loop {
        on_change(client.next_change().await?);
    }
}

/// Follow the first keyboard found, forever.
///
/// Scans again every [`RETRY_INTERVAL`] while there's no keyboard, and after it's gone.
pub async fn watch(filter: &DeviceFilter, timeout: Duration, mut on_change: impl FnMut(LayerSnapshot)) -> Result<()> {
    loop {
        match open_first(filter).await {
            Ok((candidate, transport)) => {
                info!("Watching {}", candidate);
                let mut client = Client::new(transport).with_timeout(timeout);
                if let Err(e) = follow(&mut client, &mut on_change).await {
                    warn!("Lost {}: {}", candidate, e);
                }
            }
            Err(HostError::NoDevice) => {}
            Err(e) => return Err(e),
        }
        tokio::time::sleep(RETRY_INTERVAL).await;
    }
}
