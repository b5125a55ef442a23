use std::time::Duration;

use hid_layers_types::protocol::{LayerSnapshot, RAW_HID_REPORT_SIZE, Request, Response};
use log::{debug, error, info};
use tokio::time::Instant;

use crate::device::Transport;
use crate::error::{HostError, Result};

/// Report id written before every raw HID report
const REPORT_ID: u8 = 0x00;

/// How long to wait for the answer to a request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// hid-layers client on top of a raw HID transport
pub struct Client<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request, prefixed with the report id
    pub async fn send(&mut self, request: Request) -> Result<()> {
        let mut report = [0u8; RAW_HID_REPORT_SIZE + 1];
        report[0] = REPORT_ID;
        report[1..].copy_from_slice(&request.to_report());
        debug!("Sending {:?}", request);
        self.transport.write(&report).await
    }

    /// Wait for the next hid-layers frame, skipping frames of other protocols.
    ///
    /// Returns `None` if nothing arrives within `timeout`, `None` waits forever.
    pub async fn recv(&mut self, timeout: Option<Duration>) -> Result<Option<Response>> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            let remaining = deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()));
            if remaining.is_some_and(|remaining| remaining.is_zero()) {
                return Ok(None);
            }
            let Some(frame) = self.transport.read(remaining).await? else {
                info!("Read timeout");
                return Ok(None);
            };
            match Response::decode(&frame) {
                Some(response) => return Ok(Some(response)),
                None => error!("Non-protocol HID message received: {:02x?}", frame),
            }
        }
    }

    /// Drop frames which arrived before the next request, like reports pushed while nobody read
    async fn drain(&mut self) -> Result<()> {
        while let Some(frame) = self.transport.read(Some(Duration::ZERO)).await? {
            debug!("Dropping stale frame: {:02x?}", frame);
        }
        Ok(())
    }

    /// Send a request and wait for its answer
    async fn request(&mut self, request: Request) -> Result<Response> {
        self.drain().await?;
        self.send(request).await?;
        self.recv(Some(self.timeout))
            .await?
            .ok_or(HostError::Timeout(self.timeout))
    }

    /// Current layer state, reporting isn't changed
    pub async fn get_state(&mut self) -> Result<LayerSnapshot> {
        expect_state(self.request(Request::GetLayerState).await?)
    }

    /// Switch unsolicited reports on or off, returns the state the keyboard answered with
    pub async fn set_reporting(&mut self, enabled: bool) -> Result<LayerSnapshot> {
        let snapshot = expect_state(self.request(Request::SetReportChange(enabled)).await?)?;
        if snapshot.reporting != enabled {
            return Err(HostError::UnexpectedResponse(format!(
                "reporting is {} after setting it to {}",
                snapshot.reporting, enabled
            )));
        }
        Ok(snapshot)
    }

    /// Flip `layer`. The keyboard echoes the layer, or answers with an error when it's out of range.
    pub async fn invert_layer(&mut self, layer: u8) -> Result<LayerSnapshot> {
        match self.request(Request::InvertLayer(layer)).await? {
            Response::State(snapshot) if snapshot.layer == layer => Ok(snapshot),
            Response::State(snapshot) => Err(HostError::UnexpectedResponse(format!(
                "inverted layer {}, keyboard answered layer {}",
                layer, snapshot.layer
            ))),
            Response::Error { .. } => Err(HostError::UnexpectedResponse(format!(
                "keyboard refused to invert layer {}",
                layer
            ))),
        }
    }

    /// Query the layer state, and enable reporting when it's off
    pub async fn enable_reporting_and_get_state(&mut self) -> Result<LayerSnapshot> {
        let snapshot = self.get_state().await?;
        if snapshot.reporting {
            info!(
                "Layer reporting is enabled, current layer {}, caps word {}",
                snapshot.layer, snapshot.caps_word
            );
            return Ok(snapshot);
        }

        info!("Layer reporting is not enabled, enabling it now");
        let snapshot = self.set_reporting(true).await?;
        info!(
            "Layer reporting enabled, current layer {}, caps word {}",
            snapshot.layer, snapshot.caps_word
        );
        Ok(snapshot)
    }

    /// Wait for the next layer or caps word change pushed by the keyboard.
    ///
    /// Error responses are skipped, they answer requests of other clients sharing the interface.
    pub async fn next_change(&mut self) -> Result<LayerSnapshot> {
        loop {
            match self.recv(None).await? {
                Some(Response::State(snapshot)) => return Ok(snapshot),
                Some(response) => debug!("Ignoring {:?}", response),
                // A transport without timeout may still report nothing
                None => {}
            }
        }
    }
}

fn expect_state(response: Response) -> Result<LayerSnapshot> {
    match response {
        Response::State(snapshot) => Ok(snapshot),
        Response::Error { .. } => Err(HostError::UnexpectedResponse("error response".to_string())),
    }
}
