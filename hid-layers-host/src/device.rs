//! Raw HID interfaces over USB, through nusb.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use hid_layers_types::protocol::{RAW_HID_REPORT_SIZE, RAW_HID_USAGE, RAW_HID_USAGE_PAGE};
use log::{debug, info};
use nusb::descriptors::TransferType;
use nusb::transfer::{ControlIn, ControlType, In, Interrupt, Out, Recipient};
use nusb::{DeviceInfo, Endpoint, Interface};

use crate::descriptor::top_level_usage;
use crate::error::{HostError, Result};

const USB_CLASS_HID: u8 = 0x03;
const REQUEST_GET_DESCRIPTOR: u8 = 0x06;
const DESCRIPTOR_TYPE_REPORT: u16 = 0x22;
const CONTROL_TIMEOUT: Duration = Duration::from_millis(500);

/// A raw HID link to the keyboard.
///
/// Reports are exchanged the way hidapi does: written reports start with the report id,
/// read reports don't carry it.
pub trait Transport {
    /// Write a report, prefixed with its report id
    fn write(&mut self, report: &[u8]) -> impl Future<Output = Result<()>>;

    /// Read a report. Returns `None` when nothing arrives within `timeout`, `None` waits forever.
    fn read(&mut self, timeout: Option<Duration>) -> impl Future<Output = Result<Option<Vec<u8>>>>;
}

/// Which interfaces count as a hid-layers keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceFilter {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub usage_page: u16,
    pub usage: u16,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            vendor_id: None,
            product_id: None,
            usage_page: RAW_HID_USAGE_PAGE,
            usage: RAW_HID_USAGE,
        }
    }
}

impl DeviceFilter {
    fn matches_device(&self, info: &DeviceInfo) -> bool {
        self.vendor_id.is_none_or(|vid| vid == info.vendor_id())
            && self.product_id.is_none_or(|pid| pid == info.product_id())
    }

    /// Check the top level usage declared by the report `descriptor` of `interface`
    pub fn check_usage(&self, interface: u8, descriptor: &[u8]) -> Result<()> {
        let (usage_page, usage) = top_level_usage(descriptor)?;
        if usage_page != self.usage_page || usage != self.usage {
            return Err(HostError::NotRawHid {
                interface,
                usage_page,
                usage,
            });
        }
        Ok(())
    }
}

/// A HID interface of a connected device.
///
/// The usage page lives in the report descriptor, [`candidates`] and [`Candidate::open`] check it.
#[derive(Clone)]
pub struct Candidate {
    info: DeviceInfo,
    pub interface: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} interface {} {} {}",
            self.vendor_id,
            self.product_id,
            self.interface,
            self.manufacturer.as_deref().unwrap_or("-"),
            self.product.as_deref().unwrap_or("-"),
        )
    }
}

/// HID interfaces of every connected device accepted by `filter`, without looking at their usage.
///
/// Boot keyboards and mice are skipped, raw HID interfaces never use a boot protocol.
pub async fn hid_interfaces(filter: &DeviceFilter) -> Result<Vec<Candidate>> {
    let mut interfaces = Vec::new();
    for info in nusb::list_devices().await? {
        if !filter.matches_device(&info) {
            continue;
        }
        for interface in info.interfaces() {
            if interface.class() != USB_CLASS_HID || interface.protocol() != 0 {
                continue;
            }
            interfaces.push(Candidate {
                interface: interface.interface_number(),
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                manufacturer: info.manufacturer_string().map(str::to_string),
                product: info.product_string().map(str::to_string),
                info: info.clone(),
            });
        }
    }
    debug!("Found {} HID interfaces", interfaces.len());
    Ok(interfaces)
}

/// Raw HID interfaces accepted by `filter`: HID interfaces whose report descriptor declares
/// the filter's usage page and usage.
///
/// Every HID interface is claimed for a moment to read its report descriptor.
pub async fn candidates(filter: &DeviceFilter) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for candidate in hid_interfaces(filter).await? {
        match candidate.claim(filter).await {
            Ok(_) => candidates.push(candidate),
            Err(e) => debug!("Skipping {}: {}", candidate, e),
        }
    }
    Ok(candidates)
}

impl Candidate {
    /// Claim the interface and check that its report descriptor declares the filter's usage
    async fn claim(&self, filter: &DeviceFilter) -> Result<Interface> {
        let device = self.info.open().await?;
        let interface = device.detach_and_claim_interface(self.interface).await?;

        let descriptor = interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Standard,
                    recipient: Recipient::Interface,
                    request: REQUEST_GET_DESCRIPTOR,
                    value: DESCRIPTOR_TYPE_REPORT << 8,
                    index: self.interface as u16,
                    length: 512,
                },
                CONTROL_TIMEOUT,
            )
            .await?;
        filter.check_usage(self.interface, &descriptor)?;
        Ok(interface)
    }

    /// Claim the interface, check its usage and set up the raw HID endpoints
    pub async fn open(&self, filter: &DeviceFilter) -> Result<UsbTransport> {
        let interface = self.claim(filter).await?;
        let transport = UsbTransport::new(interface, self.interface)?;
        info!("Opened {}", self);
        Ok(transport)
    }
}

/// Open the first HID interface which turns out to be a raw HID interface
pub async fn open_first(filter: &DeviceFilter) -> Result<(Candidate, UsbTransport)> {
    for candidate in hid_interfaces(filter).await? {
        match candidate.open(filter).await {
            Ok(transport) => return Ok((candidate, transport)),
            Err(e) => debug!("Skipping {}: {}", candidate, e),
        }
    }
    Err(HostError::NoDevice)
}

/// Raw HID over the interrupt endpoints of a claimed interface
pub struct UsbTransport {
    // Keeps the interface claimed
    _interface: Interface,
    reader: Endpoint<Interrupt, In>,
    writer: Endpoint<Interrupt, Out>,
}

impl UsbTransport {
    fn new(interface: Interface, number: u8) -> Result<Self> {
        let mut in_address = None;
        let mut out_address = None;
        if let Some(descriptor) = interface.descriptor() {
            for endpoint in descriptor.endpoints() {
                if endpoint.transfer_type() != TransferType::Interrupt {
                    continue;
                }
                if endpoint.address() & 0x80 != 0 {
                    in_address.get_or_insert(endpoint.address());
                } else {
                    out_address.get_or_insert(endpoint.address());
                }
            }
        }
        let in_address = in_address.ok_or(HostError::NoEndpoint {
            interface: number,
            direction: "IN",
        })?;
        let out_address = out_address.ok_or(HostError::NoEndpoint {
            interface: number,
            direction: "OUT",
        })?;

        Ok(Self {
            reader: interface.endpoint::<Interrupt, In>(in_address)?,
            writer: interface.endpoint::<Interrupt, Out>(out_address)?,
            _interface: interface,
        })
    }
}

impl Transport for UsbTransport {
    async fn write(&mut self, report: &[u8]) -> Result<()> {
        // The raw HID descriptor has no report ids, so report id 0 isn't sent on the wire
        let data = match report.split_first() {
            Some((0, data)) => data,
            _ => report,
        };
        self.writer.submit(data.to_vec().into());
        self.writer.next_complete().await.status?;
        Ok(())
    }

    async fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Vec<u8>>> {
        // A transfer left over from a timed out read is still pending, reuse it
        if self.reader.pending() == 0 {
            let len = self.reader.max_packet_size().max(RAW_HID_REPORT_SIZE);
            let buffer = self.reader.allocate(len);
            self.reader.submit(buffer);
        }

        let completion = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.reader.next_complete()).await {
                Ok(completion) => completion,
                Err(_) => return Ok(None),
            },
            None => self.reader.next_complete().await,
        };
        completion.status?;
        Ok(Some(completion.buffer[..completion.actual_len].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const RAW_HID_DESCRIPTOR: &[u8] = &[
        0x06, 0x60, 0xFF,  // Usage Page (Vendor Defined 0xFF60)
        0x09, 0x61,        // Usage (0x61)
        0xA1, 0x01,        // Collection (Application)
        0x09, 0x62,        //   Usage (0x62)
        0x95, 0x20,        //   Report Count (32)
        0x75, 0x08,        //   Report Size (8)
        0x81, 0x02,        //   Input (Data,Var,Abs)
        0xC0,              // End Collection
    ];

    #[rustfmt::skip]
    const CONSUMER_CONTROL_DESCRIPTOR: &[u8] = &[
        0x05, 0x0C,        // Usage Page (Consumer)
        0x09, 0x01,        // Usage (Consumer Control)
        0xA1, 0x01,        // Collection (Application)
        0x19, 0x00,        //   Usage Minimum (0x00)
        0x2A, 0x3C, 0x02,  //   Usage Maximum (0x023C)
        0x81, 0x00,        //   Input (Data,Array,Abs)
        0xC0,              // End Collection
    ];

    #[rustfmt::skip]
    const MOUSE_DESCRIPTOR: &[u8] = &[
        0x05, 0x01,        // Usage Page (Generic Desktop Ctrls)
        0x09, 0x02,        // Usage (Mouse)
        0xA1, 0x01,        // Collection (Application)
        0x09, 0x01,        //   Usage (Pointer)
        0xA1, 0x00,        //   Collection (Physical)
        0xC0,              //   End Collection
        0xC0,              // End Collection
    ];

    #[test]
    fn test_default_filter_accepts_raw_hid() {
        let filter = DeviceFilter::default();
        assert!(filter.check_usage(1, RAW_HID_DESCRIPTOR).is_ok());
    }

    #[test]
    fn test_default_filter_rejects_other_interfaces() {
        let filter = DeviceFilter::default();
        assert!(matches!(
            filter.check_usage(2, CONSUMER_CONTROL_DESCRIPTOR),
            Err(HostError::NotRawHid {
                interface: 2,
                usage_page: 0x0C,
                usage: 0x01
            })
        ));
        assert!(matches!(
            filter.check_usage(0, MOUSE_DESCRIPTOR),
            Err(HostError::NotRawHid {
                usage_page: 0x01,
                usage: 0x02,
                ..
            })
        ));
        assert!(matches!(filter.check_usage(0, &[0x05]), Err(HostError::BadDescriptor)));
    }

    #[test]
    fn test_custom_usage() {
        let filter = DeviceFilter {
            usage_page: 0x0C,
            usage: 0x01,
            ..Default::default()
        };
        assert!(filter.check_usage(2, CONSUMER_CONTROL_DESCRIPTOR).is_ok());
        assert!(filter.check_usage(1, RAW_HID_DESCRIPTOR).is_err());
    }
}
