//! # Viewer Module
//!
//! Streams progressive results to TEV (The EXR Viewer) over TCP.
//!
//! The image is created once when the stream opens; every later call to
//! [`TevStream::update`] sends the full averaged image as an update packet so
//! TEV shows the render converging while tracing continues.

use std::net::TcpStream;
use std::time::Instant;

use log::{debug, info, warn};
use tev_client::{PacketCreateImage, PacketUpdateImage, TevClient};

use pathgrid::Color;

/// Default TEV port when the address has none.
const DEFAULT_TEV_PORT: u16 = 14158;

const IMAGE_NAME: &str = "pathgrid";
const CHANNELS: [&str; 3] = ["R", "G", "B"];

/// Open connection to a TEV instance showing one image.
pub struct TevStream {
    client: TevClient,
    address: String,
    width: u32,
    height: u32,
}

impl TevStream {
    /// Connect to TEV and create a `width` x `height` RGB image.
    ///
    /// Returns `None` (after logging why) if TEV cannot be reached.
    pub fn connect(tev_address: &str, width: u32, height: u32) -> Option<Self> {
        // Add default port if not specified
        let address = if tev_address.contains(':') {
            tev_address.to_string()
        } else {
            format!("{}:{}", tev_address, DEFAULT_TEV_PORT)
        };

        debug!("Attempting to connect to TEV at {}", address);
        let stream = match TcpStream::connect(&address) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to connect to TEV on {}: {}", address, e);
                return None;
            }
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        let mut client = TevClient::wrap(stream);
        let create_packet = PacketCreateImage {
            image_name: IMAGE_NAME,
            width,
            height,
            channel_names: &CHANNELS,
            grab_focus: true,
        };
        if let Err(e) = client.send(create_packet) {
            warn!("Failed to create image in TEV: {}", e);
            return None;
        }

        info!("Streaming progressive results to TEV at {}", address);
        Some(Self {
            client,
            address,
            width,
            height,
        })
    }

    /// Send the averaged colors of a snapshot; returns false if the send failed.
    pub fn update(&mut self, colors: &[Color], samples: u32) -> bool {
        let started = Instant::now();
        let data = planar_rgb(colors);

        let pixel_count = (self.width * self.height) as u64;
        let update_packet = PacketUpdateImage {
            image_name: IMAGE_NAME,
            grab_focus: false,
            channel_names: &CHANNELS,
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
            channel_offsets: &[0, pixel_count, 2 * pixel_count],
            channel_strides: &[1, 1, 1],
            data: &data,
        };

        match self.client.send(update_packet) {
            Ok(_) => {
                debug!(
                    "Sent sample {} to TEV at {} in {:.2?}",
                    samples,
                    self.address,
                    started.elapsed()
                );
                true
            }
            Err(e) => {
                warn!("Failed to send image data to TEV: {}", e);
                false
            }
        }
    }
}

/// Convert interleaved integer RGB to planar (RRR...GGG...BBB...) floats in [0, 1].
pub fn planar_rgb(colors: &[Color]) -> Vec<f32> {
    let mut data = Vec::with_capacity(colors.len() * 3);
    for channel in 0..3 {
        data.extend(
            colors
                .iter()
                .map(|color| (color[channel] as f32 / 255.0).clamp(0.0, 1.0)),
        );
    }
    data
}
