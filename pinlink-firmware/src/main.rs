//! Pinlink - Remote Pin Control
//!
//! Host runtime binary. Runs the device tick loop against std sockets, a
//! data directory and a simulated GPIO bank, so the command engine can be
//! driven from a terminal, `nc` or a browser without hardware.
//!
//! ```text
//! pinlink-firmware --data-dir ./data --bind 127.0.0.1
//! echo "config pin D1 output" | nc 127.0.0.1 333
//! curl -d "pin=D1&value=1" http://127.0.0.1/write
//! ```

mod board;
mod console;
mod net;
mod settings;
mod storage;

use std::io;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::info;

use pinlink_core::Device;

use crate::board::HostPlatform;
use crate::settings::{Args, RuntimeSettings};

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = RuntimeSettings::resolve(&args)?;
    info!(
        "pinlink starting (data {}, bind {}, tick {} ms)",
        settings.data_dir.display(),
        settings.bind,
        settings.tick_ms
    );

    let mut device: Device<HostPlatform> = Device::new(board::host_board(&settings)?);
    let period = Duration::from_millis(settings.tick_ms);

    loop {
        device.tick();

        // A hardware reset never returns; here the device is rebuilt from
        // the same board so configuration is reloaded from storage
        if device.system_mut().take_reset() {
            info!("restarting");
            device = Device::new(device.into_board());
        }

        thread::sleep(period);
    }
}
