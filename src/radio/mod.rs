pub mod codec;
pub mod driver;
pub mod hal;
pub mod mailbox;
pub mod mask;
pub mod registers;
pub mod types;

// Parameter services extend Adrv9001Driver
mod params;

// Firmware workarounds
pub mod errata;

pub use driver::Adrv9001Driver;
pub use hal::{GpioPin, GpioSignal, Hal, HalError};
pub use mask::ChannelMask;
pub use types::{
    Carrier, ChannelEnableMode, ChannelEnablementDelays, ChannelId, ChannelNumber, ChannelState,
    LoGenOptimization, Pll, PllCalibration, PllLoopFilterConfig, PllPower, Port, RadioState,
};
