use adrv9001_radio::logging::{init_logger, init_logger_with_level};
use adrv9001_radio::sim::SimulatedDevice;
use adrv9001_radio::util::pretty_hex;
use adrv9001_radio::{
    constants::{ADDR_ARM_MAILBOX_SET, CARRIER_PAYLOAD_LEN},
    Adrv9001Driver, Carrier, ChannelId, ChannelState, Pll,
    PllLoopFilterConfig, RadioConfig,
};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adrv9001-cli")]
#[command(about = "Exercise the ADRV9001 radio control path against a simulated device")]
struct Cli {
    /// JSON file overriding polling windows, retry budgets and errata switches
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level, including mailbox payloads
    #[arg(short, long, global = true)]
    verbose: bool,

    /// State every RX/TX channel starts in
    #[arg(long, global = true, value_enum, default_value = "calibrated")]
    preset: StateArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print system and channel states
    State,
    /// Move one channel to a target state
    ToState {
        #[arg(value_enum)]
        channel: ChannelArg,
        #[arg(value_enum)]
        state: StateArg,
    },
    /// Prime (or un-prime) a batch of channels
    Prime {
        #[arg(value_enum, required = true)]
        channels: Vec<ChannelArg>,
        #[arg(long)]
        unprime: bool,
    },
    /// Enable (or disable) RF on a batch of channels
    EnableRf {
        #[arg(value_enum, required = true)]
        channels: Vec<ChannelArg>,
        #[arg(long)]
        disable: bool,
    },
    /// Configure a carrier and read it back
    Carrier {
        #[arg(value_enum)]
        channel: ChannelArg,
        frequency_hz: u64,
        #[arg(long, default_value_t = 0)]
        if_hz: u32,
        /// Hex dump the SET mailbox after the write
        #[arg(long)]
        dump: bool,
    },
    /// Program a PLL loop filter and read it back
    LoopFilter {
        #[arg(value_enum)]
        pll: PllArg,
        #[arg(long, default_value_t = 60)]
        phase_margin: u8,
        #[arg(long, default_value_t = 300)]
        bandwidth_khz: u16,
        #[arg(long, default_value_t = 5)]
        power_scale: u8,
    },
    /// Query a synthesizer lock indicator
    PllLock {
        #[arg(value_enum)]
        pll: PllArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChannelArg {
    Rx1,
    Rx2,
    Tx1,
    Tx2,
}

impl From<ChannelArg> for ChannelId {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Rx1 => ChannelId::RX1,
            ChannelArg::Rx2 => ChannelId::RX2,
            ChannelArg::Tx1 => ChannelId::TX1,
            ChannelArg::Tx2 => ChannelId::TX2,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StateArg {
    Standby,
    Calibrated,
    Primed,
    RfEnabled,
}

impl From<StateArg> for ChannelState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Standby => ChannelState::Standby,
            StateArg::Calibrated => ChannelState::Calibrated,
            StateArg::Primed => ChannelState::Primed,
            StateArg::RfEnabled => ChannelState::RfEnabled,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PllArg {
    Lo1,
    Lo2,
    Aux,
    Clk,
    ClkLp,
}

impl From<PllArg> for Pll {
    fn from(arg: PllArg) -> Self {
        match arg {
            PllArg::Lo1 => Pll::Lo1,
            PllArg::Lo2 => Pll::Lo2,
            PllArg::Aux => Pll::Aux,
            PllArg::Clk => Pll::Clk,
            PllArg::ClkLp => Pll::ClkLowPower,
        }
    }
}

fn simulated_device(preset: ChannelState) -> SimulatedDevice {
    let mut device = SimulatedDevice::new();
    for channel in [ChannelId::RX1, ChannelId::RX2, ChannelId::TX1, ChannelId::TX2] {
        device.set_channel_state(channel, preset);
    }
    for pll in [Pll::Lo1, Pll::Lo2, Pll::Aux, Pll::Clk, Pll::ClkLowPower] {
        device.set_pll_locked(pll, true);
    }
    device
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_logger_with_level(LevelFilter::Debug);
    } else {
        init_logger();
    }

    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            RadioConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => RadioConfig::default(),
    };
    let mut driver =
        Adrv9001Driver::with_config(simulated_device(cli.preset.into()), config);

    match cli.command {
        Commands::State => {
            let state = driver.radio_state_get()?;
            println!(
                "system {} monitor {} boot {}",
                state.system_state, state.monitor_mode_state, state.boot_state
            );
            for channel in [ChannelId::RX1, ChannelId::RX2, ChannelId::TX1, ChannelId::TX2] {
                if let Some(s) = state.channel(channel) {
                    println!("{channel}: {s:?}");
                }
            }
        }
        Commands::ToState { channel, state } => {
            let channel = ChannelId::from(channel);
            driver
                .channel_to_state(channel, state.into())
                .with_context(|| format!("moving {channel} to {state:?}"))?;
            println!("{channel}: {:?}", driver.channel_state_get(channel)?);
        }
        Commands::Prime { channels, unprime } => {
            let channels: Vec<ChannelId> = channels.into_iter().map(Into::into).collect();
            driver.channels_prime(&channels, !unprime)?;
            for channel in channels {
                println!("{channel}: {:?}", driver.channel_state_get(channel)?);
            }
        }
        Commands::EnableRf { channels, disable } => {
            let channels: Vec<ChannelId> = channels.into_iter().map(Into::into).collect();
            driver.channels_enable_rf(&channels, !disable)?;
            for channel in channels {
                println!("{channel}: {:?}", driver.channel_state_get(channel)?);
            }
        }
        Commands::Carrier {
            channel,
            frequency_hz,
            if_hz,
            dump,
        } => {
            let channel = ChannelId::from(channel);
            let carrier = Carrier {
                carrier_frequency_hz: frequency_hz,
                intermediate_frequency_hz: if_hz,
                ..Default::default()
            };
            driver.carrier_configure(channel, &carrier)?;
            if dump {
                let mailbox = driver.hal().memory(ADDR_ARM_MAILBOX_SET, CARRIER_PAYLOAD_LEN);
                println!("{}", pretty_hex(ADDR_ARM_MAILBOX_SET, &mailbox, 16));
            }
            let readback = driver.carrier_inspect(channel)?;
            println!("{}", serde_json::to_string_pretty(&readback)?);
        }
        Commands::LoopFilter {
            pll,
            phase_margin,
            bandwidth_khz,
            power_scale,
        } => {
            let pll = Pll::from(pll);
            let filter = PllLoopFilterConfig {
                phase_margin_degrees: phase_margin,
                loop_bandwidth_khz: bandwidth_khz,
                power_scale,
                effective_loop_bandwidth_khz: 0,
            };
            driver.pll_loop_filter_set(pll, &filter)?;
            let readback = driver.pll_loop_filter_get(pll)?;
            println!("{}", serde_json::to_string_pretty(&readback)?);
        }
        Commands::PllLock { pll } => {
            let pll = Pll::from(pll);
            println!("{pll:?} locked: {}", driver.pll_status_get(pll)?);
        }
    }

    Ok(())
}
