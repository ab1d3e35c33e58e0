use adrv9001_radio::sim::SimulatedDevice;
use adrv9001_radio::{Adrv9001Driver, Carrier, ChannelId, ChannelState, Pll, PllLoopFilterConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_carrier_round_trip(c: &mut Criterion) {
    let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());
    let carrier = Carrier {
        carrier_frequency_hz: 2_450_000_000,
        intermediate_frequency_hz: 1_000_000,
        ..Default::default()
    };

    c.bench_function("carrier_configure_inspect", |b| {
        b.iter(|| {
            driver.carrier_configure(ChannelId::RX1, black_box(&carrier)).unwrap();
            let read = driver.carrier_inspect(ChannelId::RX1).unwrap();
            driver.hal_mut().clear_journals();
            black_box(read)
        })
    });
}

fn benchmark_loop_filter_round_trip(c: &mut Criterion) {
    let mut driver = Adrv9001Driver::new(SimulatedDevice::new());
    let filter = PllLoopFilterConfig {
        phase_margin_degrees: 60,
        loop_bandwidth_khz: 300,
        power_scale: 5,
        effective_loop_bandwidth_khz: 0,
    };

    c.bench_function("pll_loop_filter_set_get", |b| {
        b.iter(|| {
            driver.pll_loop_filter_set(Pll::Lo1, black_box(&filter)).unwrap();
            let read = driver.pll_loop_filter_get(Pll::Lo1).unwrap();
            driver.hal_mut().clear_journals();
            black_box(read)
        })
    });
}

fn benchmark_channel_lifecycle(c: &mut Criterion) {
    let mut device = SimulatedDevice::calibrated();
    device.set_command_latency(4);
    let mut driver = Adrv9001Driver::new(device);

    c.bench_function("channel_calibrated_to_rf_enabled_and_back", |b| {
        b.iter(|| {
            driver
                .channel_to_state(black_box(ChannelId::TX1), ChannelState::RfEnabled)
                .unwrap();
            driver
                .channel_to_state(ChannelId::TX1, ChannelState::Calibrated)
                .unwrap();
            driver.hal_mut().clear_journals();
        })
    });
}

fn benchmark_radio_state_get(c: &mut Criterion) {
    let mut driver = Adrv9001Driver::new(SimulatedDevice::calibrated());

    c.bench_function("radio_state_get", |b| {
        b.iter(|| black_box(driver.radio_state_get().unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_carrier_round_trip,
    benchmark_loop_filter_round_trip,
    benchmark_channel_lifecycle,
    benchmark_radio_state_get
);
criterion_main!(benches);
