//! # Firmware Errata
//!
//! Re-priming a TX channel while the RX channel with the same number is
//! RF_ENABLED silently stops RX capture, as if the RX path had been powered
//! down. Only the paired RX is affected. Cycling RF on that RX restores it.
//!
//! [`recapture_rx_after_prime`] is the only entry point. The driver calls it
//! after a successful prime batch when
//! [`crate::config::ErrataConfig::rx_recapture_after_prime`] is set; clearing
//! that switch removes the workaround entirely.

use crate::error::Result;
use crate::radio::driver::Adrv9001Driver;
use crate::radio::hal::Hal;
use crate::radio::types::{ChannelId, ChannelState, Port};

/// Cycle RF on every enabled RX paired with a TX channel of `primed`
///
/// The radio state is read once, after the prime command completed. RX
/// channels and TX channels whose paired RX is not RF_ENABLED are skipped.
pub fn recapture_rx_after_prime<H: Hal>(
    driver: &mut Adrv9001Driver<H>,
    primed: &[ChannelId],
) -> Result<()> {
    let state = driver.radio_state_get()?;
    let tries = driver.config().disable_rf_tries_to_primed;

    for tx in primed.iter().filter(|c| c.port == Port::Tx) {
        let rx = tx.paired_rx();
        if state.channel(rx) != Some(ChannelState::RfEnabled) {
            continue;
        }

        log::warn!("{tx} primed while {rx} is RF_ENABLED, cycling RF on {rx} to restore capture");
        driver.disable_rf_and_wait(rx, tries)?;
        driver.channel_enable_rf(rx, true)?;
    }
    Ok(())
}
