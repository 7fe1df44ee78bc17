//! Link supervision.
//!
//! [`ConnectivityManager::ensure_connected`] runs at boot and on every
//! scheduler iteration.  When the link is already up it is a single
//! status query.  When it is down it starts association and polls the
//! link up to `wifi_max_attempts` times, sleeping `wifi_retry_backoff_ms`
//! before each poll, then settles on CONNECTED or DISCONNECTED.  There is
//! no retry timer: a failed attempt is simply repeated on a later
//! iteration that still sees the link down.
//!
//! The backoff sleeps block the whole loop.  That is bounded by
//! `attempts × backoff` and covered by the watchdog timeout.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LinkPort};
use crate::config::SystemConfig;
use crate::context::{ConnectionState, ControllerState};

pub struct ConnectivityManager {
    max_attempts: u8,
    backoff_ms: u32,
    /// Association attempts started since boot.
    attempts_started: u32,
}

impl ConnectivityManager {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            max_attempts: config.wifi_max_attempts.max(1),
            backoff_ms: config.wifi_retry_backoff_ms,
            attempts_started: 0,
        }
    }

    /// Bring the link up if it is down.  Writes the outcome into
    /// `state.connection` and returns it.
    pub fn ensure_connected(
        &mut self,
        state: &mut ControllerState,
        link: &mut impl LinkPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> ConnectionState {
        let from = state.connection;

        if link.is_up() {
            if from != ConnectionState::Connected {
                Self::transition(state, ConnectionState::Connected, 0, sink);
            }
            return ConnectionState::Connected;
        }

        self.attempts_started = self.attempts_started.saturating_add(1);
        // Report the drop before reassociating.
        let from = if from == ConnectionState::Connected {
            warn!("Connectivity: link lost, reassociating");
            Self::transition(state, ConnectionState::Connecting, 0, sink);
            ConnectionState::Connecting
        } else {
            state.connection = ConnectionState::Connecting;
            from
        };

        if let Err(e) = link.start_connect() {
            warn!("Connectivity: cannot start association: {}", e);
            return Self::settle(state, from, ConnectionState::Disconnected, 0, sink);
        }

        for attempt in 1..=self.max_attempts {
            delay.delay_ms(self.backoff_ms);
            if link.is_up() {
                info!("Connectivity: link up after {} check(s)", attempt);
                return Self::settle(state, from, ConnectionState::Connected, attempt, sink);
            }
        }

        warn!(
            "Connectivity: link still down after {} checks, continuing offline",
            self.max_attempts
        );
        Self::settle(state, from, ConnectionState::Disconnected, self.max_attempts, sink)
    }

    pub fn attempts_started(&self) -> u32 {
        self.attempts_started
    }

    /// Worst-case time one call can block (ms).
    pub fn worst_case_block_ms(&self) -> u32 {
        u32::from(self.max_attempts).saturating_mul(self.backoff_ms)
    }

    fn settle(
        state: &mut ControllerState,
        from: ConnectionState,
        to: ConnectionState,
        attempts: u8,
        sink: &mut impl EventSink,
    ) -> ConnectionState {
        state.connection = to;
        sink.emit(&AppEvent::Connectivity { from, to, attempts });
        to
    }

    fn transition(state: &mut ControllerState, to: ConnectionState, attempts: u8, sink: &mut impl EventSink) {
        let from = state.connection;
        Self::settle(state, from, to, attempts, sink);
    }
}
