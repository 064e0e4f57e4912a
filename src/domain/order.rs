//! Market order construction for the live driver.

use std::fmt;

use tracing::{info, warn};

use crate::domain::config_validation::{read_f64, read_usize};
use crate::domain::error::TraderError;
use crate::domain::position::Side;
use crate::domain::symbol::{compute_stop_levels, SymbolInfo};
use crate::ports::config_port::ConfigPort;
use crate::ports::execution_port::ExecutionPort;

pub const DEFAULT_DEVIATION: u32 = 50;
pub const DEFAULT_MAGIC: u64 = 123_456;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    /// Fill price for a market order: ask to buy, bid to sell.
    pub fn price_for(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.ask,
            Side::Sell => self.bid,
        }
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub volume: f64,
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Maximum accepted slippage, in points.
    pub deviation: u32,
    pub magic: u64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderManager {
    symbol: String,
    symbol_info: SymbolInfo,
    lot_size: f64,
    tp_pips: f64,
    sl_pips: f64,
    deviation: u32,
    magic: u64,
}

impl OrderManager {
    pub fn new(
        symbol: &str,
        symbol_info: SymbolInfo,
        lot_size: f64,
        tp_pips: f64,
        sl_pips: f64,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            symbol_info,
            lot_size,
            tp_pips,
            sl_pips,
            deviation: DEFAULT_DEVIATION,
            magic: DEFAULT_MAGIC,
        }
    }

    pub fn with_deviation(mut self, deviation: u32) -> Self {
        self.deviation = deviation;
        self
    }

    pub fn with_magic(mut self, magic: u64) -> Self {
        self.magic = magic;
        self
    }

    /// Sizing from `[backtest]`, venue fields from `[live]`.
    pub fn from_config(
        config: &dyn ConfigPort,
        symbol: &str,
        symbol_info: SymbolInfo,
    ) -> Result<Self, TraderError> {
        let deviation = read_usize(config, "live", "deviation", DEFAULT_DEVIATION as usize)?;
        let deviation = u32::try_from(deviation).map_err(|_| TraderError::ConfigInvalid {
            section: "live".into(),
            key: "deviation".into(),
            reason: format!("{deviation} is out of range"),
        })?;
        let magic = read_usize(config, "live", "magic", DEFAULT_MAGIC as usize)? as u64;
        Ok(Self::new(
            symbol,
            symbol_info,
            read_f64(config, "backtest", "lot_size", 0.01)?,
            read_f64(config, "backtest", "tp_pips", 5.0)?,
            read_f64(config, "backtest", "sl_pips", 5.0)?,
        )
        .with_deviation(deviation)
        .with_magic(magic))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn build_request(&self, side: Side, quote: &Quote) -> Result<OrderRequest, TraderError> {
        let price = quote.price_for(side);
        let levels = compute_stop_levels(side, price, self.tp_pips, self.sl_pips, &self.symbol_info)?;
        Ok(OrderRequest {
            symbol: self.symbol.clone(),
            side,
            volume: self.lot_size,
            price,
            take_profit: levels.take_profit,
            stop_loss: levels.stop_loss,
            deviation: self.deviation,
            magic: self.magic,
            comment: format!("{} Order", side.label()),
        })
    }

    /// Quote, build and submit a market order for `side`.
    pub fn place(&self, side: Side, venue: &dyn ExecutionPort) -> Result<Ticket, TraderError> {
        let quote = venue.quote(&self.symbol)?;
        let request = self.build_request(side, &quote)?;
        info!(
            symbol = %request.symbol,
            %side,
            price = request.price,
            tp = request.take_profit,
            sl = request.stop_loss,
            "sending order"
        );
        match venue.place_order(&request) {
            Ok(ticket) => {
                info!(%ticket, "order placed");
                Ok(ticket)
            }
            Err(e) => {
                warn!(error = %e, "order failed");
                Err(e)
            }
        }
    }
}
