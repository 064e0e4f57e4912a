//! Execution venue port, used by the live driver only.

use crate::domain::error::TraderError;
use crate::domain::order::{OrderRequest, Quote, Ticket};

pub trait ExecutionPort {
    fn quote(&self, symbol: &str) -> Result<Quote, TraderError>;

    /// Number of open positions the venue holds for `symbol`.
    fn open_positions(&self, symbol: &str) -> Result<usize, TraderError>;

    /// Submit a market order. A venue rejection is `TraderError::Order`.
    fn place_order(&self, request: &OrderRequest) -> Result<Ticket, TraderError>;
}
