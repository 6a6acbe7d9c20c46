//! Typed request objects accepted at the adapter boundary.

use laabhum_core::{OmsError, OmsResult, Order, OrderSide, OrderType, Price, Quantity, TradeStrategy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Execution style a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedType {
    Market,
    Limit,
    Stop,
}

impl From<RequestedType> for OrderType {
    fn from(kind: RequestedType) -> Self {
        match kind {
            RequestedType::Market => OrderType::Market,
            RequestedType::Limit => OrderType::Limit,
            RequestedType::Stop => OrderType::Stop,
        }
    }
}

/// Order submission as received from a client.
///
/// `limit_price` is required (and positive) for limit and stop orders;
/// for stop orders it becomes the order's trigger price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: RequestedType,
    pub price: Decimal,
    pub quantity: u64,
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub strategy: Option<TradeStrategy>,
    #[serde(default)]
    pub risk_percentage: Option<Decimal>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl OrderRequest {
    /// Minimal request with the required fields.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: RequestedType,
        price: Decimal,
        quantity: u64,
    ) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            side,
            order_type,
            price,
            quantity,
            limit_price: None,
            stop_loss: None,
            take_profit: None,
            strategy: None,
            risk_percentage: None,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn with_limit_price(mut self, limit_price: Decimal) -> Self {
        self.limit_price = Some(limit_price);
        self
    }

    /// Parse a JSON payload. Malformed payloads are `Validation` errors.
    pub fn from_json(payload: &str) -> OmsResult<Self> {
        serde_json::from_str(payload)
            .map_err(|e| OmsError::validation(format!("invalid order data: {e}")))
    }

    /// Check the request before anything is stored.
    pub fn validate(&self) -> OmsResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(OmsError::validation("symbol is required"));
        }
        if self.price <= Decimal::ZERO {
            return Err(OmsError::validation("invalid order price"));
        }
        if self.quantity == 0 {
            return Err(OmsError::validation("invalid order quantity"));
        }
        if matches!(self.order_type, RequestedType::Limit | RequestedType::Stop) {
            match self.limit_price {
                Some(limit) if limit > Decimal::ZERO => {}
                _ => return Err(OmsError::validation("invalid limit price")),
            }
        }
        if let Some(risk) = self.risk_percentage {
            if risk < Decimal::ZERO {
                return Err(OmsError::validation("risk percentage must not be negative"));
            }
        }
        Ok(())
    }

    /// Convert into an unstored order. Call [`OrderRequest::validate`] first.
    #[must_use]
    pub fn into_order(self) -> Order {
        let mut order = Order::new(
            self.symbol,
            self.side,
            self.order_type.into(),
            Quantity(self.quantity),
            Price::new(self.price),
        );
        if let Some(id) = self.id {
            order.id = id;
        }
        if self.order_type == RequestedType::Stop {
            order.stop_price = self.limit_price.map(Price::new);
        }
        order.stop_loss = self.stop_loss.map(Price::new);
        order.take_profit = self.take_profit.map(Price::new);
        order.strategy = self.strategy;
        order.risk_percentage = self.risk_percentage.unwrap_or_default();
        order.parent_id = self.parent_id.unwrap_or_default();
        order
    }
}

/// Fields a client may change on a pending order. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChanges {
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub stop_price: Option<Price>,
    #[serde(default)]
    pub stop_loss: Option<Price>,
    #[serde(default)]
    pub take_profit: Option<Price>,
}

impl OrderChanges {
    #[must_use]
    pub fn price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Apply the set fields onto `order`.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(price) = self.price {
            order.price = price;
        }
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(stop_price) = self.stop_price {
            order.stop_price = Some(stop_price);
        }
        if let Some(stop_loss) = self.stop_loss {
            order.stop_loss = Some(stop_loss);
        }
        if let Some(take_profit) = self.take_profit {
            order.take_profit = Some(take_profit);
        }
    }
}
