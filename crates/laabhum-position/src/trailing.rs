//! Trailing stop and take-profit rules.

use laabhum_core::{Position, Price};

/// Tightened stop for a long position, if the price has moved in its favour.
///
/// The stop trails the current price by the distance fixed when the
/// position opened: `current - trail_distance`. Returns `None` unless the
/// result is strictly above the stored stop, so repeated calls at the same
/// price leave the stop where it is.
#[must_use]
pub fn trailed_stop(position: &Position, current: Price) -> Option<Price> {
    if current <= position.entry_price {
        return None;
    }
    let candidate = current - position.trail_distance;
    (candidate > position.stop_loss).then_some(candidate)
}

/// Returns true once the current price reaches the position's take profit.
#[must_use]
pub fn take_profit_reached(position: &Position, current: Price) -> bool {
    position.take_profit.is_some_and(|tp| current >= tp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laabhum_core::Quantity;
    use rust_decimal_macros::dec;

    fn px(v: rust_decimal::Decimal) -> Price {
        Price::new(v)
    }

    fn long(stop_loss: Price) -> Position {
        Position::new("o1", "XYZ", Quantity(1), px(dec!(100)), stop_loss, None)
    }

    #[test]
    fn test_no_trail_at_or_below_entry() {
        let position = long(px(dec!(95)));
        assert_eq!(trailed_stop(&position, px(dec!(100))), None);
        assert_eq!(trailed_stop(&position, px(dec!(90))), None);
    }

    #[test]
    fn test_trail_keeps_opening_distance() {
        let mut position = long(px(dec!(95)));
        assert_eq!(trailed_stop(&position, px(dec!(103))), Some(px(dec!(98))));

        // distance stays 5 after the stop has been tightened
        position.stop_loss = px(dec!(98));
        assert_eq!(trailed_stop(&position, px(dec!(106))), Some(px(dec!(101))));
    }

    #[test]
    fn test_same_price_does_not_move_stop_again() {
        let mut position = long(px(dec!(95)));
        position.stop_loss = trailed_stop(&position, px(dec!(103))).unwrap();

        assert_eq!(trailed_stop(&position, px(dec!(103))), None);
        assert_eq!(trailed_stop(&position, px(dec!(102))), None);
        assert!(position.stop_loss <= px(dec!(103)));
    }

    #[test]
    fn test_take_profit() {
        let mut position = Position::new("o1", "XYZ", Quantity(1), px(dec!(100)), px(dec!(95)), Some(px(dec!(110))));
        assert!(!take_profit_reached(&position, px(dec!(109.99))));
        assert!(take_profit_reached(&position, px(dec!(110))));
        assert!(take_profit_reached(&position, px(dec!(111))));

        position.take_profit = None;
        assert!(!take_profit_reached(&position, px(dec!(1000))));
    }
}
