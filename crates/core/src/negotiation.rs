//! Budget negotiation rules.
//!
//! Negotiations form an append-only chain per project: a counter-offer does
//! not edit the countered row, it marks it `countered` and spawns a fresh
//! `pending` row whose original price is the countered row's proposed price.

use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::status::NegotiationStatus;

/// Responses are only legal while the negotiation is `pending`.
pub fn ensure_pending(current: NegotiationStatus) -> Result<(), CoreError> {
    if current != NegotiationStatus::Pending {
        return Err(CoreError::InvalidState(
            "Negotiation has already been responded to".into(),
        ));
    }
    Ok(())
}

/// Validate a proposed price (used for both proposals and counters).
pub fn validate_proposed_price(price: Decimal) -> Result<(), CoreError> {
    if price <= Decimal::ZERO {
        return Err(CoreError::Validation(
            "Proposed price must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn only_pending_negotiations_accept_responses() {
        assert!(ensure_pending(NegotiationStatus::Pending).is_ok());
        for status in [
            NegotiationStatus::Accepted,
            NegotiationStatus::Rejected,
            NegotiationStatus::Countered,
        ] {
            assert_matches!(ensure_pending(status).unwrap_err(), CoreError::InvalidState(_));
        }
    }

    #[test]
    fn proposed_price_must_be_positive() {
        assert!(validate_proposed_price(dec!(0.01)).is_ok());
        assert_matches!(
            validate_proposed_price(dec!(0)).unwrap_err(),
            CoreError::Validation(_)
        );
        assert_matches!(
            validate_proposed_price(dec!(-5)).unwrap_err(),
            CoreError::Validation(_)
        );
    }
}
