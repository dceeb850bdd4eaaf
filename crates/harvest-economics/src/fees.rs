// crates/harvest-economics/src/fees.rs
//
// Purchase reconciliation math.
//
// A sale of `total_price` yields a producer share of
//   share = total_price - floor(fee_percentage * total_price / 100)
// which is settled first against the producer's advance credit, with only
// the excess paid out in new tokens.

use serde::{Deserialize, Serialize};

use harvest_core::Amount;

/// Outcome of reconciling one sale against a producer's credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub share: Amount,
    pub credited_before: Amount,
    pub credited_after: Amount,
    /// Tokens to transfer to the producer; zero when credit covers the share.
    pub payout: Amount,
}

/// Producer share of a sale after the protocol fee.
///
/// Computed in u128 so `fee_percentage * total_price` cannot overflow.
/// Percentages above 100 are clamped to 100.
pub fn producer_share(total_price: Amount, fee_percentage: u8) -> Amount {
    let pct = u128::from(fee_percentage.min(100));
    let fee = (pct * u128::from(total_price)) / 100;
    total_price - fee as Amount
}

/// Reconcile a sale of `total_price` against `credited` advance credit.
pub fn reconcile_purchase(credited: Amount, total_price: Amount, fee_percentage: u8) -> Reconciliation {
    let share = producer_share(total_price, fee_percentage);
    if share <= credited {
        Reconciliation {
            share,
            credited_before: credited,
            credited_after: credited - share,
            payout: 0,
        }
    } else {
        Reconciliation {
            share,
            credited_before: credited,
            credited_after: 0,
            payout: share - credited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_share_floors_fee() {
        // fee = floor(20 * 12 / 100) = 2
        assert_eq!(producer_share(12, 20), 10);
        // fee = floor(20 * 7 / 100) = 1
        assert_eq!(producer_share(7, 20), 6);
        assert_eq!(producer_share(0, 20), 0);
    }

    #[test]
    fn test_producer_share_edge_percentages() {
        assert_eq!(producer_share(100, 0), 100);
        assert_eq!(producer_share(100, 100), 0);
        assert_eq!(producer_share(100, 250), 0);
    }

    #[test]
    fn test_producer_share_no_overflow() {
        let share = producer_share(u64::MAX, 20);
        assert!(share < u64::MAX);
        assert!(share > u64::MAX / 2);
    }

    #[test]
    fn test_credit_covers_share() {
        let r = reconcile_purchase(10, 12, 20);
        assert_eq!(r.share, 10);
        assert_eq!(r.credited_after, 0);
        assert_eq!(r.payout, 0);

        let r = reconcile_purchase(25, 12, 20);
        assert_eq!(r.credited_after, 15);
        assert_eq!(r.payout, 0);
    }

    #[test]
    fn test_share_exceeds_credit() {
        let r = reconcile_purchase(4, 12, 20);
        assert_eq!(r.credited_before, 4);
        assert_eq!(r.credited_after, 0);
        assert_eq!(r.payout, 6);
    }
}
