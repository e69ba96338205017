//! Analytic European option prices (Black-Scholes-Merton).
//!
//! $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
//! $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
//!
//! where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$.

use lv_core::{Price, Rate, Real, Time, Volatility};
use lv_math::normal_cdf;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// `+1` for a call, `−1` for a put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Exercise value at `spot`.
    #[inline]
    pub fn payoff(self, spot: Price, strike: Real) -> Price {
        (self.sign() * (spot - strike)).max(0.0)
    }
}

/// Black-Scholes-Merton price of a European option.
///
/// For `t ≤ 0` this is the intrinsic value; for zero volatility it is the
/// discounted payoff on the forward.
pub fn black_scholes_price(
    option_type: OptionType,
    spot: Price,
    strike: Real,
    rate: Rate,
    dividend: Rate,
    vol: Volatility,
    t: Time,
) -> Price {
    if t <= 0.0 {
        return option_type.payoff(spot, strike);
    }
    let phi = option_type.sign();
    let df_r = (-rate * t).exp();
    let df_q = (-dividend * t).exp();
    let std_dev = vol * t.sqrt();

    if std_dev <= 1e-15 {
        let forward = spot * df_q / df_r;
        return df_r * option_type.payoff(forward, strike);
    }

    let d1 = ((spot / strike).ln() + (rate - dividend) * t) / std_dev + 0.5 * std_dev;
    let d2 = d1 - std_dev;
    phi * (spot * df_q * normal_cdf(phi * d1) - strike * df_r * normal_cdf(phi * d2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn textbook_call_value() {
        // Hull: S=100, K=100, r=5%, σ=20%, T=1
        let c = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        assert_abs_diff_eq!(c, 10.450_583_572_185_565, epsilon = 1e-9);
    }

    #[test]
    fn put_call_parity() {
        for &(k, q, t) in &[(80.0, 0.0, 0.5), (100.0, 0.02, 1.0), (130.0, 0.04, 3.0)] {
            let c = black_scholes_price(OptionType::Call, 100.0, k, 0.03, q, 0.25, t);
            let p = black_scholes_price(OptionType::Put, 100.0, k, 0.03, q, 0.25, t);
            let parity = 100.0 * (-q * t).exp() - k * (-0.03 * t).exp();
            assert_abs_diff_eq!(c - p, parity, epsilon = 1e-10);
        }
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(black_scholes_price(OptionType::Call, 110.0, 100.0, 0.05, 0.0, 0.2, 0.0), 10.0);
        assert_eq!(black_scholes_price(OptionType::Put, 110.0, 100.0, 0.05, 0.0, 0.2, -1.0), 0.0);
        let c = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(c, 100.0 - 100.0 * (-0.05_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn payoff_and_sign() {
        assert_eq!(OptionType::Call.payoff(120.0, 100.0), 20.0);
        assert_eq!(OptionType::Put.payoff(120.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.sign(), -1.0);
    }

    proptest::proptest! {
        #[test]
        fn call_respects_no_arbitrage_bounds(
            k in 20.0f64..300.0,
            r in 0.0f64..0.1,
            q in 0.0f64..0.08,
            vol in 0.01f64..1.0,
            t in 0.01f64..5.0,
        ) {
            let c = black_scholes_price(OptionType::Call, 100.0, k, r, q, vol, t);
            let upper = 100.0 * (-q * t).exp();
            let lower = (upper - k * (-r * t).exp()).max(0.0);
            proptest::prop_assert!(c >= lower - 1e-10 && c <= upper + 1e-10, "c = {}", c);
        }
    }
}
