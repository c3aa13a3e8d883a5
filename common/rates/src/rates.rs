#![no_std]

use common_structs::{GrowthFactors, IndexFlavor, P2PIndexParams, P2PRateParams};

multiversx_sc::imports!();

/// The InterestRates module derives the peer-to-peer layer of a market from the
/// underlying pool: growth factors, P2P indexes and the reported P2P rates.
///
/// **Scope**: Pure fixed-point computations, no storage access.
///
/// **Goal**: Keep P2P indexes moving in lockstep with the pool while splitting the
/// pool spread between suppliers, borrowers and the reserve.
///
/// Every function takes the market's `IndexFlavor` explicitly; indexes, growth
/// factors and rates are expressed at its precision, percentages in BPS.
#[multiversx_sc::module]
pub trait InterestRates: common_math::SharedMathModule {
    /// Computes how much each side of a market grew since the last accrual.
    ///
    /// **Formula**:
    /// - `pool_gf = new_pool_index / last_pool_index` for both sides.
    /// - If `pool_supply_gf <= pool_borrow_gf`:
    ///   - `p2p_gf = weighted_avg(pool_supply_gf, pool_borrow_gf, cursor)`
    ///   - `p2p_supply_gf = p2p_gf - (p2p_gf - pool_supply_gf) * reserve_factor`
    ///   - `p2p_borrow_gf = p2p_gf + (pool_borrow_gf - p2p_gf) * reserve_factor`
    /// - Otherwise both P2P growth factors are `pool_borrow_gf`.
    ///
    /// # Arguments
    /// - `new_pool_supply_index`, `new_pool_borrow_index`: Freshly observed pool indexes.
    /// - `last_pool_supply_index`, `last_pool_borrow_index`: Pool indexes of the previous accrual, non-zero.
    /// - `p2p_index_cursor`: Position of the P2P rate inside the pool spread (BPS).
    /// - `reserve_factor`: Share of the spread kept by the reserve (BPS).
    /// - `flavor`: Index scale of the market.
    ///
    /// # Returns
    /// - `GrowthFactors<Self::Api>`: Pool and P2P growth factors of both sides.
    #[allow(clippy::too_many_arguments)]
    fn compute_growth_factors(
        &self,
        new_pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        new_pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
        last_pool_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        last_pool_borrow_index: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_index_cursor: &ManagedDecimal<Self::Api, NumDecimals>,
        reserve_factor: &ManagedDecimal<Self::Api, NumDecimals>,
        flavor: IndexFlavor,
    ) -> GrowthFactors<Self::Api> {
        let precision = flavor.precision();
        let pool_supply =
            self.index_div(new_pool_supply_index, last_pool_supply_index, precision);
        let pool_borrow =
            self.index_div(new_pool_borrow_index, last_pool_borrow_index, precision);

        if pool_supply > pool_borrow {
            // Supply index outgrew the borrow index (donation to the pool):
            // the P2P layer tracks the pool borrow side.
            return GrowthFactors {
                p2p_supply: pool_borrow.clone(),
                p2p_borrow: pool_borrow.clone(),
                pool_supply,
                pool_borrow,
            };
        }

        let p2p = self.weighted_avg(&pool_supply, &pool_borrow, p2p_index_cursor);
        let supply_spread = self.saturating_sub(&p2p, &pool_supply);
        let borrow_spread = self.saturating_sub(&pool_borrow, &p2p);

        let p2p_supply = self.saturating_sub(&p2p, &self.percent_mul(&supply_spread, reserve_factor));
        let p2p_borrow = p2p.clone() + self.percent_mul(&borrow_spread, reserve_factor);

        GrowthFactors {
            pool_supply,
            pool_borrow,
            p2p_supply,
            p2p_borrow,
        }
    }

    /// Fraction of the P2P volume that actually sits in the pool as delta.
    ///
    /// **Formula**:
    /// - `min((delta * pool_index) / (amount * p2p_index), ONE - proportion_idle)`
    ///
    /// Callers guarantee `p2p_amount > 0`. The cap keeps
    /// `share + proportion_idle <= ONE`.
    fn compute_share_of_the_delta(
        &self,
        p2p_delta: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        pool_index: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_index: &ManagedDecimal<Self::Api, NumDecimals>,
        proportion_idle: &ManagedDecimal<Self::Api, NumDecimals>,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = flavor.precision();
        let work_precision = self.amount_work_precision(&[p2p_delta, p2p_amount], precision);
        let one = self.index_one(precision);

        let delta_in_pool = self.index_mul(p2p_delta, pool_index, work_precision);
        let amount_in_p2p = self.index_mul(p2p_amount, p2p_index, work_precision);
        let cap = self.saturating_sub(&one, proportion_idle);

        if amount_in_p2p == self.index_zero(work_precision) {
            return cap;
        }

        let share = self.index_div(&delta_in_pool, &amount_in_p2p, work_precision);
        self.get_min(self.rescale_half_up(&share, precision), cap)
    }

    /// Share of the P2P supply that is idle, i.e. matched with nobody.
    ///
    /// **Formula**:
    /// - `0` when `p2p_supply_amount == 0`
    /// - otherwise `min(idle_supply / (p2p_supply_amount * p2p_supply_index), ONE)`
    fn compute_proportion_idle(
        &self,
        idle_supply: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_supply_amount: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_supply_index: &ManagedDecimal<Self::Api, NumDecimals>,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = flavor.precision();
        let work_precision =
            self.amount_work_precision(&[idle_supply, p2p_supply_amount], precision);

        let total_p2p_supply = self.index_mul(p2p_supply_amount, p2p_supply_index, work_precision);
        if total_p2p_supply == self.index_zero(work_precision) {
            return self.index_zero(precision);
        }

        let proportion = self.index_div(idle_supply, &total_p2p_supply, work_precision);
        self.get_min(self.rescale_half_up(&proportion, precision), self.index_one(precision))
    }

    /// Precision at which token amounts are multiplied with indexes: the index
    /// precision, or the amounts' own scale when it is finer.
    fn amount_work_precision(
        &self,
        amounts: &[&ManagedDecimal<Self::Api, NumDecimals>],
        precision: NumDecimals,
    ) -> NumDecimals {
        amounts
            .iter()
            .map(|amount| amount.scale())
            .fold(precision, core::cmp::max)
    }

    /// Computes the new P2P index of one side.
    ///
    /// **Formula**:
    /// - No delta and no idle supply (or no P2P volume): `last_p2p_index * p2p_gf`.
    /// - Otherwise a three-way blend where the matched part grows at `p2p_gf`,
    ///   the delta part at `pool_gf` and the idle part stays flat:
    ///   `last_p2p_index * ((ONE - share - idle) * p2p_gf + share * pool_gf + idle)`.
    ///
    /// # Arguments
    /// - `params`: Last indexes, growth factors, delta, amount and idle proportion of the side.
    /// - `flavor`: Index scale of the market.
    ///
    /// # Returns
    /// - `ManagedDecimal<Self::Api, NumDecimals>`: The new P2P index.
    fn compute_p2p_index(
        &self,
        params: &P2PIndexParams<Self::Api>,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = flavor.precision();
        let zero = self.index_zero(precision);
        let amount_is_zero = params.p2p_amount.into_raw_units() == &BigUint::zero();
        let delta_is_zero = params.p2p_delta.into_raw_units() == &BigUint::zero();

        if amount_is_zero || (delta_is_zero && params.proportion_idle == zero) {
            return self.index_mul(&params.last_p2p_index, &params.p2p_growth_factor, precision);
        }

        let share = self.compute_share_of_the_delta(
            &params.p2p_delta,
            &params.p2p_amount,
            &params.last_pool_index,
            &params.last_p2p_index,
            &params.proportion_idle,
            flavor,
        );

        let one = self.index_one(precision);
        let matched = self.saturating_sub(
            &self.saturating_sub(&one, &share),
            &params.proportion_idle,
        );

        let blended_growth = self.index_mul(&matched, &params.p2p_growth_factor, precision)
            + self.index_mul(&share, &params.pool_growth_factor, precision)
            + params.proportion_idle.rescale(precision);

        self.index_mul(&params.last_p2p_index, &blended_growth, precision)
    }

    /// P2P supply rate reported for the market.
    ///
    /// The pool supply rate is the pool-side rate blended in for the delta share.
    fn compute_p2p_supply_rate(
        &self,
        params: &P2PRateParams<Self::Api>,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = flavor.precision();
        let mid_rate = self.compute_mid_rate(params);

        let rate = if params.pool_supply_rate > params.pool_borrow_rate {
            mid_rate
        } else {
            let spread = self.saturating_sub(&mid_rate, &params.pool_supply_rate);
            self.saturating_sub(&mid_rate, &self.percent_mul(&spread, &params.reserve_factor))
        };

        self.blend_rate_with_delta(rate, &params.pool_supply_rate, params, precision, flavor)
    }

    /// P2P borrow rate reported for the market.
    fn compute_p2p_borrow_rate(
        &self,
        params: &P2PRateParams<Self::Api>,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = flavor.precision();
        let mid_rate = self.compute_mid_rate(params);

        let rate = if params.pool_supply_rate > params.pool_borrow_rate {
            mid_rate
        } else {
            let spread = self.saturating_sub(&params.pool_borrow_rate, &mid_rate);
            mid_rate.clone() + self.percent_mul(&spread, &params.reserve_factor)
        };

        self.blend_rate_with_delta(rate, &params.pool_borrow_rate, params, precision, flavor)
    }

    /// Cursor-weighted point between the pool rates, or the pool borrow rate on
    /// an inverted market.
    fn compute_mid_rate(
        &self,
        params: &P2PRateParams<Self::Api>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if params.pool_supply_rate > params.pool_borrow_rate {
            return params.pool_borrow_rate.clone();
        }

        self.weighted_avg(
            &params.pool_supply_rate,
            &params.pool_borrow_rate,
            &params.p2p_index_cursor,
        )
    }

    fn blend_rate_with_delta(
        &self,
        rate: ManagedDecimal<Self::Api, NumDecimals>,
        pool_rate: &ManagedDecimal<Self::Api, NumDecimals>,
        params: &P2PRateParams<Self::Api>,
        precision: NumDecimals,
        flavor: IndexFlavor,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let has_delta = params.p2p_delta.into_raw_units() > &BigUint::zero();
        let has_amount = params.p2p_amount.into_raw_units() > &BigUint::zero();
        if !(has_delta && has_amount) {
            return rate;
        }

        let share = self.compute_share_of_the_delta(
            &params.p2p_delta,
            &params.p2p_amount,
            &params.pool_index,
            &params.p2p_index,
            &params.proportion_idle,
            flavor,
        );
        let one = self.index_one(precision);
        let matched = self.saturating_sub(
            &self.saturating_sub(&one, &share),
            &params.proportion_idle,
        );

        // idle supply earns nothing
        self.index_mul(&rate, &matched, precision) + self.index_mul(pool_rate, &share, precision)
    }
}
