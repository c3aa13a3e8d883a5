use common_constants::WAD_PRECISION;

multiversx_sc::imports!();

/// Conversions between scaled balances, underlying amounts and USD values.
///
/// Scaled balances and underlying amounts live at the asset decimals, indexes at
/// the market's index precision. Intermediate products are taken at the larger
/// of the two so no operand is truncated before rounding.
#[multiversx_sc::module]
pub trait LedgerMathModule: common_math::SharedMathModule {
    /// `scaled * index / ONE`, rounded half up to the asset decimals.
    fn scaled_to_underlying(
        &self,
        scaled: &ManagedDecimal<Self::Api, NumDecimals>,
        index: &ManagedDecimal<Self::Api, NumDecimals>,
        asset_decimals: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = core::cmp::max(index.scale(), asset_decimals);
        let product = self.mul_half_up(scaled, index, precision);

        self.rescale_half_up(&product, asset_decimals)
    }

    /// Pool-equivalent scaled balance of a P2P balance:
    /// `in_p2p * p2p_index / pool_index`.
    fn compute_virtual_p2p(
        &self,
        in_p2p: &ManagedDecimal<Self::Api, NumDecimals>,
        p2p_index: &ManagedDecimal<Self::Api, NumDecimals>,
        pool_index: &ManagedDecimal<Self::Api, NumDecimals>,
        asset_decimals: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let precision = core::cmp::max(pool_index.scale(), asset_decimals);
        let underlying = self.mul_half_up(in_p2p, p2p_index, precision);
        let virtual_scaled = self.div_half_up(&underlying, pool_index, precision);

        self.rescale_half_up(&virtual_scaled, asset_decimals)
    }

    /// Underlying amount valued at a WAD price, returned at WAD precision.
    fn to_usd(
        &self,
        amount: &ManagedDecimal<Self::Api, NumDecimals>,
        price_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let amount = self.rescale_half_up(amount, WAD_PRECISION);
        self.mul_half_up(&amount, price_usd, WAD_PRECISION)
    }

    /// Signed raw amount at the asset decimals valued at a WAD price, raw WAD result.
    fn signed_to_usd(
        &self,
        amount: &BigInt,
        asset_decimals: NumDecimals,
        price_usd: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> BigInt {
        let (sign, magnitude) = amount.clone().to_parts();
        let usd = self.to_usd(&self.to_decimal(magnitude, asset_decimals), price_usd);

        BigInt::from_biguint(sign, usd.into_raw_units().clone())
    }

    /// `a - b` on the raw units of two decimals of the same scale.
    fn signed_difference(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> BigInt {
        BigInt::from(a.into_raw_units().clone()) - BigInt::from(b.into_raw_units().clone())
    }

    fn is_zero(&self, value: &ManagedDecimal<Self::Api, NumDecimals>) -> bool {
        value.into_raw_units() == &BigUint::zero()
    }
}
