#![no_std]

use core::cmp::Ordering;

use common_constants::{
    BPS, BPS_PRECISION, HALF_BPS, RAY, RAY_PRECISION, WAD, WAD_PRECISION,
};

multiversx_sc::imports!();

#[multiversx_sc::module]
pub trait SharedMathModule {
    fn mul_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        let product = scaled_a.into_raw_units() * scaled_b.into_raw_units();

        let scaled = BigUint::from(10u64).pow(precision as u32);
        let half_scaled = &scaled / &BigUint::from(2u64);

        let rounded_product = (product + half_scaled) / scaled;

        self.to_decimal(rounded_product, precision)
    }

    fn div_half_up(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scaled_a = a.rescale(precision);
        let scaled_b = b.rescale(precision);

        let scaled = BigUint::from(10u64).pow(precision as u32);
        let numerator = scaled_a.into_raw_units() * &scaled;
        let denominator = scaled_b.into_raw_units();

        let half_denominator = denominator / &BigUint::from(2u64);
        let rounded_quotient = (numerator + half_denominator) / denominator;

        self.to_decimal(rounded_quotient, precision)
    }

    /// Fixed-point product at an index scale: `(x * y + ONE / 2) / ONE`.
    ///
    /// `precision` is the index precision of the market (18 for WAD markets,
    /// 27 for RAY markets). Both operands are expected at that precision.
    fn index_mul(
        &self,
        x: &ManagedDecimal<Self::Api, NumDecimals>,
        y: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.mul_half_up(x, y, precision)
    }

    /// Fixed-point quotient at an index scale: `(x * ONE + y / 2) / y`.
    ///
    /// Callers guarantee `y != 0`.
    fn index_div(
        &self,
        x: &ManagedDecimal<Self::Api, NumDecimals>,
        y: &ManagedDecimal<Self::Api, NumDecimals>,
        precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.div_half_up(x, y, precision)
    }

    /// The unit of an index scale (`10^precision` raw units).
    fn index_one(&self, precision: NumDecimals) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::from(10u64).pow(precision as u32), precision)
    }

    fn index_zero(&self, precision: NumDecimals) -> ManagedDecimal<Self::Api, NumDecimals> {
        self.to_decimal(BigUint::zero(), precision)
    }

    /// `(value * percentage + BPS / 2) / BPS`, keeping the scale of `value`.
    ///
    /// `percentage` is a basis-point quantity (10_000 = 100%).
    fn percent_mul(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        percentage: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let percentage = percentage.rescale(BPS_PRECISION);
        let product = value.into_raw_units() * percentage.into_raw_units();
        let rounded = (product + BigUint::from(HALF_BPS as u64)) / BigUint::from(BPS as u64);

        self.to_decimal(rounded, value.scale())
    }

    /// `(value * BPS + percentage / 2) / percentage`, keeping the scale of `value`.
    ///
    /// Callers guarantee `percentage != 0`.
    fn percent_div(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        percentage: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let percentage = percentage.rescale(BPS_PRECISION);
        let denominator = percentage.into_raw_units();
        let numerator = value.into_raw_units() * &BigUint::from(BPS as u64);
        let rounded = (numerator + denominator / &BigUint::from(2u64)) / denominator;

        self.to_decimal(rounded, value.scale())
    }

    /// Basis-point interpolation between `x` and `y`:
    /// `(x * (BPS - percentage) + y * percentage + BPS / 2) / BPS`.
    ///
    /// `percentage = 0` yields `x`, `percentage = BPS` yields `y`. The result
    /// keeps the scale of `x`.
    fn weighted_avg(
        &self,
        x: &ManagedDecimal<Self::Api, NumDecimals>,
        y: &ManagedDecimal<Self::Api, NumDecimals>,
        percentage: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scale = x.scale();
        let y = y.rescale(scale);
        let percentage = percentage.rescale(BPS_PRECISION);
        let bps = BigUint::from(BPS as u64);

        let x_weight = &bps - percentage.into_raw_units();
        let weighted = x.into_raw_units() * &x_weight + y.into_raw_units() * percentage.into_raw_units();
        let rounded = (weighted + BigUint::from(HALF_BPS as u64)) / bps;

        self.to_decimal(rounded, scale)
    }

    /// `a - b`, or zero when `b > a`.
    fn saturating_sub(
        &self,
        a: &ManagedDecimal<Self::Api, NumDecimals>,
        b: &ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let scale = a.scale();
        let b = b.rescale(scale);
        if b.into_raw_units() >= a.into_raw_units() {
            return self.to_decimal(BigUint::zero(), scale);
        }

        self.to_decimal(a.into_raw_units() - b.into_raw_units(), scale)
    }

    fn to_decimal_wad(self, value: BigUint) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        self.to_decimal(value, WAD_PRECISION)
    }

    fn wad_zero(self) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        self.to_decimal_wad(BigUint::zero())
    }

    fn ray(self) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        self.to_decimal(BigUint::from(RAY), RAY_PRECISION)
    }

    fn wad(self) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        self.to_decimal(BigUint::from(WAD), WAD_PRECISION)
    }

    fn to_decimal(
        self,
        value: BigUint,
        precision: NumDecimals,
    ) -> ManagedDecimal<<Self as ContractBase>::Api, usize> {
        ManagedDecimal::from_raw_units(value, precision)
    }

    fn rescale_half_up(
        &self,
        value: &ManagedDecimal<Self::Api, NumDecimals>,
        new_precision: NumDecimals,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        let old_precision = value.scale();
        let raw_value = value.into_raw_units();

        match new_precision.cmp(&old_precision) {
            Ordering::Equal => value.clone(),
            Ordering::Less => {
                let precision_diff = old_precision - new_precision;
                let factor = BigUint::from(10u64).pow(precision_diff as u32);
                let half_factor = &factor / 2u64;

                let rounded_downscaled_value = (raw_value + &half_factor) / factor;
                ManagedDecimal::from_raw_units(rounded_downscaled_value, new_precision)
            },
            Ordering::Greater => value.rescale(new_precision),
        }
    }

    fn get_min(
        self,
        a: ManagedDecimal<Self::Api, NumDecimals>,
        b: ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if a < b {
            a
        } else {
            b
        }
    }

    fn get_max(
        self,
        a: ManagedDecimal<Self::Api, NumDecimals>,
        b: ManagedDecimal<Self::Api, NumDecimals>,
    ) -> ManagedDecimal<Self::Api, NumDecimals> {
        if a > b {
            a
        } else {
            b
        }
    }
}
