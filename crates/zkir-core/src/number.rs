use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Mul};

/// An arbitrary-precision non-negative integer: the value carried by a
/// single wire, a field/ring constant, or a modulus.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(BigUint);

impl Number {
    pub fn zero() -> Self {
        Number(BigUint::zero())
    }

    pub fn one() -> Self {
        Number(BigUint::one())
    }

    pub fn from_biguint(v: BigUint) -> Self {
        Number(v)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self + other`, unreduced.
    pub fn add(&self, other: &Number) -> Number {
        Number(&self.0 + &other.0)
    }

    /// `self * other`, unreduced.
    pub fn mul(&self, other: &Number) -> Number {
        Number(&self.0 * &other.0)
    }

    /// `self mod modulus`. `modulus` of zero returns `self` unchanged
    /// (used by ring types whose modulus is expressed as a bit width,
    /// see [`Number::mask`]).
    pub fn rem_euclid(&self, modulus: &Number) -> Number {
        if modulus.is_zero() {
            return self.clone();
        }
        Number(&self.0 % &modulus.0)
    }

    /// Mask to the low `bits` bits, the ring-type reduction.
    pub fn mask(&self, bits: u32) -> Number {
        if bits >= self.0.bits() as u32 {
            return self.clone();
        }
        let modulus = BigUint::one() << bits;
        Number(&self.0 % modulus)
    }

    /// Modular exponentiation: `self^exp mod modulus`.
    pub fn pow_mod(&self, exp: &Number, modulus: &Number) -> Number {
        Number(self.0.modpow(&exp.0, &modulus.0))
    }

    /// `modulus - 1`, used by the multiplexer plugin's Fermat's-little-theorem
    /// indicator (`x^(p-1) mod p`).
    pub fn minus_one(&self) -> Number {
        if self.0.is_zero() {
            Number::zero()
        } else {
            Number(&self.0 - BigUint::one())
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        use num_traits::cast::ToPrimitive;
        self.0.to_u64()
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        Number(BigUint::from(v))
    }
}

impl Add for &Number {
    type Output = Number;
    fn add(self, rhs: &Number) -> Number {
        Number(&self.0 + &rhs.0)
    }
}

impl Mul for &Number {
    type Output = Number;
    fn mul(self, rhs: &Number) -> Number {
        Number(&self.0 * &rhs.0)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
