use crate::Q;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Private key specific to the target security parameter set, held in decoded form. The
/// secret vectors are kept in the normal (coefficient) domain; their NTT/Montgomery images
/// are recomputed for each signing operation and wiped afterwards.
///
/// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey<const K: usize, const L: usize> {
    pub(crate) rho: [u8; 32],
    pub(crate) cap_k: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) s_1: [R; L],
    pub(crate) s_2: [R; K],
    pub(crate) t_0: [R; K],
}


/// Public key specific to the target security parameter set, held in decoded form along
/// with the precomputed `tr = H(pk, 64)`.
///
/// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PublicKey<const K: usize, const L: usize> {
    pub(crate) rho: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) t_1: [R; K],
}


/// Pre-hash functions supported by HashML-DSA (FIPS 204 section 5.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ph {
    /// SHA2-256, producing a 32-byte digest
    SHA256,
    /// SHA2-512, producing a 64-byte digest
    SHA512,
    /// SHAKE128, squeezed to 32 bytes (`SHAKE128(M, 256)`)
    SHAKE128,
}


// The two polynomial domains are distinct types so that a coefficient-domain polynomial can
// never be handed to an NTT-domain operation (or vice versa) without an explicit transform.

/// Polynomial in the normal (coefficient) domain `R_q = Z_q[X]/(X^256 + 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
#[repr(align(8))]
pub(crate) struct R(pub(crate) [i32; 256]);

/// The zero polynomial in the coefficient domain.
pub(crate) const R0: R = R([0; 256]);


/// Polynomial in the NTT domain `T_q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
#[repr(align(8))]
pub(crate) struct T(pub(crate) [i32; 256]);

/// The zero polynomial in the NTT domain.
pub(crate) const T0: T = T([0; 256]);


/// Element of `Z_q`; the working range is documented by each function.
pub(crate) type Zq = i32;


impl R {
    /// True when every coefficient lies within `[-lo, hi]`.
    pub(crate) fn in_range(&self, lo: i32, hi: i32) -> bool {
        self.0.iter().all(|&e| (e >= -lo) & (e <= hi))
    }

    /// Number of non-zero coefficients (the hint weight for binary polynomials).
    pub(crate) fn weight(&self) -> i32 {
        self.0.iter().map(|&e| i32::from(e != 0)).sum()
    }
}


impl T {
    /// True when every coefficient is strictly inside `(-q, q)`.
    pub(crate) fn below_q(&self) -> bool { self.0.iter().all(|&e| (e > -Q) & (e < Q)) }
}


impl<const K: usize, const L: usize> PublicKey<K, L> {
    /// Computes the message representative `µ = H(tr ‖ 0 ‖ |ctx| ‖ ctx ‖ M, 64)` for use with
    /// [`crate::traits::Signer::try_sign_mu_with_rng`] and [`crate::traits::Verifier::verify_mu`].
    /// This allows `µ` to be computed by a party that holds only the public key and the message.
    ///
    /// # Errors
    /// Returns an error when the context is longer than 255 bytes.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-44", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_44;
    /// use mldsa::traits::{Signer, Verifier};
    ///
    /// let (pk, sk) = ml_dsa_44::try_keygen()?;
    /// let mu = pk.compute_mu(b"message", b"ctx")?;
    /// let sig = sk.try_sign_mu(&mu)?;
    /// assert!(pk.verify(b"message", &sig, b"ctx"));
    /// assert!(pk.verify_mu(&mu, &sig));
    /// # }
    /// # Ok(())}
    /// ```
    pub fn compute_mu(&self, message: &[u8], ctx: &[u8]) -> Result<[u8; 64], &'static str> {
        crate::ml_dsa::pure_mu(&self.tr, message, ctx)
    }
}
