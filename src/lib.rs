#![no_std]
#![deny(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]
#![warn(absolute_paths_not_starting_with_crate, dead_code)]
#![warn(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![warn(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![warn(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![warn(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![warn(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![warn(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![warn(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![warn(unused_qualifications, unused_results, variant_size_differences)]
//
#![doc = include_str!("../README.md")]


// Implements the ML-DSA (CRYSTALS-Dilithium) signature scheme as standardized in FIPS 204.
// See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.204.pdf>

// Functionality map per FIPS 204
//
// Algorithm 1 ML-DSA.KeyGen() on page 17                   --> lib.rs to ml_dsa.rs
// Algorithm 2 ML-DSA.Sign(sk,M,ctx) on page 18             --> lib.rs, µ in ml_dsa.rs
// Algorithm 3 ML-DSA.Verify(pk,M,s,ctx) on page 18         --> lib.rs, µ in ml_dsa.rs
// Algorithm 4 HashML-DSA.Sign(sk,M,ctx,PH) on page 20      --> lib.rs, PH in hashing.rs
// Algorithm 5 HashML-DSA.Verify(sk,M,s,ctx,PH) on page 21  --> lib.rs, PH in hashing.rs
// Algorithm 6 ML-DSA.KeyGen_internal(x) on page 23         --> ml_dsa.rs
// Algorithm 7 ML-DSA.Sign_internal(sk,M',rnd) on page 25   --> ml_dsa.rs (from µ onward)
// Algorithm 8 ML-DSA.Verify_internal(pk,M',s) on page 27   --> ml_dsa.rs (from µ onward)
// Algorithms 9-13 bit/byte/integer conversions             --> folded into conversion.rs
// Algorithms 14-21 coefficient sampling, (un)packing       --> conversion.rs
// Algorithms 22-28 key, signature and w1 encodings         --> encodings.rs
// Algorithms 29-34 SampleInBall, RejNTTPoly .. ExpandMask  --> hashing.rs
// Algorithms 35-40 Power2Round, Decompose .. UseHint       --> high_low.rs
// Algorithms 41-42 NTT and inverse NTT                     --> ntt.rs
// Algorithm 43 BitRev8(m) on page 44                       --> folded into the zeta table (ntt.rs)
// Algorithms 44-48 NTT-domain arithmetic                   --> poly.rs
// Algorithm 49 MontgomeryReduce(a) on page 50              --> helpers.rs
// Types are in types.rs, traits are in traits.rs...

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow (so are good fuzz targets). The ensure! statements implement
// conservative dataflow validation and do not panic. Functions are only generic over security
// parameters that are directly involved in memory allocation (on the stack); the remaining
// parameters are passed as plain arguments.

// Note that the `CTEST` generic parameter supports constant-time measurements by dudect. This
// is done by minimally removing timing variability of non-secret data (the rejection sampling
// of hash-derived values and the signing rejection loop). All normal crate functionality has
// this disabled (set to `false`) except for the single function (per namespace)
// `dudect_keygen_sign_with_rng()` which is only exposed when the non-default `dudect` feature
// is enabled.

/// The `rand_core` types are re-exported so that users of mldsa do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod conversion;
mod encodings;
mod hashing;
mod helpers;
mod high_low;
mod ml_dsa;
mod ntt;
mod poly;
mod types;

/// All functionality is covered by traits, such that consumers can utilize trait objects as desired.
pub mod traits;
pub use crate::types::Ph;

// Applies across all security parameter sets
const Q: i32 = 8_380_417; // 2^23 - 2^13 + 1 = 0x7FE001; page 15 table 1 first row
const ZETA: i32 = 1753; // 512th root of unity; page 15 table 1 second row
const D: u32 = 13; // dropped bits from t; page 15 table 1 third row


// This common functionality is injected into each security parameter set namespace, and is
// largely a lightweight wrapper into the ml_dsa functions.
macro_rules! functionality {
    () => {
        use crate::helpers;
        use crate::ml_dsa;
        use crate::traits::{KeyGen, SerDes, Signer, Verifier};
        use crate::types::Ph;
        use rand_core::CryptoRngCore;
        use zeroize::{Zeroize, ZeroizeOnDrop};

        use crate::Q;
        const BETA: i32 = TAU * ETA;
        const LAMBDA_DIV4: usize = LAMBDA / 4;
        const W1_LEN: usize = 32 * K * helpers::bit_length((Q - 1) / (2 * GAMMA2) - 1);
        const CTEST: bool = false; // only the dudect entry point signs with CTEST set


        // ----- 'EXTERNAL' DATA TYPES -----

        /// Unit struct carrying the [`crate::traits::KeyGen`] implementation for this set.
        #[derive(Zeroize, ZeroizeOnDrop)]
        pub struct KG();


        /// Private key specific to the target security parameter set.
        ///
        /// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
        // Zeroized on drop by the generic struct.
        pub type PrivateKey = crate::types::PrivateKey<K, L>;


        /// Public key specific to the target security parameter set.
        ///
        /// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
        pub type PublicKey = crate::types::PublicKey<K, L>;


        /// Signature specific to the target security parameter set; a plain fixed-size byte array.
        pub type Signature = [u8; SIG_LEN];


        // ----- PRIMARY FUNCTIONS ---

        /// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
        /// Key pair from a seed drawn from the **OS** random number generator.
        ///
        /// Secret-independent timing covers everything except the RNG itself, the public
        /// `ρ`, and the rejection sampling of `s1`/`s2` from `ρ′`.
        ///
        /// # Errors
        /// Fails only when the random number generator does.
        ///
        /// # Examples
        /// ```rust
        /// # use std::error::Error;
        /// # fn main() -> Result<(), Box<dyn Error>> {
        /// # #[cfg(all(feature = "ml-dsa-44", feature = "default-rng"))] {
        /// use mldsa::ml_dsa_44; // Could also be ml_dsa_65 or ml_dsa_87.
        /// use mldsa::traits::{SerDes, Signer, Verifier};
        ///
        /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
        ///
        /// // Generate key pair and signature
        /// let (pk, sk) = ml_dsa_44::try_keygen()?;  // Generate both public and secret keys
        /// let sig = sk.try_sign(&message, &[0])?;  // Use the secret key to generate a message signature
        /// assert!(pk.verify(&message, &sig, &[0]));
        /// # }
        /// # Ok(())}
        /// ```
        #[cfg(feature = "default-rng")]
        pub fn try_keygen() -> Result<(PublicKey, PrivateKey), &'static str> { KG::try_keygen() }


        /// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
        /// Key pair from a seed drawn from the **supplied** random number generator.
        ///
        /// # Errors
        /// Fails only when the random number generator does.
        ///
        /// # Examples
        /// ```rust
        /// # use std::error::Error;
        /// # fn main() -> Result<(), Box<dyn Error>> {
        /// # #[cfg(feature = "ml-dsa-44")] {
        /// use mldsa::ml_dsa_44; // Could also be ml_dsa_65 or ml_dsa_87.
        /// use mldsa::traits::{SerDes, Signer, Verifier};
        /// use rand_chacha::rand_core::SeedableRng;
        ///
        /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
        /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        ///
        /// // Generate key pair and signature
        /// let (pk, sk) = ml_dsa_44::try_keygen_with_rng(&mut rng)?;  // Generate both public and secret keys
        /// let sig = sk.try_sign_with_rng(&mut rng, &message, &[0])?;  // Use the secret key to generate a message signature
        /// assert!(pk.verify(&message, &sig, &[0]));
        /// # }
        /// # Ok(())}
        /// ```
        pub fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), &'static str> {
            KG::try_keygen_with_rng(rng)
        }


        /// # Algorithm 6: `ML-DSA.KeyGen_internal(ξ)` on page 23.
        /// Deterministically derives a key pair from the 32-byte seed `ξ`.
        #[must_use]
        pub fn keygen_from_seed(xi: &[u8; 32]) -> (PublicKey, PrivateKey) { KG::keygen_from_seed(xi) }


        /// # Algorithm 7: `ML-DSA.Sign_internal(sk, M′, rnd)` on page 25.
        /// Signs the already-formatted message `M′` with the explicit randomness `rnd`. No
        /// domain separation or context is applied; this is the interface exercised by the
        /// NIST ACVP "internal" test vectors.
        #[must_use]
        pub fn sign_internal(sk: &PrivateKey, m_prime: &[u8], rnd: &[u8; 32]) -> Signature {
            let mu = ml_dsa::message_representative(&sk.tr, &[m_prime]);
            ml_dsa::sign_mu::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                BETA, GAMMA1, GAMMA2, OMEGA, TAU, sk, &mu, rnd,
            )
        }


        /// # Algorithm 8: `ML-DSA.Verify_internal(pk, M′, σ)` on page 27.
        /// Verifies a signature over the already-formatted message `M′`.
        #[must_use]
        pub fn verify_internal(pk: &PublicKey, m_prime: &[u8], sig: &Signature) -> bool {
            let mu = ml_dsa::message_representative(&pk.tr, &[m_prime]);
            ml_dsa::verify_mu::<K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(BETA, GAMMA1, GAMMA2, OMEGA, TAU, pk, &mu, sig)
        }


        impl KeyGen for KG {
            type PrivateKey = PrivateKey;
            type PublicKey = PublicKey;


            fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), &'static str> {
                ml_dsa::key_gen::<CTEST, K, L, PK_LEN>(rng, ETA)
            }


            fn keygen_from_seed(xi: &[u8; 32]) -> (PublicKey, PrivateKey) {
                ml_dsa::key_gen_internal::<CTEST, K, L, PK_LEN>(ETA, xi)
            }
        }


        impl Signer for PrivateKey {
            type Signature = Signature;
            type PublicKey = PublicKey;

            /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18.
            /// Generates an ML-DSA signature.
            ///
            /// **Input**:  Implemented on private key struct,
            ///             message `M ∈ {0, 1}∗`,
            ///             context string `ctx` (a byte string of 255 or fewer bytes). <br>
            /// **Output**: Signature `σ ∈ B^{λ/4+ℓ·32·(1+bitlen(γ1−1))+ω+k}`.
            ///
            /// # Errors
            /// Returns an error when the random number generator fails or context too long.
            fn try_sign_with_rng(
                &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
            ) -> Result<Signature, &'static str> {
                // 1: if |ctx| > 255 then return ⊥
                // 10: M′ ← BytesToBits(IntegerToBytes(0, 1) ‖ IntegerToBytes(|ctx|, 1) ‖ ctx) ‖ M
                let mu = ml_dsa::pure_mu(&self.tr, message, ctx)?;

                // 5: rnd ← B^32
                // 6: if rnd = NULL then return ⊥
                let mut rnd = [0u8; 32];
                rng.try_fill_bytes(&mut rnd).map_err(|_| "ML-DSA.Sign: random number generator failed")?;

                // 11: σ ← ML-DSA.Sign_internal(sk, M′, rnd)
                let sig = ml_dsa::sign_mu::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                    BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, &mu, &rnd,
                );
                rnd.zeroize();

                // 12: return σ
                Ok(sig)
            }


            /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18, deterministic variant.
            /// Substitutes `rnd ← {0}^32`.
            ///
            /// # Errors
            /// Returns an error when the context is too long.
            fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Signature, &'static str> {
                let mu = ml_dsa::pure_mu(&self.tr, message, ctx)?;
                Ok(ml_dsa::sign_mu::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                    BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, &mu, &[0u8; 32],
                ))
            }


            fn try_sign_combined_with_rng(
                &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], sm_out: &mut [u8],
            ) -> Result<usize, &'static str> {
                let smlen = SIG_LEN + message.len();
                helpers::ensure!(sm_out.len() >= smlen, "ML-DSA.Sign: signed message buffer too short");
                let sig = self.try_sign_with_rng(rng, message, ctx)?;
                sm_out[..SIG_LEN].copy_from_slice(&sig);
                sm_out[SIG_LEN..smlen].copy_from_slice(message);
                Ok(smlen)
            }


            /// # Algorithm 4: `HashML-DSA.Sign(sk, M, ctx, PH)` on page 20.
            /// Generate a “pre-hash” ML-DSA signature.
            ///
            /// **Input**:  Implemented on private key struct,
            ///             message `M ∈ {0, 1}∗`,
            ///             context string `ctx` (a byte string of 255 or fewer bytes),
            ///             pre-hash function `PH`. <br>
            /// **Output**: ML-DSA signature `σ ∈ B^{λ/4+ℓ·32·(1+bitlen(γ1−1))+ω+k}`.
            ///
            /// # Errors
            /// Returns an error when the random number generator fails or context too long.
            fn try_hash_sign_with_rng(
                &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], ph: &Ph,
            ) -> Result<Signature, &'static str> {
                // 1: if |ctx| > 255 then return ⊥
                // 10-22: PH_M ← PH(M) with its OID
                // 23: M′ ← BytesToBits(IntegerToBytes(1, 1) ‖ IntegerToBytes(|ctx|, 1) ‖ ctx ‖ OID ‖ PH_M)
                let mu = ml_dsa::pre_hash_mu(&self.tr, message, ctx, *ph)?;

                // 5: rnd ← B^32
                let mut rnd = [0u8; 32];
                rng.try_fill_bytes(&mut rnd).map_err(|_| "HashML-DSA.Sign: random number generator failed")?;

                // 24: σ ← ML-DSA.Sign_internal(sk, M′, rnd)
                let sig = ml_dsa::sign_mu::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                    BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, &mu, &rnd,
                );
                rnd.zeroize();

                // 25: return σ
                Ok(sig)
            }


            fn try_sign_mu_with_rng(&self, rng: &mut impl CryptoRngCore, mu: &[u8; 64]) -> Result<Signature, &'static str> {
                let mut rnd = [0u8; 32];
                rng.try_fill_bytes(&mut rnd).map_err(|_| "ML-DSA.Sign: random number generator failed")?;
                let sig = ml_dsa::sign_mu::<CTEST, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                    BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, mu, &rnd,
                );
                rnd.zeroize();
                Ok(sig)
            }


            fn get_public_key(&self) -> PublicKey { ml_dsa::private_to_public_key::<K, L, PK_LEN>(self) }
        }


        impl Verifier for PublicKey {
            type Signature = Signature;

            /// # Algorithm 3: `ML-DSA.Verify(pk, M, σ, ctx)` on page 18.
            /// Verifies a signature σ for a message M.
            ///
            /// **Input**:  Implemented on public key struct,
            ///             message `M ∈ {0, 1}∗`,
            ///             signature `σ ∈ B^{λ/4+ℓ·32·(1+bitlen(γ1−1))+ω+k}`,
            ///             context string `ctx` (a byte string of 255 or fewer bytes). <br>
            /// **Output**: Boolean.
            fn verify(&self, message: &[u8], sig: &Signature, ctx: &[u8]) -> bool {
                // 1: if |ctx| > 255 then return ⊥
                // 5: M′ ← BytesToBits(IntegerToBytes(0, 1) ‖ IntegerToBytes(|ctx|, 1) ‖ ctx) ‖ M
                let Ok(mu) = ml_dsa::pure_mu(&self.tr, message, ctx) else {
                    return false;
                };

                // 6: return ML-DSA.Verify_internal(pk, M′, σ)
                ml_dsa::verify_mu::<K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, &mu, sig)
            }


            fn try_open(&self, sm: &[u8], ctx: &[u8], m_out: &mut [u8]) -> Result<usize, &'static str> {
                let mlen = sm.len().saturating_sub(SIG_LEN);
                let valid = (sm.len() >= SIG_LEN) && (m_out.len() >= mlen) && {
                    let (sig, message) = sm.split_at(SIG_LEN);
                    <&Signature>::try_from(sig).is_ok_and(|sig| self.verify(message, sig, ctx))
                };
                if !valid {
                    m_out.zeroize();
                    return Err("ML-DSA.Open: verification failed");
                }
                m_out[..mlen].copy_from_slice(&sm[SIG_LEN..]);
                Ok(mlen)
            }


            /// # Algorithm 5: `HashML-DSA.Verify(pk, M, σ, ctx, PH)` on page 21.
            /// Verifies a pre-hash HashML-DSA signature.
            ///
            /// **Input**:  Implemented on public key struct,
            ///             message `M ∈ {0, 1}∗`,
            ///             signature `σ ∈ B^{λ/4+ℓ·32·(1+bitlen(γ1−1))+ω+k}`,
            ///             context string `ctx` (a byte string of 255 or fewer bytes),
            ///             pre-hash function `PH`. <br>
            /// **Output**: Boolean.
            fn hash_verify(&self, message: &[u8], sig: &Signature, ctx: &[u8], ph: &Ph) -> bool {
                // 1: if |ctx| > 255 then return ⊥
                // 18: M′ ← BytesToBits(IntegerToBytes(1, 1) ‖ IntegerToBytes(|ctx|, 1) ‖ ctx ‖ OID ‖ PH_M)
                let Ok(mu) = ml_dsa::pre_hash_mu(&self.tr, message, ctx, *ph) else {
                    return false;
                };

                // 19: return ML-DSA.Verify_internal(pk, M′, σ)
                ml_dsa::verify_mu::<K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, &mu, sig)
            }


            fn verify_mu(&self, mu: &[u8; 64], sig: &Signature) -> bool {
                ml_dsa::verify_mu::<K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(BETA, GAMMA1, GAMMA2, OMEGA, TAU, self, mu, sig)
            }
        }


        // ----- SERIALIZATION AND DESERIALIZATION ---

        impl SerDes for PrivateKey {
            type ByteArray = [u8; SK_LEN];

            fn try_from_bytes(sk: Self::ByteArray) -> Result<Self, &'static str> {
                ml_dsa::private_from_bytes::<K, L, SK_LEN>(ETA, &sk)
            }

            fn into_bytes(self) -> Self::ByteArray { ml_dsa::private_to_bytes::<K, L, SK_LEN>(ETA, &self) }
        }


        impl SerDes for PublicKey {
            type ByteArray = [u8; PK_LEN];

            fn try_from_bytes(pk: Self::ByteArray) -> Result<Self, &'static str> {
                ml_dsa::public_from_bytes::<K, L, PK_LEN>(&pk)
            }

            fn into_bytes(self) -> Self::ByteArray { ml_dsa::public_to_bytes::<K, L, PK_LEN>(&self) }
        }


        #[cfg(test)]
        mod tests {
            use super::*;
            use rand_chacha::rand_core::{RngCore, SeedableRng};

            #[test]
            fn smoke_test() {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
                let message1 = [0u8, 1, 2, 3, 4, 5, 6, 7];
                let message2 = [7u8, 7, 7, 7, 7, 7, 7, 7];

                for _i in 0..32 {
                    let (pk, sk) = try_keygen_with_rng(&mut rng).unwrap();
                    let sig = sk.try_sign_with_rng(&mut rng, &message1, &[]).unwrap();
                    assert!(pk.verify(&message1, &sig, &[]));
                    assert!(!pk.verify(&message2, &sig, &[]));
                    assert!(!pk.verify(&message1, &sig, &[0]));
                    for ph in [Ph::SHA256, Ph::SHA512, Ph::SHAKE128] {
                        let sig = sk.try_hash_sign_with_rng(&mut rng, &message1, &[], &ph).unwrap();
                        assert!(pk.hash_verify(&message1, &sig, &[], &ph));
                        assert!(!pk.verify(&message1, &sig, &[]));
                    }
                    assert_eq!(pk.clone().into_bytes(), sk.get_public_key().into_bytes());
                }
            }

            #[cfg(feature = "default-rng")]
            #[test]
            fn test_default_rng() {
                let message1 = [0u8, 1, 2, 3, 4, 5, 6, 7];
                let message2 = [7u8, 7, 7, 7, 7, 7, 7, 7];
                let (pk, sk) = try_keygen().unwrap();
                let sig = sk.try_sign(&message1, &[]).unwrap();
                assert!(pk.verify(&message1, &sig, &[]));
                assert!(!pk.verify(&message2, &sig, &[]));
                assert!(!pk.verify(&message1, &sig, &[0u8; 257]));
                assert!(sk.try_sign(&message1, &[0u8; 257]).is_err());
                assert!(sk.try_sign(&message1, &[0u8; 255]).is_ok());

                for ph in [Ph::SHA256, Ph::SHA512, Ph::SHAKE128] {
                    let sig = sk.try_hash_sign(&message1, &[], &ph).unwrap();
                    assert!(pk.hash_verify(&message1, &sig, &[], &ph));
                }
                assert!(sk.try_hash_sign(&message1, &[0u8; 256], &Ph::SHA256).is_err());
                assert_eq!(pk.clone().into_bytes(), sk.get_public_key().into_bytes());
            }

            #[test]
            fn test_hash_sign_matches_internal() {
                use sha3::digest::{ExtendableOutput, Update, XofReader};

                let (pk, sk) = keygen_from_seed(&[0x44u8; 32]);
                let message = [9u8; 40];
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(55);
                let mut rnd = [0u8; 32];
                rng.clone().fill_bytes(&mut rnd);
                let sig = sk.try_hash_sign_with_rng(&mut rng, &message, b"abc", &Ph::SHAKE128).unwrap();

                // M′ = 1 ‖ 3 ‖ "abc" ‖ OID(SHAKE128) ‖ SHAKE128(M, 256)
                let mut m_prime = [0u8; 2 + 3 + 11 + 32];
                m_prime[..5].copy_from_slice(b"\x01\x03abc");
                m_prime[5..16].copy_from_slice(&[0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x0B]);
                let mut shake = sha3::Shake128::default();
                shake.update(&message);
                shake.finalize_xof().read(&mut m_prime[16..]);

                assert_eq!(sig, sign_internal(&sk, &m_prime, &rnd));
                assert!(verify_internal(&pk, &m_prime, &sig));
                assert!(pk.hash_verify(&message, &sig, b"abc", &Ph::SHAKE128));
            }

            #[test]
            fn test_known_first_pk_byte() {
                let (pk, _) = KG::keygen_from_seed(&[0x11u8; 32]);
                let pk_bytes = pk.into_bytes();
                if pk_bytes.len() == 1312 { assert_eq!(pk_bytes[0], 197) }
                if pk_bytes.len() == 1952 { assert_eq!(pk_bytes[0], 177) }
                if pk_bytes.len() == 2592 { assert_eq!(pk_bytes[0], 16) }
            }

            #[test]
            fn test_deterministic_and_internal() {
                let (pk, sk) = keygen_from_seed(&[0x22u8; 32]);
                let sig1 = sk.try_sign_deterministic(b"msg", b"ctx").unwrap();
                let sig2 = sk.try_sign_deterministic(b"msg", b"ctx").unwrap();
                assert_eq!(sig1, sig2);
                assert!(pk.verify(b"msg", &sig1, b"ctx"));

                // The pure interface is sign_internal over 0 ‖ |ctx| ‖ ctx ‖ M
                let sig3 = sign_internal(&sk, b"\x00\x03ctxmsg", &[0u8; 32]);
                assert_eq!(sig1, sig3);
                assert!(verify_internal(&pk, b"\x00\x03ctxmsg", &sig3));
                assert!(!verify_internal(&pk, b"\x00\x03ctxmsh", &sig3));
            }

            #[test]
            fn test_external_mu() {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
                let (pk, sk) = try_keygen_with_rng(&mut rng).unwrap();
                let mu = pk.compute_mu(b"external", &[5]).unwrap();
                let sig = sk.try_sign_mu_with_rng(&mut rng, &mu).unwrap();
                assert!(pk.verify(b"external", &sig, &[5]));
                assert!(pk.verify_mu(&mu, &sig));
                assert!(pk.compute_mu(b"external", &[0u8; 256]).is_err());
            }

            #[test]
            fn test_combined_and_open() {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
                let (pk, sk) = try_keygen_with_rng(&mut rng).unwrap();
                let message = [0xA5u8; 20];
                let mut sm = [0u8; SIG_LEN + 20];
                let smlen = sk.try_sign_combined_with_rng(&mut rng, &message, &[], &mut sm).unwrap();
                assert_eq!(smlen, SIG_LEN + 20);

                let mut m_out = [0xFFu8; 20];
                assert_eq!(pk.try_open(&sm, &[], &mut m_out), Ok(20));
                assert_eq!(m_out, message);

                let mut short = [0u8; SIG_LEN + 19];
                assert!(sk.try_sign_combined_with_rng(&mut rng, &message, &[], &mut short).is_err());

                sm[SIG_LEN + 3] ^= 1;
                let mut m_out = [0xFFu8; 20];
                assert!(pk.try_open(&sm, &[], &mut m_out).is_err());
                assert_eq!(m_out, [0u8; 20]);

                let mut m_out = [0xFFu8; 4];
                assert!(pk.try_open(&sm[..SIG_LEN - 1], &[], &mut m_out).is_err());
                assert_eq!(m_out, [0u8; 4]);
            }

            #[test]
            fn test_serdes_rejects_bad_private_key() {
                let (_pk, sk) = keygen_from_seed(&[0x33u8; 32]);
                let mut sk_bytes = sk.into_bytes();
                // Every s1 coefficient is packed in the bytes just past ρ ‖ K ‖ tr; all ones is
                // out of range for both η = 2 (3 bits) and η = 4 (4 bits)
                sk_bytes[128..132].copy_from_slice(&[0xFF; 4]);
                assert!(PrivateKey::try_from_bytes(sk_bytes).is_err());
            }

            #[cfg(all(feature = "dudect", not(debug_assertions)))]
            #[test]
            #[allow(deprecated)]
            fn test_dudect_entry() {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
                assert!(dudect_keygen_sign_with_rng(&mut rng, &[0]).is_ok());
            }
        }


        // ----- SUPPORT FOR DUDECT CONSTANT TIME MEASUREMENTS ---

        /// Key generation followed by one pure-interface signing pass, both with `CTEST` set so
        /// that public rejection-sampling work is fixed. Entry point for the `dudect/` harness;
        /// requires the `dudect` feature.
        ///
        /// # Errors
        /// Returns an error when the random number generator fails.
        #[deprecated = "Function for constant-time testing; do not use elsewhere"]
        #[cfg(feature = "dudect")]
        pub fn dudect_keygen_sign_with_rng(
            rng: &mut impl CryptoRngCore, message: &[u8],
        ) -> Result<Signature, &'static str> {
            let (_pk, sk) = ml_dsa::key_gen::<true, K, L, PK_LEN>(rng, ETA)?;
            let mut rnd = [0u8; 32];
            rng.try_fill_bytes(&mut rnd).map_err(|_| "Random number generator failed")?;
            let mu = ml_dsa::message_representative(&sk.tr, &[&[0, 0], message]);
            let sig = ml_dsa::sign_mu::<true, K, L, LAMBDA_DIV4, SIG_LEN, W1_LEN>(
                BETA, GAMMA1, GAMMA2, OMEGA, TAU, &sk, &mu, &rnd,
            );
            Ok(sig)
        }
    };
}


/// # ML-DSA-44 (NIST security category 2)
///
/// `K = 4`, `L = 4`, `η = 2`. Keys are 1312 (public) and 2560 (private) bytes; signatures are
/// 2420 bytes.
///
/// A signer calls [`ml_dsa_44::try_keygen`] (or [`ml_dsa_44::keygen_from_seed`]), keeps the
/// [`ml_dsa_44::PrivateKey`] and publishes [`traits::SerDes::into_bytes()`] of the
/// [`ml_dsa_44::PublicKey`]. Signing goes through [`traits::Signer`]; the receiving side decodes
/// the public key with [`traits::SerDes::try_from_bytes()`] and checks signatures or opens
/// signed messages through [`traits::Verifier`].
#[cfg(feature = "ml-dsa-44")]
pub mod ml_dsa_44 {
    const TAU: i32 = 39;
    const LAMBDA: usize = 128;
    const GAMMA1: i32 = 1 << 17;
    const GAMMA2: i32 = (Q - 1) / 88;
    const K: usize = 4;
    const L: usize = 4;
    const ETA: i32 = 2;
    const OMEGA: i32 = 80;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 2560;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 1312;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 2420;

    functionality!();
}


/// # ML-DSA-65 (NIST security category 3)
///
/// `K = 6`, `L = 5`, `η = 4`. Keys are 1952 (public) and 4032 (private) bytes; signatures are
/// 3309 bytes. The API is identical to [`ml_dsa_44`].
#[cfg(feature = "ml-dsa-65")]
pub mod ml_dsa_65 {
    const TAU: i32 = 49;
    const LAMBDA: usize = 192;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const K: usize = 6;
    const L: usize = 5;
    const ETA: i32 = 4;
    const OMEGA: i32 = 55;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 4032;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 1952;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 3309;

    functionality!();
}


/// # ML-DSA-87 (NIST security category 5)
///
/// `K = 8`, `L = 7`, `η = 2`. Keys are 2592 (public) and 4896 (private) bytes; signatures are
/// 4627 bytes. The API is identical to [`ml_dsa_44`].
#[cfg(feature = "ml-dsa-87")]
pub mod ml_dsa_87 {
    const TAU: i32 = 60;
    const LAMBDA: usize = 256;
    const GAMMA1: i32 = 1 << 19;
    const GAMMA2: i32 = (Q - 1) / 32;
    const K: usize = 8;
    const L: usize = 7;
    const ETA: i32 = 2;
    const OMEGA: i32 = 75;
    /// Private (secret) key length in bytes.
    pub const SK_LEN: usize = 4896;
    /// Public key length in bytes.
    pub const PK_LEN: usize = 2592;
    /// Signature length in bytes.
    pub const SIG_LEN: usize = 4627;

    functionality!();
}
