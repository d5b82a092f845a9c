use crate::types::Ph;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// Key pair generation, implemented by the empty `KG` struct of every parameter set.
pub trait KeyGen {
    /// Public key of the parameter set
    type PublicKey;
    /// Private key of the parameter set
    type PrivateKey;

    /// Draws the seed `ξ` from the OS random number generator and expands it into a key pair.
    /// Runs in constant time with respect to the generated secrets.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-44", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_44; // Could also be ml_dsa_65 or ml_dsa_87.
    /// use mldsa::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// // Generate key pair and signature
    /// let (pk, sk) = ml_dsa_44::KG::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, &[])?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::PrivateKey), &'static str> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Draws the seed `ξ` from `rng` and expands it into a key pair.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "ml-dsa-44")] {
    /// use mldsa::ml_dsa_44; // Could also be ml_dsa_65 or ml_dsa_87.
    /// use mldsa::traits::{KeyGen, Signer, Verifier};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2024);
    ///
    /// // Generate key pair and signature
    /// let (pk, sk) = ml_dsa_44::KG::try_keygen_with_rng(&mut rng)?;  // Generate both public and secret keys
    /// let sig = sk.try_sign_with_rng(&mut rng, &message, &[])?;  // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # }
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(Self::PublicKey, Self::PrivateKey), &'static str>;

    /// Deterministically generates a public and private key pair from the 32-byte seed `ξ`
    /// (Algorithm 6 `ML-DSA.KeyGen_internal`). The same seed always yields the same key pair.
    /// # Examples
    /// ```rust
    /// # #[cfg(feature = "ml-dsa-65")] {
    /// use mldsa::ml_dsa_65; // Could also be ml_dsa_44 or ml_dsa_87.
    /// use mldsa::traits::{KeyGen, SerDes};
    ///
    /// let (pk1, _sk1) = ml_dsa_65::KG::keygen_from_seed(&[7u8; 32]);
    /// let (pk2, _sk2) = ml_dsa_65::KG::keygen_from_seed(&[7u8; 32]);
    /// assert_eq!(pk1.into_bytes(), pk2.into_bytes());
    /// # }
    /// ```
    #[must_use]
    fn keygen_from_seed(xi: &[u8; 32]) -> (Self::PublicKey, Self::PrivateKey);
}


/// Signing operations, implemented by `PrivateKey` in every parameter set.
pub trait Signer {
    /// Fixed-size signature `σ`
    type Signature;
    /// Matching public key
    type PublicKey;

    /// Attempt to sign the given message and context, returning a digital signature on success,
    /// or an error if something went wrong. This function utilizes the default OS RNG (the
    /// "hedged" variant) and operates in constant time with respect to the `PrivateKey`; only the
    /// rejection decision of each attempt is revealed.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is longer than 255 bytes.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-65", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_65; // Could also be ml_dsa_44 or ml_dsa_87.
    /// use mldsa::traits::{Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// // Generate key pair and signature
    /// let (pk, sk) = ml_dsa_65::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, b"context")?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, b"context"));
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, &'static str> {
        self.try_sign_with_rng(&mut OsRng, message, ctx)
    }

    /// Attempt to sign the given message and context, returning a digital signature on success,
    /// or an error if something went wrong. This function utilizes a supplied RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is longer than 255 bytes.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, &'static str>;

    /// Signs with `rnd = {0}^32`, the deterministic variant of Algorithm 2. Repeated calls with
    /// the same key, message and context produce identical signatures.
    ///
    /// # Errors
    /// Returns an error when the context is longer than 255 bytes.
    fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, &'static str>;

    /// Produces the signed message `sm = σ ‖ M` into `sm_out` and returns its length,
    /// `SIG_LEN + message.len()`. Uses the default OS RNG.
    ///
    /// # Errors
    /// Returns an error when `sm_out` is too short, the random number generator fails or the
    /// context is longer than 255 bytes.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-44", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_44;
    /// use mldsa::traits::{Signer, Verifier};
    ///
    /// let message = *b"attack at dawn";
    /// let (pk, sk) = ml_dsa_44::try_keygen()?;
    ///
    /// let mut sm = [0u8; ml_dsa_44::SIG_LEN + 14];
    /// let smlen = sk.try_sign_combined(&message, &[], &mut sm)?;
    /// assert_eq!(smlen, ml_dsa_44::SIG_LEN + message.len());
    ///
    /// let mut m_out = [0u8; 14];
    /// let mlen = pk.try_open(&sm[..smlen], &[], &mut m_out)?;
    /// assert_eq!(&m_out[..mlen], &message);
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_sign_combined(&self, message: &[u8], ctx: &[u8], sm_out: &mut [u8]) -> Result<usize, &'static str> {
        self.try_sign_combined_with_rng(&mut OsRng, message, ctx, sm_out)
    }

    /// Produces the signed message `sm = σ ‖ M` into `sm_out` and returns its length, using a
    /// supplied RNG.
    ///
    /// # Errors
    /// Returns an error when `sm_out` is too short, the random number generator fails or the
    /// context is longer than 255 bytes.
    fn try_sign_combined_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], sm_out: &mut [u8],
    ) -> Result<usize, &'static str>;

    /// Attempt to produce a HashML-DSA ("pre-hash") signature of the given message and context,
    /// using the default OS RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is longer than 255 bytes.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-87", feature = "default-rng"))] {
    /// use mldsa::{ml_dsa_87, Ph};
    /// use mldsa::traits::{Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let (pk, sk) = ml_dsa_87::try_keygen()?;
    /// let sig = sk.try_hash_sign(&message, &[], &Ph::SHA512)?;
    /// assert!(pk.hash_verify(&message, &sig, &[], &Ph::SHA512));
    /// assert!(!pk.verify(&message, &sig, &[])); // Pure and pre-hash signatures are domain separated
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_hash_sign(&self, message: &[u8], ctx: &[u8], ph: &Ph) -> Result<Self::Signature, &'static str> {
        self.try_hash_sign_with_rng(&mut OsRng, message, ctx, ph)
    }

    /// Attempt to produce a HashML-DSA ("pre-hash") signature of the given message and context,
    /// using a supplied RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or the context is longer than 255 bytes.
    fn try_hash_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], ph: &Ph,
    ) -> Result<Self::Signature, &'static str>;

    /// Signs an externally computed message representative `µ` (see `PublicKey::compute_mu()`),
    /// using the default OS RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    #[cfg(feature = "default-rng")]
    fn try_sign_mu(&self, mu: &[u8; 64]) -> Result<Self::Signature, &'static str> {
        self.try_sign_mu_with_rng(&mut OsRng, mu)
    }

    /// Signs an externally computed message representative `µ`, using a supplied RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    fn try_sign_mu_with_rng(&self, rng: &mut impl CryptoRngCore, mu: &[u8; 64]) -> Result<Self::Signature, &'static str>;

    /// Derives the public key corresponding to this private key.
    /// # Examples
    /// ```rust
    /// # #[cfg(feature = "ml-dsa-44")] {
    /// use mldsa::ml_dsa_44;
    /// use mldsa::traits::{KeyGen, SerDes, Signer};
    ///
    /// let (pk, sk) = ml_dsa_44::KG::keygen_from_seed(&[1u8; 32]);
    /// assert_eq!(sk.get_public_key().into_bytes(), pk.into_bytes());
    /// # }
    /// ```
    fn get_public_key(&self) -> Self::PublicKey;
}


/// Verification operations, implemented by `PublicKey` in every parameter set.
pub trait Verifier {
    /// Fixed-size signature `σ`
    type Signature;

    /// Verifies a digital signature over a message and context with respect to a `PublicKey`.
    /// A context longer than 255 bytes, a malformed signature or a mismatch all yield `false`.
    /// This function operates in variable time over public data only.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-65", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_65; // Could also be ml_dsa_44 or ml_dsa_87.
    /// use mldsa::traits::{Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// // Generate key pair and signature
    /// let (pk, sk) = ml_dsa_65::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, &[])?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, &[])); // Use the public to verify message signature
    /// assert!(!pk.verify(&message, &sig, &[0])); // The context is bound into the signature
    /// # }
    /// # Ok(())}
    /// ```
    fn verify(&self, message: &[u8], sig: &Self::Signature, ctx: &[u8]) -> bool;

    /// Verifies the signed message `sm = σ ‖ M` and, on success, copies `M` into `m_out` and
    /// returns its length. On any failure `m_out` is zeroed.
    ///
    /// # Errors
    /// Returns an error when `sm` is shorter than a signature, `m_out` is too short, or the
    /// signature does not verify.
    fn try_open(&self, sm: &[u8], ctx: &[u8], m_out: &mut [u8]) -> Result<usize, &'static str>;

    /// Verifies a HashML-DSA ("pre-hash") signature over a message and context.
    fn hash_verify(&self, message: &[u8], sig: &Self::Signature, ctx: &[u8], ph: &Ph) -> bool;

    /// Verifies a signature over an externally computed message representative `µ`.
    fn verify_mu(&self, mu: &[u8; 64], sig: &Self::Signature) -> bool;
}


/// Conversion between keys and their fixed-length byte encodings.
/// Deserialization rejects any coefficient outside its permitted range (e.g., `s1`, `s2` outside `[−η, η]`),
/// so an accepted key always re-encodes to the same bytes.
pub trait SerDes {
    /// Encoded form, `[u8; PK_LEN]` or `[u8; SK_LEN]`
    type ByteArray;

    /// Encodes the key (`pkEncode` / `skEncode`).
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-65", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_65; // Could also be ml_dsa_44 or ml_dsa_87.
    /// use mldsa::traits::SerDes;
    ///
    /// let (pk, sk) = ml_dsa_65::try_keygen()?; // Generate both public and secret keys
    /// let pk_bytes = pk.into_bytes();
    /// let sk_bytes = sk.into_bytes();
    /// assert_eq!(pk_bytes.len(), ml_dsa_65::PK_LEN);
    /// assert_eq!(sk_bytes.len(), ml_dsa_65::SK_LEN);
    /// # }
    /// # Ok(())}
    /// ```
    fn into_bytes(self) -> Self::ByteArray;

    /// Decodes and range-checks a key (`pkDecode` / `skDecode`).
    /// # Errors
    /// Returns an error on malformed input.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "ml-dsa-87", feature = "default-rng"))] {
    /// use mldsa::ml_dsa_87; // Could also be ml_dsa_44 or ml_dsa_65.
    /// use mldsa::traits::SerDes;
    ///
    /// let (pk, sk) = ml_dsa_87::try_keygen()?; // Generate both public and secret keys
    /// let (pk_bytes, sk_bytes) = (pk.into_bytes(), sk.into_bytes());
    /// let pk_again = ml_dsa_87::PublicKey::try_from_bytes(pk_bytes)?;
    /// let sk_again = ml_dsa_87::PrivateKey::try_from_bytes(sk_bytes)?;
    /// assert_eq!(pk_again.into_bytes(), pk_bytes);
    /// assert_eq!(sk_again.into_bytes(), sk_bytes);
    /// # }
    /// # Ok(())}
    /// ```
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self, &'static str>
    where
        Self: Sized;
}
