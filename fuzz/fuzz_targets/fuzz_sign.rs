#![no_main]
use libfuzzer_sys::fuzz_target;
use mldsa::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa::{ml_dsa_44, ml_dsa_65, ml_dsa_87, Ph};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRngCore, SeedableRng};


// Deterministic RNG seeded from (up to) the first 32 bytes of input
fn create_rng(seed_data: &[u8]) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    let len = seed_data.len().min(32);
    seed[..len].copy_from_slice(&seed_data[..len]);
    ChaCha20Rng::from_seed(seed)
}


// Cross-checks the signing entry points of one parameter set against each other.
fn fuzz_signer_for_params<S, V>(msg: &[u8], ctx: &[u8], rng: &mut impl CryptoRngCore, keypair: &(V, S))
where
    S: Signer<PublicKey = V>,
    V: Verifier<Signature = S::Signature> + SerDes + Clone,
    S::Signature: PartialEq,
    V::ByteArray: PartialEq,
{
    let (pk, sk) = keypair;

    // Hedged signatures differ, but both verify
    let sig1 = sk.try_sign_with_rng(rng, msg, ctx).unwrap();
    let sig2 = sk.try_sign_with_rng(rng, msg, ctx).unwrap();
    assert!(sig1 != sig2);
    assert!(pk.verify(msg, &sig1, ctx));
    assert!(pk.verify(msg, &sig2, ctx));

    // Deterministic signatures repeat
    let det1 = sk.try_sign_deterministic(msg, ctx).unwrap();
    let det2 = sk.try_sign_deterministic(msg, ctx).unwrap();
    assert!(det1 == det2);
    assert!(pk.verify(msg, &det1, ctx));

    // Derived public key matches
    let derived_pk = sk.get_public_key();
    assert!(derived_pk.clone().into_bytes() == pk.clone().into_bytes());
    assert!(derived_pk.verify(msg, &sig1, ctx));

    // Pre-hash signatures are separated from pure ones and from each other
    for ph in [Ph::SHA256, Ph::SHA512, Ph::SHAKE128] {
        let sig = sk.try_hash_sign_with_rng(rng, msg, ctx, &ph).unwrap();
        assert!(pk.hash_verify(msg, &sig, ctx, &ph));
        assert!(!pk.verify(msg, &sig, ctx));
        let wrong_ph = if ph == Ph::SHA256 { Ph::SHA512 } else { Ph::SHA256 };
        assert!(!pk.hash_verify(msg, &sig, ctx, &wrong_ph));
    }
}


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut rng = create_rng(data);
    let ml_dsa_44_keypair = ml_dsa_44::KG::try_keygen_with_rng(&mut rng).unwrap();
    let ml_dsa_65_keypair = ml_dsa_65::KG::try_keygen_with_rng(&mut rng).unwrap();
    let ml_dsa_87_keypair = ml_dsa_87::KG::try_keygen_with_rng(&mut rng).unwrap();

    // First byte selects the context length
    let ctx_len = usize::from(data[0]) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    fuzz_signer_for_params(msg, ctx, &mut rng, &ml_dsa_44_keypair);
    fuzz_signer_for_params(msg, ctx, &mut rng, &ml_dsa_65_keypair);
    fuzz_signer_for_params(msg, ctx, &mut rng, &ml_dsa_87_keypair);

    // External µ matches the pure interface
    let (pk, sk) = &ml_dsa_65_keypair;
    let mu = pk.compute_mu(msg, ctx).unwrap();
    let sig = sk.try_sign_mu_with_rng(&mut rng, &mu).unwrap();
    assert!(pk.verify(msg, &sig, ctx));
    assert!(pk.verify_mu(&mu, &sig));
});
