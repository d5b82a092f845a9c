use dudect_bencher::{ctbench_main, BenchRng, Class, CtRunner};
use mldsa::{ml_dsa_44, ml_dsa_65};
use rand_core::{CryptoRng, RngCore};

// Test RNG that fills every request with a pattern derived from an incrementing counter, so
// that both the keygen seed and the signing `rnd` are fixed by the starting value (the class).
#[derive(Clone)]
#[repr(align(8))]
struct TestRng {
    value: u32,
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.iter_mut().for_each(|b| *b = self.value.to_le_bytes()[0]);
        out[0..4].copy_from_slice(&self.value.to_be_bytes());
        self.value = self.value.wrapping_add(1);
        Ok(())
    }
}

impl CryptoRng for TestRng {}


const ITERATIONS_INNER: usize = 5;
const ITERATIONS_OUTER: usize = 100_000;

// Left and right classes start from different RNG values, hence different secrets
fn classes_and_rngs() -> (Vec<Class>, Vec<TestRng>) {
    (0..ITERATIONS_OUTER)
        .map(|i| if i % 2 == 0 { (Class::Left, TestRng { value: 56 }) } else { (Class::Right, TestRng { value: 12 }) })
        .unzip()
}


#[allow(deprecated)]
fn keygen_and_sign_44(runner: &mut CtRunner, _rng: &mut BenchRng) {
    let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let (classes, rngs) = classes_and_rngs();
    for (class, rng) in classes.into_iter().zip(rngs) {
        runner.run_one(class, || {
            let mut rng = rng.clone();
            for _ in 0..ITERATIONS_INNER {
                let _sig = ml_dsa_44::dudect_keygen_sign_with_rng(&mut rng, &message).unwrap();
            }
        })
    }
}


#[allow(deprecated)]
fn keygen_and_sign_65(runner: &mut CtRunner, _rng: &mut BenchRng) {
    let message = [7u8; 8];
    let (classes, rngs) = classes_and_rngs();
    for (class, rng) in classes.into_iter().zip(rngs) {
        runner.run_one(class, || {
            let mut rng = rng.clone();
            for _ in 0..ITERATIONS_INNER {
                let _sig = ml_dsa_65::dudect_keygen_sign_with_rng(&mut rng, &message).unwrap();
            }
        })
    }
}

ctbench_main!(keygen_and_sign_44, keygen_and_sign_65);
