use bilinear::{Bls12_381Group, CountingBilinearGroup, DebugBilinearGroup};
use divan::{black_box, AllocProfiler, Bencher};
use groth15::{Groth15G1, Groth15G2};
use rand::SeedableRng;
use sps_bench::{
    memory, prepare_messages, seed_from_str, BenchRng, G1Messages, G2Messages,
    MeasuredOperation, OperationInstance, Scheme, SignatureKeyPair,
    TrackingAllocator,
};

const MESSAGE_LENGTHS: [usize; 3] = [1, 8, 32];

static DIVAN_ALLOC: AllocProfiler = AllocProfiler::system();

#[global_allocator]
static ALLOC: TrackingAllocator<AllocProfiler> =
    TrackingAllocator::new(&DIVAN_ALLOC);

fn bench_rng(label: &str) -> BenchRng {
    BenchRng::seed_from_u64(seed_from_str(&format!("groth15-divan-{label}")))
}

#[divan::bench(args = MESSAGE_LENGTHS)]
fn sign_messages_in_g1(bencher: Bencher, length: usize) {
    let group = Bls12_381Group::bls12_381();
    let mut rng = bench_rng("sign-g1");
    let instance = Groth15G1::new()
        .construct(&group, length, &mut rng)
        .expect("groth15 setup should succeed");
    let key_pair = instance
        .generate_key_pair(length, &mut rng)
        .expect("groth15 keygen should succeed");
    let message =
        prepare_messages::<_, G1Messages<_>>(&group, 1, length, &mut rng)
            .remove(0);

    bencher.bench_local(|| {
        black_box(
            instance
                .sign(key_pair.signing_key(), &message, &mut rng)
                .expect("groth15 sign should succeed"),
        )
    });
}

#[divan::bench(args = MESSAGE_LENGTHS)]
fn verify_messages_in_g2(bencher: Bencher, length: usize) {
    let group = Bls12_381Group::bls12_381();
    let mut rng = bench_rng("verify-g2");
    let instance = Groth15G2::new()
        .construct(&group, length, &mut rng)
        .expect("groth15 setup should succeed");
    let key_pair = instance
        .generate_key_pair(length, &mut rng)
        .expect("groth15 keygen should succeed");
    let message =
        prepare_messages::<_, G2Messages<_>>(&group, 1, length, &mut rng)
            .remove(0);
    let signature = instance
        .sign(key_pair.signing_key(), &message, &mut rng)
        .expect("groth15 sign should succeed");

    bencher.bench_local(|| {
        let valid = instance
            .verify(&message, &signature, key_pair.verification_key())
            .expect("groth15 verify call should succeed");
        assert!(valid, "groth15 verify must return true");
        black_box(valid)
    });
}

fn print_operation_counts() {
    let group = CountingBilinearGroup::new(DebugBilinearGroup::new());
    let scheme = Groth15G1::new();
    println!("{} verify operation counts:", scheme.scheme_name());

    for length in MESSAGE_LENGTHS {
        let mut rng = bench_rng(&format!("counts-{length}"));
        let instance = scheme
            .construct(&group, length, &mut rng)
            .expect("counting setup should succeed");
        let key_pair = instance
            .generate_key_pair(length, &mut rng)
            .expect("counting keygen should succeed");
        let message = prepare_messages::<_, G1Messages<_>>(
            &group, 1, length, &mut rng,
        )
        .remove(0);
        let signature = instance
            .sign(key_pair.signing_key(), &message, &mut rng)
            .expect("counting sign should succeed");

        group.set_bucket("verify");
        group.reset_counters();
        let valid = instance
            .verify(&message, &signature, key_pair.verification_key())
            .expect("counting verify should succeed");
        assert!(valid, "counting verify must return true");
        println!(
            "  Message {length} elements: {}",
            group.bucket_counts("verify")
        );
    }
}

fn print_memory_usage() {
    let group = Bls12_381Group::bls12_381();
    let scheme = Groth15G1::new();
    println!("{} peak heap usage:", scheme.scheme_name());

    for length in MESSAGE_LENGTHS {
        let mut rng = bench_rng(&format!("mem-{length}"));
        let instance = scheme
            .construct(&group, length, &mut rng)
            .expect("memory setup should succeed");
        let key_pair = instance
            .generate_key_pair(length, &mut rng)
            .expect("memory keygen should succeed");
        let message = prepare_messages::<_, G1Messages<_>>(
            &group, 1, length, &mut rng,
        )
        .remove(0);

        memory::reset_peak();
        let signature = instance
            .sign(key_pair.signing_key(), &message, &mut rng)
            .expect("memory measurement should sign message");
        let sign_peak = memory::peak_bytes();

        memory::reset_peak();
        let valid = instance
            .verify(&message, &signature, key_pair.verification_key())
            .expect("memory measurement verify call should succeed");
        assert!(valid, "benchmark setup should verify the signed message");
        let verify_peak = memory::peak_bytes();

        println!(
            "  Message {length} elements: sign={sign_peak} bytes, verify={verify_peak} bytes"
        );
    }
}

fn main() {
    print_operation_counts();
    print_memory_usage();
    divan::main();
}
