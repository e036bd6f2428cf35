use criterion::{black_box, criterion_group, criterion_main, Criterion};
use he_context::{
    EncryptionParameters,
    EncryptionContext,
    EncryptionParameterQualifiers,
    SchemeType, PlainModulus, CoeffModulus, SecurityLevel, MemoryPoolHandle, HomomorphicEncryptionStandard,
    util::NTTTables,
};

fn test_suite<F: Fn(String) -> String>(c: &mut Criterion, get_name: F, parms: EncryptionParameters) {

    let context = EncryptionContext::create(&parms, true, SecurityLevel::Tc128);
    assert!(context.parameters_set());

    c.bench_function(get_name("Qualifiers".to_string()).as_str(),
        |b| b.iter(|| EncryptionParameterQualifiers::derive(black_box(&parms), SecurityLevel::Tc128)));
    c.bench_function(get_name("ContextKeyOnly".to_string()).as_str(),
        |b| b.iter(|| EncryptionContext::create(black_box(&parms), false, SecurityLevel::Tc128)));
    c.bench_function(get_name("ContextFull".to_string()).as_str(),
        |b| b.iter(|| EncryptionContext::create(black_box(&parms), true, SecurityLevel::Tc128)));

    let pool = MemoryPoolHandle::new();
    let standard = HomomorphicEncryptionStandard::classical();
    c.bench_function(get_name("ContextFullOwnPool".to_string()).as_str(),
        |b| b.iter(|| EncryptionContext::create_with_standard(
            black_box(&parms), true, SecurityLevel::Tc128, &standard, pool.clone())));

    let coeff_count_power = parms.poly_modulus_degree().trailing_zeros() as usize;
    c.bench_function(get_name("NTTTables".to_string()).as_str(),
        |b| b.iter(|| NTTTables::create_ntt_tables(coeff_count_power, black_box(parms.coeff_modulus())).unwrap()));

    let coeff_modulus = parms.coeff_modulus().to_vec();
    let mut reset = parms.clone();
    c.bench_function(get_name("ParmsID".to_string()).as_str(),
        |b| b.iter(|| reset.set_coeff_modulus(black_box(&coeff_modulus)).unwrap().parms_id()[0]));

    c.bench_function(get_name("Lookup".to_string()).as_str(),
        |b| b.iter(|| context.context_data(black_box(context.last_parms_id())).is_some()));

}

fn bfvbgv_benchmark(c: &mut Criterion, name: String, poly_modulus_degree: usize, plain_modulus_bits: usize, coeff_modulus_bits: Vec<usize>, is_bgv: bool) {

    let mut parms = EncryptionParameters::new(if !is_bgv {SchemeType::BFV} else {SchemeType::BGV});
    parms
        .set_poly_modulus_degree(poly_modulus_degree).unwrap()
        .set_plain_modulus(&PlainModulus::batching(poly_modulus_degree, plain_modulus_bits).unwrap())
        .set_coeff_modulus(&CoeffModulus::create(poly_modulus_degree, &coeff_modulus_bits).unwrap()).unwrap();

    let get_name = |func: String| -> String {format!("{}({}) {}", if !is_bgv {"BFV"} else {"BGV"}, name, func)};
    test_suite(c, get_name, parms);

}

fn ckks_benchmark(c: &mut Criterion, name: String, poly_modulus_degree: usize, coeff_modulus_bits: Vec<usize>) {

    let mut parms = EncryptionParameters::new(SchemeType::CKKS);
    parms
        .set_poly_modulus_degree(poly_modulus_degree).unwrap()
        .set_coeff_modulus(&CoeffModulus::create(poly_modulus_degree, &coeff_modulus_bits).unwrap()).unwrap();

    let get_name = |func: String| -> String {format!("{}({}) {}", "CKKS", name, func)};
    test_suite(c, get_name, parms);

}

fn criterion_bfv_benchmark(c: &mut Criterion) {

    let poly_modulus_degree = 4096;
    let plain_modulus_bits = 20;
    let coeff_modulus_bits = vec![40, 40];
    bfvbgv_benchmark(c, "s".to_string(), poly_modulus_degree, plain_modulus_bits, coeff_modulus_bits, false);

    let poly_modulus_degree = 8192;
    let plain_modulus_bits = 30;
    let coeff_modulus_bits = vec![60, 60, 60];
    bfvbgv_benchmark(c, "m".to_string(), poly_modulus_degree, plain_modulus_bits, coeff_modulus_bits, false);

    let poly_modulus_degree = 16384;
    let plain_modulus_bits = 30;
    let coeff_modulus_bits = vec![60, 40, 40, 40, 40, 60];
    bfvbgv_benchmark(c, "l".to_string(), poly_modulus_degree, plain_modulus_bits, coeff_modulus_bits, false);

}

fn criterion_bgv_benchmark(c: &mut Criterion) {

    let poly_modulus_degree = 8192;
    let plain_modulus_bits = 30;
    let coeff_modulus_bits = vec![60, 60, 60];
    bfvbgv_benchmark(c, "m".to_string(), poly_modulus_degree, plain_modulus_bits, coeff_modulus_bits, true);

}

fn criterion_ckks_benchmark(c: &mut Criterion) {

    let poly_modulus_degree = 4096;
    let coeff_modulus_bits = vec![60, 40];
    ckks_benchmark(c, "s".to_string(), poly_modulus_degree, coeff_modulus_bits);

    let poly_modulus_degree = 8192;
    let coeff_modulus_bits = vec![60, 60, 60];
    ckks_benchmark(c, "m".to_string(), poly_modulus_degree, coeff_modulus_bits);

    let poly_modulus_degree = 16384;
    let coeff_modulus_bits = vec![60, 40, 40, 40, 40, 60];
    ckks_benchmark(c, "l".to_string(), poly_modulus_degree, coeff_modulus_bits);

}

criterion_group!(bench_bfv, criterion_bfv_benchmark);
criterion_group!(bench_bgv, criterion_bgv_benchmark);
criterion_group!(bench_ckks, criterion_ckks_benchmark);
criterion_main!(bench_bfv, bench_bgv, bench_ckks);
