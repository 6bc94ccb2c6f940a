use gigatron_core::config::Config;
use gigatron_core::system::GigatronSystem;

#[test]
fn scenario_audio_emits_expected_sample_count_over_1_000_000_ticks() {
    let config = Config::default(); // hz = 6_250_000
    let mut system = GigatronSystem::new(&config, 44_100);
    system.load_rom(&[0u8; 4]).unwrap(); // all-zero ROM: LD #0 -> AC, repeated

    for _ in 0..1_000_000 {
        system.tick();
    }

    let mut samples = [0.0f32; 8_192];
    let n = system.read_audio_samples(&mut samples);
    let expected = 1_000_000u64 * 44_100 / 6_250_000;
    assert!(
        (n as i64 - expected as i64).abs() <= 1,
        "expected {expected} +-1 samples, got {n}"
    );
}
