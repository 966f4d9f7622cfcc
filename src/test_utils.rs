use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Route `log` records to the test output once per test binary.
///
/// Honours `RUST_LOG`; defaults to `info` so lifecycle lines show up with
/// `cargo test -- --nocapture`.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .is_test(true)
            .try_init();
    });
}
