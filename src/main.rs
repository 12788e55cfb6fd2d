use anyhow::{Context, Result};
use judicial_assets::{run_from_source, AppConfig, SystemClock};
use std::{
    env,
    fs::File,
    io::{self, BufWriter, Write},
    time::Instant,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // logs go to stderr so stdout stays clean JSON
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let config = AppConfig::from_env(env::args().nth(1))?;
    info!(source = %config.source.display(), "starting run");
    let start = Instant::now();

    let payload = run_from_source(&config.source, &SystemClock, &config.pipeline)?;

    match &config.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &payload)?;
            writer.flush()?;
            info!(output = %path.display(), "wrote dashboard payload");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &payload)?;
            writeln!(writer)?;
        }
    }

    info!(
        records = payload.records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}
