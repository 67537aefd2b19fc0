use clap::{Arg, ArgAction, Command};
use defect_ingest::{ingest_path, IngestOptions};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("inspect")
        .about("Parse a defect log and report what was extracted")
        .arg(Arg::new("path").long("path").value_parser(clap::value_parser!(PathBuf)).required(true))
        .arg(Arg::new("config").long("config").help("JSON file with ingest options").value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("delimiter").long("delimiter").help("Field delimiter for CSV input").value_parser(clap::value_parser!(char)))
        .arg(Arg::new("quote").long("quote").help("Quote character for CSV input").value_parser(clap::value_parser!(char)))
        .arg(Arg::new("json").long("json").help("Print the records as JSON").action(ArgAction::SetTrue))
        .arg(Arg::new("limit").long("limit").help("Show at most N records").value_parser(clap::value_parser!(usize)))
        .arg(Arg::new("verbose").short('v').long("verbose").help("Debug logging").action(ArgAction::SetTrue))
        .arg(Arg::new("quiet").short('q').long("quiet").help("Only log errors").action(ArgAction::SetTrue))
        .get_matches();

    setup_logging(matches.get_flag("verbose"), matches.get_flag("quiet"));

    let mut options = match matches.get_one::<PathBuf>("config") {
        Some(p) => IngestOptions::from_json_file(p)?,
        None => IngestOptions::default(),
    };
    if let Some(&d) = matches.get_one::<char>("delimiter") {
        options.delimiter = d;
    }
    if let Some(&q) = matches.get_one::<char>("quote") {
        options.quote = q;
    }
    debug!("options: {:?}", options);

    let path = matches.get_one::<PathBuf>("path").unwrap();
    let start = Instant::now();
    let ingested = ingest_path(path, &options).await?;
    let elapsed = start.elapsed().as_secs_f64();

    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(ingested.records.len());
    let shown = &ingested.records[..limit.min(ingested.records.len())];

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    let summary = &ingested.summary;
    let rps = (summary.data_rows as f64) / elapsed.max(f64::EPSILON);
    println!(
        "source={} format={:?} rows={} records={} skipped={} crc=0x{:08x}\nelapsed={:.3}s rows/sec={:.0}",
        path.display(),
        summary.format,
        summary.data_rows,
        summary.records,
        summary.skipped,
        summary.checksum,
        elapsed,
        rps
    );
    if !summary.headers.is_empty() {
        println!("headers={:?}", summary.headers);
    }
    for line in &summary.diagnostics {
        println!("  skipped: {line}");
    }
    for record in shown {
        println!(
            "{:<12} {:<40} feature={} origin={} tc={}",
            record.id, record.subject, record.feature_tag, record.bug_origin, record.test_case_id
        );
    }
    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("defect_ingest={level},inspect={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
