use std::{env, process};
use tracing_subscriber::EnvFilter;

use ddcgen::{
    agent::DdcAgent,
    batch::BulkClassifier,
    config::{BulkConfig, ClassifierConfig, OutputConfig},
    parser::TitleParser,
    storage::LocalSaver
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let input = args.next().unwrap_or_else(|| {
        eprintln!("usage: bulk <input.csv> [output.csv]");
        process::exit(2);
    });
    let output = args
        .next()
        .unwrap_or_else(|| OutputConfig::default().results_csv_path());

    let titles = TitleParser::default()
        .read_titles_from_path(&input)
        .unwrap_or_else(|e| {
            eprintln!("Failed to read titles: {}", e);
            process::exit(1);
        });
    println!("# titles: {}", titles.len());

    let agent = DdcAgent::new(ClassifierConfig::from_env()).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let classifier = BulkClassifier::new(agent, BulkConfig::from_env());

    let rows = classifier
        .run(&titles, |rows, progress| {
            println!(
                "chunk {}/{} ({:.0}%), {} rows",
                progress.completed_batches,
                progress.total_batches,
                progress.percent(),
                rows.len()
            );
        })
        .await;

    let succeeded = rows.iter().filter(|r| r.is_ok()).count();
    println!("succeeded: {}, failed: {}", succeeded, rows.len() - succeeded);

    if let Err(e) = LocalSaver::save_rows_as_csv(&output, &rows) {
        eprintln!("Failed to write results: {}", e);
        process::exit(1);
    }
    println!("results written to {}", output);
}
