use std::{env, process};
use tracing_subscriber::EnvFilter;

use ddcgen::{
    agent::{Classify, DdcAgent},
    config::ClassifierConfig,
    storage::LocalSaver
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let text = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() {
        eprintln!("usage: classify <text to classify>");
        process::exit(2);
    }

    let config = ClassifierConfig::from_env();
    let agent = DdcAgent::new(config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    match agent.classify(&text).await {
        Ok(record) => {
            if let Err(e) = LocalSaver::append_classification_log(&text, &record.number) {
                eprintln!("Logging error (non-critical): {}", e);
            }
            println!("{}", serde_json::to_string_pretty(&record).expect("serialize record"));
        }
        Err(e) => {
            eprintln!("Classification failed: {}", e);
            process::exit(1);
        }
    }
}
