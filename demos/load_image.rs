//! Load an image while a terminal bar follows its download.
//!
//! The bar is only ever touched from a dedicated "UI" thread driving the
//! main loop; the body is read on the tokio runtime.
//!
//! ```sh
//! RUST_LOG=fetchmeter=debug cargo run --example load_image [URL]
//! ```

use color_eyre::Result;
use fetchmeter::{dispatch, BarListener, LoaderBuilder, ProgressBarOpts, ProgressRegistry};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/2/23/Mountaintop_of_Seehorn_%28Davos%29.jpg";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_URL.to_string());

    let (dispatcher, main_loop) = dispatch::channel();
    let ui = thread::spawn(move || main_loop.run_blocking());

    let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
    let loader = LoaderBuilder::new(registry).build()?;

    let name = url.rsplit('/').next().unwrap_or_default().to_string();
    let listener = BarListener::new(ProgressBarOpts::percent_only(), 1.0).with_message(name);

    let result = loader.load(&url, Arc::new(listener)).await;

    // Dropping the loader drops the last dispatcher, which ends the UI loop.
    drop(loader);
    let _ = ui.join();

    let image = result?;
    println!("Loaded {} bytes from {}", image.len(), url);
    Ok(())
}
