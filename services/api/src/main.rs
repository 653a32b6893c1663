use intake_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("intake-api: {err}");
        std::process::exit(1);
    }
}
