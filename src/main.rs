#[tokio::main]
async fn main() {
    if let Err(err) = projet_match::api::run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
