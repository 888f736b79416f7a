#[tokio::main]
async fn main() {
    if let Err(error) = crisisconnect_lib::run().await {
        eprintln!("crisisconnect failed: {error}");
        std::process::exit(1);
    }
}
