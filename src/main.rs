#[tokio::main]
async fn main() {
    if let Err(err) = apiprobe::mcp::server::run_stdio().await {
        eprintln!("apiprobe: {}", err);
        std::process::exit(1);
    }
}
