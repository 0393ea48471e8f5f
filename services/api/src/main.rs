use card_portal_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("card portal error: {err}");
        std::process::exit(1);
    }
}
