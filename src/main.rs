#[actix_web::main]
async fn main() -> std::io::Result<()> {
    credit_scoring_lib::run().await
}
