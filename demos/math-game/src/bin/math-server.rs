use quizwire::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    math_game::init_logging("info");

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    let server = QuizServer::builder().bind(&addr).build().await?;
    tracing::info!("math game server ready at ws://{addr}/math");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}
