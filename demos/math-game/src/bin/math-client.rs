use std::process::ExitCode;

use math_game::PromptAnswerer;
use quizwire::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    math_game::init_logging("warn");

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    println!("Connecting to {url}");
    let mut answerer = PromptAnswerer::stdio();

    let result = play(&url, &mut answerer).await;
    let (text, status) = math_game::report(&result);
    if status == 0 {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
    ExitCode::from(status)
}
