use log_tail::{TailOptions, follow_log};
use std::time::Duration;
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = TailOptions::default()
        .state_path("/tmp/follow-demo-state.yml")
        .poll_interval(Duration::from_millis(500));
    let mut stream = follow_log("app.log", options).await?;

    println!("Following app.log, one batch per pass...");

    let mut count = 0;
    while let Some(batch) = stream.next().await {
        let lines = batch?;
        println!("Batch #{} with {} lines:", count + 1, lines.len());
        for line in &lines {
            print!("  {}", line);
        }

        count += 1;
        if count >= 5 {
            break;
        }
    }

    Ok(())
}
