use log_tail::{FileStateStore, RotatingTail};

/// Prints whatever was appended to a log file since the last run.
/// Run it repeatedly (e.g. from cron) against a logrotate-managed file.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tail = RotatingTail::with_store(
        "/var/log/apache2/access.log",
        FileStateStore::new("/tmp/access-log-demo-state.yml"),
    );

    let mut count = 0;
    tail.process_new_lines(|line| {
        count += 1;
        print!("[{}] {}", count, line);
        Ok::<(), std::io::Error>(())
    })
    .await?;

    println!("--- {} new lines", count);
    Ok(())
}
