use std::fs;
use std::io::Write;
use std::time::Duration;

use futures_util::future::FutureExt;
use tailmux::{FileTail, LineSource, SkipPolicy, TailOptions};
use tempfile::tempdir;
use tokio::time;

#[tokio::test]
pub async fn test_newline() {
    let expected_line = "foo bar".to_string();

    let logdir = tempdir().unwrap();
    let logfile = logdir.path().join("foo.log");
    fs::write(&logfile, "").unwrap();

    let options = TailOptions {
        poll_interval: Duration::from_millis(10),
        skip: SkipPolicy::Misaligned,
        ..TailOptions::default()
    };
    let mut tail = FileTail::open(&logfile, &options).await.unwrap();

    // The line shows up in pieces; it must come out whole.
    let writer_path = logfile.clone();
    let writer = tokio::spawn(async move {
        let mut file = fs::OpenOptions::new().append(true).open(writer_path).unwrap();
        for piece in ["foo", " ", "bar", "\n"] {
            file.write_all(piece.as_bytes()).unwrap();
            file.flush().unwrap();
            time::sleep(Duration::from_millis(30)).await;
        }
    });

    let line_val_fut = tail
        .next_record()
        .map(|line| String::from_utf8(line.unwrap().unwrap()).unwrap());

    const TIMEOUT_2_SEC: Duration = Duration::from_millis(2000);

    let (line_val, status) = tokio::try_join!(
        time::timeout(TIMEOUT_2_SEC, line_val_fut),
        time::timeout(TIMEOUT_2_SEC, writer),
    )
    .unwrap();

    assert!(status.is_ok());
    assert_eq!(expected_line, line_val);
}
