use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tailmux::{run, DecodeMode, Multiplexer, Source, TailOptions};
use tempfile::tempdir;
use tokio::time;

const TIMEOUT_MS: u64 = 2000;

/// Output buffer that can be inspected while followers still hold it.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn rows(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn append(path: &Path, data: &str) {
    let mut file = fs::OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(data.as_bytes()).unwrap();
}

async fn wait_for_rows(buf: &SharedBuf, count: usize) -> Vec<String> {
    let waited = time::timeout(Duration::from_millis(TIMEOUT_MS), async {
        loop {
            let rows = buf.rows();
            if rows.len() >= count {
                return rows;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    waited.unwrap_or_else(|_| panic!("expected {} rows, got {:?}", count, buf.rows()))
}

fn content_of<'a>(rows: &'a [String], label: &str) -> Vec<&'a str> {
    let prefix = format!("|{:<17}| ", label);
    rows.iter()
        .filter_map(|row| row.strip_prefix(prefix.as_str()))
        .collect()
}

#[tokio::test]
async fn test_two_files_interleaved() {
    let logdir = tempdir().unwrap();
    let file_a = logdir.path().join("A");
    let file_b = logdir.path().join("B");
    fs::write(&file_a, "discarded\n").unwrap();
    fs::write(&file_b, "discarded\n").unwrap();

    let buf = SharedBuf::default();
    let output = Multiplexer::new(buf.clone(), false);
    let sources = vec![Source::File(file_a.clone()), Source::File(file_b.clone())];
    let options = TailOptions {
        poll_interval: Duration::from_millis(10),
        ..TailOptions::default()
    };

    let runner = tokio::spawn(async move {
        run(&sources, DecodeMode::Raw, &options, 80, output).await;
    });

    // Let both followers get past the existing content.
    time::sleep(Duration::from_millis(100)).await;

    let long: String = (0..120).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    append(&file_a, "short line\n");
    append(&file_b, &format!("{}\n", long));

    let rows = wait_for_rows(&buf, 4).await;
    runner.abort();

    let label_a = file_a.display().to_string();
    let label_b = file_b.display().to_string();
    let label_a = tailmux::trim_label(&label_a, 17);
    let label_b = tailmux::trim_label(&label_b, 17);

    assert_eq!(content_of(&rows, &label_a), vec!["short line"]);

    // 80 columns leave 59 for content.
    let b_rows = content_of(&rows, &label_b);
    assert_eq!(b_rows.iter().map(|r| r.chars().count()).collect::<Vec<_>>(), vec![59, 59, 2]);
    assert_eq!(b_rows.concat(), long);

    // The wrapped line is one contiguous block.
    let first = rows
        .iter()
        .position(|r| r.starts_with(&format!("|{:<17}|", label_b)))
        .unwrap();
    assert!(rows[first..first + 3]
        .iter()
        .all(|r| r.starts_with(&format!("|{:<17}|", label_b))));
}

#[tokio::test]
async fn test_structured_and_missing_sources() {
    let logdir = tempdir().unwrap();
    let json_log = logdir.path().join("container-json.log");
    fs::write(&json_log, "").unwrap();
    let missing = logdir.path().join("missing.log");

    let buf = SharedBuf::default();
    let output = Multiplexer::new(buf.clone(), false);
    let sources = vec![Source::File(missing), Source::File(json_log.clone())];
    let options = TailOptions {
        poll_interval: Duration::from_millis(10),
        ..TailOptions::default()
    };

    let runner = tokio::spawn(async move {
        run(&sources, DecodeMode::Structured, &options, 40, output).await;
    });

    time::sleep(Duration::from_millis(100)).await;

    // The first record after the seek is dropped even in an empty file.
    append(
        &json_log,
        concat!(
            "{\"log\":\"primer\\n\"}\n",
            "{\"log\":\"hello\\n\",\"stream\":\"stdout\",\"time\":\"2019-01-01T00:00:00Z\"}\n",
            "garbage that is not json\n",
            "{\"log\":\"hi\"}\n",
        ),
    );

    let rows = wait_for_rows(&buf, 2).await;
    runner.abort();

    let label = json_log.display().to_string();
    let label = tailmux::trim_label(&label, 17);
    assert_eq!(content_of(&rows, &label), vec!["hello", "hi"]);
    assert_eq!(rows.len(), 2);
}
