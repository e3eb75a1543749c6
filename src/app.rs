//! Running one follower per source until all of them are done.

use std::io::Write;

use tokio::task::JoinSet;

use crate::error::Error;
use crate::follower::Follower;
use crate::layout::content_width;
use crate::output::{color_for, Multiplexer};
use crate::record::DecodeMode;
use crate::source::{PipeSource, Source};
use crate::tail::{FileTail, TailOptions};

/// Follows every source in `sources` concurrently, rendering into `output`
/// for a terminal `columns` wide.
///
/// Sources are colored by their position. A source that fails to open or
/// breaks while followed is logged and dropped; the others carry on. Returns
/// once every follower has finished, which for regular files means never.
pub async fn run<W>(
    sources: &[Source],
    mode: DecodeMode,
    tail: &TailOptions,
    columns: u16,
    output: Multiplexer<W>,
) where
    W: Write + Send + 'static,
{
    let width = content_width(columns);
    let mut followers = JoinSet::new();

    for (ordinal, source) in sources.iter().enumerate() {
        let follower = Follower::new(
            source.label(),
            color_for(ordinal),
            mode,
            width,
            output.clone(),
        );
        let source = source.clone();
        let tail = tail.clone();

        followers.spawn(async move {
            let res = match source {
                Source::Stdin => follower.run(PipeSource::stdin()).await,
                Source::File(path) => match FileTail::open(&path, &tail).await {
                    Ok(file) => follower.run(file).await,
                    Err(e) => Err(Error::open(path, e)),
                },
            };
            if let Err(e) = res {
                log::error!("{}", e);
            }
        });
    }
    drop(output);

    while let Some(joined) = followers.join_next().await {
        if let Err(e) = joined {
            log::error!("follower task failed: {}", e);
        }
    }
}
