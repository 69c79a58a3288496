//! Async driver for the stylesheet pipeline.

use super::{BatchTransform, ChannelSink, Stages, Unit};
use crate::compiler::{RenderOptions, StyleCompiler};
use crate::debug;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run `units` through the batch compiler and the map stages.
///
/// Units for which `compiled` returns true go through one shared
/// [`BatchTransform`]; the rest skip compilation. Compiled units are staged
/// as they stream out of the flush. The result keeps the input order.
///
/// Must be called inside a tokio runtime.
pub async fn run_styles<C, F>(
    units: Vec<Unit>,
    compiled: F,
    compiler: &C,
    options: &RenderOptions,
    stages: Arc<Stages>,
) -> Result<Vec<Unit>>
where
    C: StyleCompiler,
    F: Fn(&Unit) -> bool,
{
    let mut batch = BatchTransform::new();
    // `None` marks a slot filled from the batch output
    let mut slots: Vec<Option<Unit>> = Vec::with_capacity(units.len());
    for unit in units {
        if compiled(&unit) {
            batch.collect(unit);
            slots.push(None);
        } else {
            slots.push(Some(unit));
        }
    }
    debug!("styles"; "{} compiled, {} plain", batch.len(), slots.len() - batch.len());

    let (tx, mut rx) = mpsc::unbounded_channel::<Unit>();
    let consumer_stages = Arc::clone(&stages);
    let consumer = tokio::spawn(async move {
        let mut staged = Vec::new();
        while let Some(unit) = rx.recv().await {
            staged.push(consumer_stages.apply(unit));
        }
        staged
    });

    let mut sink = ChannelSink::new(tx);
    let flushed = batch.flush(compiler, options, &mut sink).await;
    drop(sink);

    let staged = consumer.await.context("stylesheet stage task panicked")?;
    flushed?;

    let mut staged = staged.into_iter();
    slots
        .into_iter()
        .map(|slot| match slot {
            Some(plain) => Ok(stages.apply(plain)),
            None => staged
                .next()
                .context("batch emitted fewer units than it collected"),
        })
        .collect()
}
