//! Marker task: announce start, optionally pause, announce finish.

use crate::journal::EventJournal;
use crate::models::{MarkerKind, TaskConfig, TaskContext, TaskEvent};
use crate::pool::Task;
use std::sync::Arc;
use tracing::debug;

/// Task whose body only emits start and finish markers.
#[derive(Debug, Clone)]
pub struct MarkerTask {
    config: TaskConfig,
    journal: Arc<EventJournal>,
}

impl MarkerTask {
    pub fn new(config: TaskConfig, journal: Arc<EventJournal>) -> Self {
        Self { config, journal }
    }

    pub fn journal(&self) -> &Arc<EventJournal> {
        &self.journal
    }

    fn emit(&self, ctx: TaskContext, kind: MarkerKind) {
        debug!(run_id = %ctx.run_id, task = %ctx.id, marker = kind.verb(), "Task marker");
        self.journal
            .record(TaskEvent::new(ctx.run_id, ctx.id, kind, &self.config.label));
    }
}

impl Task for MarkerTask {
    async fn run(&self, ctx: TaskContext) {
        self.emit(ctx, MarkerKind::Started);

        let delay = self.config.delay_for(ctx.id.index());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.emit(ctx, MarkerKind::Finished);
    }
}
