//! Lighting command channel.
//!
//! All lighting reads and writes go through one task, so the order in
//! which changes are applied is the order in which reports reach the
//! tablet.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::state::AppState;

/// Requests handled by the lighting task.
#[derive(Debug)]
pub enum LightingCommand {
    /// Select the active ring segment; replies with the stored (clamped) value.
    SetRing { value: i32, reply: oneshot::Sender<u8> },
    /// Set the brightness level; replies with the stored (clamped) value.
    SetBrightness { value: i32, reply: oneshot::Sender<u8> },
    GetBrightness { reply: oneshot::Sender<u8> },
    GetRing { reply: oneshot::Sender<u8> },
}

/// Cloneable sender side of the lighting task.
#[derive(Clone)]
pub struct LightingHandle {
    tx: mpsc::Sender<LightingCommand>,
}

impl LightingHandle {
    pub async fn set_ring_led(&self, value: i32) -> Result<u8> {
        self.request(|reply| LightingCommand::SetRing { value, reply })
            .await
    }

    pub async fn set_brightness(&self, value: i32) -> Result<u8> {
        self.request(|reply| LightingCommand::SetBrightness { value, reply })
            .await
    }

    pub async fn brightness(&self) -> Result<u8> {
        self.request(|reply| LightingCommand::GetBrightness { reply })
            .await
    }

    pub async fn ring_led(&self) -> Result<u8> {
        self.request(|reply| LightingCommand::GetRing { reply }).await
    }

    async fn request<F>(&self, build: F) -> Result<u8>
    where
        F: FnOnce(oneshot::Sender<u8>) -> LightingCommand,
    {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| anyhow!("lighting task stopped"))?;
        rx.await.map_err(|_| anyhow!("lighting task dropped the request"))
    }
}

/// Spawns the lighting task and returns its handle.
///
/// The current state is sent to the tablet once before any command runs.
pub fn spawn(state: Arc<AppState>) -> LightingHandle {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(run(state, rx));
    LightingHandle { tx }
}

async fn run(state: Arc<AppState>, mut rx: mpsc::Receiver<LightingCommand>) {
    // Device writes block on the tablet lock; keep them off the runtime workers.
    let initial = state.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || initial.lighting().apply()).await {
        warn!("Initial lighting update failed: {}", e);
    }

    while let Some(command) = rx.recv().await {
        debug!("Lighting command: {:?}", command);
        let state = state.clone();
        // Awaiting each command keeps them strictly ordered.
        if let Err(e) = tokio::task::spawn_blocking(move || execute(&state, command)).await {
            warn!("Lighting command failed: {}", e);
        }
    }

    debug!("Lighting task finished");
}

fn execute(state: &AppState, command: LightingCommand) {
    let lighting = state.lighting();
    // A dropped reply only means the caller went away.
    let _ = match command {
        LightingCommand::SetRing { value, reply } => reply.send(lighting.set_ring_led(value)),
        LightingCommand::SetBrightness { value, reply } => {
            reply.send(lighting.set_brightness(value))
        }
        LightingCommand::GetBrightness { reply } => reply.send(lighting.brightness()),
        LightingCommand::GetRing { reply } => reply.send(lighting.active_ring()),
    };
}
