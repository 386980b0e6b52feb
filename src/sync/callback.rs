// Checkpoint-sync trainer callback
//
// Lifecycle hook invoked by an external training loop. Initialization is
// lazy and one-way: the object-store client is built on the first
// `on_train_begin` and held for the life of the instance, so worker
// processes that never save pay no connection cost.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::store::{ObjectStore, ObjectStoreFactory, S3StoreFactory};
use crate::config;

/// Training-run arguments the trainer shares with its callbacks.
#[derive(Debug, Clone)]
pub struct TrainingArgs {
    /// Directory the trainer writes checkpoints under
    pub output_dir: PathBuf,
}

/// Trainer progress snapshot passed to every lifecycle hook.
#[derive(Debug, Clone)]
pub struct TrainerState {
    /// Optimizer step count at the time of the event
    pub global_step: u64,
    /// Whether this process is the coordinator of the training job.
    /// Singleton side effects (checkpoint upload) happen only there.
    pub is_world_process_zero: bool,
}

/// Trait for training lifecycle callbacks
///
/// Each hook has a fixed signature; callbacks override the events they care
/// about and inherit no-ops for the rest. Hooks on a given process are
/// invoked one at a time by the training loop, never concurrently.
#[async_trait]
pub trait TrainerCallback: Send {
    /// Called once when the training loop starts.
    async fn on_train_begin(&mut self, _args: &TrainingArgs, _state: &TrainerState) -> Result<()> {
        Ok(())
    }

    /// Called after the trainer persists a checkpoint to local storage.
    async fn on_save(&mut self, _args: &TrainingArgs, _state: &TrainerState) -> Result<()> {
        Ok(())
    }
}

/// One-way initialization state of the callback.
enum SyncState {
    Uninitialized,
    Initialized {
        bucket_name: String,
        region: String,
        store: Arc<dyn ObjectStore>,
    },
}

/// A [`TrainerCallback`] that uploads checkpoints to S3.
///
/// Construction fails fast when the static credential variables are absent;
/// everything else (bucket, region, client) is resolved lazily on the first
/// `on_train_begin`. Upload errors propagate to the training loop untouched.
pub struct S3SyncCallback {
    state: SyncState,
    factory: Box<dyn ObjectStoreFactory>,
}

impl std::fmt::Debug for S3SyncCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3SyncCallback").finish_non_exhaustive()
    }
}

impl S3SyncCallback {
    /// Create a callback backed by S3.
    pub fn new() -> Result<Self> {
        Self::with_factory(Box::new(S3StoreFactory))
    }

    /// Create a callback with a custom store factory.
    pub fn with_factory(factory: Box<dyn ObjectStoreFactory>) -> Result<Self> {
        if !config::check_aws_credentials() {
            bail!(
                "S3SyncCallback requires the environment variables \
                 AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY to be set"
            );
        }

        Ok(Self {
            state: SyncState::Uninitialized,
            factory,
        })
    }

    /// Resolve bucket and region from the environment and build the client.
    async fn setup(&mut self) -> Result<()> {
        let settings = config::sync_settings();
        let store = self.factory.create(&settings.region).await?;

        tracing::info!(
            bucket = %settings.bucket_name,
            region = %settings.region,
            "Checkpoint sync initialized"
        );

        self.state = SyncState::Initialized {
            bucket_name: settings.bucket_name,
            region: settings.region,
            store,
        };

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, SyncState::Initialized { .. })
    }

    /// Bucket in use, once initialized.
    pub fn bucket_name(&self) -> Option<&str> {
        match &self.state {
            SyncState::Initialized { bucket_name, .. } => Some(bucket_name),
            SyncState::Uninitialized => None,
        }
    }

    /// Region in use, once initialized.
    pub fn region(&self) -> Option<&str> {
        match &self.state {
            SyncState::Initialized { region, .. } => Some(region),
            SyncState::Uninitialized => None,
        }
    }
}

#[async_trait]
impl TrainerCallback for S3SyncCallback {
    async fn on_train_begin(&mut self, _args: &TrainingArgs, _state: &TrainerState) -> Result<()> {
        if !self.is_initialized() {
            self.setup().await?;
        }
        Ok(())
    }

    async fn on_save(&mut self, args: &TrainingArgs, state: &TrainerState) -> Result<()> {
        let (bucket_name, store) = match &self.state {
            SyncState::Initialized {
                bucket_name, store, ..
            } => (bucket_name, store),
            SyncState::Uninitialized => return Ok(()),
        };

        if !state.is_world_process_zero {
            return Ok(());
        }

        let ckpt_dir = format!("checkpoint-{}", state.global_step);
        let artifact_path = args.output_dir.join(&ckpt_dir);
        let remote = format!("{}/{}/{}", bucket_name, args.output_dir.display(), ckpt_dir);

        tracing::info!(
            checkpoint = %ckpt_dir,
            remote = %remote,
            "Uploading checkpoint artifacts, this may take time"
        );

        store.put_recursive(&artifact_path, &remote).await
    }
}
