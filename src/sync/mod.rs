// Checkpoint sync module - trainer callback uploading checkpoints to S3

mod callback;
mod store;

pub use callback::{S3SyncCallback, TrainerCallback, TrainerState, TrainingArgs};
pub use store::{ObjectStore, ObjectStoreFactory, S3ObjectStore, S3StoreFactory};
