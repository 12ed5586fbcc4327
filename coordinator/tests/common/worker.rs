//! Stand-in for the external generation worker
//!
//! Watches the trigger path, consumes each descriptor and answers according
//! to a fixed behaviour.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use shared::{JobDescriptor, StoreLayout};
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum WorkerBehavior {
    /// Write this payload as-is
    Reply(Value),
    /// Write this payload with the descriptor's request_id added
    ReplyTagged(Value),
    /// Write content that is not JSON
    Corrupt,
    /// Never touch the store
    Ignore,
}

pub struct SimulatedWorker {
    handle: JoinHandle<()>,
    seen: Arc<Mutex<Vec<JobDescriptor>>>,
}

impl SimulatedWorker {
    pub fn spawn(layout: StoreLayout, behavior: WorkerBehavior) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let handle = tokio::spawn(async move {
            if matches!(behavior, WorkerBehavior::Ignore) {
                return;
            }

            loop {
                if let Ok(content) = fs::read(layout.trigger_path()).await {
                    let _ = fs::remove_file(layout.trigger_path()).await;
                    if let Ok(descriptor) = JobDescriptor::from_json(&content) {
                        log.lock().await.push(descriptor.clone());
                        answer(&layout, &descriptor, &behavior).await;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        Self { handle, seen }
    }

    /// Descriptors picked up so far, in order
    pub async fn seen(&self) -> Vec<JobDescriptor> {
        self.seen.lock().await.clone()
    }
}

impl Drop for SimulatedWorker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn answer(layout: &StoreLayout, descriptor: &JobDescriptor, behavior: &WorkerBehavior) {
    let content = match behavior {
        WorkerBehavior::Reply(payload) => payload.to_string(),
        WorkerBehavior::ReplyTagged(payload) => {
            let mut payload = payload.clone();
            if let (Some(map), Some(request_id)) = (payload.as_object_mut(), descriptor.request_id) {
                map.insert("request_id".to_string(), Value::String(request_id.to_string()));
            }
            payload.to_string()
        }
        WorkerBehavior::Corrupt => "{\"video\": ".to_string(),
        WorkerBehavior::Ignore => return,
    };

    // Stage then rename, like a well-behaved worker
    let path = layout.result_path(descriptor.index);
    let staged = path.with_extension("json.part");
    fs::write(&staged, content).await.unwrap();
    fs::rename(&staged, &path).await.unwrap();
}
