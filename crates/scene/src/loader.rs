//! Background model loading.
//!
//! Parsing runs on a worker thread; finished graphs come back over a channel that
//! the frame loop drains without blocking. Everything that mutates level state
//! (classification, physics bodies) stays on the frame thread.

use crate::{load_model, SceneError, SceneGraph};
use crossbeam_channel::{Receiver, TryRecvError};
use glam::Vec3;
use std::path::PathBuf;
use std::thread;

/// One model to load. `slot` lets the caller tell results apart.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub slot: usize,
    pub path: PathBuf,
    pub position: Vec3,
}

/// Outcome of one [`AssetRequest`].
#[derive(Debug)]
pub struct AssetLoaded {
    pub request: AssetRequest,
    pub result: Result<SceneGraph, SceneError>,
}

/// Loads a batch of models in request order on a worker thread.
pub struct AssetLoader {
    receiver: Receiver<AssetLoaded>,
    pending: Vec<AssetRequest>,
}

impl AssetLoader {
    /// Start loading `requests`. Returns immediately.
    pub fn spawn(requests: Vec<AssetRequest>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let pending = requests.clone();

        let work = move || {
            for request in requests {
                let result = load_model(&request.path, request.position);
                if sender.send(AssetLoaded { request, result }).is_err() {
                    // Receiver dropped: the level was torn down mid-load.
                    break;
                }
            }
        };

        if let Err(e) = thread::Builder::new().name("asset-loader".into()).spawn(work) {
            log::error!("Could not start asset loader thread: {}", e);
        }

        Self { receiver, pending }
    }

    /// Drain every result that has arrived since the last call.
    pub fn poll(&mut self) -> Vec<AssetLoaded> {
        let mut done = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(loaded) => {
                    self.pending.retain(|r| r.slot != loaded.request.slot);
                    done.push(loaded);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Worker is gone; whatever never arrived is reported as failed.
                    for request in self.pending.drain(..) {
                        let path = request.path.clone();
                        done.push(AssetLoaded {
                            request,
                            result: Err(SceneError::LoaderGone { path }),
                        });
                    }
                    break;
                }
            }
        }
        done
    }

    /// True once every request has been reported.
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_all(loader: &mut AssetLoader) -> Vec<AssetLoaded> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while !loader.is_finished() && Instant::now() < deadline {
            all.extend(loader.poll());
            thread::sleep(Duration::from_millis(5));
        }
        all
    }

    #[test]
    fn failures_are_reported_per_request_in_order() {
        let mut loader = AssetLoader::spawn(vec![
            AssetRequest { slot: 0, path: "/missing/a.glb".into(), position: Vec3::ZERO },
            AssetRequest { slot: 1, path: "/missing/b.glb".into(), position: Vec3::X },
        ]);
        let results = wait_for_all(&mut loader);
        assert!(loader.is_finished());
        assert_eq!(results.iter().map(|r| r.request.slot).collect::<Vec<_>>(), [0, 1]);
        assert!(results.iter().all(|r| r.result.is_err()));
    }

    #[test]
    fn empty_batch_is_finished_immediately() {
        let loader = AssetLoader::spawn(Vec::new());
        assert!(loader.is_finished());
        assert_eq!(loader.pending(), 0);
    }
}
