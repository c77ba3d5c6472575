use async_trait::async_trait;
use bcrypt::{hash, verify, BcryptError};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashWorkerError {
  #[error("Bcrypt error: {0}")]
  Bcrypt(#[from] BcryptError),
  #[error("Thread pool error: {0}")]
  ThreadPool(#[from] ThreadPoolBuildError),
  #[error("Channel send error")]
  Send,
  #[error("Channel receive error")]
  Receive,
}

enum WorkOrder {
  Hash(String, flume::Sender<Result<String, HashWorkerError>>),
  Verify(String, String, flume::Sender<Result<bool, HashWorkerError>>),
}

/// Runs bcrypt off the async executor on a dedicated rayon pool.
pub struct HashWorker {
  sender: flume::Sender<WorkOrder>,
}

impl HashWorker {
  pub fn new(thread_pool: ThreadPool, num_threads: u32, cost: u32) -> Self {
    // A cost-12 hash takes a few hundred milliseconds, so allow roughly three
    // rounds of work per thread to queue before senders wait.
    let channels_capacity = num_threads.max(1) * 3;
    let (tx, rx) = flume::bounded::<WorkOrder>(channels_capacity as usize);
    let rx = Arc::new(rx);

    for _ in 0..num_threads.max(1) {
      thread_pool.spawn({
        let arc_rx = Arc::clone(&rx);
        move || {
          while let Ok(work_order) = arc_rx.recv() {
            match work_order {
              WorkOrder::Hash(password, response) => {
                let _ = response
                  .send(hash(password, cost).map_err(HashWorkerError::from));
              }
              WorkOrder::Verify(password, hashed_password, response) => {
                let _ = response.send(
                  verify(password, &hashed_password)
                    .map_err(HashWorkerError::from),
                );
              }
            };
          }
        }
      });
    }

    Self { sender: tx }
  }

  pub fn with_threads(
    num_threads: u32,
    cost: u32,
  ) -> Result<Self, HashWorkerError> {
    let thread_pool = ThreadPoolBuilder::new()
      .num_threads(num_threads.max(1) as usize)
      .thread_name(|index| format!("hash-worker-{index}"))
      .build()?;
    Ok(Self::new(thread_pool, num_threads, cost))
  }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Hasher {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError>;
  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError>;
}

#[async_trait]
impl Hasher for HashWorker {
  async fn hash_password(
    &self,
    password: &str,
  ) -> Result<String, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Hash(password.to_string(), response_tx))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }

  async fn verify_password(
    &self,
    password: &str,
    hash: &str,
  ) -> Result<bool, HashWorkerError> {
    let (response_tx, response_rx) = flume::bounded(1);
    self
      .sender
      .send_async(WorkOrder::Verify(
        password.to_string(),
        hash.to_string(),
        response_tx,
      ))
      .await
      .map_err(|_| HashWorkerError::Send)?;

    response_rx
      .recv_async()
      .await
      .map_err(|_| HashWorkerError::Receive)?
  }
}
