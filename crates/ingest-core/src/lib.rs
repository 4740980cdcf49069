//! Core position-feed traits and channel types used by the trip tracker

use model::Position;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    Msg(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PositionTx = crossbeam_channel::Sender<Position>;
pub type PositionRx = crossbeam_channel::Receiver<Position>;

/// Trait for any live position feed connector.
#[async_trait::async_trait]
pub trait PositionSource: Send + Sync {
    async fn run(&self, tx: PositionTx) -> Result<(), IngestError>;
}

pub fn channel() -> (PositionTx, PositionRx) {
    crossbeam_channel::unbounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneShot;

    #[async_trait::async_trait]
    impl PositionSource for OneShot {
        async fn run(&self, tx: PositionTx) -> Result<(), IngestError> {
            tx.send(Position::new(52.0, 13.0, 1_700_000_000.0))
                .map_err(|e| IngestError::Msg(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_source_delivers_through_channel() {
        let (tx, rx) = channel();
        OneShot.run(tx).await.unwrap();
        let fix = rx.recv().unwrap();
        assert_eq!(fix.latitude, 52.0);
        assert_eq!(fix.longitude, 13.0);
    }
}
