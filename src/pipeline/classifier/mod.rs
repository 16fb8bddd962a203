pub mod common;
#[cfg(feature = "onnx-ort")]
pub mod ort;

use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

use crate::{
    error::ClassificationError,
    types::{ClassificationResult, Frame, ImageSample, Prediction},
};

/// An image classification model. Implementations own any resizing the model
/// needs and may assume they are only ever called from one thread at a time.
pub trait Classifier: Send + 'static {
    fn classify(&mut self, frame: &Frame) -> Result<Prediction, ClassificationError>;
}

/// Identifies one classification request so a screen can ignore replies
/// that are not for its current capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug)]
pub struct ClassifyReply {
    pub ticket: Ticket,
    pub outcome: Result<ClassificationResult, ClassificationError>,
}

struct ClassifyRequest {
    ticket: Ticket,
    sample: ImageSample,
    reply_tx: Sender<ClassifyReply>,
}

/// Submits work to the classifier thread. Dropping every handle stops it.
#[derive(Clone)]
pub struct ClassifierHandle {
    request_tx: Sender<ClassifyRequest>,
}

impl ClassifierHandle {
    /// Queues `sample` and returns the receiver its single reply arrives on.
    /// Dropping the receiver before the reply arrives discards the result.
    pub fn submit(&self, ticket: Ticket, sample: ImageSample) -> Receiver<ClassifyReply> {
        let (reply_tx, reply_rx) = bounded(1);
        let request = ClassifyRequest {
            ticket,
            sample,
            reply_tx,
        };
        if let Err(err) = self.request_tx.send(request) {
            let request = err.into_inner();
            let _ = request.reply_tx.try_send(ClassifyReply {
                ticket,
                outcome: Err(ClassificationError::inference("classifier worker has stopped")),
            });
        }
        reply_rx
    }
}

/// Spawns the classifier thread. `load` builds the model; it runs on the
/// first request and again on later ones for as long as it keeps failing, so
/// a missing model is reported per scan instead of killing the worker.
pub fn start_classifier<C, L>(mut load: L) -> (ClassifierHandle, thread::JoinHandle<()>)
where
    C: Classifier,
    L: FnMut() -> Result<C, ClassificationError> + Send + 'static,
{
    let (request_tx, request_rx) = unbounded::<ClassifyRequest>();

    let handle = thread::spawn(move || {
        let mut classifier: Option<C> = None;

        while let Ok(request) = request_rx.recv() {
            if classifier.is_none() {
                match load() {
                    Ok(loaded) => {
                        log::info!("leaf classifier ready");
                        classifier = Some(loaded);
                    }
                    Err(err) => {
                        log::error!("failed to load leaf classifier: {err}");
                        deliver(request.reply_tx, request.ticket, Err(err));
                        continue;
                    }
                }
            }

            if let Some(model) = classifier.as_mut() {
                let outcome = run_classification(model, &request.sample);
                deliver(request.reply_tx, request.ticket, outcome);
            }
        }

        log::debug!("classifier worker exiting");
    });

    (ClassifierHandle { request_tx }, handle)
}

fn run_classification<C: Classifier>(
    classifier: &mut C,
    sample: &ImageSample,
) -> Result<ClassificationResult, ClassificationError> {
    let frame = common::decode_sample(sample)?;
    let prediction = classifier.classify(&frame)?;
    log::info!(
        "classified {} as {} ({:.1}%)",
        sample.provenance,
        prediction.label,
        prediction.probability * 100.0
    );
    Ok(ClassificationResult::from_prediction(prediction))
}

fn deliver(
    reply_tx: Sender<ClassifyReply>,
    ticket: Ticket,
    outcome: Result<ClassificationResult, ClassificationError>,
) {
    if let Err(err) = &outcome {
        log::warn!("classification {ticket:?} failed: {err}");
    }
    match reply_tx.try_send(ClassifyReply { ticket, outcome }) {
        Ok(()) => {}
        Err(TrySendError::Disconnected(_)) => {
            log::debug!("discarding result for {ticket:?}: screen is gone");
        }
        Err(TrySendError::Full(_)) => {
            log::warn!("duplicate reply for {ticket:?} dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use std::time::Duration;

    struct Fixed(&'static str, f32);

    impl Classifier for Fixed {
        fn classify(&mut self, _frame: &Frame) -> Result<Prediction, ClassificationError> {
            Ok(Prediction::new(self.0, self.1))
        }
    }

    fn pixel_sample() -> ImageSample {
        ImageSample::decoded(
            Provenance::LiveCapture {
                device: "test".into(),
            },
            Frame::from_rgba(vec![10, 200, 10, 255], 1, 1),
        )
    }

    #[test]
    fn replies_on_the_per_request_channel() {
        let (handle, _worker) = start_classifier(|| Ok(Fixed("Rust_Leaf", 0.873)));
        let reply = handle
            .submit(Ticket(7), pixel_sample())
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(reply.ticket, Ticket(7));
        let result = reply.outcome.unwrap();
        assert_eq!(result.label(), "Rust_Leaf");
        assert_eq!(result.confidence_percent(), 87);
    }

    #[test]
    fn load_is_retried_until_it_succeeds() {
        let mut attempts = 0;
        let (handle, _worker) = start_classifier(move || {
            attempts += 1;
            if attempts == 1 {
                Err(ClassificationError::missing(
                    crate::error::ResourceKind::Model,
                    "models/leaf.onnx",
                ))
            } else {
                Ok(Fixed("Healthy", 0.95))
            }
        });

        let first = handle
            .submit(Ticket(1), pixel_sample())
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(
            first.outcome,
            Err(ClassificationError::ResourceMissing { .. })
        ));

        let second = handle
            .submit(Ticket(2), pixel_sample())
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(second.outcome.unwrap().label(), "Healthy");
    }

    #[test]
    fn worker_stops_when_handles_are_dropped() {
        let (handle, worker) = start_classifier(|| Ok(Fixed("Healthy", 0.5)));
        drop(handle);
        worker.join().unwrap();
    }
}
