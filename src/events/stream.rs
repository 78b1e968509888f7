use futures_core::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::a2a::{RequestId, SendTaskStreamingResponse, TaskUpdateEvent};

/// Finite stream of streaming responses for one request.
///
/// Wraps a broker subscription and the originating JSON-RPC request id; each
/// event is delivered inside a `SendTaskStreamingResponse` envelope. The
/// stream ends after the event marked final, or when the producer side goes
/// away.
#[derive(Debug)]
pub struct TaskEventStream {
    request_id: RequestId,
    receiver: mpsc::Receiver<TaskUpdateEvent>,
    done: bool,
}

impl TaskEventStream {
    pub fn new(request_id: RequestId, receiver: mpsc::Receiver<TaskUpdateEvent>) -> Self {
        Self {
            request_id,
            receiver,
            done: false,
        }
    }

    /// Receive the next enveloped event, or None once the stream is finished.
    pub async fn recv(&mut self) -> Option<SendTaskStreamingResponse> {
        if self.done {
            return None;
        }
        let event = self.receiver.recv().await?;
        if event.is_final() {
            self.done = true;
        }
        Some(self.envelope(event))
    }

    fn envelope(&self, event: TaskUpdateEvent) -> SendTaskStreamingResponse {
        SendTaskStreamingResponse {
            id: self.request_id.clone(),
            result: Some(event),
            error: None,
        }
    }
}

impl Stream for TaskEventStream {
    type Item = SendTaskStreamingResponse;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_final() {
                    this.done = true;
                }
                Poll::Ready(Some(this.envelope(event)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
