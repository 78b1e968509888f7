pub mod event_broker;
pub mod stream;

pub use event_broker::EventBroker;
pub use stream::TaskEventStream;
