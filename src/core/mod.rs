//! Runtime plumbing shared by the engine: clocks, id generation and the
//! journey event channel.

pub mod event_bus;
pub mod runtime_context;

pub use event_bus::{create_event_channel, EventReceiver, EventSender, JourneyEvent};
pub use runtime_context::{
    FakeIdGenerator, FakeTimeProvider, IdGenerator, RealIdGenerator, RealTimeProvider,
    RuntimeContext, TimeProvider,
};
