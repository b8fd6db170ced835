//! Interpreter Core
//!
//! Everything needed to broker a WebRTC session between a browser and the
//! realtime translation API: the supported language table, the interpreter
//! prompt, the session wire types, and the upstream client.

pub mod broker;
pub mod instructions;
pub mod languages;
pub mod session;
pub mod upstream;

pub use broker::{BrokerSettings, NegotiationError, SdpAnswer, SessionBroker};
pub use languages::Language;
pub use upstream::{OpenAIRealtimeClient, RealtimeUpstream, Stage, UpstreamError};
