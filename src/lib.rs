//! `lottie-pool` plays vector (Lottie/TGS) animations for many host elements at once.
//!
//! Decoding runs on a small pool of worker threads. The caller-facing side is a single-threaded,
//! cooperative [`Orchestrator`] that the host drives:
//!
//! - [`Orchestrator::init`] binds an element to a new player and ships a load request to a worker
//! - [`Orchestrator::poll`] / [`Orchestrator::wait`] dispatch worker replies
//! - [`Orchestrator::tick`] runs one pass of the render loop; [`Orchestrator::next_wake`] says when
//!   the next pass is due (paint callback or timer)
//!
//! Each player owns a bounded frame queue. Decode look-ahead is limited to one request in flight
//! and is only issued while the queue has room, so decoding never runs more than a quarter second
//! ahead of display.
//!
//! The vector rasterizer is an opaque [`DecodeModule`]; the document is an opaque [`Host`]. Both are
//! traits so the scheduling core can be exercised headlessly ([`HeadlessHost`], [`SolidModule`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod channel;
mod decode;
mod foundation;
mod gate;
mod orchestrator;
mod platform;
mod player;
mod pool;
mod registry;
mod scheduler;

/// Real-time event loop for native hosts.
pub mod driver;
/// Document-side seam and the in-memory host used by tests and the CLI.
pub mod host;

pub use assets::header::{AnimationData, AnimationHeader, decode_asset, inflate};
pub use assets::source::{AssetSource, FileSource, MemorySource};
pub use decode::module::{DecodeModule, ModuleFactory, ModuleHandle, module_factory};
pub use decode::solid::{SolidModule, SolidStats};
pub use foundation::core::{ElementId, Fps, PixelSize, RequestId, WorkerId};
pub use foundation::error::{LottieError, LottieResult};
pub use gate::intersects_viewport;
pub use host::{HeadlessElement, HeadlessHost, Host};
pub use orchestrator::{InitStatus, Orchestrator, OrchestratorOpts, PlayerInfo};
pub use platform::{BufferMode, Capabilities, EngineClass, PlatformPolicy, engine_class};
pub use player::options::PlayerOptions;
pub use player::PlayerPhase;
pub use scheduler::{LoopState, Wake};
