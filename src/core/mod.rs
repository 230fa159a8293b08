pub mod batch;
pub mod cache;
pub mod config;
pub mod errors;
pub mod http;
pub mod pipeline;
pub mod state;
pub mod wordlist;


pub use batch::BatchScheduler;
pub use cache::NoteCache;
pub use config::Config;
pub use errors::LazyError;
pub use pipeline::{
    FetchOutcome,
    FetchedNote,
    reset_local,
    Pipeline,
    RunError,
    RunReport,
    WordFailure,
};
pub use state::{
    ConfigStateTracker,
    Freshness,
    StructuralState,
};
