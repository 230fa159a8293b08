pub mod api;
pub mod model;
pub mod types;

pub use api::{
    AnkiClient,
    AnkiTransport,
    HttpTransport,
};
pub use types::{
    AudioAttachment,
    Note,
    NoteParams,
};
