pub mod book;
pub mod feed;
pub mod presentation;
pub mod selection;
pub mod state;
pub mod synthesizer;
