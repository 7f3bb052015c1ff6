pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod photometry;
pub mod pipeline;
pub mod table;
pub mod tracking;
