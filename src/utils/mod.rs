pub mod request;
pub mod text;
pub mod time;
