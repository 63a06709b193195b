pub mod element;
pub mod message;
