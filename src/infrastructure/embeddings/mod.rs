pub mod fastembed;
pub mod openai;
pub mod voyage;
