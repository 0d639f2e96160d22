pub mod dispatcher;
pub mod push;
pub mod reminder;
pub mod retention;
