pub mod record;
pub mod template;
