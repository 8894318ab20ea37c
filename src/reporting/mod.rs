pub mod aggregate;
pub mod html;
pub mod json;
pub mod model;
pub mod text;
