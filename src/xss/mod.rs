// XSS Detection Module
// Reflected, stored and DOM-based XSS, sharing one reflection classifier

pub mod context;
pub mod dom;
pub mod reflected;
pub mod stored;
pub mod verify;
