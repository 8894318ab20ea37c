pub mod corpus;
pub mod injector;
