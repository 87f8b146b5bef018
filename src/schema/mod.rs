pub mod corpus;
pub mod token;
