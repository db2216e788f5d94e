//! Statement field extraction pipeline.

mod assembler;
mod extractor;
mod identifier;
pub mod normalize;
mod parser;

pub use assembler::assemble;
pub use extractor::PatternFieldExtractor;
pub use identifier::BankIdentifier;
pub use parser::{parse_statement, StatementParser};
