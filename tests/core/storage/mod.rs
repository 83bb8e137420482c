//! Storage layer tests

mod test_persistence;
mod test_removal;
