/// The `cli` module defines the command-line surface and the batch runners.
pub(crate) mod cli;
