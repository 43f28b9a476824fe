#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    WriteFailure,
    ReadFailure,
}
