//! LineSource trait - Dispatcher input interface

use crate::ContractError;

/// Lazy, finite sequence of input lines.
///
/// `Ok(None)` is the end-of-input signal and is distinct from `Ok(Some(""))`,
/// an empty line.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>, ContractError>;
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn next_line(&mut self) -> Result<Option<String>, ContractError> {
        (**self).next_line()
    }
}
