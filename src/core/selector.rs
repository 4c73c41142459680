use super::currency::CurrencyCode;
use tracing::debug;

/// One entry of the selector list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorOption {
    pub code: CurrencyCode,
    pub selected: bool,
}

/// Controlled currency picker. It holds only the value it was given and
/// reports a validated pick back to the caller.
#[derive(Debug, Clone, Copy)]
pub struct CurrencySelector {
    value: CurrencyCode,
}

impl CurrencySelector {
    pub fn new(value: CurrencyCode) -> Self {
        Self { value }
    }

    pub fn value(&self) -> CurrencyCode {
        self.value
    }

    pub fn options(&self) -> Vec<SelectorOption> {
        CurrencyCode::ALL
            .into_iter()
            .map(|code| SelectorOption {
                code,
                selected: code == self.value,
            })
            .collect()
    }

    /// Returns the picked code, or `None` when `raw` is not in the set.
    pub fn pick(&self, raw: &str) -> Option<CurrencyCode> {
        match raw.parse::<CurrencyCode>() {
            Ok(code) => Some(code),
            Err(e) => {
                debug!(current = %self.value, "Ignoring selection: {e}");
                None
            }
        }
    }
}
